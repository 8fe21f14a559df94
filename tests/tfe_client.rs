use tfsync::{SourceError, StateSource, TfeClient, TfeError};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn state_version_body(download_url: &str) -> serde_json::Value {
    serde_json::json!({
        "data": {
            "id": "sv-g4rqST72reoHMM5a",
            "type": "state-versions",
            "attributes": {
                "created-at": "2021-06-08T01:22:03.794Z",
                "serial": 7,
                "hosted-state-download-url": download_url
            }
        }
    })
}

#[tokio::test]
async fn test_read_current_version_success() {
    let mock_server = MockServer::start().await;
    let download_url = format!("{}/archivist/sv-1", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/api/v2/workspaces/ws-abc123/current-state-version"))
        .and(header("authorization", "Bearer test_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(state_version_body(&download_url)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = TfeClient::with_address("test_token".to_string(), mock_server.uri()).unwrap();
    let version = client.read_current_version("ws-abc123").await.unwrap();

    assert_eq!(version.id, "sv-g4rqST72reoHMM5a");
    assert_eq!(version.serial, Some(7));
    assert_eq!(version.download_url, download_url);
}

#[tokio::test]
async fn test_read_current_version_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/workspaces/ws-empty/current-state-version"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "errors": [{ "status": "404", "title": "not found" }]
        })))
        .mount(&mock_server)
        .await;

    let client = TfeClient::with_address("test_token".to_string(), mock_server.uri()).unwrap();
    let result = client.read_current_version("ws-empty").await;

    match result {
        Err(TfeError::NoCurrentVersion { workspace_id }) => assert_eq!(workspace_id, "ws-empty"),
        other => panic!("expected TfeError::NoCurrentVersion, got {:?}", other),
    }
}

#[tokio::test]
async fn test_read_current_version_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/workspaces/ws-abc123/current-state-version"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "errors": [{ "status": "401", "title": "unauthorized" }]
        })))
        .mount(&mock_server)
        .await;

    let client =
        TfeClient::with_address("super_secret_token_12345".to_string(), mock_server.uri())
            .unwrap();
    let err = client.read_current_version("ws-abc123").await.unwrap_err();

    assert!(matches!(err, TfeError::Auth { .. }));
    assert_eq!(err.to_string(), "authentication failed: unauthorized");
    assert!(
        !err.to_string().contains("super_secret_token_12345"),
        "Error message must NOT contain the token"
    );
}

#[tokio::test]
async fn test_read_current_version_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/workspaces/ws-abc123/current-state-version"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&mock_server)
        .await;

    let client = TfeClient::with_address("test_token".to_string(), mock_server.uri()).unwrap();
    let err = client.read_current_version("ws-abc123").await.unwrap_err();

    match err {
        TfeError::Api { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "Service Unavailable");
        }
        other => panic!("expected TfeError::Api, got {:?}", other),
    }
}

#[tokio::test]
async fn test_read_current_version_missing_download_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/workspaces/ws-abc123/current-state-version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "id": "sv-1", "type": "state-versions", "attributes": { "serial": 1 } }
        })))
        .mount(&mock_server)
        .await;

    let client = TfeClient::with_address("test_token".to_string(), mock_server.uri()).unwrap();
    let err = client.read_current_version("ws-abc123").await.unwrap_err();

    assert!(err.to_string().contains("no download url"));
}

#[tokio::test]
async fn test_download_returns_raw_bytes() {
    let mock_server = MockServer::start().await;
    let state = br#"{"version":4,"serial":7,"resources":[]}"#.to_vec();

    Mock::given(method("GET"))
        .and(path("/archivist/sv-1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(state.clone()))
        .mount(&mock_server)
        .await;

    let client = TfeClient::with_address("test_token".to_string(), mock_server.uri()).unwrap();
    let url = format!("{}/archivist/sv-1", mock_server.uri());
    let bytes = client.download(&url).await.unwrap();

    assert_eq!(bytes, state);
}

#[tokio::test]
async fn test_download_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/archivist/expired"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let client = TfeClient::with_address("test_token".to_string(), mock_server.uri()).unwrap();
    let url = format!("{}/archivist/expired", mock_server.uri());
    let err = client.download(&url).await.unwrap_err();

    assert!(matches!(err, TfeError::Api { status: 403, .. }));
    assert!(err.to_string().contains("403"));
}

#[tokio::test]
async fn test_read_current_version_retries_after_rate_limit() {
    let mock_server = MockServer::start().await;
    let download_url = format!("{}/archivist/sv-1", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/api/v2/workspaces/ws-abc123/current-state-version"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v2/workspaces/ws-abc123/current-state-version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(state_version_body(&download_url)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = TfeClient::with_address("test_token".to_string(), mock_server.uri()).unwrap();
    let version = client.read_current_version("ws-abc123").await.unwrap();

    assert_eq!(version.download_url, download_url);
}

#[tokio::test]
async fn test_rate_limit_gives_up_after_bounded_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/archivist/busy"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .expect(5)
        .mount(&mock_server)
        .await;

    let client = TfeClient::with_address("test_token".to_string(), mock_server.uri()).unwrap();
    let url = format!("{}/archivist/busy", mock_server.uri());
    let err = client.download(&url).await.unwrap_err();

    assert!(matches!(err, TfeError::RateLimited { attempts: 5 }));
}

#[tokio::test]
async fn test_fetch_current_state_resolves_then_downloads() {
    let mock_server = MockServer::start().await;
    let download_url = format!("{}/archivist/sv-1", mock_server.uri());
    let state = br#"{"version":4,"serial":7}"#.to_vec();

    Mock::given(method("GET"))
        .and(path("/api/v2/workspaces/ws-abc123/current-state-version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(state_version_body(&download_url)))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/archivist/sv-1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(state.clone()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = TfeClient::with_address("test_token".to_string(), mock_server.uri()).unwrap();
    let bytes = client.fetch_current_state("ws-abc123").await.unwrap();

    assert_eq!(bytes, state);
}

#[tokio::test]
async fn test_fetch_current_state_not_found_is_recognizable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/workspaces/ws-empty/current-state-version"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = TfeClient::with_address("test_token".to_string(), mock_server.uri()).unwrap();
    let err = client.fetch_current_state("ws-empty").await.unwrap_err();

    assert!(err.is_no_current_version());
}

#[tokio::test]
async fn test_fetch_current_state_other_failures_are_tfe_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/workspaces/ws-abc123/current-state-version"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "errors": [{ "status": "500", "title": "internal", "detail": "database unavailable" }]
        })))
        .mount(&mock_server)
        .await;

    let client = TfeClient::with_address("test_token".to_string(), mock_server.uri()).unwrap();
    let err = client.fetch_current_state("ws-abc123").await.unwrap_err();

    match &err {
        SourceError::Tfe {
            workspace_id,
            step,
            message,
        } => {
            assert_eq!(workspace_id, "ws-abc123");
            assert_eq!(*step, "read current state version");
            assert_eq!(message, "API error (500): database unavailable");
        }
        other => panic!("expected SourceError::Tfe, got {:?}", other),
    }
    assert_eq!(
        err.to_string(),
        "failed to read current state version for workspace 'ws-abc123': \
         API error (500): database unavailable"
    );
}

#[tokio::test]
async fn test_fetch_current_state_download_failure_names_step() {
    let mock_server = MockServer::start().await;
    let download_url = format!("{}/archivist/expired", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/api/v2/workspaces/ws-abc123/current-state-version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(state_version_body(&download_url)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/archivist/expired"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let client = TfeClient::with_address("test_token".to_string(), mock_server.uri()).unwrap();
    let err = client.fetch_current_state("ws-abc123").await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "failed to download state for workspace 'ws-abc123': API error (403): Forbidden"
    );
}
