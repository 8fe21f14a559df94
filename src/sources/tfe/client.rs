use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, RETRY_AFTER};

use super::TfeError;
use super::types::{
    JSON_API_CONTENT_TYPE, JsonApiDocument, JsonApiErrors, StateVersion, StateVersionData,
};

pub const DEFAULT_TFE_ADDRESS: &str = "https://app.terraform.io";

const API_PATH: &str = "/api/v2";

/// Requests answered with 429 are retried until this many attempts have been made.
const RATE_LIMIT_ATTEMPTS: u32 = 5;

#[derive(Clone)]
pub struct TfeClient {
    client: reqwest::Client,
    base_url: String,
}

impl TfeClient {
    pub fn new(token: String) -> Result<Self, TfeError> {
        Self::with_address(token, DEFAULT_TFE_ADDRESS.to_string())
    }

    /// `address` is the host root (`https://tfe.example.com`); the API path is appended.
    /// NOTE: Also used for testing with mock servers.
    pub fn with_address(token: String, address: String) -> Result<Self, TfeError> {
        if token.trim().is_empty() {
            return Err(TfeError::Auth {
                message: "missing API token".to_string(),
            });
        }

        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", token);
        let header_value = HeaderValue::from_str(&auth_value).map_err(|_| TfeError::Auth {
            message: "Invalid token format".to_string(),
        })?;
        headers.insert(AUTHORIZATION, header_value);
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_API_CONTENT_TYPE));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("tfsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(TfeError::Network)?;

        let base_url = format!("{}{}", address.trim_end_matches('/'), API_PATH);

        Ok(Self { client, base_url })
    }

    pub fn api_base(&self) -> &str {
        &self.base_url
    }

    /// Resolves the workspace's current state version and its download location.
    pub async fn read_current_version(&self, workspace_id: &str) -> Result<StateVersion, TfeError> {
        let url = format!(
            "{}/workspaces/{}/current-state-version",
            self.base_url,
            urlencoding::encode(workspace_id)
        );

        let response = self.get(&url, JSON_API_CONTENT_TYPE).await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(TfeError::NoCurrentVersion {
                workspace_id: workspace_id.to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_status(status, &body));
        }

        let document: JsonApiDocument<StateVersionData> =
            response.json().await.map_err(|e| TfeError::Api {
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            })?;

        document
            .data
            .into_state_version()
            .ok_or_else(|| TfeError::Api {
                status: status.as_u16(),
                message: "state version has no download url".to_string(),
            })
    }

    /// Downloads the raw state file behind a state version's download url.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, TfeError> {
        let response = self.get(url, "application/json").await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_status(status, &body));
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// Sends a GET, backing off while the API answers 429. A `Retry-After` given in seconds
    /// overrides the exponential interval.
    async fn get(&self, url: &str, accept: &'static str) -> Result<reqwest::Response, TfeError> {
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(500))
            .with_max_elapsed_time(Some(Duration::from_secs(60)))
            .build();

        let mut attempts = 0u32;
        backoff::future::retry(policy, || {
            attempts += 1;
            let attempt = attempts;
            let request = self.client.get(url).header(ACCEPT, accept);

            async move {
                let response = match request.send().await {
                    Ok(response) => response,
                    Err(e) => return Err(backoff::Error::permanent(TfeError::Network(e))),
                };

                if response.status() != StatusCode::TOO_MANY_REQUESTS {
                    return Ok(response);
                }

                let err = TfeError::RateLimited { attempts: attempt };
                if attempt >= RATE_LIMIT_ATTEMPTS {
                    return Err(backoff::Error::permanent(err));
                }

                let retry_after = retry_after_secs(response.headers());
                tracing::warn!(attempt, ?retry_after, "rate limited by TFE, backing off");

                Err(match retry_after {
                    Some(secs) => backoff::Error::retry_after(err, Duration::from_secs(secs)),
                    None => backoff::Error::transient(err),
                })
            }
        })
        .await
    }
}

fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

fn error_for_status(status: StatusCode, body: &str) -> TfeError {
    let message = serde_json::from_str::<JsonApiErrors>(body)
        .ok()
        .and_then(|errors| errors.first_message())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        });

    if status == StatusCode::UNAUTHORIZED {
        return TfeError::Auth { message };
    }

    TfeError::Api {
        status: status.as_u16(),
        message,
    }
}

impl std::fmt::Debug for TfeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfeClient")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
