use serde::Deserialize;

pub const JSON_API_CONTENT_TYPE: &str = "application/vnd.api+json";

/// The parts of a state version this crate needs.
#[derive(Debug, Clone, PartialEq)]
pub struct StateVersion {
    pub id: String,
    pub serial: Option<u64>,
    pub download_url: String,
}

#[derive(Debug, Deserialize)]
pub struct JsonApiDocument<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct StateVersionData {
    pub id: String,
    #[serde(default)]
    pub attributes: StateVersionAttributes,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct StateVersionAttributes {
    #[serde(default)]
    pub serial: Option<u64>,
    #[serde(default)]
    pub hosted_state_download_url: Option<String>,
}

impl StateVersionData {
    pub fn into_state_version(self) -> Option<StateVersion> {
        let download_url = self
            .attributes
            .hosted_state_download_url
            .filter(|url| !url.is_empty())?;
        Some(StateVersion {
            id: self.id,
            serial: self.attributes.serial,
            download_url,
        })
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct JsonApiErrors {
    #[serde(default)]
    pub errors: Vec<JsonApiError>,
}

#[derive(Debug, Deserialize)]
pub struct JsonApiError {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl JsonApiErrors {
    /// First error's detail, falling back to its title.
    pub fn first_message(&self) -> Option<String> {
        self.errors
            .first()
            .and_then(|e| e.detail.clone().or_else(|| e.title.clone()))
    }
}
