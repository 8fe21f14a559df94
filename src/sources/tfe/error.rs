use thiserror::Error;

use crate::sources::SourceError;

/// Terraform Cloud/Enterprise API errors.
///
/// SECURITY: Error messages must NEVER contain the API token.
#[derive(Debug, Error)]
pub enum TfeError {
    /// Token missing, malformed or rejected
    #[error("authentication failed: {message}")]
    Auth { message: String },

    /// API returned an error response
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Network-level error (connection failed, timeout, etc.)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Workspace has no current state version (or is not visible to the token)
    #[error("no current state version for workspace '{workspace_id}'")]
    NoCurrentVersion { workspace_id: String },

    /// Still rate limited after the retry budget ran out
    #[error("rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },
}

impl TfeError {
    /// Maps into the source-level error, labelling everything but "no current version" with the
    /// workspace and the step that failed.
    pub fn into_source_error(self, workspace_id: &str, step: &'static str) -> SourceError {
        match self {
            TfeError::NoCurrentVersion { workspace_id } => {
                SourceError::NoCurrentVersion { workspace_id }
            }
            other => SourceError::Tfe {
                workspace_id: workspace_id.to_string(),
                step,
                message: other.to_string(),
            },
        }
    }
}
