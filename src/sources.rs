pub mod tfe;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    /// The workspace has no current state version.
    #[error("no current state version for workspace '{workspace_id}'")]
    NoCurrentVersion { workspace_id: String },
    /// Any other failure, labelled with the step that failed.
    #[error("failed to {step} for workspace '{workspace_id}': {message}")]
    Tfe {
        workspace_id: String,
        step: &'static str,
        message: String,
    },
}

impl SourceError {
    pub fn is_no_current_version(&self) -> bool {
        matches!(self, SourceError::NoCurrentVersion { .. })
    }
}

/// Remote versioned-state service.
#[async_trait]
pub trait StateSource: Send + Sync {
    fn name(&self) -> &str;

    /// Latest state snapshot bytes for `workspace_id`.
    async fn fetch_current_state(&self, workspace_id: &str) -> Result<Vec<u8>, SourceError>;
}

/// What a caller gets back once the ignore-empty policy has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchedState {
    Contents(Vec<u8>),
    Ignored,
}

/// Fetches the current state, turning "no current version" into [`FetchedState::Ignored`] when the
/// caller opted in. Every other failure propagates.
pub async fn fetch_state(
    source: &dyn StateSource,
    workspace_id: &str,
    ignore_empty: bool,
) -> Result<FetchedState, SourceError> {
    match source.fetch_current_state(workspace_id).await {
        Ok(contents) => Ok(FetchedState::Contents(contents)),
        Err(err) if ignore_empty && err.is_no_current_version() => {
            tracing::info!(workspace_id, "no current state version, ignoring");
            Ok(FetchedState::Ignored)
        }
        Err(err) => Err(err),
    }
}
