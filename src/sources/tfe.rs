mod client;
mod error;
mod types;

pub use client::{DEFAULT_TFE_ADDRESS, TfeClient};
pub use error::TfeError;
pub use types::StateVersion;

use async_trait::async_trait;

use super::{SourceError, StateSource};

#[async_trait]
impl StateSource for TfeClient {
    fn name(&self) -> &str {
        "tfe"
    }

    async fn fetch_current_state(&self, workspace_id: &str) -> Result<Vec<u8>, SourceError> {
        let version = self
            .read_current_version(workspace_id)
            .await
            .map_err(|e| e.into_source_error(workspace_id, "read current state version"))?;

        tracing::debug!(
            workspace_id,
            state_version_id = %version.id,
            serial = ?version.serial,
            "current state version resolved"
        );

        let contents = self
            .download(&version.download_url)
            .await
            .map_err(|e| e.into_source_error(workspace_id, "download state"))?;

        tracing::debug!(workspace_id, bytes = contents.len(), "state downloaded");

        Ok(contents)
    }
}
