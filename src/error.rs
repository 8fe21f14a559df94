use thiserror::Error;

use crate::sources::SourceError;
use crate::stores::StoreError;

#[derive(Debug, Error)]
pub enum TfSyncError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),
}

impl TfSyncError {
    /// Short diagnostic summary naming the collaborator that failed.
    pub fn summary(&self) -> &'static str {
        match self {
            TfSyncError::Config(_) => "provider configuration",
            TfSyncError::Source(_) => "state source",
            TfSyncError::Store(err) if err.is_precondition() => "invalid write",
            TfSyncError::Store(_) => "object store",
            TfSyncError::Io(_) => "io",
            TfSyncError::Json(_) => "json",
        }
    }
}
