//! Lifecycle handlers that keep an object in sync with a workspace's current state.
//!
//! Every call is a short pipeline over the two adapters: fetch the current state, apply the
//! ignore-empty policy, digest, and (for create/update) write. Failures never escape as `Err`;
//! they become error diagnostics on the returned [`Outcome`], and no further side effect happens
//! after the first error.
//!
//! Create and update trust the write: `bucket_contents_sha256` is set to the digest of the bytes
//! that were just written, without reading the object back. Only read digests the two sides
//! independently, which is how drift becomes visible.

use std::sync::Arc;

use crate::diagnostics::{Diagnostics, Outcome};
use crate::digest::sha256_hex;
use crate::error::TfSyncError;
use crate::record::{SyncRecord, parse_id};
use crate::sources::{FetchedState, StateSource, fetch_state};
use crate::stores::{ObjectStore, PutObjectRequest};

/// Runs the sync record lifecycle against one state source and one object store.
///
/// Built once per provider configuration and shared across calls; it holds no per-record state.
pub struct Synchronizer {
    source: Arc<dyn StateSource>,
    store: Arc<dyn ObjectStore>,
    soft_delete: bool,
}

impl Synchronizer {
    pub fn new(source: Arc<dyn StateSource>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            source,
            store,
            soft_delete: false,
        }
    }

    /// Provider-wide soft-delete default; a record can only add to it, never turn it off.
    pub fn with_soft_delete(mut self, soft_delete: bool) -> Self {
        self.soft_delete = soft_delete;
        self
    }

    pub async fn create(&self, record: SyncRecord) -> Outcome<SyncRecord> {
        finish("create", self.write_through(record).await)
    }

    pub async fn read(&self, record: SyncRecord) -> Outcome<SyncRecord> {
        finish("read", self.refresh(record).await)
    }

    /// Same pipeline as [`Synchronizer::create`], using the tags of the planned record.
    pub async fn update(&self, planned: SyncRecord) -> Outcome<SyncRecord> {
        finish("update", self.write_through(planned).await)
    }

    /// Deletes the backing object unless soft delete is in effect, in which case only a warning
    /// is returned and the object stays. Either way the host drops the record.
    pub async fn delete(&self, record: &SyncRecord) -> Outcome<()> {
        let mut diagnostics = Diagnostics::new();

        if self.soft_delete || record.soft_delete() {
            tracing::warn!(
                bucket = %record.bucket,
                key = %record.key,
                "soft delete, leaving object in place"
            );
            diagnostics.add_warning(
                "using soft delete",
                format!("bucket: {}, key: {}", record.bucket, record.key),
            );
            return Outcome {
                state: None,
                diagnostics,
            };
        }

        match self.store.delete_object(&record.bucket, &record.key).await {
            Ok(()) => {
                tracing::info!(bucket = %record.bucket, key = %record.key, "object deleted");
            }
            Err(err) => {
                let err = TfSyncError::from(err);
                tracing::error!(error = %err, "delete failed");
                diagnostics.add_error(err.summary(), err.to_string());
            }
        }

        Outcome {
            state: None,
            diagnostics,
        }
    }

    /// Passthrough import: `id` becomes the record id. When it has the
    /// `workspace/bucket/key` shape the location fields are filled in too, so the read the host
    /// runs next has something to fetch. No remote calls.
    pub fn import(&self, id: &str) -> Outcome<SyncRecord> {
        let mut diagnostics = Diagnostics::new();

        if id.is_empty() {
            diagnostics.add_error("import", "import id must not be empty");
            return Outcome {
                state: None,
                diagnostics,
            };
        }

        let mut record = match parse_id(id) {
            Some((workspace_id, bucket, key)) => SyncRecord::new(workspace_id, bucket, key),
            None => SyncRecord::default(),
        };
        record.id = Some(id.to_string());

        Outcome {
            state: Some(record),
            diagnostics,
        }
    }

    async fn fetch(&self, record: &SyncRecord) -> Result<FetchedState, TfSyncError> {
        tracing::debug!(
            workspace_id = %record.workspace_id,
            source = self.source.name(),
            "fetching current state"
        );
        Ok(fetch_state(
            self.source.as_ref(),
            &record.workspace_id,
            record.ignore_empty(),
        )
        .await?)
    }

    async fn write_through(&self, mut record: SyncRecord) -> Result<SyncRecord, TfSyncError> {
        let contents = match self.fetch(&record).await? {
            FetchedState::Contents(contents) => contents,
            FetchedState::Ignored => {
                record.refresh_id();
                record.mark_ignored();
                return Ok(record);
            }
        };

        let digest = sha256_hex(&contents);
        let request = PutObjectRequest::new(&record.bucket, &record.key, contents)?
            .with_kms_key_id(record.kms_key_id())
            .with_tags(record.tags.clone().unwrap_or_default());

        self.store.put_object(&request).await?;

        tracing::info!(
            workspace_id = %record.workspace_id,
            bucket = %record.bucket,
            key = %record.key,
            sha256 = %digest,
            "state written"
        );

        record.refresh_id();
        record.mark_synced(digest.clone(), digest);
        Ok(record)
    }

    async fn refresh(&self, mut record: SyncRecord) -> Result<SyncRecord, TfSyncError> {
        let contents = match self.fetch(&record).await? {
            FetchedState::Contents(contents) => contents,
            FetchedState::Ignored => {
                record.refresh_id();
                record.mark_ignored();
                return Ok(record);
            }
        };

        let state_digest = sha256_hex(&contents);
        let stored = self.store.get_object(&record.bucket, &record.key).await?;
        let bucket_digest = sha256_hex(&stored);

        if state_digest != bucket_digest {
            tracing::info!(
                workspace_id = %record.workspace_id,
                bucket = %record.bucket,
                key = %record.key,
                "stored object differs from current state"
            );
        }

        record.refresh_id();
        record.mark_synced(state_digest, bucket_digest);
        Ok(record)
    }
}

impl std::fmt::Debug for Synchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synchronizer")
            .field("source", &self.source.name())
            .field("store", &self.store.name())
            .field("soft_delete", &self.soft_delete)
            .finish()
    }
}

fn finish(operation: &str, result: Result<SyncRecord, TfSyncError>) -> Outcome<SyncRecord> {
    let mut diagnostics = Diagnostics::new();

    match result {
        Ok(record) => Outcome {
            state: Some(record),
            diagnostics,
        },
        Err(err) => {
            tracing::error!(operation, error = %err, "lifecycle operation failed");
            diagnostics.add_error(err.summary(), err.to_string());
            Outcome {
                state: None,
                diagnostics,
            }
        }
    }
}
