use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The desired/actual state record exchanged with the host for one synced object.
///
/// Field names match the host schema attribute names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SyncRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub workspace_id: String,
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub state_contents_sha256: Option<String>,
    #[serde(default)]
    pub bucket_contents_sha256: Option<String>,
    #[serde(default)]
    pub kms_key_id: Option<String>,
    #[serde(default)]
    pub ignore_empty: Option<bool>,
    #[serde(default)]
    pub ignored: bool,
    #[serde(default)]
    pub soft_delete: Option<bool>,
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,
}

impl SyncRecord {
    pub fn new(
        workspace_id: impl Into<String>,
        bucket: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            bucket: bucket.into(),
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn ignore_empty(&self) -> bool {
        self.ignore_empty.unwrap_or(false)
    }

    pub fn soft_delete(&self) -> bool {
        self.soft_delete.unwrap_or(false)
    }

    /// Recomputes `id` from the three location fields.
    pub fn refresh_id(&mut self) {
        self.id = Some(build_id(&self.workspace_id, &self.bucket, &self.key));
    }

    /// Marks the record as ignored. Digests are only meaningful when bytes were fetched.
    pub fn mark_ignored(&mut self) {
        self.ignored = true;
        self.state_contents_sha256 = None;
        self.bucket_contents_sha256 = None;
    }

    /// Records the digests of a synced state; clears `ignored`.
    pub fn mark_synced(&mut self, state_sha256: String, bucket_sha256: String) {
        self.ignored = false;
        self.state_contents_sha256 = Some(state_sha256);
        self.bucket_contents_sha256 = Some(bucket_sha256);
    }

    /// Non-empty KMS key id, if any.
    pub fn kms_key_id(&self) -> Option<&str> {
        self.kms_key_id.as_deref().filter(|id| !id.is_empty())
    }
}

pub fn build_id(workspace_id: &str, bucket: &str, key: &str) -> String {
    format!("{}/{}/{}", workspace_id, bucket, key)
}

/// Splits an identifier produced by [`build_id`].
///
/// Workspace ids and bucket names never contain `/`, so everything after the second separator is
/// the object key.
pub fn parse_id(id: &str) -> Option<(&str, &str, &str)> {
    let mut parts = id.splitn(3, '/');
    let workspace_id = parts.next().filter(|s| !s.is_empty())?;
    let bucket = parts.next().filter(|s| !s.is_empty())?;
    let key = parts.next().filter(|s| !s.is_empty())?;
    Some((workspace_id, bucket, key))
}
