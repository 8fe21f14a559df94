pub mod s3;

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

pub const STATE_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("empty bucket")]
    EmptyBucket,
    #[error("empty key")]
    EmptyKey,
    #[error("empty contents")]
    EmptyContents,
    #[error("failed to get object s3://{bucket}/{key}: {message}")]
    Get {
        bucket: String,
        key: String,
        message: String,
    },
    #[error("failed to put object s3://{bucket}/{key}: {message}")]
    Put {
        bucket: String,
        key: String,
        message: String,
    },
    #[error("failed to delete object s3://{bucket}/{key}: {message}")]
    Delete {
        bucket: String,
        key: String,
        message: String,
    },
}

impl StoreError {
    /// Rejected before any network call.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            StoreError::EmptyBucket | StoreError::EmptyKey | StoreError::EmptyContents
        )
    }
}

/// A validated object write. Construction enforces a non-empty bucket, key and body, so an
/// adapter never sees an invalid request.
#[derive(Debug, Clone, PartialEq)]
pub struct PutObjectRequest {
    bucket: String,
    key: String,
    contents: Vec<u8>,
    kms_key_id: Option<String>,
    tags: BTreeMap<String, String>,
}

impl PutObjectRequest {
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        contents: Vec<u8>,
    ) -> Result<Self, StoreError> {
        let bucket = bucket.into();
        let key = key.into();

        if bucket.is_empty() {
            return Err(StoreError::EmptyBucket);
        }
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        if contents.is_empty() {
            return Err(StoreError::EmptyContents);
        }

        Ok(Self {
            bucket,
            key,
            contents,
            kms_key_id: None,
            tags: BTreeMap::new(),
        })
    }

    /// Empty ids are treated as "no server-side encryption".
    pub fn with_kms_key_id(mut self, kms_key_id: Option<&str>) -> Self {
        self.kms_key_id = kms_key_id.filter(|id| !id.is_empty()).map(str::to_string);
        self
    }

    pub fn with_tags(mut self, tags: BTreeMap<String, String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    pub fn kms_key_id(&self) -> Option<&str> {
        self.kms_key_id.as_deref()
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// `x-amz-tagging` value, or `None` when there are no tags.
    pub fn tagging(&self) -> Option<String> {
        (!self.tags.is_empty()).then(|| crate::tags::encode_tags(&self.tags))
    }
}

/// Object storage holding the synced state files.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    fn name(&self) -> &str;

    /// Full contents of the object.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError>;

    async fn put_object(&self, request: &PutObjectRequest) -> Result<(), StoreError>;

    /// Deleting a missing object may or may not fail, depending on the store.
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StoreError>;
}
