use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{ChecksumAlgorithm, ServerSideEncryption};

use super::{ObjectStore, PutObjectRequest, STATE_CONTENT_TYPE, StoreError};

/// [`ObjectStore`] backed by Amazon S3 (or any S3-compatible endpoint).
#[derive(Clone, Debug)]
pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_sdk_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(config))
    }

    pub fn region(&self) -> Option<String> {
        self.client.config().region().map(|r| r.to_string())
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn name(&self) -> &str {
        "s3"
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let get_error = |message: String| StoreError::Get {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message,
        };

        tracing::debug!(bucket, key, "s3 get object");

        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| get_error(DisplayErrorContext(&e).to_string()))?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| get_error(format!("failed to read body: {}", e)))?;

        Ok(body.into_bytes().to_vec())
    }

    async fn put_object(&self, request: &PutObjectRequest) -> Result<(), StoreError> {
        let bucket = request.bucket();
        let key = request.key();

        tracing::debug!(
            bucket,
            key,
            bytes = request.contents().len(),
            kms = request.kms_key_id().is_some(),
            tags = request.tags().len(),
            "s3 put object"
        );

        let mut put = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(request.contents().to_vec()))
            .content_length(request.contents().len() as i64)
            .content_type(STATE_CONTENT_TYPE)
            .checksum_algorithm(ChecksumAlgorithm::Sha256);

        if let Some(kms_key_id) = request.kms_key_id() {
            put = put
                .server_side_encryption(ServerSideEncryption::AwsKms)
                .ssekms_key_id(kms_key_id);
        }

        if let Some(tagging) = request.tagging() {
            put = put.tagging(tagging);
        }

        put.send().await.map_err(|e| StoreError::Put {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message: DisplayErrorContext(&e).to_string(),
        })?;

        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        tracing::debug!(bucket, key, "s3 delete object");

        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StoreError::Delete {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(())
    }
}
