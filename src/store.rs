use crate::config::S3Config;
use anyhow::Result;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use thiserror::Error;
use tracing::{debug, info};

/// Errors from the object store
///
/// The display text is what the HTTP layer embeds in 500 response bodies.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Error reading from store: {0}")]
    Read(String),

    #[error("Error saving to store: {0}")]
    Write(String),
}

/// Whole-object get/put against a single configured bucket/key pair
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the full object body, or `None` if the bucket or key does
    /// not exist.
    async fn get(&self) -> Result<Option<Vec<u8>>, StoreError>;

    /// Overwrite the object with the given body. No retry on failure.
    async fn put(&self, body: Vec<u8>) -> Result<(), StoreError>;
}

/// Production object store backed by S3 (or an S3-compatible store)
pub struct S3ObjectStore {
    client: S3Client,
    bucket: String,
    key: String,
}

impl S3ObjectStore {
    /// Create a new S3-backed object store
    ///
    /// Credentials and the region are resolved once at startup from the
    /// default AWS configuration chain.
    pub async fn new(config: &S3Config) -> Result<Self> {
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;

        let mut s3_config_builder = S3ConfigBuilder::from(&aws_config);

        // Configure custom endpoint for MinIO/LocalStack
        if let Some(ref endpoint_url) = config.endpoint_url {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint_url);
        }

        // Force path-style access for MinIO compatibility
        if config.force_path_style {
            s3_config_builder = s3_config_builder.force_path_style(true);
        }

        let client = S3Client::from_conf(s3_config_builder.build());

        info!(
            bucket = %config.bucket,
            key = %config.key,
            region = %config.region,
            "Object store client initialized"
        );

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
            key: config.key.clone(),
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get(&self) -> Result<Option<Vec<u8>>, StoreError> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .send()
            .await;

        match response {
            Ok(output) => {
                let data = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| StoreError::Read(e.to_string()))?;
                let bytes = data.into_bytes().to_vec();

                debug!(size_bytes = bytes.len(), "Document downloaded");
                Ok(Some(bytes))
            }
            Err(err) => {
                // An absent bucket or key is a valid first-run state
                let not_found = err
                    .as_service_error()
                    .map(|e| e.is_no_such_key() || e.code() == Some("NoSuchBucket"))
                    .unwrap_or(false);

                if not_found {
                    debug!("Document not found in store");
                    Ok(None)
                } else {
                    Err(StoreError::Read(DisplayErrorContext(&err).to_string()))
                }
            }
        }
    }

    async fn put(&self, body: Vec<u8>) -> Result<(), StoreError> {
        let size_bytes = body.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .body(ByteStream::from(body))
            .content_type("text/csv")
            .send()
            .await
            .map_err(|e| StoreError::Write(DisplayErrorContext(&e).to_string()))?;

        debug!(size_bytes, "Document uploaded");
        Ok(())
    }
}
