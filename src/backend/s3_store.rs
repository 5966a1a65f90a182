use aws_sdk_s3::Client;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};

use super::durable_store::{Result, StoreError};
use super::object_store::ObjectStore;

/// Configuration for S3ObjectStore.
pub struct S3ObjectStoreConfig {
    /// The S3 bucket name.
    pub bucket: String,
    /// Optional custom endpoint URL (for LocalStack/MinIO testing).
    pub endpoint_url: Option<String>,
    /// Optional region override.
    pub region: Option<String>,
}

impl S3ObjectStoreConfig {
    /// Create a new config with just a bucket name.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            endpoint_url: None,
            region: None,
        }
    }

    /// Set a custom endpoint URL (for LocalStack/MinIO).
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Set the region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

/// An S3-based implementation of `ObjectStore`.
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Create a new S3 object store with the given configuration.
    ///
    /// Uses the standard AWS credential chain (env vars, ~/.aws, IAM roles, etc.).
    /// A custom endpoint switches to path-style addressing, which LocalStack
    /// and MinIO require.
    pub async fn new(config: S3ObjectStoreConfig) -> Self {
        let mut aws_config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

        if let Some(region) = &config.region {
            aws_config_loader = aws_config_loader.region(aws_config::Region::new(region.clone()));
        }

        if let Some(endpoint_url) = &config.endpoint_url {
            aws_config_loader = aws_config_loader.endpoint_url(endpoint_url);
        }

        let aws_config = aws_config_loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
            .force_path_style(config.endpoint_url.is_some())
            .build();

        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket,
        }
    }
}

fn is_not_found<E>(err: &SdkError<E>) -> bool {
    matches!(err, SdkError::ServiceError(e) if e.raw().status().as_u16() == 404)
}

fn map_sdk_error<E: std::error::Error + 'static>(err: SdkError<E>) -> StoreError {
    StoreError::Unavailable(DisplayErrorContext(&err).to_string())
}

impl ObjectStore for S3ObjectStore {
    async fn object_exists(&self, key: &str) -> Result<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) if is_not_found(&err) => Ok(false),
            Err(err) => Err(map_sdk_error(err)),
        }
    }

    async fn read_object(&self, key: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                if is_not_found(&err) {
                    StoreError::NotFound
                } else {
                    map_sdk_error(err)
                }
            })?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(bytes.to_vec())
    }

    async fn write_object(&self, key: &str, data: &[u8]) -> Result<()> {
        // Only JSON documents are ever written through this store.
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("application/json")
            .body(data.to_vec().into())
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(())
    }

    fn location(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }
}
