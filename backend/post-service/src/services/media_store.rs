/// S3-backed media storage for post attachments
use crate::config::S3Config;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

/// Durable storage boundary for uploaded media.
///
/// `store` writes the object before returning and hands back a fully
/// qualified, publicly readable locator. The random key component makes
/// locators practically unguessable, but possession of a locator is the
/// only access control there is.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Store raw bytes under a fresh collision-resistant key and return the
    /// public locator for the object.
    async fn store(&self, data: Vec<u8>, original_name: &str, content_type: &str)
        -> Result<String>;
}

/// Media store backed by an S3 bucket (or any S3-compatible endpoint).
pub struct S3MediaStore {
    client: Client,
    bucket: String,
    region: String,
}

impl S3MediaStore {
    /// Initialize the S3 client with credentials from config.
    ///
    /// Uses explicit credentials when provided, otherwise the default
    /// credential chain. A custom endpoint enables S3-compatible storage
    /// like MinIO.
    pub async fn from_config(cfg: &S3Config) -> Self {
        use aws_sdk_s3::config::Region;

        let mut aws_config_builder = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()));

        if let (Some(access_key_id), Some(secret_access_key)) =
            (&cfg.access_key_id, &cfg.secret_access_key)
        {
            use aws_sdk_s3::config::Credentials;

            let credentials = Credentials::new(
                access_key_id,
                secret_access_key,
                None, // No session token
                None, // No expiration
                "post_service_s3",
            );

            aws_config_builder = aws_config_builder.credentials_provider(credentials);
        }

        if let Some(endpoint) = &cfg.endpoint {
            aws_config_builder = aws_config_builder.endpoint_url(endpoint);
        }

        let aws_config = aws_config_builder.load().await;

        Self {
            client: Client::new(&aws_config),
            bucket: cfg.bucket.clone(),
            region: cfg.region.clone(),
        }
    }

    /// Collision-resistant object key: 16 random bytes hex-encoded, followed
    /// by the caller-supplied original file name.
    fn object_key(original_name: &str) -> String {
        let raw: [u8; 16] = rand::random();
        format!("{}{}", hex::encode(raw), original_name)
    }

    /// Health check for S3 connectivity and bucket access.
    pub async fn health_check(&self) -> Result<()> {
        match self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .max_keys(1)
            .send()
            .await
        {
            Ok(_) => {
                tracing::info!(
                    "✅ S3 connection validated (bucket: {}, region: {})",
                    self.bucket,
                    self.region
                );
                Ok(())
            }
            Err(e) => {
                let error_msg = e.to_string();

                let guidance = if error_msg.contains("InvalidAccessKeyId") {
                    "Invalid AWS Access Key ID. Check AWS_ACCESS_KEY_ID environment variable."
                } else if error_msg.contains("SignatureDoesNotMatch") {
                    "Invalid AWS Secret Access Key. Check AWS_SECRET_ACCESS_KEY environment variable."
                } else if error_msg.contains("NoSuchBucket") {
                    "Bucket does not exist. Check S3_BUCKET environment variable."
                } else if error_msg.contains("AccessDenied") {
                    "Access denied to S3 bucket. Ensure IAM user/role has S3 permissions."
                } else {
                    "S3 health check failed. Ensure S3 bucket is accessible and credentials are valid."
                };

                Err(AppError::Upload(format!(
                    "S3 health check failed: {error_msg}. {guidance}"
                )))
            }
        }
    }
}

fn public_object_url(bucket: &str, region: &str, key: &str) -> String {
    format!("https://{bucket}.s3.{region}.amazonaws.com/{key}")
}

#[async_trait]
impl MediaStorage for S3MediaStore {
    async fn store(
        &self,
        data: Vec<u8>,
        original_name: &str,
        content_type: &str,
    ) -> Result<String> {
        let key = Self::object_key(original_name);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                let error_msg = e.to_string();
                if error_msg.contains("403") || error_msg.contains("Forbidden") {
                    AppError::Upload("S3 auth failed (403): Check AWS credentials".to_string())
                } else if error_msg.contains("NoSuchBucket") {
                    AppError::Upload(format!("S3 bucket not found: {}", self.bucket))
                } else {
                    AppError::Upload(format!("S3 upload failed: {e}"))
                }
            })?;

        tracing::debug!(%key, "stored media object");

        Ok(public_object_url(&self.bucket, &self.region, &key))
    }
}
