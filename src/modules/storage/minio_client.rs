//! MinIO/S3-compatible blob store
//!
//! Streams artifact bytes to and from a single bucket. Uses the rust-s3
//! crate for the S3 protocol and tokio-util to expose downloads as
//! `AsyncRead`.

use async_trait::async_trait;
use futures::TryStreamExt;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tokio_util::io::StreamReader;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::config::MinIOConfig;
use crate::core::error::AppError;
use crate::modules::storage::blob_store::{BlobStore, BoxReader};

/// MinIO/S3-compatible storage client
pub struct MinIOClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    endpoint: String,
    key_prefix: String,
}

impl MinIOClient {
    /// Create a new MinIO client from configuration
    pub fn new(config: MinIOConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create MinIO credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Internal(format!("Failed to create MinIO bucket: {}", e)))?;

        // Use path-style URLs for MinIO (http://endpoint/bucket instead of http://bucket.endpoint)
        bucket.set_path_style();

        info!(
            "MinIO client configured for endpoint: {}, bucket: {}, key_prefix: {}",
            config.endpoint,
            bucket.name(),
            config.key_prefix
        );

        Ok(Self {
            bucket,
            region,
            credentials,
            endpoint: config.endpoint,
            key_prefix: config.key_prefix,
        })
    }

    /// Ensure the bucket exists, create if not
    pub async fn ensure_bucket_exists(&self) -> Result<(), AppError> {
        // Try to create bucket - if it already exists, MinIO will return an error
        // which we can safely ignore
        match self.create_bucket().await {
            Ok(_) => {
                info!("Bucket '{}' is ready", self.bucket.name());
                Ok(())
            }
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    warn!(
                        "Could not create bucket '{}' at {}: {}. Assuming it exists.",
                        self.bucket.name(),
                        self.endpoint,
                        e
                    );
                }
                Ok(())
            }
        }
    }

    async fn create_bucket(&self) -> Result<(), AppError> {
        let response = Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await
        .map_err(|e| {
            AppError::Storage(format!(
                "Failed to create bucket '{}': {}",
                self.bucket.name(),
                e
            ))
        })?;

        // Non-2xx answers arrive as Ok without the `fail-on-err` feature
        if !(200..300).contains(&response.response_code) {
            return Err(AppError::Storage(format!(
                "Failed to create bucket '{}': status {}: {}",
                self.bucket.name(),
                response.response_code,
                response.response_text
            )));
        }

        Ok(())
    }

    /// Get the bucket name
    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }
}

/// Whether an S3 error message describes a missing object
fn is_missing_object(message: &str) -> bool {
    message.contains("404") || message.contains("NoSuchKey")
}

/// Reduce a display name to characters that are safe inside an object key
pub(crate) fn sanitize_key_segment(file_name: &str) -> String {
    let cleaned: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('_').is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

#[async_trait]
impl BlobStore for MinIOClient {
    async fn put_stream(
        &self,
        key: &str,
        mut reader: BoxReader,
        content_type: &str,
    ) -> Result<(), AppError> {
        let response = self
            .bucket
            .put_object_stream_with_content_type(&mut reader, key, content_type)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload blob '{}': {}", key, e)))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(AppError::Storage(format!(
                "Failed to upload blob '{}': status {}",
                key, status
            )));
        }

        debug!(
            "Uploaded blob '{}' to bucket '{}' ({} bytes)",
            key,
            self.bucket.name(),
            response.uploaded_bytes()
        );
        Ok(())
    }

    async fn get_stream(&self, key: &str) -> Result<Option<BoxReader>, AppError> {
        let response = match self.bucket.get_object_stream(key).await {
            Ok(response) => response,
            Err(e) if is_missing_object(&e.to_string()) => return Ok(None),
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "Failed to open blob '{}': {}",
                    key, e
                )))
            }
        };

        match response.status_code {
            200..=299 => {}
            404 => return Ok(None),
            status => {
                return Err(AppError::Storage(format!(
                    "Failed to open blob '{}': status {}",
                    key, status
                )))
            }
        }

        let stream = response
            .bytes
            .map_err(|e| std::io::Error::other(e.to_string()));
        let reader: BoxReader = Box::new(StreamReader::new(stream));

        debug!("Opened blob '{}' from bucket '{}'", key, self.bucket.name());
        Ok(Some(reader))
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        match self.bucket.head_object(key).await {
            Ok((_, 200..=299)) => Ok(true),
            Ok((_, 404)) => Ok(false),
            Ok((_, status)) => Err(AppError::Storage(format!(
                "Failed to check if blob '{}' exists: status {}",
                key, status
            ))),
            Err(e) if is_missing_object(&e.to_string()) => Ok(false),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to check if blob '{}' exists: {}",
                key, e
            ))),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, AppError> {
        // S3 answers 204 for missing keys too, so look first to report absence
        if !self.exists(key).await? {
            return Ok(false);
        }

        let response = self
            .bucket
            .delete_object(key)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete blob '{}': {}", key, e)))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(AppError::Storage(format!(
                "Failed to delete blob '{}': status {}",
                key, status
            )));
        }

        debug!("Deleted blob '{}' from bucket '{}'", key, self.bucket.name());
        Ok(true)
    }

    fn generate_key(&self, file_name: &str) -> String {
        format!(
            "{}/{}_{}",
            self.key_prefix,
            Uuid::new_v4(),
            sanitize_key_segment(file_name)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn test_config() -> MinIOConfig {
        config_for("http://localhost:9000")
    }

    fn config_for(endpoint: &str) -> MinIOConfig {
        MinIOConfig {
            endpoint: endpoint.to_string(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            bucket: "file-cabinet-test".to_string(),
            region: "us-east-1".to_string(),
            key_prefix: "artifacts".to_string(),
        }
    }

    #[test]
    fn test_sanitize_key_segment() {
        assert_eq!(sanitize_key_segment("cat.png"), "cat.png");
        assert_eq!(sanitize_key_segment("my cat/photo.png"), "my_cat_photo.png");
        assert_eq!(sanitize_key_segment("../"), ".._");
        assert_eq!(sanitize_key_segment("///"), "file");
        assert_eq!(sanitize_key_segment(""), "file");
    }

    #[test]
    fn test_generate_key_is_prefixed_and_unique() {
        let client = MinIOClient::new(test_config()).unwrap();

        let first = client.generate_key("cat.png");
        let second = client.generate_key("cat.png");

        assert!(first.starts_with("artifacts/"));
        assert!(first.ends_with("_cat.png"));
        assert_ne!(first, second);
        assert_eq!(client.bucket_name(), "file-cabinet-test");
    }

    /// Minimal S3 endpoint: answers each listed method with the given status
    /// line and body, everything else with an empty 200
    async fn spawn_s3_endpoint(
        answers: &'static [(&'static str, &'static str, &'static str)],
    ) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 4096];
                    let header_end = loop {
                        if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                            break pos + 4;
                        }
                        match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&buf[..n]),
                        }
                    };

                    let head = String::from_utf8_lossy(&request[..header_end]).to_string();
                    let content_length = head
                        .lines()
                        .filter_map(|line| line.split_once(':'))
                        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    while request.len() < header_end + content_length {
                        match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => break,
                            Ok(n) => request.extend_from_slice(&buf[..n]),
                        }
                    }

                    let method = head.split_whitespace().next().unwrap_or_default().to_string();
                    let (status, body) = answers
                        .iter()
                        .find(|(m, _, _)| *m == method)
                        .map(|(_, status, body)| (*status, *body))
                        .unwrap_or(("200 OK", ""));
                    let response = format!(
                        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        if method == "HEAD" { "" } else { body }
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_delete_refused_by_store_is_an_error() {
        let endpoint = spawn_s3_endpoint(&[(
            "DELETE",
            "403 Forbidden",
            "<Error><Code>AccessDenied</Code></Error>",
        )])
        .await;
        let client = MinIOClient::new(config_for(&endpoint)).unwrap();

        let result = client.delete("artifacts/cat.png").await;

        assert!(matches!(result, Err(AppError::Storage(_))));
    }

    #[tokio::test]
    async fn test_delete_existing_blob_reports_removed() {
        let endpoint = spawn_s3_endpoint(&[("DELETE", "204 No Content", "")]).await;
        let client = MinIOClient::new(config_for(&endpoint)).unwrap();

        assert!(client.delete("artifacts/cat.png").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_missing_blob_reports_absent() {
        let endpoint = spawn_s3_endpoint(&[("HEAD", "404 Not Found", "")]).await;
        let client = MinIOClient::new(config_for(&endpoint)).unwrap();

        assert!(!client.delete("artifacts/cat.png").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_bucket_refused_is_an_error() {
        let endpoint = spawn_s3_endpoint(&[(
            "PUT",
            "403 Forbidden",
            "<Error><Code>AccessDenied</Code></Error>",
        )])
        .await;
        let client = MinIOClient::new(config_for(&endpoint)).unwrap();

        let err = client.create_bucket().await.unwrap_err();

        assert!(matches!(err, AppError::Storage(_)));
        assert!(err.to_string().contains("403"));
    }

    #[tokio::test]
    async fn test_ensure_bucket_tolerates_owned_bucket() {
        let endpoint = spawn_s3_endpoint(&[(
            "PUT",
            "409 Conflict",
            "<Error><Code>BucketAlreadyOwnedByYou</Code></Error>",
        )])
        .await;
        let client = MinIOClient::new(config_for(&endpoint)).unwrap();

        assert!(client.create_bucket().await.is_err());
        assert!(client.ensure_bucket_exists().await.is_ok());
    }

    #[test]
    fn test_is_missing_object() {
        assert!(is_missing_object("Got HTTP 404 with content 'NoSuchKey'"));
        assert!(!is_missing_object("connection refused"));
    }
}
