use async_trait::async_trait;
use tokio::io::AsyncRead;

use crate::core::error::AppError;

/// Type alias for a boxed async reader over blob bytes.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Streamed binary storage addressed by opaque keys.
///
/// Chunking and integrity are left to the backend; callers only see whole
/// objects as byte streams.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store everything `reader` yields under `key`.
    async fn put_stream(
        &self,
        key: &str,
        reader: BoxReader,
        content_type: &str,
    ) -> Result<(), AppError>;

    /// Open a blob for reading, `None` if no object exists under `key`.
    async fn get_stream(&self, key: &str) -> Result<Option<BoxReader>, AppError>;

    /// Check whether a blob exists.
    async fn exists(&self, key: &str) -> Result<bool, AppError>;

    /// Delete a blob.
    ///
    /// Returns `true` if the blob was deleted, `false` if it did not exist.
    async fn delete(&self, key: &str) -> Result<bool, AppError>;

    /// Build a fresh, unique key for a new blob
    fn generate_key(&self, file_name: &str) -> String;
}
