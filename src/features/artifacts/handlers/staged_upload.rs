use axum::extract::multipart::Field;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::artifacts::dtos::oversize_error;
use crate::modules::storage::BoxReader;

/// A multipart file field spooled to a temp file.
///
/// Call [`StagedUpload::discard`] once the bytes are stored; dropping the
/// value without it still removes the file, but blocks the worker thread.
pub struct StagedUpload {
    path: PathBuf,
    size: u64,
    content_type: Option<String>,
}

impl StagedUpload {
    /// Stream `field` to disk, failing as soon as more than `max_size` bytes arrive
    pub async fn from_field(field: Field<'_>, max_size: u64) -> Result<Self> {
        let content_type = field.content_type().map(str::to_string);
        let mut staged = Self {
            path: std::env::temp_dir().join(format!("file-cabinet-upload-{}", Uuid::new_v4())),
            size: 0,
            content_type,
        };

        if let Err(e) = staged.spool(field, max_size).await {
            staged.discard().await;
            return Err(e);
        }

        Ok(staged)
    }

    async fn spool(&mut self, mut field: Field<'_>, max_size: u64) -> Result<()> {
        let mut temp_file = tokio::fs::File::create(&self.path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create temp file: {}", e)))?;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read file data: {}", e)))?
        {
            self.size += chunk.len() as u64;
            if self.size > max_size {
                debug!("Upload rejected after {} bytes", self.size);
                return Err(oversize_error());
            }
            temp_file
                .write_all(&chunk)
                .await
                .map_err(|e| AppError::Internal(format!("Temp file write failed: {}", e)))?;
        }

        temp_file
            .flush()
            .await
            .map_err(|e| AppError::Internal(format!("Temp file flush failed: {}", e)))
    }

    /// Remove the temp file without blocking the runtime
    pub async fn discard(mut self) {
        let path = std::mem::take(&mut self.path);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove temp file {}: {}", path.display(), e);
            }
        }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// MIME type declared on the multipart part
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Reopen the staged bytes for streaming into the blob store
    pub async fn open(&self) -> Result<BoxReader> {
        let file = tokio::fs::File::open(&self.path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to reopen temp file: {}", e)))?;
        Ok(Box::new(file))
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if self.path.as_os_str().is_empty() {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove temp file {}: {}", self.path.display(), e);
            }
        }
    }
}
