use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::artifacts::dtos::ArtifactResponseDto;
use crate::features::artifacts::models::{ArtifactSort, NewArtifact};
use crate::features::artifacts::repositories::ArtifactRepository;
use crate::modules::storage::{BlobStore, BoxReader};
use crate::shared::types::PageRequest;

/// An artifact's metadata together with an open reader over its bytes
pub struct ArtifactStream {
    pub artifact: ArtifactResponseDto,
    pub reader: BoxReader,
}

fn not_found() -> AppError {
    AppError::NotFound("Artifact not found".to_string())
}

/// Service for artifact storage, listing and likes
pub struct ArtifactService {
    repository: Arc<dyn ArtifactRepository>,
    blob_store: Arc<dyn BlobStore>,
}

impl ArtifactService {
    pub fn new(repository: Arc<dyn ArtifactRepository>, blob_store: Arc<dyn BlobStore>) -> Self {
        Self {
            repository,
            blob_store,
        }
    }

    /// Store an uploaded file and record its metadata
    ///
    /// The bytes are written to the blob store first; if that fails no
    /// metadata is created. If the metadata insert fails afterwards the
    /// fresh blob is removed again.
    ///
    /// # Arguments
    /// * `reader` - The file content
    /// * `file_name` - Display name chosen by the uploader
    /// * `content_type` - The MIME type of the file
    /// * `file_size` - Number of bytes `reader` yields
    pub async fn upload(
        &self,
        reader: BoxReader,
        file_name: &str,
        content_type: &str,
        file_size: i64,
    ) -> Result<ArtifactResponseDto> {
        let blob_ref = self.blob_store.generate_key(file_name);

        self.blob_store
            .put_stream(&blob_ref, reader, content_type)
            .await?;

        debug!("Artifact bytes stored: {}", blob_ref);

        let new_artifact = NewArtifact {
            id: Uuid::new_v4(),
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            file_size,
            blob_ref: blob_ref.clone(),
        };

        let artifact = match self.repository.insert(new_artifact).await {
            Ok(artifact) => artifact,
            Err(e) => {
                if let Err(cleanup) = self.blob_store.delete(&blob_ref).await {
                    warn!(
                        "Failed to remove blob '{}' after metadata insert failed: {}",
                        blob_ref, cleanup
                    );
                }
                return Err(e);
            }
        };

        info!(
            "Artifact uploaded: id={}, name={}, size={}",
            artifact.id, artifact.file_name, artifact.file_size
        );

        Ok(artifact.into())
    }

    pub async fn get(&self, id: Uuid) -> Result<ArtifactResponseDto> {
        self.repository
            .find_by_id(id)
            .await?
            .map(Into::into)
            .ok_or_else(not_found)
    }

    /// Delete an artifact's blob and metadata, returning the removed record
    ///
    /// A blob that is already gone does not block removing the metadata.
    pub async fn delete(&self, id: Uuid) -> Result<ArtifactResponseDto> {
        let artifact = self.repository.find_by_id(id).await?.ok_or_else(not_found)?;

        if !self.blob_store.delete(&artifact.blob_ref).await? {
            warn!(
                "Blob '{}' for artifact {} was already missing",
                artifact.blob_ref, artifact.id
            );
        }

        if !self.repository.delete_by_id(id).await? {
            debug!("Artifact {} metadata was removed concurrently", id);
        }

        info!("Artifact deleted: id={}, name={}", artifact.id, artifact.file_name);

        Ok(artifact.into())
    }

    /// Open the stored bytes of an artifact
    ///
    /// Fails with NotFound when either the metadata or the blob is missing.
    pub async fn open_file_stream(&self, id: Uuid) -> Result<ArtifactStream> {
        let artifact = self.repository.find_by_id(id).await?.ok_or_else(not_found)?;

        let reader = self
            .blob_store
            .get_stream(&artifact.blob_ref)
            .await?
            .ok_or_else(|| {
                warn!(
                    "Blob '{}' for artifact {} is missing",
                    artifact.blob_ref, artifact.id
                );
                AppError::NotFound("File not found in blob store".to_string())
            })?;

        Ok(ArtifactStream {
            artifact: artifact.into(),
            reader,
        })
    }

    pub async fn list(
        &self,
        page: PageRequest,
        sort: ArtifactSort,
    ) -> Result<Vec<ArtifactResponseDto>> {
        let artifacts = self.repository.find_page(sort, page).await?;
        Ok(artifacts.into_iter().map(Into::into).collect())
    }

    pub async fn has_more(&self, page: PageRequest) -> Result<bool> {
        let total = self.total_count().await?;
        Ok(page.has_more(total))
    }

    pub async fn total_count(&self) -> Result<i64> {
        self.repository.count().await
    }

    /// Anonymous like: bump the counter without recording who liked
    pub async fn increment_like(&self, id: Uuid) -> Result<ArtifactResponseDto> {
        self.repository
            .increment_like(id)
            .await?
            .map(Into::into)
            .ok_or_else(not_found)
    }

    /// Anonymous unlike; a zero count stays at zero
    pub async fn decrement_like(&self, id: Uuid) -> Result<ArtifactResponseDto> {
        self.repository
            .decrement_like(id)
            .await?
            .map(Into::into)
            .ok_or_else(not_found)
    }

    pub async fn toggle_like(&self, id: Uuid, user_id: &str) -> Result<ArtifactResponseDto> {
        let artifact = self
            .repository
            .toggle_like(id, user_id)
            .await?
            .ok_or_else(not_found)?;

        debug!(
            "Like toggled: artifact={}, user={}, liked={}, count={}",
            artifact.id,
            user_id,
            artifact.is_liked_by(user_id),
            artifact.like_count
        );

        Ok(artifact.into())
    }

    /// Whether `user_id` has liked the artifact; false if the artifact does not exist
    pub async fn is_liked_by_user(&self, id: Uuid, user_id: &str) -> Result<bool> {
        Ok(self
            .repository
            .find_by_id(id)
            .await?
            .is_some_and(|a| a.is_liked_by(user_id)))
    }

    pub async fn search_by_file_name(&self, fragment: &str) -> Result<Vec<ArtifactResponseDto>> {
        let artifacts = self.repository.search_by_file_name(fragment).await?;
        Ok(artifacts.into_iter().map(Into::into).collect())
    }

    pub async fn filter_by_content_type(
        &self,
        content_type: &str,
    ) -> Result<Vec<ArtifactResponseDto>> {
        let artifacts = self.repository.find_by_content_type(content_type).await?;
        Ok(artifacts.into_iter().map(Into::into).collect())
    }
}
