use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::artifacts::models::{Artifact, ArtifactSort, NewArtifact};
use crate::shared::types::PageRequest;

/// Record store for artifact metadata.
///
/// Like mutations must be atomic per artifact: implementations apply the
/// read-modify-write inside the store, never as a separate read and write.
#[async_trait]
pub trait ArtifactRepository: Send + Sync {
    async fn insert(&self, artifact: NewArtifact) -> Result<Artifact>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Artifact>>;

    async fn find_page(&self, sort: ArtifactSort, page: PageRequest) -> Result<Vec<Artifact>>;

    async fn count(&self) -> Result<i64>;

    /// Returns `false` if no record had this id
    async fn delete_by_id(&self, id: Uuid) -> Result<bool>;

    /// Add `user_id` to the liked-by set if absent, otherwise remove it,
    /// moving the like count with it
    async fn toggle_like(&self, id: Uuid, user_id: &str) -> Result<Option<Artifact>>;

    async fn increment_like(&self, id: Uuid) -> Result<Option<Artifact>>;

    /// Decrement the like count, leaving it at zero if already zero
    async fn decrement_like(&self, id: Uuid) -> Result<Option<Artifact>>;

    /// Case-insensitive substring match on the file name
    async fn search_by_file_name(&self, fragment: &str) -> Result<Vec<Artifact>>;

    async fn find_by_content_type(&self, content_type: &str) -> Result<Vec<Artifact>>;
}

/// Escape LIKE metacharacters so the fragment matches literally
pub(crate) fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Postgres-backed artifact repository
pub struct PgArtifactRepository {
    pool: PgPool,
}

impl PgArtifactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArtifactRepository for PgArtifactRepository {
    async fn insert(&self, artifact: NewArtifact) -> Result<Artifact> {
        sqlx::query_as::<_, Artifact>(
            r#"
            INSERT INTO artifacts (id, file_name, content_type, file_size, blob_ref)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, file_name, content_type, file_size, upload_date, blob_ref, like_count, liked_by_users
            "#,
        )
        .bind(artifact.id)
        .bind(&artifact.file_name)
        .bind(&artifact.content_type)
        .bind(artifact.file_size)
        .bind(&artifact.blob_ref)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert artifact: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Artifact>> {
        sqlx::query_as::<_, Artifact>(
            r#"
            SELECT id, file_name, content_type, file_size, upload_date, blob_ref, like_count, liked_by_users
            FROM artifacts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get artifact by id: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_page(&self, sort: ArtifactSort, page: PageRequest) -> Result<Vec<Artifact>> {
        let query = match sort {
            ArtifactSort::UploadDate => {
                r#"
                SELECT id, file_name, content_type, file_size, upload_date, blob_ref, like_count, liked_by_users
                FROM artifacts
                ORDER BY upload_date DESC, id
                LIMIT $1 OFFSET $2
                "#
            }
            ArtifactSort::Likes => {
                r#"
                SELECT id, file_name, content_type, file_size, upload_date, blob_ref, like_count, liked_by_users
                FROM artifacts
                ORDER BY like_count DESC, id
                LIMIT $1 OFFSET $2
                "#
            }
        };

        sqlx::query_as::<_, Artifact>(query)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list artifacts: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM artifacts")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count artifacts: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM artifacts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete artifact: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn toggle_like(&self, id: Uuid, user_id: &str) -> Result<Option<Artifact>> {
        // Every SET expression sees the pre-update row, so membership is tested once
        sqlx::query_as::<_, Artifact>(
            r#"
            UPDATE artifacts
            SET
                like_count = CASE
                    WHEN $2::text = ANY(liked_by_users) THEN GREATEST(like_count - 1, 0)
                    ELSE like_count + 1
                END,
                liked_by_users = CASE
                    WHEN $2::text = ANY(liked_by_users) THEN array_remove(liked_by_users, $2::text)
                    ELSE array_append(liked_by_users, $2::text)
                END
            WHERE id = $1
            RETURNING id, file_name, content_type, file_size, upload_date, blob_ref, like_count, liked_by_users
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to toggle like: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn increment_like(&self, id: Uuid) -> Result<Option<Artifact>> {
        sqlx::query_as::<_, Artifact>(
            r#"
            UPDATE artifacts
            SET like_count = like_count + 1
            WHERE id = $1
            RETURNING id, file_name, content_type, file_size, upload_date, blob_ref, like_count, liked_by_users
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to increment like count: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn decrement_like(&self, id: Uuid) -> Result<Option<Artifact>> {
        sqlx::query_as::<_, Artifact>(
            r#"
            UPDATE artifacts
            SET like_count = GREATEST(like_count - 1, 0)
            WHERE id = $1
            RETURNING id, file_name, content_type, file_size, upload_date, blob_ref, like_count, liked_by_users
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to decrement like count: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn search_by_file_name(&self, fragment: &str) -> Result<Vec<Artifact>> {
        sqlx::query_as::<_, Artifact>(
            r#"
            SELECT id, file_name, content_type, file_size, upload_date, blob_ref, like_count, liked_by_users
            FROM artifacts
            WHERE file_name ILIKE '%' || $1 || '%' ESCAPE '\'
            ORDER BY upload_date DESC, id
            "#,
        )
        .bind(escape_like(fragment))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to search artifacts: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_by_content_type(&self, content_type: &str) -> Result<Vec<Artifact>> {
        sqlx::query_as::<_, Artifact>(
            r#"
            SELECT id, file_name, content_type, file_size, upload_date, blob_ref, like_count, liked_by_users
            FROM artifacts
            WHERE content_type = $1
            ORDER BY upload_date DESC, id
            "#,
        )
        .bind(content_type)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to filter artifacts by content type: {:?}", e);
            AppError::Database(e)
        })
    }
}
