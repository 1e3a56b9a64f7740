use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::profiles::models::{NewProfile, Profile, ProfilePatch};

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn insert(&self, profile: NewProfile) -> Result<Profile>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>>;

    async fn find_all(&self) -> Result<Vec<Profile>>;

    /// Apply a merge-patch, returning the updated row or `None` if absent
    async fn update(&self, id: Uuid, patch: ProfilePatch) -> Result<Option<Profile>>;

    /// Remove a profile, returning the deleted row or `None` if absent
    async fn delete_by_id(&self, id: Uuid) -> Result<Option<Profile>>;
}

pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn insert(&self, profile: NewProfile) -> Result<Profile> {
        sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, display_name, email)
            VALUES ($1, $2, $3)
            RETURNING id, display_name, email, avatar_id, created_at, updated_at
            "#,
        )
        .bind(profile.id)
        .bind(&profile.display_name)
        .bind(&profile.email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert profile: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>> {
        sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, display_name, email, avatar_id, created_at, updated_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get profile by id: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_all(&self) -> Result<Vec<Profile>> {
        sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, display_name, email, avatar_id, created_at, updated_at
            FROM profiles
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list profiles: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn update(&self, id: Uuid, patch: ProfilePatch) -> Result<Option<Profile>> {
        sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET
                display_name = COALESCE($2, display_name),
                email = COALESCE($3, email),
                avatar_id = COALESCE($4, avatar_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, display_name, email, avatar_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(patch.display_name)
        .bind(patch.email)
        .bind(patch.avatar_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update profile: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<Option<Profile>> {
        sqlx::query_as::<_, Profile>(
            r#"
            DELETE FROM profiles
            WHERE id = $1
            RETURNING id, display_name, email, avatar_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete profile: {:?}", e);
            AppError::Database(e)
        })
    }
}
