use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::profiles::dtos::{CreateProfileDto, ProfileResponseDto, UpdateProfileDto};
use crate::features::profiles::models::NewProfile;
use crate::features::profiles::repositories::ProfileRepository;

fn not_found() -> AppError {
    AppError::NotFound("Profile not found".to_string())
}

/// Service for profile CRUD
pub struct ProfileService {
    repository: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    pub fn new(repository: Arc<dyn ProfileRepository>) -> Self {
        Self { repository }
    }

    pub async fn create(&self, dto: CreateProfileDto) -> Result<ProfileResponseDto> {
        let profile = self
            .repository
            .insert(NewProfile {
                id: Uuid::new_v4(),
                display_name: dto.display_name,
                email: dto.email,
            })
            .await?;

        info!("Profile created: id={}", profile.id);
        Ok(profile.into())
    }

    pub async fn get(&self, id: Uuid) -> Result<ProfileResponseDto> {
        self.repository
            .find_by_id(id)
            .await?
            .map(Into::into)
            .ok_or_else(not_found)
    }

    pub async fn list(&self) -> Result<Vec<ProfileResponseDto>> {
        let profiles = self.repository.find_all().await?;
        Ok(profiles.into_iter().map(Into::into).collect())
    }

    /// Overwrite only the fields present in `dto`
    pub async fn update(&self, id: Uuid, dto: UpdateProfileDto) -> Result<ProfileResponseDto> {
        let profile = self
            .repository
            .update(id, dto.into())
            .await?
            .ok_or_else(not_found)?;

        info!("Profile updated: id={}", profile.id);
        Ok(profile.into())
    }

    pub async fn delete(&self, id: Uuid) -> Result<ProfileResponseDto> {
        let profile = self
            .repository
            .delete_by_id(id)
            .await?
            .ok_or_else(not_found)?;

        info!("Profile deleted: id={}", profile.id);
        Ok(profile.into())
    }
}
