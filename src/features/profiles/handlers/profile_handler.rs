use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::profiles::dtos::{
    CreateProfileDto, DeleteProfileResponseDto, ProfileListDto, ProfileResponseDto,
    UpdateProfileDto,
};
use crate::features::profiles::services::ProfileService;
use crate::shared::types::ErrorResponse;
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

fn parse_profile_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Profile not found".to_string()))
}

#[utoipa::path(
    get,
    path = "/api/profiles",
    responses(
        (status = 200, description = "All profiles", body = ProfileListDto)
    ),
    tag = "profiles"
)]
pub async fn list_profiles(
    State(service): State<Arc<ProfileService>>,
) -> Result<Json<ProfileListDto>> {
    let profiles = service.list().await?;
    Ok(Json(ProfileListDto { profiles }))
}

#[utoipa::path(
    get,
    path = "/api/profiles/{id}",
    params(("id" = String, Path, description = "Profile id")),
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ProfileResponseDto),
        (status = 404, description = "Profile not found", body = ErrorResponse)
    ),
    tag = "profiles"
)]
pub async fn get_profile(
    State(service): State<Arc<ProfileService>>,
    Path(id): Path<String>,
) -> Result<Json<ProfileResponseDto>> {
    let id = parse_profile_id(&id)?;
    Ok(Json(service.get(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/profiles",
    params(CreateProfileDto),
    responses(
        (status = 200, description = "Profile created", body = ProfileResponseDto),
        (status = 400, description = "Validation error", body = ErrorResponse)
    ),
    tag = "profiles"
)]
pub async fn create_profile(
    State(service): State<Arc<ProfileService>>,
    AppQuery(dto): AppQuery<CreateProfileDto>,
) -> Result<Json<ProfileResponseDto>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    Ok(Json(service.create(dto).await?))
}

/// Merge-patch a profile: only the fields present in the body change
#[utoipa::path(
    put,
    path = "/api/profiles/{id}",
    params(("id" = String, Path, description = "Profile id")),
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Profile updated successfully", body = ProfileResponseDto),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse)
    ),
    tag = "profiles"
)]
pub async fn update_profile(
    State(service): State<Arc<ProfileService>>,
    Path(id): Path<String>,
    AppJson(dto): AppJson<UpdateProfileDto>,
) -> Result<Json<ProfileResponseDto>> {
    let id = parse_profile_id(&id)?;
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    Ok(Json(service.update(id, dto).await?))
}

#[utoipa::path(
    delete,
    path = "/api/profiles/{id}",
    params(("id" = String, Path, description = "Profile id")),
    responses(
        (status = 200, description = "Profile deleted", body = DeleteProfileResponseDto),
        (status = 404, description = "Profile not found", body = ErrorResponse)
    ),
    tag = "profiles"
)]
pub async fn delete_profile(
    State(service): State<Arc<ProfileService>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteProfileResponseDto>> {
    let id = parse_profile_id(&id)?;
    let profile = service.delete(id).await?;

    Ok(Json(DeleteProfileResponseDto {
        message: "Profile deleted successfully".to_string(),
        display_name: profile.display_name,
    }))
}
