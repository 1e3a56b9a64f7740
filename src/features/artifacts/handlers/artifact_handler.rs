use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppQuery;
use crate::features::artifacts::dtos::{
    validate_upload, ArtifactListQuery, ArtifactPageDto, ArtifactResponseDto, ContentTypeQuery,
    DeleteArtifactResponseDto, LikeResponseDto, LikeStatusResponseDto, LikeUserQuery,
    SearchArtifactsQuery, ToggleLikeResponseDto, UploadArtifactDto,
};
use crate::features::artifacts::handlers::staged_upload::StagedUpload;
use crate::features::artifacts::models::ArtifactSort;
use crate::features::artifacts::services::ArtifactService;
use crate::shared::constants::MAX_FILE_SIZE;
use crate::shared::types::{ErrorResponse, PageRequest};

/// Parse an artifact id from the path. A malformed id cannot name a record, so it is a 404.
pub(crate) fn parse_artifact_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Artifact not found".to_string()))
}

/// List artifacts one page at a time
#[utoipa::path(
    get,
    path = "/api/artifacts",
    tag = "artifacts",
    params(ArtifactListQuery),
    responses(
        (status = 200, description = "Page of artifacts", body = ArtifactPageDto),
        (status = 400, description = "Invalid page or size", body = ErrorResponse)
    )
)]
pub async fn list_artifacts(
    State(service): State<Arc<ArtifactService>>,
    AppQuery(query): AppQuery<ArtifactListQuery>,
) -> Result<Json<ArtifactPageDto>> {
    let page = PageRequest::new(query.page, query.size)?;
    let sort = ArtifactSort::from_query(&query.sort_by);

    let artifacts = service.list(page, sort).await?;
    let has_more = service.has_more(page).await?;
    let total_count = service.total_count().await?;

    Ok(Json(ArtifactPageDto {
        artifacts,
        has_more,
        current_page: page.page,
        page_size: page.size,
        total_count,
    }))
}

#[utoipa::path(
    get,
    path = "/api/artifacts/{id}",
    tag = "artifacts",
    params(("id" = String, Path, description = "Artifact id")),
    responses(
        (status = 200, description = "Artifact metadata", body = ArtifactResponseDto),
        (status = 404, description = "Artifact not found", body = ErrorResponse)
    )
)]
pub async fn get_artifact(
    State(service): State<Arc<ArtifactService>>,
    Path(id): Path<String>,
) -> Result<Json<ArtifactResponseDto>> {
    let id = parse_artifact_id(&id)?;
    Ok(Json(service.get(id).await?))
}

/// Upload an image
///
/// Accepts multipart/form-data with:
/// - `file`: The image bytes (required, `image/*`, at most 10MB)
/// - `fileName`: Display name to store (required)
#[utoipa::path(
    post,
    path = "/api/artifacts",
    tag = "artifacts",
    request_body(
        content = UploadArtifactDto,
        content_type = "multipart/form-data",
        description = "Image file plus the display name to store it under",
    ),
    responses(
        (status = 201, description = "Artifact stored", body = ArtifactResponseDto),
        (status = 400, description = "Missing, empty, non-image or oversized file", body = ErrorResponse),
        (status = 500, description = "Blob store or database failure", body = ErrorResponse)
    )
)]
pub async fn upload_artifact(
    State(service): State<Arc<ArtifactService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ArtifactResponseDto>)> {
    let mut staged: Option<StagedUpload> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                staged = Some(StagedUpload::from_field(field, MAX_FILE_SIZE as u64).await?);
            }
            "fileName" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read fileName field: {}", e))
                })?;
                file_name = Some(text);
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let staged = staged.ok_or_else(|| AppError::Validation("File is required".to_string()))?;
    let stored = store_staged(&service, &staged, file_name.as_deref()).await;
    staged.discard().await;

    Ok((StatusCode::CREATED, Json(stored?)))
}

async fn store_staged(
    service: &ArtifactService,
    staged: &StagedUpload,
    file_name: Option<&str>,
) -> Result<ArtifactResponseDto> {
    let file_name = validate_upload(staged.size(), file_name, staged.content_type())?;
    let content_type = staged.content_type().unwrap_or_default().to_string();

    let reader = staged.open().await?;
    service
        .upload(reader, &file_name, &content_type, staged.size() as i64)
        .await
}

#[utoipa::path(
    delete,
    path = "/api/artifacts/{id}",
    tag = "artifacts",
    params(("id" = String, Path, description = "Artifact id")),
    responses(
        (status = 200, description = "Artifact deleted", body = DeleteArtifactResponseDto),
        (status = 404, description = "Artifact not found", body = ErrorResponse)
    )
)]
pub async fn delete_artifact(
    State(service): State<Arc<ArtifactService>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteArtifactResponseDto>> {
    let id = parse_artifact_id(&id)?;
    let artifact = service.delete(id).await?;

    Ok(Json(DeleteArtifactResponseDto {
        message: "Artifact deleted successfully".to_string(),
        file_name: artifact.file_name,
    }))
}

/// Add an anonymous like
#[utoipa::path(
    post,
    path = "/api/artifacts/{id}/like",
    tag = "artifacts",
    params(("id" = String, Path, description = "Artifact id")),
    responses(
        (status = 200, description = "Like count incremented", body = LikeResponseDto),
        (status = 404, description = "Artifact not found", body = ErrorResponse)
    )
)]
pub async fn like_artifact(
    State(service): State<Arc<ArtifactService>>,
    Path(id): Path<String>,
) -> Result<Json<LikeResponseDto>> {
    let id = parse_artifact_id(&id)?;
    let artifact = service.increment_like(id).await?;

    Ok(Json(LikeResponseDto {
        artifact_id: artifact.id,
        like_count: artifact.like_count,
        message: "Like added successfully".to_string(),
    }))
}

/// Remove an anonymous like
#[utoipa::path(
    delete,
    path = "/api/artifacts/{id}/like",
    tag = "artifacts",
    params(("id" = String, Path, description = "Artifact id")),
    responses(
        (status = 200, description = "Like count decremented, never below zero", body = LikeResponseDto),
        (status = 404, description = "Artifact not found", body = ErrorResponse)
    )
)]
pub async fn unlike_artifact(
    State(service): State<Arc<ArtifactService>>,
    Path(id): Path<String>,
) -> Result<Json<LikeResponseDto>> {
    let id = parse_artifact_id(&id)?;
    let artifact = service.decrement_like(id).await?;

    Ok(Json(LikeResponseDto {
        artifact_id: artifact.id,
        like_count: artifact.like_count,
        message: "Like removed successfully".to_string(),
    }))
}

/// Like the artifact for a user, or take the like back if already liked
#[utoipa::path(
    post,
    path = "/api/artifacts/{id}/toggle-like",
    tag = "artifacts",
    params(("id" = String, Path, description = "Artifact id"), LikeUserQuery),
    responses(
        (status = 200, description = "Like toggled", body = ToggleLikeResponseDto),
        (status = 404, description = "Artifact not found", body = ErrorResponse)
    )
)]
pub async fn toggle_like(
    State(service): State<Arc<ArtifactService>>,
    Path(id): Path<String>,
    AppQuery(query): AppQuery<LikeUserQuery>,
) -> Result<Json<ToggleLikeResponseDto>> {
    let id = parse_artifact_id(&id)?;
    let user_id = query.user_id();
    let artifact = service.toggle_like(id, user_id).await?;
    let is_liked = artifact.liked_by_users.iter().any(|u| u == user_id);

    Ok(Json(ToggleLikeResponseDto {
        artifact_id: artifact.id,
        like_count: artifact.like_count,
        is_liked,
        message: if is_liked {
            "Artifact liked".to_string()
        } else {
            "Artifact unliked".to_string()
        },
    }))
}

#[utoipa::path(
    get,
    path = "/api/artifacts/{id}/liked",
    tag = "artifacts",
    params(("id" = String, Path, description = "Artifact id"), LikeUserQuery),
    responses(
        (status = 200, description = "Whether the user likes the artifact; false if it does not exist", body = LikeStatusResponseDto)
    )
)]
pub async fn like_status(
    State(service): State<Arc<ArtifactService>>,
    Path(id): Path<String>,
    AppQuery(query): AppQuery<LikeUserQuery>,
) -> Result<Json<LikeStatusResponseDto>> {
    let id = parse_artifact_id(&id)?;
    let user_id = query.user_id();
    let is_liked = service.is_liked_by_user(id, user_id).await?;

    Ok(Json(LikeStatusResponseDto {
        artifact_id: id,
        user_id: user_id.to_string(),
        is_liked,
    }))
}

#[utoipa::path(
    get,
    path = "/api/artifacts/search",
    tag = "artifacts",
    params(SearchArtifactsQuery),
    responses(
        (status = 200, description = "Artifacts whose name contains the fragment", body = Vec<ArtifactResponseDto>)
    )
)]
pub async fn search_artifacts(
    State(service): State<Arc<ArtifactService>>,
    AppQuery(query): AppQuery<SearchArtifactsQuery>,
) -> Result<Json<Vec<ArtifactResponseDto>>> {
    Ok(Json(service.search_by_file_name(&query.file_name).await?))
}

#[utoipa::path(
    get,
    path = "/api/artifacts/by-type",
    tag = "artifacts",
    params(ContentTypeQuery),
    responses(
        (status = 200, description = "Artifacts with exactly this content type", body = Vec<ArtifactResponseDto>)
    )
)]
pub async fn artifacts_by_type(
    State(service): State<Arc<ArtifactService>>,
    AppQuery(query): AppQuery<ContentTypeQuery>,
) -> Result<Json<Vec<ArtifactResponseDto>>> {
    Ok(Json(
        service.filter_by_content_type(&query.content_type).await?,
    ))
}
