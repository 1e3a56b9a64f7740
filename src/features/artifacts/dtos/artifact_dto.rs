use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::artifacts::models::Artifact;
use crate::shared::constants::{ANONYMOUS_USER_ID, DEFAULT_PAGE_SIZE, MAX_FILE_SIZE};

/// Upload artifact request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
#[schema(rename_all = "camelCase")]
pub struct UploadArtifactDto {
    /// The image to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Display name stored with the artifact
    #[schema(example = "cat.png")]
    pub file_name: String,
}

/// Response DTO for a stored artifact
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactResponseDto {
    pub id: Uuid,
    pub file_name: String,
    pub content_type: String,
    /// Size of the stored bytes
    pub file_size: i64,
    pub upload_date: DateTime<Utc>,
    /// Opaque reference into the blob store
    pub blob_ref: String,
    pub like_count: i32,
    pub liked_by_users: Vec<String>,
}

impl From<Artifact> for ArtifactResponseDto {
    fn from(a: Artifact) -> Self {
        Self {
            id: a.id,
            file_name: a.file_name,
            content_type: a.content_type,
            file_size: a.file_size,
            upload_date: a.upload_date,
            blob_ref: a.blob_ref,
            like_count: a.like_count,
            liked_by_users: a.liked_by_users,
        }
    }
}

/// Query params for the paginated artifact listing
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ArtifactListQuery {
    /// Zero-based page index (default: 0)
    #[serde(default)]
    pub page: i64,

    /// Items per page (default: 20, max: 100)
    #[serde(default = "default_size")]
    pub size: i64,

    /// `uploadDate` (default) or `likes`, both descending
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
}

fn default_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

fn default_sort_by() -> String {
    "uploadDate".to_string()
}

/// One page of artifacts for infinite scroll
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactPageDto {
    pub artifacts: Vec<ArtifactResponseDto>,
    pub has_more: bool,
    pub current_page: i64,
    pub page_size: i64,
    pub total_count: i64,
}

/// Response DTO for delete operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteArtifactResponseDto {
    pub message: String,
    /// Name of the artifact that was removed
    pub file_name: String,
}

/// Response DTO for anonymous like/unlike
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponseDto {
    pub artifact_id: Uuid,
    pub like_count: i32,
    pub message: String,
}

/// Response DTO for the per-user like toggle
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleLikeResponseDto {
    pub artifact_id: Uuid,
    pub like_count: i32,
    pub is_liked: bool,
    pub message: String,
}

/// Response DTO for a like membership check
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatusResponseDto {
    pub artifact_id: Uuid,
    pub user_id: String,
    pub is_liked: bool,
}

/// Query params identifying the liking user
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct LikeUserQuery {
    /// Defaults to `anonymous`
    pub user_id: Option<String>,
}

impl LikeUserQuery {
    pub fn user_id(&self) -> &str {
        self.user_id
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(ANONYMOUS_USER_ID)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct SearchArtifactsQuery {
    /// Case-insensitive fragment of the file name
    pub file_name: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ContentTypeQuery {
    /// Exact MIME type, e.g. `image/png`
    pub content_type: String,
}

/// Check if a MIME type is accepted for upload (images only)
pub fn is_mime_type_allowed(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

/// Validate a staged upload, returning the trimmed display name.
///
/// Rules are checked in order: empty file, blank name, non-image type, oversize.
pub fn validate_upload(
    file_size: u64,
    file_name: Option<&str>,
    content_type: Option<&str>,
) -> Result<String, AppError> {
    if file_size == 0 {
        return Err(AppError::Validation("File is empty".to_string()));
    }

    let file_name = file_name.map(str::trim).unwrap_or_default();
    if file_name.is_empty() {
        return Err(AppError::Validation(
            "fileName parameter is required".to_string(),
        ));
    }

    if !content_type.is_some_and(is_mime_type_allowed) {
        return Err(AppError::Validation(
            "Only image files are allowed".to_string(),
        ));
    }

    if file_size > MAX_FILE_SIZE as u64 {
        return Err(oversize_error());
    }

    Ok(file_name.to_string())
}

pub fn oversize_error() -> AppError {
    AppError::Validation(format!(
        "File size exceeds maximum limit of {}MB",
        MAX_FILE_SIZE / 1024 / 1024
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_upload_accepts_image_and_trims_name() {
        let name = validate_upload(42, Some("  cat.png "), Some("image/png")).unwrap();
        assert_eq!(name, "cat.png");
    }

    #[test]
    fn test_validate_upload_rejections() {
        let cases = [
            (0, Some("cat.png"), Some("image/png"), "File is empty"),
            (10, Some("   "), Some("image/png"), "fileName parameter is required"),
            (10, None, Some("image/png"), "fileName parameter is required"),
            (10, Some("doc.pdf"), Some("application/pdf"), "Only image files are allowed"),
            (10, Some("cat.png"), None, "Only image files are allowed"),
            (
                MAX_FILE_SIZE as u64 + 1,
                Some("big.png"),
                Some("image/png"),
                "File size exceeds maximum limit of 10MB",
            ),
        ];

        for (size, name, content_type, expected) in cases {
            match validate_upload(size, name, content_type) {
                Err(AppError::Validation(msg)) => assert_eq!(msg, expected),
                other => panic!("expected validation error '{}', got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn test_exact_limit_is_accepted() {
        assert!(validate_upload(MAX_FILE_SIZE as u64, Some("max.png"), Some("image/png")).is_ok());
    }

    #[test]
    fn test_like_user_query_defaults_to_anonymous() {
        let missing = LikeUserQuery { user_id: None };
        let blank = LikeUserQuery {
            user_id: Some(" ".to_string()),
        };
        let given = LikeUserQuery {
            user_id: Some("alice".to_string()),
        };

        assert_eq!(missing.user_id(), ANONYMOUS_USER_ID);
        assert_eq!(blank.user_id(), ANONYMOUS_USER_ID);
        assert_eq!(given.user_id(), "alice");
    }
}
