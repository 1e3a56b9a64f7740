use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::profiles::models::{Profile, ProfilePatch};

/// Query params for creating a profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct CreateProfileDto {
    #[validate(length(
        min = 1,
        max = 128,
        message = "Display name must be between 1 and 128 characters"
    ))]
    #[schema(example = "Ada Lovelace")]
    pub display_name: String,

    #[validate(email(message = "Email must be a valid email address"))]
    #[schema(example = "ada@example.com")]
    pub email: String,
}

/// Request DTO for a profile merge-patch
///
/// Omitted fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileDto {
    #[validate(length(
        min = 1,
        max = 128,
        message = "Display name must be between 1 and 128 characters"
    ))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[validate(email(message = "Email must be a valid email address"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Id of the artifact to use as avatar
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_id: Option<String>,
}

impl From<UpdateProfileDto> for ProfilePatch {
    fn from(dto: UpdateProfileDto) -> Self {
        Self {
            display_name: dto.display_name,
            email: dto.email,
            avatar_id: dto.avatar_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponseDto {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub avatar_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Profile> for ProfileResponseDto {
    fn from(p: Profile) -> Self {
        Self {
            id: p.id,
            display_name: p.display_name,
            email: p.email,
            avatar_id: p.avatar_id,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileListDto {
    pub profiles: Vec<ProfileResponseDto>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteProfileResponseDto {
    pub message: String,
    pub display_name: String,
}
