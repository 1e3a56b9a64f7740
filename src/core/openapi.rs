use utoipa::{Modify, OpenApi};

use crate::features::artifacts::{dtos as artifacts_dtos, handlers as artifacts_handlers};
use crate::features::profiles::{dtos as profiles_dtos, handlers as profiles_handlers};
use crate::shared::types::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Artifacts
        artifacts_handlers::list_artifacts,
        artifacts_handlers::get_artifact,
        artifacts_handlers::upload_artifact,
        artifacts_handlers::delete_artifact,
        artifacts_handlers::like_artifact,
        artifacts_handlers::unlike_artifact,
        artifacts_handlers::toggle_like,
        artifacts_handlers::like_status,
        artifacts_handlers::search_artifacts,
        artifacts_handlers::artifacts_by_type,
        // Downloads
        artifacts_handlers::download_artifact,
        artifacts_handlers::view_artifact,
        artifacts_handlers::thumbnail_artifact,
        // Profiles
        profiles_handlers::list_profiles,
        profiles_handlers::get_profile,
        profiles_handlers::create_profile,
        profiles_handlers::update_profile,
        profiles_handlers::delete_profile,
    ),
    components(
        schemas(
            // Shared
            ErrorResponse,
            // Artifacts
            artifacts_dtos::UploadArtifactDto,
            artifacts_dtos::ArtifactResponseDto,
            artifacts_dtos::ArtifactPageDto,
            artifacts_dtos::DeleteArtifactResponseDto,
            artifacts_dtos::LikeResponseDto,
            artifacts_dtos::ToggleLikeResponseDto,
            artifacts_dtos::LikeStatusResponseDto,
            // Profiles
            profiles_dtos::CreateProfileDto,
            profiles_dtos::UpdateProfileDto,
            profiles_dtos::ProfileResponseDto,
            profiles_dtos::ProfileListDto,
            profiles_dtos::DeleteProfileResponseDto,
        )
    ),
    tags(
        (name = "artifacts", description = "Image upload, listing, search and likes"),
        (name = "downloads", description = "Streaming artifact bytes"),
        (name = "profiles", description = "User profile records"),
    ),
    info(
        title = "File Cabinet API",
        version = "0.1.0",
        description = "Artifact upload, likes and profiles",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();

        for path in [
            "/api/artifacts",
            "/api/artifacts/{id}",
            "/api/artifacts/{id}/like",
            "/api/artifacts/{id}/toggle-like",
            "/api/artifacts/{id}/liked",
            "/api/artifacts/search",
            "/api/artifacts/by-type",
            "/api/download/{id}",
            "/api/view/{id}",
            "/api/thumbnail/{id}",
            "/api/profiles",
            "/api/profiles/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_info_modifier_overrides_title() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Cabinet".to_string(),
            version: "9.9.9".to_string(),
            description: "custom".to_string(),
        }
        .modify(&mut doc);

        assert_eq!(doc.info.title, "Cabinet");
        assert_eq!(doc.info.version, "9.9.9");
        assert_eq!(doc.info.description.as_deref(), Some("custom"));
    }
}
