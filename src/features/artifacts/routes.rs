use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::artifacts::handlers::{
    artifacts_by_type, delete_artifact, download_artifact, get_artifact, like_artifact,
    like_status, list_artifacts, search_artifacts, thumbnail_artifact, toggle_like,
    unlike_artifact, upload_artifact, view_artifact,
};
use crate::features::artifacts::services::ArtifactService;
use crate::shared::constants::MAX_FILE_SIZE;

/// Create routes for the artifacts feature
pub fn routes(service: Arc<ArtifactService>) -> Router {
    Router::new()
        .route(
            "/api/artifacts",
            get(list_artifacts).post(upload_artifact).layer(
                // Room for the multipart framing on top of the file itself
                DefaultBodyLimit::max(MAX_FILE_SIZE + 1024 * 1024),
            ),
        )
        .route("/api/artifacts/search", get(search_artifacts))
        .route("/api/artifacts/by-type", get(artifacts_by_type))
        .route(
            "/api/artifacts/{id}",
            get(get_artifact).delete(delete_artifact),
        )
        .route(
            "/api/artifacts/{id}/like",
            post(like_artifact).delete(unlike_artifact),
        )
        .route("/api/artifacts/{id}/toggle-like", post(toggle_like))
        .route("/api/artifacts/{id}/liked", get(like_status))
        .route("/api/download/{id}", get(download_artifact))
        .route("/api/view/{id}", get(view_artifact))
        .route("/api/thumbnail/{id}", get(thumbnail_artifact))
        .with_state(service)
}
