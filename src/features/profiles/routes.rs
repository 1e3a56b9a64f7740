use crate::features::profiles::handlers::profile_handler;
use crate::features::profiles::services::ProfileService;
use axum::{routing::get, Router};
use std::sync::Arc;

pub fn routes(service: Arc<ProfileService>) -> Router {
    Router::new()
        .route(
            "/api/profiles",
            get(profile_handler::list_profiles).post(profile_handler::create_profile),
        )
        .route(
            "/api/profiles/{id}",
            get(profile_handler::get_profile)
                .put(profile_handler::update_profile)
                .delete(profile_handler::delete_profile),
        )
        .with_state(service)
}
