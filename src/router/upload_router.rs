use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, middleware, routing::post, Router};

use crate::handler::upload_handler::{upload_image_handler, upload_images_handler};
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::upload_service::UploadServiceImpl;

/// Routes mounted under `/api/uploads`.
pub fn upload_router(service: Arc<UploadServiceImpl>, auth_state: Arc<AuthState>, body_limit: usize) -> Router {
    Router::new()
        .route("/", post(upload_image_handler))
        .route("/multiple", post(upload_images_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(service)
}
