use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::handler::cv_handler::{
    create_cv_handler, cv_pdf_handler, default_cv_handler, delete_cv_handler, duplicate_cv_handler, get_cv_handler,
    list_cvs_handler, make_default_handler, make_private_handler, make_public_handler, public_cv_handler,
    search_by_user_handler, sync_cv_handler, update_cv_handler, update_cv_image_handler, user_public_cv_handler,
};
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::cv_service::CvServiceImpl;

/// Routes mounted under `/api/cv-profile`.
pub fn cv_router(service: Arc<CvServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    let public = Router::new()
        .route("/public/{id}", get(public_cv_handler))
        .route("/user/{userId}", get(user_public_cv_handler))
        .route("/search/by-user/{userId}", get(search_by_user_handler));

    let protected = Router::new()
        .route("/", get(default_cv_handler).post(create_cv_handler))
        .route("/all", get(list_cvs_handler))
        .route("/sync", post(sync_cv_handler))
        .route("/public/{id}", put(make_public_handler))
        .route("/private/{id}", put(make_private_handler))
        .route("/default/{id}", put(make_default_handler))
        .route("/duplicate/{id}", post(duplicate_cv_handler))
        .route("/{id}", get(get_cv_handler).put(update_cv_handler).delete(delete_cv_handler))
        .route("/{id}/image", put(update_cv_image_handler))
        .route("/{id}/pdf", get(cv_pdf_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth));

    public.merge(protected).with_state(service)
}
