use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::handler::user_handler::{
    follow_handler, followers_handler, following_handler, get_profile_handler, get_user_handler, list_users_handler,
    login_handler, my_following_handler, profile_image_handler, public_profile_handler, refresh_token_handler,
    register_handler, search_users_handler, unfollow_handler, update_profile_handler,
};
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::user_service::UserServiceImpl;

/// Routes mounted under `/api/user`.
pub fn user_router(service: Arc<UserServiceImpl>, auth_state: Arc<AuthState>, upload_limit: usize) -> Router {
    let public = Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/refresh-token", post(refresh_token_handler))
        .route("/all", get(list_users_handler))
        .route("/search", get(search_users_handler))
        .route("/profile/{userId}", get(public_profile_handler));

    let protected = Router::new()
        .route("/profile", get(get_profile_handler).put(update_profile_handler))
        .route("/profile/image", post(profile_image_handler).layer(DefaultBodyLimit::max(upload_limit)))
        .route("/follow/{userId}", post(follow_handler))
        .route("/unfollow/{userId}", post(unfollow_handler))
        .route("/following", get(my_following_handler))
        .route("/following/{userId}", get(following_handler))
        .route("/followers/{userId}", get(followers_handler))
        .route("/{id}", get(get_user_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth));

    public.merge(protected).with_state(service)
}
