use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post},
    Router,
};

use crate::handler::content_handler::{
    create_content_handler, delete_content_handler, get_content_handler, list_by_type_handler, list_contents_handler,
    list_user_contents_handler, reposted_contents_handler, saved_contents_handler, update_content_handler,
};
use crate::handler::interaction_handler::{
    accept_answer_handler, answer_handler, comment_handler, dislike_handler, like_handler, questions_by_tags_handler,
    repost_handler, save_handler, trending_questions_handler, unanswered_questions_handler, vote_answer_handler,
};
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::content_service::ContentServiceImpl;
use crate::service::interaction_service::InteractionServiceImpl;

/// Routes mounted under `/api/contents`. Reads are public, writes need a token.
pub fn content_router(
    contents: Arc<ContentServiceImpl>,
    interactions: Arc<InteractionServiceImpl>,
    auth_state: Arc<AuthState>,
    upload_limit: usize,
) -> Router {
    let auth = middleware::from_fn_with_state(auth_state, require_auth);

    let public_contents = Router::new()
        .route("/", get(list_contents_handler))
        .route("/user/{userId}", get(list_user_contents_handler))
        .route("/type/{contentType}", get(list_by_type_handler))
        .route("/{id}", get(get_content_handler));

    let protected_contents = Router::new()
        .route("/", post(create_content_handler).layer(DefaultBodyLimit::max(upload_limit)))
        .route("/saved", get(saved_contents_handler))
        .route("/reposted", get(reposted_contents_handler))
        .route(
            "/{id}",
            patch(update_content_handler).layer(DefaultBodyLimit::max(upload_limit)).delete(delete_content_handler),
        )
        .route_layer(auth.clone());

    let public_questions = Router::new()
        .route("/questions/tags", get(questions_by_tags_handler))
        .route("/questions/unanswered", get(unanswered_questions_handler))
        .route("/questions/trending", get(trending_questions_handler));

    let protected_interactions = Router::new()
        .route("/{id}/like", post(like_handler))
        .route("/{id}/dislike", post(dislike_handler))
        .route("/{id}/save", post(save_handler))
        .route("/{id}/repost", post(repost_handler))
        .route("/{id}/comment", post(comment_handler))
        .route("/{id}/answer", post(answer_handler))
        .route("/{id}/accept-answer", post(accept_answer_handler))
        .route("/{id}/vote-answer", post(vote_answer_handler))
        .route_layer(auth);

    let contents_routes = public_contents.merge(protected_contents).with_state(contents);
    let interaction_routes = public_questions.merge(protected_interactions).with_state(interactions);
    contents_routes.merge(interaction_routes)
}
