use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use serde_json::json;

use crate::dto::content_dto::{AcceptAnswerRequest, RepostRequest, TagsQuery, TextRequest, VoteAnswerRequest};
use crate::handler::parse_id;
use crate::middlewares::auth_middleware::AuthUser;
use crate::service::interaction_service::{InteractionService, InteractionServiceImpl, RepostOutcome};
use crate::util::error::HandlerError;

pub async fn like_handler(
    State(service): State<Arc<InteractionServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    let content = service.toggle_like(&auth.id, &id).await?;
    Ok(Json(json!({ "message": "Content like toggled successfully", "content": content })))
}

pub async fn dislike_handler(
    State(service): State<Arc<InteractionServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    let content = service.toggle_dislike(&auth.id, &id).await?;
    Ok(Json(json!({ "message": "Content dislike toggled successfully", "content": content })))
}

pub async fn save_handler(
    State(service): State<Arc<InteractionServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    let (saved, content) = service.toggle_save(&auth.id, &id).await?;
    let message = if saved { "Content saved successfully" } else { "Content unsaved successfully" };
    Ok(Json(json!({ "message": message, "content": content })))
}

pub async fn repost_handler(
    State(service): State<Arc<InteractionServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Option<Json<RepostRequest>>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    let note = payload.and_then(|Json(p)| p.repost_note);
    let response = match service.toggle_repost(&auth.id, &id, note).await? {
        RepostOutcome::Reposted { content, repost } => (
            StatusCode::CREATED,
            Json(json!({ "message": "Content reposted successfully", "content": content, "repost": repost })),
        ),
        RepostOutcome::Unreposted { content } => {
            (StatusCode::OK, Json(json!({ "message": "Content unreposted successfully", "content": content })))
        }
    };
    Ok(response)
}

pub async fn comment_handler(
    State(service): State<Arc<InteractionServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<TextRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    let comments = service.comment(&auth.id, &id, &payload.text).await?;
    Ok(Json(json!({ "message": "Comment added", "comments": comments })))
}

pub async fn answer_handler(
    State(service): State<Arc<InteractionServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<TextRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    let comments = service.answer(&auth.id, &id, &payload.text).await?;
    Ok(Json(json!({ "message": "Answer added", "comments": comments })))
}

pub async fn accept_answer_handler(
    State(service): State<Arc<InteractionServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<AcceptAnswerRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    let content = service.accept_answer(&auth.id, &id, payload.comment_index).await?;
    Ok(Json(json!({ "message": "Answer accepted", "content": content })))
}

pub async fn vote_answer_handler(
    State(service): State<Arc<InteractionServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<VoteAnswerRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    let (direction, content) = service.vote_answer(&auth.id, &id, payload.comment_index, &payload.direction).await?;
    Ok(Json(json!({
        "message": format!("Vote {} registered successfully", direction.as_str()),
        "content": content,
    })))
}

pub async fn questions_by_tags_handler(
    State(service): State<Arc<InteractionServiceImpl>>,
    Query(query): Query<TagsQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.questions_by_tags(query.tags.as_deref()).await?))
}

pub async fn unanswered_questions_handler(
    State(service): State<Arc<InteractionServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.unanswered_questions().await?))
}

pub async fn trending_questions_handler(
    State(service): State<Arc<InteractionServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.trending_questions().await?))
}
