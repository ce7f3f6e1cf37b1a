use std::sync::Arc;

use axum::{
    extract::{Json, Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use tracing::{debug, info};

use crate::dto::content_dto::{MessageResponse, SearchQuery};
use crate::dto::user_dto::{LoginRequest, ProfileUpdateRequest, RefreshTokenRequest, RegisterRequest};
use crate::handler::{multipart_error, parse_id, read_file, validate_payload};
use crate::middlewares::auth_middleware::AuthUser;
use crate::service::user_service::{UserService, UserServiceImpl};
use crate::util::error::HandlerError;

pub async fn register_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let res = service.register(payload).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

pub async fn login_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let res = service.login(payload.email, payload.password).await?;
    Ok(Json(res))
}

pub async fn refresh_token_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let res = service.refresh_token(payload.refresh_token).await?;
    Ok(Json(res))
}

pub async fn list_users_handler(State(service): State<Arc<UserServiceImpl>>) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list_users().await?))
}

pub async fn search_users_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.search_users(query.q.as_deref().unwrap_or_default()).await?;
    Ok(Json(res))
}

pub async fn get_profile_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.get_profile(&auth.id).await?))
}

pub async fn update_profile_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<ProfileUpdateRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    Ok(Json(service.update_profile(&auth.id, payload).await?))
}

pub async fn public_profile_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&user_id)?;
    Ok(Json(service.get_public_profile(&id).await?))
}

pub async fn get_user_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    Ok(Json(service.get_profile(&id).await?))
}

pub async fn follow_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let target = parse_id(&user_id)?;
    service.follow(&auth.id, &target).await?;
    Ok(Json(MessageResponse::new("User followed successfully")))
}

pub async fn unfollow_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let target = parse_id(&user_id)?;
    service.unfollow(&auth.id, &target).await?;
    Ok(Json(MessageResponse::new("User unfollowed successfully")))
}

pub async fn my_following_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.following(&auth.id).await?))
}

pub async fn following_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&user_id)?;
    Ok(Json(service.following(&id).await?))
}

pub async fn followers_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&user_id)?;
    Ok(Json(service.followers(&id).await?))
}

pub async fn profile_image_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let mut image = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "profileImage" {
            image = Some(read_file(field).await?);
        } else {
            debug!(field = %name, "Ignoring multipart field");
        }
    }
    let image = image.ok_or_else(|| HandlerError::bad_request("No file uploaded"))?;
    let res = service.update_profile_image(&auth.id, image).await?;
    info!(user = %auth.id, "Profile image updated");
    Ok(Json(res))
}
