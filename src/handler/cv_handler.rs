use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension,
};

use crate::dto::content_dto::MessageResponse;
use crate::dto::cv_dto::{CvProfileInput, ImageRequest, SyncRequest};
use crate::handler::parse_id;
use crate::middlewares::auth_middleware::AuthUser;
use crate::service::cv_service::{CvService, CvServiceImpl};
use crate::util::error::HandlerError;

pub async fn default_cv_handler(
    State(service): State<Arc<CvServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.get_default(&auth.id).await?))
}

pub async fn list_cvs_handler(
    State(service): State<Arc<CvServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list(&auth.id).await?))
}

pub async fn get_cv_handler(
    State(service): State<Arc<CvServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    Ok(Json(service.get_owned(&auth.id, &id).await?))
}

pub async fn create_cv_handler(
    State(service): State<Arc<CvServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CvProfileInput>,
) -> Result<impl IntoResponse, HandlerError> {
    let cv = service.create(&auth.id, payload).await?;
    Ok((StatusCode::CREATED, Json(cv)))
}

pub async fn update_cv_handler(
    State(service): State<Arc<CvServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<CvProfileInput>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    Ok(Json(service.update(&auth.id, &id, payload).await?))
}

pub async fn delete_cv_handler(
    State(service): State<Arc<CvServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    service.delete(&auth.id, &id).await?;
    Ok(Json(MessageResponse::new("CV profile deleted")))
}

pub async fn make_public_handler(
    State(service): State<Arc<CvServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    Ok(Json(service.set_public(&auth.id, &id, true).await?))
}

pub async fn make_private_handler(
    State(service): State<Arc<CvServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    Ok(Json(service.set_public(&auth.id, &id, false).await?))
}

pub async fn make_default_handler(
    State(service): State<Arc<CvServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    Ok(Json(service.set_default(&auth.id, &id).await?))
}

pub async fn update_cv_image_handler(
    State(service): State<Arc<CvServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<ImageRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    Ok(Json(service.update_image(&auth.id, &id, payload.image_data).await?))
}

pub async fn duplicate_cv_handler(
    State(service): State<Arc<CvServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    let copy = service.duplicate(&auth.id, &id).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

pub async fn sync_cv_handler(
    State(service): State<Arc<CvServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<SyncRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if payload.sections.is_empty() {
        return Err(HandlerError::bad_request("No sections selected to sync"));
    }
    Ok(Json(service.sync(&auth.id, payload.sections).await?))
}

pub async fn public_cv_handler(
    State(service): State<Arc<CvServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    Ok(Json(service.public_by_id(&id).await?))
}

pub async fn user_public_cv_handler(
    State(service): State<Arc<CvServiceImpl>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let user_id = parse_id(&user_id)?;
    Ok(Json(service.public_by_user(&user_id).await?))
}

pub async fn search_by_user_handler(
    State(service): State<Arc<CvServiceImpl>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let user_id = parse_id(&user_id)?;
    Ok(Json(service.search_by_user(&user_id).await?))
}

pub async fn cv_pdf_handler(
    State(service): State<Arc<CvServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    let pdf = service.render_pdf(&auth.id, &id).await?;
    let disposition = format!("attachment; filename=\"{}\"", pdf.file_name);
    Ok(([(header::CONTENT_TYPE, "application/pdf".to_string()), (header::CONTENT_DISPOSITION, disposition)], pdf.bytes))
}
