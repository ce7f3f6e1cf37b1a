use std::sync::Arc;

use axum::{
    extract::{Json, Multipart, State},
    response::IntoResponse,
};
use serde_json::json;
use tracing::debug;

use crate::handler::{multipart_error, read_file};
use crate::service::upload_service::{UploadService, UploadServiceImpl};
use crate::util::error::HandlerError;

pub async fn upload_image_handler(
    State(service): State<Arc<UploadServiceImpl>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let mut image = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("image") {
            image = Some(read_file(field).await?);
        } else {
            debug!(field = ?field.name(), "Ignoring multipart field");
        }
    }
    let url = service.upload_one(image).await?;
    Ok(Json(json!({ "imageUrl": url, "message": "File uploaded successfully" })))
}

pub async fn upload_images_handler(
    State(service): State<Arc<UploadServiceImpl>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let mut images = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("images") {
            debug!(field = ?field.name(), "Ignoring multipart field");
            continue;
        }
        if images.len() >= service.max_files() {
            return Err(HandlerError::bad_request(format!(
                "Too many files. Maximum is {}.",
                service.max_files()
            )));
        }
        images.push(read_file(field).await?);
    }
    let urls = service.upload_many(images).await?;
    let message = format!("{} files uploaded successfully", urls.len());
    Ok(Json(json!({ "imageUrls": urls, "message": message })))
}
