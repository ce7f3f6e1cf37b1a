pub mod content_handler;
pub mod cv_handler;
pub mod interaction_handler;
pub mod search_handler;
pub mod upload_handler;
pub mod user_handler;

use std::str::FromStr;

use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use bson::oid::ObjectId;
use validator::Validate;

use crate::util::error::{HandlerError, HandlerErrorKind};
use crate::util::storage::IncomingFile;

/// Path ids must be 24-char hex ObjectIds.
pub fn parse_id(raw: &str) -> Result<ObjectId, HandlerError> {
    ObjectId::from_str(raw).map_err(|_| HandlerError::bad_request(format!("Invalid id: {}", raw)))
}

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), HandlerError> {
    payload.validate().map_err(HandlerError::validation)
}

pub fn multipart_error(err: MultipartError) -> HandlerError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        HandlerError::new(HandlerErrorKind::PayloadTooLarge, "Request body is too large")
    } else {
        HandlerError::bad_request(format!("Invalid multipart body: {}", err.body_text()))
    }
}

/// Reads a multipart file field into memory.
pub async fn read_file(field: Field<'_>) -> Result<IncomingFile, HandlerError> {
    let name = field.name().unwrap_or_default().to_string();
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().unwrap_or("application/octet-stream").to_string();
    let data = field.bytes().await.map_err(multipart_error)?;
    Ok(IncomingFile { field: name, file_name, content_type, data })
}

pub async fn read_text(field: Field<'_>) -> Result<String, HandlerError> {
    field.text().await.map_err(multipart_error)
}
