use std::sync::Arc;

use axum::{
    extract::{FromRequest, Json, Multipart, Path, Query, Request, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension,
};
use serde_json::json;
use tracing::debug;

use crate::dto::content_dto::{CreateContentInput, CreateContentJson, MessageResponse, UpdateContentRequest};
use crate::handler::{multipart_error, parse_id, read_file, read_text};
use crate::middlewares::auth_middleware::AuthUser;
use crate::service::content_service::{ContentService, ContentServiceImpl};
use crate::util::error::HandlerError;
use crate::util::pagination::{PageParams, PageRequest};
use crate::util::storage::IncomingFile;

/// `tags` arrives either as a JSON array or a comma separated list.
fn parse_tags(raw: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(tags) => tags,
        Err(_) => raw.split(',').map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect(),
    }
}

/// Loose form values become payload keys; `[`/`{` values are decoded as JSON when they parse.
fn loose_field_value(raw: String) -> serde_json::Value {
    let trimmed = raw.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        if let Ok(value) = serde_json::from_str(trimmed) {
            return value;
        }
    }
    serde_json::Value::String(raw)
}

fn parse_extra_fields(text: &str) -> Result<serde_json::Value, HandlerError> {
    serde_json::from_str(text).map_err(|e| HandlerError::bad_request(format!("Invalid extraFields: {}", e)))
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"))
}

/// Reads the multipart form of a content update.
async fn read_update_form(mut multipart: Multipart) -> Result<(UpdateContentRequest, Option<IncomingFile>), HandlerError> {
    let mut update = UpdateContentRequest::default();
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => update.title = Some(read_text(field).await?),
            "visibility" => {
                let raw = read_text(field).await?;
                let visibility = serde_json::from_value(serde_json::Value::String(raw.trim().to_string()))
                    .map_err(|_| HandlerError::bad_request(format!("Invalid visibility: {}", raw)))?;
                update.visibility = Some(visibility);
            }
            "tags" => update.tags = Some(parse_tags(&read_text(field).await?)),
            "extraFields" => update.extra_fields = Some(parse_extra_fields(&read_text(field).await?)?),
            "image" => {
                let file = read_file(field).await?;
                if !file.data.is_empty() {
                    image = Some(file);
                }
            }
            other => debug!(field = %other, "Ignoring multipart field"),
        }
    }
    Ok((update, image))
}

pub async fn list_contents_handler(
    State(service): State<Arc<ContentServiceImpl>>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list(PageRequest::from(params)).await?))
}

pub async fn list_user_contents_handler(
    State(service): State<Arc<ContentServiceImpl>>,
    Path(user_id): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, HandlerError> {
    let user_id = parse_id(&user_id)?;
    Ok(Json(service.list_by_user(&user_id, PageRequest::from(params)).await?))
}

pub async fn list_by_type_handler(
    State(service): State<Arc<ContentServiceImpl>>,
    Path(content_type): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list_by_type(&content_type).await?))
}

pub async fn get_content_handler(
    State(service): State<Arc<ContentServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    Ok(Json(service.get(&id).await?))
}

pub async fn create_content_handler(
    State(service): State<Arc<ContentServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let mut input = CreateContentInput::default();
    let mut image = None;
    let mut loose = serde_json::Map::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "json" => {
                let text = read_text(field).await?;
                let parsed: CreateContentJson = serde_json::from_str(&text)
                    .map_err(|e| HandlerError::bad_request(format!("Invalid JSON data: {}", e)))?;
                input.content_type = parsed.content_type.or(input.content_type);
                input.title = parsed.title.or(input.title);
                input.visibility = parsed.visibility.or(input.visibility);
                if !parsed.tags.is_empty() {
                    input.tags = parsed.tags;
                }
                if !parsed.extra_fields.is_null() {
                    input.extra_fields = parsed.extra_fields;
                }
            }
            "contentType" => input.content_type = Some(read_text(field).await?),
            "title" => input.title = Some(read_text(field).await?),
            "visibility" => input.visibility = Some(read_text(field).await?),
            "tags" => input.tags = parse_tags(&read_text(field).await?),
            "extraFields" => input.extra_fields = parse_extra_fields(&read_text(field).await?)?,
            "image" => {
                let file = read_file(field).await?;
                if !file.data.is_empty() {
                    image = Some(file);
                }
            }
            "" => debug!("Ignoring unnamed multipart field"),
            _ => {
                let value = loose_field_value(read_text(field).await?);
                loose.insert(name, value);
            }
        }
    }
    // without an explicit payload the remaining form fields make up extraFields
    if input.extra_fields.is_null() && !loose.is_empty() {
        debug!(keys = loose.len(), "Building extraFields from form fields");
        input.extra_fields = serde_json::Value::Object(loose);
    }

    let saved = service.create(&auth.id, input, image).await?;
    Ok((StatusCode::CREATED, Json(json!({ "message": "Content created", "saved": saved }))))
}

/// Accepts either a JSON body or a multipart form carrying a new image file.
pub async fn update_content_handler(
    State(service): State<Arc<ContentServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    request: Request,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    let (payload, image) = if is_multipart(&request) {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| HandlerError::bad_request(e.body_text()))?;
        read_update_form(multipart).await?
    } else {
        let Json(payload) = Json::<UpdateContentRequest>::from_request(request, &())
            .await
            .map_err(|e| HandlerError::bad_request(e.body_text()))?;
        (payload, None)
    };
    let updated = service.update(&auth.id, &id, payload, image).await?;
    Ok(Json(json!({ "message": "Content updated", "updatedContent": updated })))
}

pub async fn delete_content_handler(
    State(service): State<Arc<ContentServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    service.delete(&auth.id, &id).await?;
    Ok(Json(MessageResponse::new("Content deleted successfully")))
}

pub async fn saved_contents_handler(
    State(service): State<Arc<ContentServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.saved_by(&auth.id).await?))
}

pub async fn reposted_contents_handler(
    State(service): State<Arc<ContentServiceImpl>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.reposted_by(&auth.id).await?))
}

#[cfg(test)]
mod tests {
    use super::{loose_field_value, parse_tags};
    use serde_json::json;

    #[test]
    fn test_loose_field_values() {
        assert_eq!(loose_field_value("Acme".into()), json!("Acme"));
        assert_eq!(loose_field_value(r#"["rust","go"]"#.into()), json!(["rust", "go"]));
        assert_eq!(loose_field_value(r#"{"a":1}"#.into()), json!({"a": 1}));
        assert_eq!(loose_field_value("[not json".into()), json!("[not json"));
    }

    #[test]
    fn test_parse_tags_accepts_both_forms() {
        assert_eq!(parse_tags(r#"["rust","axum"]"#), vec!["rust", "axum"]);
        assert_eq!(parse_tags("rust, axum ,"), vec!["rust", "axum"]);
    }
}
