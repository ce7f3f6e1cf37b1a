use std::sync::Arc;

use axum::{
    extract::{Json, Query, State},
    response::IntoResponse,
};

use crate::dto::content_dto::SearchQuery;
use crate::service::search_service::{SearchService, SearchServiceImpl};
use crate::util::error::HandlerError;

pub async fn search_handler(
    State(service): State<Arc<SearchServiceImpl>>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.search(query.q.as_deref()).await?))
}
