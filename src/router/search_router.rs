use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handler::search_handler::search_handler;
use crate::service::search_service::SearchServiceImpl;

/// Routes mounted under `/api/search`.
pub fn search_router(service: Arc<SearchServiceImpl>) -> Router {
    Router::new().route("/", get(search_handler)).with_state(service)
}
