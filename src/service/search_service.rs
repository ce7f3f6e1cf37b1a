use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::dto::content_dto::{SearchContentItem, SearchResponse};
use crate::dto::user_dto::UserResponse;
use crate::repository::content_repo::{ContentQuery, ContentRepository};
use crate::repository::text_query::TextQuery;
use crate::repository::user_repo::UserRepository;
use crate::util::error::ServiceError;

#[async_trait]
pub trait SearchService: Send + Sync {
    async fn search(&self, q: Option<&str>) -> Result<SearchResponse, ServiceError>;
}

pub struct SearchServiceImpl {
    pub user_repo: Arc<dyn UserRepository>,
    pub content_repo: Arc<dyn ContentRepository>,
}

impl SearchServiceImpl {
    pub fn new(user_repo: Arc<dyn UserRepository>, content_repo: Arc<dyn ContentRepository>) -> Self {
        Self { user_repo, content_repo }
    }
}

#[async_trait]
impl SearchService for SearchServiceImpl {
    #[instrument(skip(self))]
    async fn search(&self, q: Option<&str>) -> Result<SearchResponse, ServiceError> {
        let query = q
            .and_then(TextQuery::new)
            .ok_or_else(|| ServiceError::InvalidInput("Query parameter is required".to_string()))?;

        let content_query = ContentQuery::Search(query.clone());
        let (users, contents) =
            tokio::try_join!(self.user_repo.search(&query), self.content_repo.find(&content_query, None))?;

        info!(users = users.len(), contents = contents.len(), "Search finished");
        Ok(SearchResponse {
            users: users.into_iter().map(UserResponse::from).collect(),
            contents: contents.iter().map(SearchContentItem::from).collect(),
        })
    }
}
