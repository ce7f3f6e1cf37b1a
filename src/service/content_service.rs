use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tracing::{debug, error, info, instrument, warn};

use crate::dto::content_dto::{ContentPage, ContentResponse, CreateContentInput, UpdateContentRequest};
use crate::model::content::{Content, ContentType, ExtraFields, Visibility, DEFAULT_CONTENT_IMAGE, DEFAULT_TITLE};
use crate::repository::content_repo::{ContentQuery, ContentRepository};
use crate::repository::user_repo::UserRepository;
use crate::service::update_content;
use crate::util::error::ServiceError;
use crate::util::pagination::PageRequest;
use crate::util::storage::{FileStorage, IncomingFile};

#[async_trait]
pub trait ContentService: Send + Sync {
    async fn create(
        &self,
        author: &ObjectId,
        input: CreateContentInput,
        image: Option<IncomingFile>,
    ) -> Result<ContentResponse, ServiceError>;
    async fn list(&self, page: PageRequest) -> Result<ContentPage, ServiceError>;
    async fn list_by_user(&self, user_id: &ObjectId, page: PageRequest) -> Result<ContentPage, ServiceError>;
    async fn list_by_type(&self, content_type: &str) -> Result<Vec<ContentResponse>, ServiceError>;
    async fn get(&self, id: &ObjectId) -> Result<ContentResponse, ServiceError>;
    async fn update(
        &self,
        caller: &ObjectId,
        id: &ObjectId,
        update: UpdateContentRequest,
        image: Option<IncomingFile>,
    ) -> Result<ContentResponse, ServiceError>;
    async fn delete(&self, caller: &ObjectId, id: &ObjectId) -> Result<(), ServiceError>;
    async fn saved_by(&self, user_id: &ObjectId) -> Result<Vec<ContentResponse>, ServiceError>;
    async fn reposted_by(&self, user_id: &ObjectId) -> Result<Vec<ContentResponse>, ServiceError>;
}

pub struct ContentServiceImpl {
    pub content_repo: Arc<dyn ContentRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub storage: Arc<dyn FileStorage>,
}

impl ContentServiceImpl {
    pub fn new(
        content_repo: Arc<dyn ContentRepository>,
        user_repo: Arc<dyn UserRepository>,
        storage: Arc<dyn FileStorage>,
    ) -> Self {
        Self { content_repo, user_repo, storage }
    }

    async fn page(&self, query: ContentQuery, page: PageRequest) -> Result<ContentPage, ServiceError> {
        let total = self.content_repo.count(&query).await?;
        let contents = self.content_repo.find(&query, Some(page)).await?;
        Ok(ContentPage {
            contents: contents.iter().map(ContentResponse::from).collect(),
            pagination: page.pagination(total),
        })
    }

    async fn all(&self, query: ContentQuery) -> Result<Vec<ContentResponse>, ServiceError> {
        Ok(self.content_repo.find(&query, None).await?.iter().map(ContentResponse::from).collect())
    }
}

fn parse_visibility(raw: Option<&str>) -> Result<Visibility, ServiceError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(Visibility::Public),
        Some(v) => serde_json::from_value(serde_json::Value::String(v.to_string()))
            .map_err(|_| ServiceError::InvalidInput(format!("Invalid visibility: {}", v))),
    }
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags.into_iter().map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) {
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// Builds a new content item from the create form.
pub fn build_content(author: ObjectId, input: CreateContentInput) -> Result<Content, ServiceError> {
    let raw_type = input
        .content_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ServiceError::InvalidInput("contentType is required".to_string()))?;
    let content_type = ContentType::from_str(raw_type).map_err(ServiceError::InvalidInput)?;
    let extra_fields = ExtraFields::from_parts(content_type, input.extra_fields)
        .map_err(|e| ServiceError::InvalidInput(format!("Invalid extraFields: {}", e)))?;

    let mut content = Content::new(author, extra_fields);
    content.title = input
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());
    content.image = input.image.filter(|i| !i.is_empty()).unwrap_or_else(|| DEFAULT_CONTENT_IMAGE.to_string());
    content.visibility = parse_visibility(input.visibility.as_deref())?;
    content.tags = clean_tags(input.tags);
    Ok(content)
}

#[async_trait]
impl ContentService for ContentServiceImpl {
    #[instrument(skip(self, input, image), fields(author = %author))]
    async fn create(
        &self,
        author: &ObjectId,
        input: CreateContentInput,
        image: Option<IncomingFile>,
    ) -> Result<ContentResponse, ServiceError> {
        let mut content = build_content(*author, input)?;
        if let Some(file) = image {
            content.image = self.storage.store_image(&file, None).await?;
        }
        let res = self.content_repo.insert(content).await;
        match &res {
            Ok(c) => info!(id = ?c.id, content_type = %c.content_type, "Content created"),
            Err(e) => error!("Failed to create content: {e}"),
        }
        Ok(ContentResponse::from(res?))
    }

    #[instrument(skip(self))]
    async fn list(&self, page: PageRequest) -> Result<ContentPage, ServiceError> {
        self.page(ContentQuery::All, page).await
    }

    #[instrument(skip(self))]
    async fn list_by_user(&self, user_id: &ObjectId, page: PageRequest) -> Result<ContentPage, ServiceError> {
        self.page(ContentQuery::ByUser(*user_id), page).await
    }

    #[instrument(skip(self))]
    async fn list_by_type(&self, content_type: &str) -> Result<Vec<ContentResponse>, ServiceError> {
        let kind = ContentType::from_str(content_type).map_err(ServiceError::InvalidInput)?;
        let contents = self.all(ContentQuery::ByType(kind)).await?;
        if contents.is_empty() {
            return Err(ServiceError::NotFound("No content found for this type".to_string()));
        }
        Ok(contents)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get(&self, id: &ObjectId) -> Result<ContentResponse, ServiceError> {
        let content = self
            .content_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Content not found".to_string()))?;
        let mut response = ContentResponse::from(&content);

        // author identity is decoration; a failed lookup still returns the content
        match self.user_repo.find_by_id(&content.user_id).await {
            Ok(Some(author)) => {
                response.author_name = Some(author.display_name().to_string());
                response.author_avatar = Some(author.avatar().to_string());
            }
            Ok(None) => debug!("Author not found"),
            Err(e) => warn!("Author lookup failed: {e}"),
        }
        Ok(response)
    }

    #[instrument(skip(self, update, image), fields(caller = %caller, id = %id))]
    async fn update(
        &self,
        caller: &ObjectId,
        id: &ObjectId,
        mut update: UpdateContentRequest,
        image: Option<IncomingFile>,
    ) -> Result<ContentResponse, ServiceError> {
        if let Some(file) = image {
            // ownership is checked before anything is written to disk
            let current = self
                .content_repo
                .find_by_id(id)
                .await?
                .ok_or_else(|| ServiceError::NotFound("Content not found".to_string()))?;
            if !current.is_owned_by(caller) {
                return Err(ServiceError::Forbidden("Unauthorized to update this content".to_string()));
            }
            update.image = Some(self.storage.store_image(&file, None).await?);
        }
        let (saved, _) = update_content(self.content_repo.as_ref(), id, "Content not found", |content| {
            if !content.is_owned_by(caller) {
                return Err(ServiceError::Forbidden("Unauthorized to update this content".to_string()));
            }
            if let Some(title) = update.title.as_ref().map(|t| t.trim()).filter(|t| !t.is_empty()) {
                content.title = title.to_string();
            }
            if let Some(visibility) = update.visibility {
                content.visibility = visibility;
            }
            if let Some(tags) = update.tags.clone() {
                content.tags = clean_tags(tags);
            }
            if let Some(image) = update.image.as_ref().filter(|i| !i.is_empty()) {
                content.image = image.clone();
            }
            if let Some(patch) = update.extra_fields.clone() {
                content.extra_fields = content
                    .extra_fields
                    .merged(patch)
                    .map_err(|e| ServiceError::InvalidInput(format!("Invalid extraFields: {}", e)))?;
            }
            Ok(())
        })
        .await?;
        info!("Content updated");
        Ok(ContentResponse::from(saved))
    }

    #[instrument(skip(self), fields(caller = %caller, id = %id))]
    async fn delete(&self, caller: &ObjectId, id: &ObjectId) -> Result<(), ServiceError> {
        let content = self
            .content_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Content not found".to_string()))?;
        if !content.is_owned_by(caller) {
            return Err(ServiceError::Forbidden("Unauthorized to delete this content".to_string()));
        }
        if !self.content_repo.delete(id).await? {
            return Err(ServiceError::NotFound("Content not found".to_string()));
        }
        info!("Content deleted");
        Ok(())
    }

    async fn saved_by(&self, user_id: &ObjectId) -> Result<Vec<ContentResponse>, ServiceError> {
        self.all(ContentQuery::SavedBy(*user_id)).await
    }

    async fn reposted_by(&self, user_id: &ObjectId) -> Result<Vec<ContentResponse>, ServiceError> {
        self.all(ContentQuery::RepostsBy(*user_id)).await
    }
}
