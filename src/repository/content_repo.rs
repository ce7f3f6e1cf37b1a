use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::stream::TryStreamExt;
use mongodb::options::FindOptions;
use mongodb::{Collection, Database};
use tracing::{debug, error, info, instrument};

use crate::config::MongoConfig;
use crate::model::content::{Content, ContentType};
use crate::model::timestamp;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::repository::text_query::TextQuery;
use crate::util::pagination::PageRequest;

/// Root fields plus the title locations kept inside the type payload.
pub const CONTENT_SEARCH_FIELDS: [&str; 7] = [
    "title",
    "contentType",
    "extraFields.description",
    "extraFields.tags",
    "extraFields.title",
    "extraFields.postTitle",
    "extraFields.tutorialTitle",
];

/// The content selections the service layer asks for.
#[derive(Debug, Clone)]
pub enum ContentQuery {
    All,
    ByUser(ObjectId),
    ByType(ContentType),
    SavedBy(ObjectId),
    RepostsBy(ObjectId),
    QuestionsTagged(Vec<String>),
    UnansweredQuestions,
    Search(TextQuery),
}

impl ContentQuery {
    pub fn to_filter(&self) -> Document {
        match self {
            ContentQuery::All => doc! {},
            ContentQuery::ByUser(user_id) => doc! { "userId": user_id },
            ContentQuery::ByType(kind) => doc! { "contentType": kind.as_str() },
            ContentQuery::SavedBy(user_id) => doc! { "saves": user_id },
            ContentQuery::RepostsBy(user_id) => doc! {
                "userId": user_id,
                "originalContentId": { "$exists": true, "$ne": null },
            },
            ContentQuery::QuestionsTagged(tags) => doc! {
                "contentType": ContentType::Question.as_str(),
                "tags": { "$in": tags.clone() },
            },
            ContentQuery::UnansweredQuestions => doc! {
                "contentType": ContentType::Question.as_str(),
                "solved": false,
                "comments.isAnswer": { "$ne": true },
            },
            ContentQuery::Search(query) => query.any_field(&CONTENT_SEARCH_FIELDS),
        }
    }

    /// Same selection as [`ContentQuery::to_filter`], evaluated in memory.
    pub fn matches(&self, content: &Content) -> bool {
        match self {
            ContentQuery::All => true,
            ContentQuery::ByUser(user_id) => &content.user_id == user_id,
            ContentQuery::ByType(kind) => content.content_type == *kind,
            ContentQuery::SavedBy(user_id) => content.saves.contains(user_id),
            ContentQuery::RepostsBy(user_id) => &content.user_id == user_id && content.original_content_id.is_some(),
            ContentQuery::QuestionsTagged(tags) => {
                content.is_question() && content.tags.iter().any(|t| tags.contains(t))
            }
            ContentQuery::UnansweredQuestions => content.is_question() && !content.solved && !content.has_answers(),
            ContentQuery::Search(query) => {
                let fields = &content.extra_fields;
                let payload_tags: &[String] = match fields {
                    crate::model::content::ExtraFields::Post(f) => &f.tags,
                    crate::model::content::ExtraFields::Tutorial(f) => &f.tags,
                    _ => &[],
                };
                query.matches(&content.title)
                    || query.matches(content.content_type.as_str())
                    || [fields.description(), fields.title(), fields.post_title(), fields.tutorial_title()]
                        .into_iter()
                        .flatten()
                        .any(|value| query.matches(value))
                    || payload_tags.iter().any(|tag| query.matches(tag))
            }
        }
    }
}

#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn insert(&self, content: Content) -> RepositoryResult<Content>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Content>>;
    /// Newest first; `page` of `None` returns every match.
    async fn find(&self, query: &ContentQuery, page: Option<PageRequest>) -> RepositoryResult<Vec<Content>>;
    async fn count(&self, query: &ContentQuery) -> RepositoryResult<u64>;
    /// Questions ranked by likes + comments + saves, ties newest first.
    async fn trending_questions(&self, limit: i64) -> RepositoryResult<Vec<Content>>;
    /// Writes `content` only if the stored revision still equals `content.revision`.
    /// The stored copy gets the next revision and a fresh `lastUpdatedAt`.
    async fn replace_if_revision(&self, content: Content) -> RepositoryResult<Content>;
    async fn delete(&self, id: &ObjectId) -> RepositoryResult<bool>;
    async fn delete_repost(&self, user_id: &ObjectId, original_id: &ObjectId) -> RepositoryResult<u64>;
}

pub struct MongoContentRepository {
    collection: Collection<Content>,
}

impl MongoContentRepository {
    pub fn new(db: &Database, config: &MongoConfig) -> Self {
        MongoContentRepository { collection: db.collection::<Content>(&config.contents_collection) }
    }
}

#[async_trait]
impl ContentRepository for MongoContentRepository {
    #[instrument(skip(self, content), fields(content_type = %content.content_type, user_id = %content.user_id))]
    async fn insert(&self, mut content: Content) -> RepositoryResult<Content> {
        content.id = Some(ObjectId::new());
        content.revision = 0;
        match self.collection.insert_one(&content, None).await {
            Ok(_) => {
                info!("Content created");
                Ok(content)
            }
            Err(e) => {
                error!("Failed to create content: {}", e);
                Err(RepositoryError::database(format!("Failed to create content: {}", e)))
            }
        }
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Content>> {
        Ok(self.collection.find_one(doc! { "_id": id }, None).await?)
    }

    #[instrument(skip(self))]
    async fn find(&self, query: &ContentQuery, page: Option<PageRequest>) -> RepositoryResult<Vec<Content>> {
        let mut options = FindOptions::builder().sort(doc! { "createdAt": -1, "_id": -1 }).build();
        if let Some(page) = page {
            options.skip = Some(page.skip());
            options.limit = Some(page.limit as i64);
        }
        let cursor = self.collection.find(query.to_filter(), options).await?;
        let contents: Vec<Content> = cursor.try_collect().await?;
        debug!(count = contents.len(), "Contents fetched");
        Ok(contents)
    }

    async fn count(&self, query: &ContentQuery) -> RepositoryResult<u64> {
        Ok(self.collection.count_documents(query.to_filter(), None).await?)
    }

    #[instrument(skip(self))]
    async fn trending_questions(&self, limit: i64) -> RepositoryResult<Vec<Content>> {
        let pipeline = vec![
            doc! { "$match": { "contentType": ContentType::Question.as_str() } },
            doc! { "$addFields": { "interactionScore": { "$add": [
                { "$size": { "$ifNull": ["$likes", []] } },
                { "$size": { "$ifNull": ["$comments", []] } },
                { "$size": { "$ifNull": ["$saves", []] } },
            ] } } },
            doc! { "$sort": { "interactionScore": -1, "createdAt": -1 } },
            doc! { "$limit": limit },
            doc! { "$project": { "interactionScore": 0 } },
        ];
        let cursor = self.collection.aggregate(pipeline, None).await?;
        let docs: Vec<Document> = cursor.try_collect().await?;
        docs.into_iter()
            .map(|d| bson::from_document::<Content>(d).map_err(RepositoryError::from))
            .collect()
    }

    #[instrument(skip(self, content), fields(id = ?content.id, revision = content.revision))]
    async fn replace_if_revision(&self, mut content: Content) -> RepositoryResult<Content> {
        let id = content.id.ok_or_else(|| RepositoryError::not_found("Content has no id"))?;
        let expected = content.revision;
        content.revision = expected + 1;
        content.last_updated_at = timestamp();
        let filter = doc! { "_id": id, "revision": expected };
        let result = self.collection.replace_one(filter, &content, None).await?;
        if result.matched_count == 0 {
            debug!("Stale revision, replace skipped");
            return Err(RepositoryError::conflict(format!("Content {} changed concurrently", id)));
        }
        Ok(content)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: &ObjectId) -> RepositoryResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self), fields(user_id = %user_id, original_id = %original_id))]
    async fn delete_repost(&self, user_id: &ObjectId, original_id: &ObjectId) -> RepositoryResult<u64> {
        let filter = doc! { "userId": user_id, "originalContentId": original_id };
        let result = self.collection.delete_many(filter, None).await?;
        Ok(result.deleted_count)
    }
}
