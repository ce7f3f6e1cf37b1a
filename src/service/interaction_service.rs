use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tracing::{error, info, instrument, warn};

use crate::dto::content_dto::{CommentResponse, ContentResponse};
use crate::model::comment::VoteType;
use crate::model::content::Content;
use crate::repository::content_repo::{ContentQuery, ContentRepository};
use crate::repository::user_repo::UserRepository;
use crate::service::update_content;
use crate::util::error::ServiceError;

pub const TRENDING_LIMIT: i64 = 20;

pub enum RepostOutcome {
    Reposted { content: ContentResponse, repost: ContentResponse },
    Unreposted { content: ContentResponse },
}

#[async_trait]
pub trait InteractionService: Send + Sync {
    async fn toggle_like(&self, user: &ObjectId, id: &ObjectId) -> Result<ContentResponse, ServiceError>;
    async fn toggle_dislike(&self, user: &ObjectId, id: &ObjectId) -> Result<ContentResponse, ServiceError>;
    /// The flag is whether the content is now saved.
    async fn toggle_save(&self, user: &ObjectId, id: &ObjectId) -> Result<(bool, ContentResponse), ServiceError>;
    async fn toggle_repost(&self, user: &ObjectId, id: &ObjectId, note: Option<String>) -> Result<RepostOutcome, ServiceError>;
    async fn comment(&self, user: &ObjectId, id: &ObjectId, text: &str) -> Result<Vec<CommentResponse>, ServiceError>;
    async fn answer(&self, user: &ObjectId, id: &ObjectId, text: &str) -> Result<Vec<CommentResponse>, ServiceError>;
    async fn accept_answer(&self, user: &ObjectId, id: &ObjectId, index: Option<i64>) -> Result<ContentResponse, ServiceError>;
    async fn vote_answer(
        &self,
        user: &ObjectId,
        id: &ObjectId,
        index: Option<i64>,
        direction: &str,
    ) -> Result<(VoteType, ContentResponse), ServiceError>;
    async fn questions_by_tags(&self, tags: Option<&str>) -> Result<Vec<ContentResponse>, ServiceError>;
    async fn unanswered_questions(&self) -> Result<Vec<ContentResponse>, ServiceError>;
    async fn trending_questions(&self) -> Result<Vec<ContentResponse>, ServiceError>;
}

pub struct InteractionServiceImpl {
    pub content_repo: Arc<dyn ContentRepository>,
    pub user_repo: Arc<dyn UserRepository>,
}

impl InteractionServiceImpl {
    pub fn new(content_repo: Arc<dyn ContentRepository>, user_repo: Arc<dyn UserRepository>) -> Self {
        Self { content_repo, user_repo }
    }

    /// Snapshot of the author's username taken when a comment is written.
    async fn username_of(&self, user: &ObjectId) -> Result<String, ServiceError> {
        let found = self
            .user_repo
            .find_by_id(user)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;
        Ok(found.username)
    }

    async fn toggle<F>(&self, id: &ObjectId, toggle: F) -> Result<(bool, Content), ServiceError>
    where
        F: Fn(&mut Content) -> bool + Send + Sync,
    {
        let (saved, active) =
            update_content(self.content_repo.as_ref(), id, "Content not found", |content| Ok(toggle(content))).await?;
        Ok((active, saved))
    }

    /// Drops `user` from the reposts set after the repost document could not be written.
    async fn undo_repost_membership(&self, user: &ObjectId, id: &ObjectId) {
        let undo = update_content(self.content_repo.as_ref(), id, "Content not found", |content| {
            Ok(content.reposts.remove(user))
        })
        .await;
        match undo {
            Ok((_, removed)) => warn!(removed, "Repost membership rolled back"),
            Err(e) => error!("Failed to roll back repost membership: {e}"),
        }
    }
}

fn comment_index(index: Option<i64>) -> Result<i64, ServiceError> {
    index.ok_or_else(|| ServiceError::InvalidInput("Comment index is required".to_string()))
}

fn responses(contents: Vec<Content>) -> Vec<ContentResponse> {
    contents.iter().map(ContentResponse::from).collect()
}

#[async_trait]
impl InteractionService for InteractionServiceImpl {
    #[instrument(skip(self), fields(user = %user, id = %id))]
    async fn toggle_like(&self, user: &ObjectId, id: &ObjectId) -> Result<ContentResponse, ServiceError> {
        let (liked, content) = self.toggle(id, |c| c.toggle_like(*user)).await?;
        info!(liked, "Like toggled");
        Ok(ContentResponse::from(content))
    }

    #[instrument(skip(self), fields(user = %user, id = %id))]
    async fn toggle_dislike(&self, user: &ObjectId, id: &ObjectId) -> Result<ContentResponse, ServiceError> {
        let (disliked, content) = self.toggle(id, |c| c.toggle_dislike(*user)).await?;
        info!(disliked, "Dislike toggled");
        Ok(ContentResponse::from(content))
    }

    #[instrument(skip(self), fields(user = %user, id = %id))]
    async fn toggle_save(&self, user: &ObjectId, id: &ObjectId) -> Result<(bool, ContentResponse), ServiceError> {
        let (saved, content) = self.toggle(id, |c| c.toggle_save(*user)).await?;
        info!(saved, "Save toggled");
        Ok((saved, ContentResponse::from(content)))
    }

    #[instrument(skip(self, note), fields(user = %user, id = %id))]
    async fn toggle_repost(&self, user: &ObjectId, id: &ObjectId, note: Option<String>) -> Result<RepostOutcome, ServiceError> {
        let (reposted, original) = self.toggle(id, |c| c.toggle_repost(*user)).await?;
        if !reposted {
            let removed = self.content_repo.delete_repost(user, id).await?;
            info!(removed, "Repost removed");
            return Ok(RepostOutcome::Unreposted { content: ContentResponse::from(original) });
        }

        let repost = match self.content_repo.insert(original.repost_for(*user, note)).await {
            Ok(r) => r,
            Err(e) => {
                error!("Failed to create repost document: {e}");
                self.undo_repost_membership(user, id).await;
                return Err(e.into());
            }
        };
        info!(repost_id = ?repost.id, "Repost created");
        Ok(RepostOutcome::Reposted { content: ContentResponse::from(original), repost: ContentResponse::from(repost) })
    }

    #[instrument(skip(self, text), fields(user = %user, id = %id))]
    async fn comment(&self, user: &ObjectId, id: &ObjectId, text: &str) -> Result<Vec<CommentResponse>, ServiceError> {
        if text.trim().is_empty() {
            return Err(ServiceError::InvalidInput("Comment text cannot be empty".to_string()));
        }
        let username = self.username_of(user).await?;
        let (saved, _) = update_content(self.content_repo.as_ref(), id, "Content not found", |content| {
            content.add_comment(*user, &username, text)?;
            Ok(())
        })
        .await?;
        info!(comments = saved.comments.len(), "Comment added");
        Ok(saved.comments.iter().map(CommentResponse::from).collect())
    }

    #[instrument(skip(self, text), fields(user = %user, id = %id))]
    async fn answer(&self, user: &ObjectId, id: &ObjectId, text: &str) -> Result<Vec<CommentResponse>, ServiceError> {
        if text.trim().is_empty() {
            return Err(ServiceError::InvalidInput("Answer text cannot be empty".to_string()));
        }
        let username = self.username_of(user).await?;
        let (saved, _) = update_content(self.content_repo.as_ref(), id, "Content not found", |content| {
            content.add_answer(*user, &username, text)?;
            Ok(())
        })
        .await?;
        info!("Answer added");
        Ok(saved.comments.iter().map(CommentResponse::from).collect())
    }

    #[instrument(skip(self), fields(user = %user, id = %id))]
    async fn accept_answer(&self, user: &ObjectId, id: &ObjectId, index: Option<i64>) -> Result<ContentResponse, ServiceError> {
        let index = comment_index(index)?;
        let (saved, _) = update_content(self.content_repo.as_ref(), id, "Question not found", |content| {
            Ok(content.accept_answer(user, index)?)
        })
        .await?;
        info!(index, "Answer accepted");
        Ok(ContentResponse::from(saved))
    }

    #[instrument(skip(self), fields(user = %user, id = %id))]
    async fn vote_answer(
        &self,
        user: &ObjectId,
        id: &ObjectId,
        index: Option<i64>,
        direction: &str,
    ) -> Result<(VoteType, ContentResponse), ServiceError> {
        let index = comment_index(index)?;
        let direction = VoteType::from_str(direction)?;
        let (saved, votes) = update_content(self.content_repo.as_ref(), id, "Question not found", |content| {
            Ok(content.vote_answer(user, index, direction)?.votes())
        })
        .await?;
        info!(index, votes, direction = direction.as_str(), "Vote registered");
        Ok((direction, ContentResponse::from(saved)))
    }

    #[instrument(skip(self))]
    async fn questions_by_tags(&self, tags: Option<&str>) -> Result<Vec<ContentResponse>, ServiceError> {
        let tags: Vec<String> = tags
            .unwrap_or_default()
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if tags.is_empty() {
            return Err(ServiceError::InvalidInput("Tags parameter is required".to_string()));
        }
        Ok(responses(self.content_repo.find(&ContentQuery::QuestionsTagged(tags), None).await?))
    }

    async fn unanswered_questions(&self) -> Result<Vec<ContentResponse>, ServiceError> {
        Ok(responses(self.content_repo.find(&ContentQuery::UnansweredQuestions, None).await?))
    }

    async fn trending_questions(&self) -> Result<Vec<ContentResponse>, ServiceError> {
        Ok(responses(self.content_repo.trending_questions(TRENDING_LIMIT).await?))
    }
}
