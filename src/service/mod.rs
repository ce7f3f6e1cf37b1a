pub mod content_service;
pub mod cv_service;
pub mod interaction_service;
pub mod search_service;
pub mod upload_service;
pub mod user_service;

use bson::oid::ObjectId;
use tracing::warn;

use crate::model::content::Content;
use crate::repository::content_repo::ContentRepository;
use crate::repository::repository_error::RepositoryError;
use crate::util::error::ServiceError;

/// Read-modify-write attempts before a content update gives up with 409.
pub const MAX_WRITE_ATTEMPTS: usize = 5;

/// Loads the content, applies `change` and writes it back if nobody else
/// wrote in between; on a lost race the whole cycle is repeated.
pub(crate) async fn update_content<T, F>(
    repo: &dyn ContentRepository,
    id: &ObjectId,
    not_found: &str,
    mut change: F,
) -> Result<(Content, T), ServiceError>
where
    F: FnMut(&mut Content) -> Result<T, ServiceError> + Send,
    T: Send,
{
    for attempt in 1..=MAX_WRITE_ATTEMPTS {
        let mut content = repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(not_found.to_string()))?;
        let outcome = change(&mut content)?;
        match repo.replace_if_revision(content).await {
            Ok(saved) => return Ok((saved, outcome)),
            Err(RepositoryError::Conflict(msg)) => warn!(attempt, "{}", msg),
            Err(e) => return Err(e.into()),
        }
    }
    Err(ServiceError::Conflict("Content was modified concurrently, please retry".to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::model::content::{ContentType, ExtraFields};
    use crate::repository::content_repo::ContentQuery;
    use crate::repository::repository_error::RepositoryResult;
    use crate::util::pagination::PageRequest;

    /// Holds one document and rejects the first `conflicts` conditional writes.
    struct RacyRepository {
        content: Mutex<Content>,
        conflicts: AtomicUsize,
        writes: AtomicUsize,
    }

    impl RacyRepository {
        fn new(conflicts: usize) -> Self {
            let mut content = Content::new(ObjectId::new(), ExtraFields::empty(ContentType::Post));
            content.id = Some(ObjectId::new());
            RacyRepository { content: Mutex::new(content), conflicts: AtomicUsize::new(conflicts), writes: AtomicUsize::new(0) }
        }

        fn id(&self) -> ObjectId {
            self.content.lock().unwrap().id.unwrap()
        }
    }

    #[async_trait]
    impl ContentRepository for RacyRepository {
        async fn insert(&self, content: Content) -> RepositoryResult<Content> {
            Ok(content)
        }

        async fn find_by_id(&self, _id: &ObjectId) -> RepositoryResult<Option<Content>> {
            Ok(Some(self.content.lock().unwrap().clone()))
        }

        async fn find(&self, _query: &ContentQuery, _page: Option<PageRequest>) -> RepositoryResult<Vec<Content>> {
            Ok(vec![])
        }

        async fn count(&self, _query: &ContentQuery) -> RepositoryResult<u64> {
            Ok(0)
        }

        async fn trending_questions(&self, _limit: i64) -> RepositoryResult<Vec<Content>> {
            Ok(vec![])
        }

        async fn replace_if_revision(&self, mut content: Content) -> RepositoryResult<Content> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.conflicts.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1)).is_ok() {
                return Err(RepositoryError::conflict("revision moved"));
            }
            content.revision += 1;
            *self.content.lock().unwrap() = content.clone();
            Ok(content)
        }

        async fn delete(&self, _id: &ObjectId) -> RepositoryResult<bool> {
            Ok(false)
        }

        async fn delete_repost(&self, _user_id: &ObjectId, _original_id: &ObjectId) -> RepositoryResult<u64> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_update_content_retries_lost_races() {
        let repo = RacyRepository::new(MAX_WRITE_ATTEMPTS - 1);
        let fan = ObjectId::new();
        let mut runs = 0;
        let (saved, liked) = update_content(&repo, &repo.id(), "missing", |content| {
            runs += 1;
            Ok(content.toggle_like(fan))
        })
        .await
        .unwrap();

        assert!(liked);
        assert!(saved.likes.contains(&fan));
        assert_eq!(saved.revision, 1);
        assert_eq!(runs, MAX_WRITE_ATTEMPTS);
        assert_eq!(repo.writes.load(Ordering::SeqCst), MAX_WRITE_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_update_content_gives_up_with_conflict() {
        let repo = RacyRepository::new(MAX_WRITE_ATTEMPTS);
        let fan = ObjectId::new();
        let err = update_content(&repo, &repo.id(), "missing", |content| Ok(content.toggle_like(fan)))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(repo.writes.load(Ordering::SeqCst), MAX_WRITE_ATTEMPTS);
        assert!(repo.content.lock().unwrap().likes.is_empty());
    }

    #[tokio::test]
    async fn test_update_content_stops_on_rejected_change() {
        let repo = RacyRepository::new(0);
        let err = update_content(&repo, &repo.id(), "missing", |_| -> Result<(), ServiceError> {
            Err(ServiceError::Forbidden("not yours".to_string()))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, ServiceError::Forbidden(_)));
        assert_eq!(repo.writes.load(Ordering::SeqCst), 0);
    }
}
