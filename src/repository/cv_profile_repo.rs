use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::stream::TryStreamExt;
use mongodb::options::{FindOneOptions, FindOptions};
use mongodb::{Collection, Database};
use tracing::{error, info, instrument};

use crate::config::MongoConfig;
use crate::model::cv_profile::CvProfile;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait CvProfileRepository: Send + Sync {
    async fn insert(&self, cv: CvProfile) -> RepositoryResult<CvProfile>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<CvProfile>>;
    async fn find_owned(&self, id: &ObjectId, user_id: &ObjectId) -> RepositoryResult<Option<CvProfile>>;
    /// Oldest first.
    async fn find_by_user(&self, user_id: &ObjectId) -> RepositoryResult<Vec<CvProfile>>;
    async fn find_first_by_user(&self, user_id: &ObjectId) -> RepositoryResult<Option<CvProfile>>;
    async fn find_default(&self, user_id: &ObjectId) -> RepositoryResult<Option<CvProfile>>;
    async fn find_public_by_user(&self, user_id: &ObjectId) -> RepositoryResult<Option<CvProfile>>;
    async fn count_by_user(&self, user_id: &ObjectId) -> RepositoryResult<u64>;
    /// Replaces the stored profile with the same id and owner.
    async fn replace(&self, cv: CvProfile) -> RepositoryResult<CvProfile>;
    /// Clears `isDefault` on every profile of the user except `keep`.
    async fn clear_default_except(&self, user_id: &ObjectId, keep: &ObjectId) -> RepositoryResult<u64>;
    async fn delete_owned(&self, id: &ObjectId, user_id: &ObjectId) -> RepositoryResult<bool>;
}

pub struct MongoCvProfileRepository {
    collection: Collection<CvProfile>,
}

impl MongoCvProfileRepository {
    pub fn new(db: &Database, config: &MongoConfig) -> Self {
        MongoCvProfileRepository { collection: db.collection::<CvProfile>(&config.cv_profiles_collection) }
    }

    async fn find_one_oldest(&self, filter: bson::Document) -> RepositoryResult<Option<CvProfile>> {
        let options = FindOneOptions::builder().sort(doc! { "createdAt": 1, "_id": 1 }).build();
        Ok(self.collection.find_one(filter, options).await?)
    }
}

#[async_trait]
impl CvProfileRepository for MongoCvProfileRepository {
    #[instrument(skip(self, cv), fields(user_id = %cv.user_id))]
    async fn insert(&self, mut cv: CvProfile) -> RepositoryResult<CvProfile> {
        cv.id = Some(ObjectId::new());
        match self.collection.insert_one(&cv, None).await {
            Ok(_) => {
                info!("CV profile created");
                Ok(cv)
            }
            Err(e) => {
                error!("Failed to create CV profile: {}", e);
                Err(RepositoryError::database(format!("Failed to create CV profile: {}", e)))
            }
        }
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<CvProfile>> {
        Ok(self.collection.find_one(doc! { "_id": id }, None).await?)
    }

    async fn find_owned(&self, id: &ObjectId, user_id: &ObjectId) -> RepositoryResult<Option<CvProfile>> {
        Ok(self.collection.find_one(doc! { "_id": id, "userId": user_id }, None).await?)
    }

    async fn find_by_user(&self, user_id: &ObjectId) -> RepositoryResult<Vec<CvProfile>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": 1, "_id": 1 }).build();
        let cursor = self.collection.find(doc! { "userId": user_id }, options).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_first_by_user(&self, user_id: &ObjectId) -> RepositoryResult<Option<CvProfile>> {
        self.find_one_oldest(doc! { "userId": user_id }).await
    }

    async fn find_default(&self, user_id: &ObjectId) -> RepositoryResult<Option<CvProfile>> {
        self.find_one_oldest(doc! { "userId": user_id, "isDefault": true }).await
    }

    async fn find_public_by_user(&self, user_id: &ObjectId) -> RepositoryResult<Option<CvProfile>> {
        self.find_one_oldest(doc! { "userId": user_id, "isPublic": true }).await
    }

    async fn count_by_user(&self, user_id: &ObjectId) -> RepositoryResult<u64> {
        Ok(self.collection.count_documents(doc! { "userId": user_id }, None).await?)
    }

    #[instrument(skip(self, cv), fields(id = ?cv.id))]
    async fn replace(&self, cv: CvProfile) -> RepositoryResult<CvProfile> {
        let id = cv.id.ok_or_else(|| RepositoryError::not_found("CV profile has no id"))?;
        let result = self.collection.replace_one(doc! { "_id": id, "userId": cv.user_id }, &cv, None).await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found("CV profile not found"));
        }
        Ok(cv)
    }

    #[instrument(skip(self), fields(user_id = %user_id, keep = %keep))]
    async fn clear_default_except(&self, user_id: &ObjectId, keep: &ObjectId) -> RepositoryResult<u64> {
        let filter = doc! { "userId": user_id, "_id": { "$ne": keep } };
        let result = self.collection.update_many(filter, doc! { "$set": { "isDefault": false } }, None).await?;
        Ok(result.modified_count)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete_owned(&self, id: &ObjectId, user_id: &ObjectId) -> RepositoryResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": id, "userId": user_id }, None).await?;
        Ok(result.deleted_count > 0)
    }
}
