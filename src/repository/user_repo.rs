use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::stream::TryStreamExt;
use mongodb::{Collection, Database};
use tracing::{error, info, instrument};

use crate::config::MongoConfig;
use crate::model::timestamp;
use crate::model::user::User;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::repository::text_query::TextQuery;

pub const USER_SEARCH_FIELDS: [&str; 3] = ["username", "fullName", "areaOfExpertise"];

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: User) -> RepositoryResult<User>;
    async fn update(&self, id: ObjectId, user: User) -> RepositoryResult<User>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>>;
    async fn find_many(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<User>>;
    async fn list_all(&self) -> RepositoryResult<Vec<User>>;
    async fn search(&self, query: &TextQuery) -> RepositoryResult<Vec<User>>;
    /// Users whose connections contain `id`.
    async fn find_followers(&self, id: &ObjectId) -> RepositoryResult<Vec<User>>;
    async fn add_connection(&self, id: &ObjectId, target: &ObjectId) -> RepositoryResult<()>;
    async fn remove_connection(&self, id: &ObjectId, target: &ObjectId) -> RepositoryResult<()>;
}

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database, config: &MongoConfig) -> Self {
        MongoUserRepository { collection: db.collection::<User>(&config.users_collection) }
    }

    async fn find_where(&self, filter: bson::Document) -> RepositoryResult<Vec<User>> {
        let cursor = self.collection.find(filter, None).await?;
        Ok(cursor.try_collect().await?)
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn insert(&self, mut user: User) -> RepositoryResult<User> {
        user.id = Some(ObjectId::new());
        let now = timestamp();
        user.created_at = Some(now.clone());
        user.updated_at = Some(now);
        match self.collection.insert_one(&user, None).await {
            Ok(_) => {
                info!("User inserted");
                Ok(user)
            }
            Err(e) => {
                error!("Failed to insert user: {}", e);
                Err(e.into())
            }
        }
    }

    #[instrument(skip(self, user), fields(id = %id))]
    async fn update(&self, id: ObjectId, mut user: User) -> RepositoryResult<User> {
        user.updated_at = Some(timestamp());
        let mut set = bson::to_document(&user)?;
        set.remove("_id");
        set.remove("connections");
        let result = self.collection.update_one(doc! { "_id": id }, doc! { "$set": set }, None).await;
        match result {
            Ok(update_result) if update_result.matched_count > 0 => Ok(user),
            Ok(_) => Err(RepositoryError::not_found(format!("No user found to update for ID: {}", id))),
            Err(e) => {
                error!("Failed to update user: {}", e);
                Err(RepositoryError::database(format!("Failed to update user: {}", e)))
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "email": email }, None).await?)
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "username": username }, None).await?)
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "_id": id }, None).await?)
    }

    async fn find_many(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.find_where(doc! { "_id": { "$in": ids.to_vec() } }).await
    }

    async fn list_all(&self) -> RepositoryResult<Vec<User>> {
        self.find_where(doc! {}).await
    }

    #[instrument(skip(self, query), fields(term = %query.term()))]
    async fn search(&self, query: &TextQuery) -> RepositoryResult<Vec<User>> {
        self.find_where(query.any_field(&USER_SEARCH_FIELDS)).await
    }

    async fn find_followers(&self, id: &ObjectId) -> RepositoryResult<Vec<User>> {
        self.find_where(doc! { "connections": id }).await
    }

    #[instrument(skip(self), fields(id = %id, target = %target))]
    async fn add_connection(&self, id: &ObjectId, target: &ObjectId) -> RepositoryResult<()> {
        let update = doc! { "$addToSet": { "connections": target }, "$set": { "updatedAt": timestamp() } };
        let result = self.collection.update_one(doc! { "_id": id }, update, None).await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("User not found: {}", id)));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(id = %id, target = %target))]
    async fn remove_connection(&self, id: &ObjectId, target: &ObjectId) -> RepositoryResult<()> {
        let update = doc! { "$pull": { "connections": target }, "$set": { "updatedAt": timestamp() } };
        let result = self.collection.update_one(doc! { "_id": id }, update, None).await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("User not found: {}", id)));
        }
        Ok(())
    }
}
