#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use bson::oid::ObjectId;
use serde_json::Value;
use tower::ServiceExt;

use devnet_backend::app::app::{create_router, Services};
use devnet_backend::config::{AppConfig, JwtConfig, UploadConfig};
use devnet_backend::middlewares::auth_middleware::AuthState;
use devnet_backend::model::content::{Content, ContentType};
use devnet_backend::model::cv_profile::CvProfile;
use devnet_backend::model::timestamp;
use devnet_backend::model::user::User;
use devnet_backend::repository::content_repo::{ContentQuery, ContentRepository};
use devnet_backend::repository::cv_profile_repo::CvProfileRepository;
use devnet_backend::repository::repository_error::{RepositoryError, RepositoryResult};
use devnet_backend::repository::text_query::TextQuery;
use devnet_backend::repository::user_repo::UserRepository;
use devnet_backend::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};
use devnet_backend::util::pagination::PageRequest;
use devnet_backend::util::storage::{FileStorage, LocalFileStorage};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, mut user: User) -> RepositoryResult<User> {
        user.id = Some(ObjectId::new());
        let now = timestamp();
        user.created_at = Some(now.clone());
        user.updated_at = Some(now);
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: ObjectId, mut user: User) -> RepositoryResult<User> {
        let mut users = self.users.lock().unwrap();
        let stored = users
            .iter_mut()
            .find(|u| u.id == Some(id))
            .ok_or_else(|| RepositoryError::not_found(format!("No user found to update for ID: {}", id)))?;
        user.id = Some(id);
        user.connections = stored.connections.clone();
        user.updated_at = Some(timestamp());
        *stored = user.clone();
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id.as_ref() == Some(id)).cloned())
    }

    async fn find_many(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().filter(|u| u.id.map(|id| ids.contains(&id)).unwrap_or(false)).cloned().collect())
    }

    async fn list_all(&self) -> RepositoryResult<Vec<User>> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn search(&self, query: &TextQuery) -> RepositoryResult<Vec<User>> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .filter(|u| query.matches(&u.username) || query.matches(&u.full_name) || query.matches(&u.area_of_expertise))
            .cloned()
            .collect())
    }

    async fn find_followers(&self, id: &ObjectId) -> RepositoryResult<Vec<User>> {
        Ok(self.users.lock().unwrap().iter().filter(|u| u.connections.contains(id)).cloned().collect())
    }

    async fn add_connection(&self, id: &ObjectId, target: &ObjectId) -> RepositoryResult<()> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id.as_ref() == Some(id))
            .ok_or_else(|| RepositoryError::not_found(format!("User not found: {}", id)))?;
        if !user.connections.contains(target) {
            user.connections.push(*target);
        }
        Ok(())
    }

    async fn remove_connection(&self, id: &ObjectId, target: &ObjectId) -> RepositoryResult<()> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id.as_ref() == Some(id))
            .ok_or_else(|| RepositoryError::not_found(format!("User not found: {}", id)))?;
        user.connections.retain(|c| c != target);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryContentRepository {
    contents: Mutex<Vec<Content>>,
    fail_inserts: AtomicBool,
    stale_writes: AtomicUsize,
}

impl InMemoryContentRepository {
    fn newest_first(mut contents: Vec<Content>) -> Vec<Content> {
        contents.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        contents
    }

    pub fn all(&self) -> Vec<Content> {
        self.contents.lock().unwrap().clone()
    }

    pub fn find(&self, id: &ObjectId) -> Option<Content> {
        self.all().into_iter().find(|c| c.id.as_ref() == Some(id))
    }

    /// Makes every following insert fail with a database error.
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// The next `n` conditional writes see a newer revision and are rejected.
    pub fn make_stale(&self, n: usize) {
        self.stale_writes.store(n, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContentRepository for InMemoryContentRepository {
    async fn insert(&self, mut content: Content) -> RepositoryResult<Content> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(RepositoryError::database("insert rejected"));
        }
        content.id = Some(ObjectId::new());
        content.revision = 0;
        self.contents.lock().unwrap().push(content.clone());
        Ok(content)
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Content>> {
        Ok(self.contents.lock().unwrap().iter().find(|c| c.id.as_ref() == Some(id)).cloned())
    }

    async fn find(&self, query: &ContentQuery, page: Option<PageRequest>) -> RepositoryResult<Vec<Content>> {
        let matching: Vec<Content> =
            self.contents.lock().unwrap().iter().filter(|c| query.matches(c)).cloned().collect();
        let sorted = Self::newest_first(matching);
        Ok(match page {
            Some(page) => sorted.into_iter().skip(page.skip() as usize).take(page.limit as usize).collect(),
            None => sorted,
        })
    }

    async fn count(&self, query: &ContentQuery) -> RepositoryResult<u64> {
        Ok(self.contents.lock().unwrap().iter().filter(|c| query.matches(c)).count() as u64)
    }

    async fn trending_questions(&self, limit: i64) -> RepositoryResult<Vec<Content>> {
        let mut questions: Vec<Content> = self
            .contents
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.content_type == ContentType::Question)
            .cloned()
            .collect();
        questions.sort_by(|a, b| {
            b.interaction_score().cmp(&a.interaction_score()).then(b.created_at.cmp(&a.created_at))
        });
        questions.truncate(limit as usize);
        Ok(questions)
    }

    async fn replace_if_revision(&self, mut content: Content) -> RepositoryResult<Content> {
        let id = content.id.ok_or_else(|| RepositoryError::not_found("Content has no id"))?;
        let stale = self.stale_writes.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1)).is_ok();
        if stale {
            return Err(RepositoryError::conflict(format!("Content {} changed concurrently", id)));
        }
        let mut contents = self.contents.lock().unwrap();
        let stored = contents
            .iter_mut()
            .find(|c| c.id == Some(id))
            .ok_or_else(|| RepositoryError::conflict(format!("Content {} changed concurrently", id)))?;
        if stored.revision != content.revision {
            return Err(RepositoryError::conflict(format!("Content {} changed concurrently", id)));
        }
        content.revision += 1;
        content.last_updated_at = timestamp();
        *stored = content.clone();
        Ok(content)
    }

    async fn delete(&self, id: &ObjectId) -> RepositoryResult<bool> {
        let mut contents = self.contents.lock().unwrap();
        let before = contents.len();
        contents.retain(|c| c.id.as_ref() != Some(id));
        Ok(contents.len() < before)
    }

    async fn delete_repost(&self, user_id: &ObjectId, original_id: &ObjectId) -> RepositoryResult<u64> {
        let mut contents = self.contents.lock().unwrap();
        let before = contents.len();
        contents.retain(|c| !(&c.user_id == user_id && c.original_content_id.as_ref() == Some(original_id)));
        Ok((before - contents.len()) as u64)
    }
}

#[derive(Default)]
pub struct InMemoryCvProfileRepository {
    cvs: Mutex<Vec<CvProfile>>,
}

impl InMemoryCvProfileRepository {
    fn oldest_where(&self, pred: impl Fn(&CvProfile) -> bool) -> Vec<CvProfile> {
        let mut found: Vec<CvProfile> = self.cvs.lock().unwrap().iter().filter(|cv| pred(cv)).cloned().collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        found
    }
}

#[async_trait]
impl CvProfileRepository for InMemoryCvProfileRepository {
    async fn insert(&self, mut cv: CvProfile) -> RepositoryResult<CvProfile> {
        cv.id = Some(ObjectId::new());
        self.cvs.lock().unwrap().push(cv.clone());
        Ok(cv)
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<CvProfile>> {
        Ok(self.cvs.lock().unwrap().iter().find(|cv| cv.id.as_ref() == Some(id)).cloned())
    }

    async fn find_owned(&self, id: &ObjectId, user_id: &ObjectId) -> RepositoryResult<Option<CvProfile>> {
        Ok(self
            .cvs
            .lock()
            .unwrap()
            .iter()
            .find(|cv| cv.id.as_ref() == Some(id) && &cv.user_id == user_id)
            .cloned())
    }

    async fn find_by_user(&self, user_id: &ObjectId) -> RepositoryResult<Vec<CvProfile>> {
        Ok(self.oldest_where(|cv| &cv.user_id == user_id))
    }

    async fn find_first_by_user(&self, user_id: &ObjectId) -> RepositoryResult<Option<CvProfile>> {
        Ok(self.oldest_where(|cv| &cv.user_id == user_id).into_iter().next())
    }

    async fn find_default(&self, user_id: &ObjectId) -> RepositoryResult<Option<CvProfile>> {
        Ok(self.oldest_where(|cv| &cv.user_id == user_id && cv.is_default).into_iter().next())
    }

    async fn find_public_by_user(&self, user_id: &ObjectId) -> RepositoryResult<Option<CvProfile>> {
        Ok(self.oldest_where(|cv| &cv.user_id == user_id && cv.is_public).into_iter().next())
    }

    async fn count_by_user(&self, user_id: &ObjectId) -> RepositoryResult<u64> {
        Ok(self.cvs.lock().unwrap().iter().filter(|cv| &cv.user_id == user_id).count() as u64)
    }

    async fn replace(&self, cv: CvProfile) -> RepositoryResult<CvProfile> {
        let mut cvs = self.cvs.lock().unwrap();
        let stored = cvs
            .iter_mut()
            .find(|stored| stored.id == cv.id && stored.user_id == cv.user_id)
            .ok_or_else(|| RepositoryError::not_found("CV profile not found"))?;
        *stored = cv.clone();
        Ok(cv)
    }

    async fn clear_default_except(&self, user_id: &ObjectId, keep: &ObjectId) -> RepositoryResult<u64> {
        let mut cvs = self.cvs.lock().unwrap();
        let mut modified = 0;
        for cv in cvs.iter_mut().filter(|cv| &cv.user_id == user_id && cv.id.as_ref() != Some(keep)) {
            if cv.is_default {
                cv.is_default = false;
                modified += 1;
            }
        }
        Ok(modified)
    }

    async fn delete_owned(&self, id: &ObjectId, user_id: &ObjectId) -> RepositoryResult<bool> {
        let mut cvs = self.cvs.lock().unwrap();
        let before = cvs.len();
        cvs.retain(|cv| !(cv.id.as_ref() == Some(id) && &cv.user_id == user_id));
        Ok(cvs.len() < before)
    }
}

pub struct TestApp {
    pub router: Router,
    pub users: Arc<InMemoryUserRepository>,
    pub contents: Arc<InMemoryContentRepository>,
    pub cvs: Arc<InMemoryCvProfileRepository>,
    pub jwt: Arc<JwtTokenUtilsImpl>,
    pub upload_dir: PathBuf,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_uploads(|_| {})
    }

    pub fn with_uploads(tweak: impl FnOnce(&mut UploadConfig)) -> Self {
        let upload_dir = std::env::temp_dir().join(format!("devnet-test-{}", uuid::Uuid::new_v4()));
        let mut upload_config = UploadConfig::from_test_env(upload_dir.clone());
        tweak(&mut upload_config);

        let users = Arc::new(InMemoryUserRepository::default());
        let contents = Arc::new(InMemoryContentRepository::default());
        let cvs = Arc::new(InMemoryCvProfileRepository::default());
        let storage: Arc<dyn FileStorage> = Arc::new(LocalFileStorage::new(&upload_config).unwrap());
        let jwt = Arc::new(JwtTokenUtilsImpl::new(JwtConfig::from_test_env()));

        let services = Services::new(users.clone(), contents.clone(), cvs.clone(), storage, jwt.clone());
        let auth_state = Arc::new(AuthState::new(jwt.clone()));
        let router = create_router(&services, auth_state, &AppConfig::default(), &upload_config);
        TestApp { router, users, contents, cvs, jwt, upload_dir }
    }

    /// Stores a user directly and returns its id with a valid access token.
    pub async fn user(&self, username: &str) -> (ObjectId, String) {
        let mut user = User::new(
            username.to_string(),
            format!("{} Tester", username),
            format!("{}@example.com", username),
            String::new(),
        );
        user.area_of_expertise = "Backend".to_string();
        let user = self.users.insert(user).await.unwrap();
        let id = user.id.unwrap();
        let token = self.jwt.generate_access_token(&id.to_hex(), &user.email, &user.role).unwrap();
        (id, token)
    }

    pub async fn content(&self, owner: ObjectId, content: Content) -> Content {
        let mut content = content;
        content.user_id = owner;
        self.contents.insert(content).await.unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().oneshot(request).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), 16 * 1024 * 1024).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request("GET", uri, token, None)).await
    }

    pub async fn json(&self, method: &str, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(request(method, uri, token, Some(body))).await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub const BOUNDARY: &str = "devnet-test-boundary";

/// One multipart part: (field name, file name, content type, bytes).
pub type Part<'a> = (&'a str, Option<&'a str>, Option<&'a str>, Vec<u8>);

pub fn multipart(uri: &str, token: &str, parts: &[Part<'_>]) -> Request<Body> {
    multipart_with("POST", uri, token, parts)
}

pub fn multipart_with(method: &str, uri: &str, token: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, file_name, content_type, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match file_name {
            Some(file_name) => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n", name, file_name).as_bytes(),
            ),
            None => body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{}\"\r\n", name).as_bytes()),
        }
        if let Some(content_type) = content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap()
}
