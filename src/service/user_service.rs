use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::{Datelike, Utc};
use tracing::{error, info, instrument, warn};
use validator::ValidateUrl;

use crate::dto::user_dto::{
    AuthResponse, ProfileImageResponse, ProfileUpdateRequest, RegisterRequest, UserResponse, UserSummary,
};
use crate::model::user::User;
use crate::repository::text_query::TextQuery;
use crate::repository::user_repo::UserRepository;
use crate::util::dates::parse_lenient;
use crate::util::error::ServiceError;
use crate::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl, TokenPair};
use crate::util::password::{PasswordUtils, PasswordUtilsImpl};
use crate::util::storage::{FileStorage, IncomingFile};

/// Data-URL profile images larger than this are rejected.
const MAX_INLINE_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[async_trait]
pub trait UserService: Send + Sync {
    async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, ServiceError>;
    async fn login(&self, email: String, password: String) -> Result<AuthResponse, ServiceError>;
    async fn refresh_token(&self, refresh_token: String) -> Result<TokenPair, ServiceError>;
    async fn list_users(&self) -> Result<Vec<UserResponse>, ServiceError>;
    async fn search_users(&self, q: &str) -> Result<Vec<UserResponse>, ServiceError>;
    async fn get_profile(&self, id: &ObjectId) -> Result<UserResponse, ServiceError>;
    async fn get_public_profile(&self, id: &ObjectId) -> Result<UserResponse, ServiceError>;
    async fn update_profile(&self, id: &ObjectId, update: ProfileUpdateRequest) -> Result<UserResponse, ServiceError>;
    async fn follow(&self, id: &ObjectId, target: &ObjectId) -> Result<(), ServiceError>;
    async fn unfollow(&self, id: &ObjectId, target: &ObjectId) -> Result<(), ServiceError>;
    async fn following(&self, id: &ObjectId) -> Result<Vec<UserSummary>, ServiceError>;
    async fn followers(&self, id: &ObjectId) -> Result<Vec<UserSummary>, ServiceError>;
    async fn update_profile_image(&self, id: &ObjectId, file: IncomingFile) -> Result<ProfileImageResponse, ServiceError>;
}

pub struct UserServiceImpl {
    pub user_repo: Arc<dyn UserRepository>,
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
    pub storage: Arc<dyn FileStorage>,
}

impl UserServiceImpl {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        jwt_utils: Arc<JwtTokenUtilsImpl>,
        storage: Arc<dyn FileStorage>,
    ) -> Self {
        Self { user_repo, jwt_utils, storage }
    }

    async fn load(&self, id: &ObjectId) -> Result<User, ServiceError> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }

    fn auth_response(&self, user: User) -> Result<AuthResponse, ServiceError> {
        let id = user.id.map(|id| id.to_hex()).unwrap_or_default();
        let tokens = self
            .jwt_utils
            .generate_token_pair(&id, &user.email, &user.role)
            .map_err(|e| ServiceError::InternalError(format!("JWT error: {}", e)))?;
        Ok(AuthResponse { token: tokens.access_token.clone(), user: UserResponse::from(user), tokens })
    }
}

/// Checks the profile rules the request types cannot express on their own.
pub fn check_profile(update: &ProfileUpdateRequest) -> Result<(), ServiceError> {
    let mut errors = Vec::new();

    for (field, value) in [("github", &update.github), ("linkedin", &update.linkedin), ("portfolio", &update.portfolio)] {
        if let Some(link) = value.as_deref().filter(|l| !l.is_empty()) {
            if !link.validate_url() {
                errors.push(format!("Invalid URL format for {}", field));
            }
        }
    }

    if let Some(image) = update.profile_image.as_deref().filter(|i| i.starts_with("data:image")) {
        let approximate = image.len() * 3 / 4;
        if approximate > MAX_INLINE_IMAGE_BYTES {
            let mb = approximate as f64 / 1024.0 / 1024.0;
            return Err(ServiceError::InvalidInput(format!(
                "Profile image is too large ({:.2}MB). Maximum size allowed is 5MB.",
                mb
            )));
        }
    }

    let max_year = Utc::now().year() + 10;
    for edu in update.education.iter().flatten() {
        for year in [edu.start_year, edu.end_year].into_iter().flatten() {
            if !(1900..=max_year).contains(&year) {
                errors.push(format!("Education year {} must be between 1900 and {}", year, max_year));
            }
        }
        if let (Some(start), Some(end)) = (edu.start_year, edu.end_year) {
            if end < start {
                errors.push("Education end year cannot be before start year".to_string());
            }
        }
    }

    for exp in update.experience.iter().flatten() {
        let start = exp.start_date.as_deref().and_then(parse_lenient);
        let end = exp.end_date.as_deref().and_then(parse_lenient);
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                errors.push("Experience end date cannot be before start date".to_string());
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::InvalidInput(format!("Validation error: {}", errors.join("; "))))
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    #[instrument(skip(self, request), fields(username = %request.username, email = %request.email))]
    async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, ServiceError> {
        info!("Registering new user");
        if request.password != request.confirm_password {
            return Err(ServiceError::InvalidInput("Passwords do not match".to_string()));
        }
        check_profile(&request.profile)?;

        if self.user_repo.find_by_email(&request.email).await?.is_some() {
            warn!("Email already registered");
            return Err(ServiceError::InvalidInput("Email already exists".to_string()));
        }
        if self.user_repo.find_by_username(&request.username).await?.is_some() {
            warn!("Username already taken");
            return Err(ServiceError::InvalidInput("Username already taken".to_string()));
        }

        let hash = PasswordUtilsImpl::hash_password(&request.password)
            .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))?;
        let mut user = User::new(request.username, request.full_name, request.email, hash);
        request.profile.apply_to(&mut user);

        let inserted = self.user_repo.insert(user).await;
        match &inserted {
            Ok(_) => info!("User registered"),
            Err(e) => error!("Failed to insert user: {e}"),
        }
        self.auth_response(inserted?)
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn login(&self, email: String, password: String) -> Result<AuthResponse, ServiceError> {
        let invalid = || ServiceError::InvalidInput("Invalid credentials".to_string());
        let user = match self.user_repo.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                warn!("Login for unknown email");
                return Err(invalid());
            }
        };
        let valid = PasswordUtilsImpl::verify_password(&password, &user.password)
            .map_err(|e| ServiceError::InternalError(format!("Password verify error: {}", e)))?;
        if !valid {
            warn!("Invalid password");
            return Err(invalid());
        }
        info!("User logged in");
        self.auth_response(user)
    }

    #[instrument(skip(self, refresh_token))]
    async fn refresh_token(&self, refresh_token: String) -> Result<TokenPair, ServiceError> {
        let claims = self
            .jwt_utils
            .validate_refresh_token(&refresh_token)
            .map_err(|e| ServiceError::Unauthorized(format!("Invalid refresh token: {}", e)))?;
        self.jwt_utils
            .generate_token_pair(&claims.sub, &claims.email, &claims.role)
            .map_err(|e| ServiceError::InternalError(format!("JWT error: {}", e)))
    }

    async fn list_users(&self) -> Result<Vec<UserResponse>, ServiceError> {
        Ok(self.user_repo.list_all().await?.into_iter().map(UserResponse::from).collect())
    }

    #[instrument(skip(self))]
    async fn search_users(&self, q: &str) -> Result<Vec<UserResponse>, ServiceError> {
        let query = TextQuery::new(q).ok_or_else(|| ServiceError::InvalidInput("Query parameter is required".to_string()))?;
        Ok(self.user_repo.search(&query).await?.into_iter().map(UserResponse::from).collect())
    }

    async fn get_profile(&self, id: &ObjectId) -> Result<UserResponse, ServiceError> {
        Ok(UserResponse::from(self.load(id).await?))
    }

    async fn get_public_profile(&self, id: &ObjectId) -> Result<UserResponse, ServiceError> {
        Ok(UserResponse::public(self.load(id).await?))
    }

    #[instrument(skip(self, update), fields(id = %id))]
    async fn update_profile(&self, id: &ObjectId, update: ProfileUpdateRequest) -> Result<UserResponse, ServiceError> {
        check_profile(&update)?;
        let mut user = self.load(id).await?;
        update.apply_to(&mut user);
        let res = self.user_repo.update(*id, user).await;
        match &res {
            Ok(_) => info!("Profile updated"),
            Err(e) => error!("Failed to update profile: {e}"),
        }
        Ok(UserResponse::from(res?))
    }

    #[instrument(skip(self), fields(id = %id, target = %target))]
    async fn follow(&self, id: &ObjectId, target: &ObjectId) -> Result<(), ServiceError> {
        if id == target {
            return Err(ServiceError::InvalidInput("You cannot follow yourself".to_string()));
        }
        self.load(target).await?;
        self.user_repo.add_connection(id, target).await?;
        info!("User followed");
        Ok(())
    }

    #[instrument(skip(self), fields(id = %id, target = %target))]
    async fn unfollow(&self, id: &ObjectId, target: &ObjectId) -> Result<(), ServiceError> {
        self.user_repo.remove_connection(id, target).await?;
        info!("User unfollowed");
        Ok(())
    }

    async fn following(&self, id: &ObjectId) -> Result<Vec<UserSummary>, ServiceError> {
        let user = self.load(id).await?;
        let followed = self.user_repo.find_many(&user.connections).await?;
        // keep the order in which they were followed
        Ok(user
            .connections
            .iter()
            .filter_map(|cid| followed.iter().find(|u| u.id.as_ref() == Some(cid)))
            .map(UserSummary::from)
            .collect())
    }

    async fn followers(&self, id: &ObjectId) -> Result<Vec<UserSummary>, ServiceError> {
        Ok(self.user_repo.find_followers(id).await?.iter().map(UserSummary::from).collect())
    }

    #[instrument(skip(self, file), fields(id = %id))]
    async fn update_profile_image(&self, id: &ObjectId, file: IncomingFile) -> Result<ProfileImageResponse, ServiceError> {
        let mut user = self.load(id).await?;
        let url = self.storage.store_image(&file, Some("profiles")).await?;
        user.profile_image = url.clone();
        let updated = self.user_repo.update(*id, user).await?;
        info!(url = %url, "Profile image updated");
        Ok(ProfileImageResponse {
            message: "Profile image updated successfully".to_string(),
            profile_image: url,
            user: UserResponse::from(updated),
        })
    }
}
