use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tracing::{error, info, instrument, warn};

use crate::dto::cv_dto::{CvImageResponse, CvPdf, CvProfileInput, CvProfileResponse};
use crate::dto::user_dto::UserSummary;
use crate::model::cv_profile::{CvProfile, SyncSection, MAX_CV_PROFILES};
use crate::model::user::User;
use crate::render;
use crate::repository::cv_profile_repo::CvProfileRepository;
use crate::repository::user_repo::UserRepository;
use crate::util::error::ServiceError;

const CV_NOT_FOUND: &str = "CV profile not found";

#[async_trait]
pub trait CvService: Send + Sync {
    async fn get_default(&self, user: &ObjectId) -> Result<CvProfileResponse, ServiceError>;
    async fn list(&self, user: &ObjectId) -> Result<Vec<CvProfileResponse>, ServiceError>;
    async fn get_owned(&self, user: &ObjectId, id: &ObjectId) -> Result<CvProfileResponse, ServiceError>;
    async fn create(&self, user: &ObjectId, input: CvProfileInput) -> Result<CvProfileResponse, ServiceError>;
    async fn update(&self, user: &ObjectId, id: &ObjectId, input: CvProfileInput) -> Result<CvProfileResponse, ServiceError>;
    async fn delete(&self, user: &ObjectId, id: &ObjectId) -> Result<(), ServiceError>;
    async fn set_public(&self, user: &ObjectId, id: &ObjectId, public: bool) -> Result<CvProfileResponse, ServiceError>;
    async fn set_default(&self, user: &ObjectId, id: &ObjectId) -> Result<CvProfileResponse, ServiceError>;
    async fn update_image(&self, user: &ObjectId, id: &ObjectId, image_data: Option<String>) -> Result<CvImageResponse, ServiceError>;
    async fn duplicate(&self, user: &ObjectId, id: &ObjectId) -> Result<CvProfileResponse, ServiceError>;
    async fn sync(&self, user: &ObjectId, sections: Vec<SyncSection>) -> Result<CvProfileResponse, ServiceError>;
    async fn public_by_id(&self, id: &ObjectId) -> Result<CvProfileResponse, ServiceError>;
    async fn public_by_user(&self, user_id: &ObjectId) -> Result<CvProfileResponse, ServiceError>;
    async fn search_by_user(&self, user_id: &ObjectId) -> Result<CvProfileResponse, ServiceError>;
    async fn render_pdf(&self, user: &ObjectId, id: &ObjectId) -> Result<CvPdf, ServiceError>;
}

pub struct CvServiceImpl {
    pub cv_repo: Arc<dyn CvProfileRepository>,
    pub user_repo: Arc<dyn UserRepository>,
}

impl CvServiceImpl {
    pub fn new(cv_repo: Arc<dyn CvProfileRepository>, user_repo: Arc<dyn UserRepository>) -> Self {
        Self { cv_repo, user_repo }
    }

    async fn owned(&self, user: &ObjectId, id: &ObjectId) -> Result<CvProfile, ServiceError> {
        self.cv_repo
            .find_owned(id, user)
            .await?
            .ok_or_else(|| ServiceError::NotFound(CV_NOT_FOUND.to_string()))
    }

    async fn account(&self, user: &ObjectId) -> Result<User, ServiceError> {
        self.user_repo
            .find_by_id(user)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }

    async fn ensure_capacity(&self, user: &ObjectId) -> Result<u64, ServiceError> {
        let count = self.cv_repo.count_by_user(user).await?;
        if count >= MAX_CV_PROFILES {
            return Err(ServiceError::InvalidInput(format!(
                "Maximum number of CV profiles reached ({}). Please delete an existing CV to create a new one.",
                MAX_CV_PROFILES
            )));
        }
        Ok(count)
    }

    /// Persists `cv` and, when it is the default, demotes its siblings.
    async fn save(&self, mut cv: CvProfile) -> Result<CvProfile, ServiceError> {
        cv.touch();
        let saved = self.cv_repo.replace(cv).await?;
        self.settle_default(&saved).await?;
        Ok(saved)
    }

    async fn settle_default(&self, cv: &CvProfile) -> Result<(), ServiceError> {
        if let (true, Some(id)) = (cv.is_default, cv.id.as_ref()) {
            let cleared = self.cv_repo.clear_default_except(&cv.user_id, id).await?;
            if cleared > 0 {
                info!(cleared, "Previous default CV cleared");
            }
        }
        Ok(())
    }

    /// Owner identity attached to public reads; a missing owner is not an error.
    async fn with_owner(&self, cv: CvProfile) -> CvProfileResponse {
        let owner = match self.user_repo.find_by_id(&cv.user_id).await {
            Ok(found) => found.as_ref().map(UserSummary::from),
            Err(e) => {
                warn!("CV owner lookup failed: {e}");
                None
            }
        };
        CvProfileResponse::from(cv).with_owner(owner)
    }
}

/// Download name for a rendered CV.
pub fn pdf_file_name(display_name: &str) -> String {
    let cleaned: String = display_name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' || c == ' ' { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "cv.pdf".to_string()
    } else {
        format!("cv-{}.pdf", cleaned)
    }
}

#[async_trait]
impl CvService for CvServiceImpl {
    #[instrument(skip(self), fields(user = %user))]
    async fn get_default(&self, user: &ObjectId) -> Result<CvProfileResponse, ServiceError> {
        let cv = match self.cv_repo.find_default(user).await? {
            Some(cv) => Some(cv),
            None => self.cv_repo.find_first_by_user(user).await?,
        };
        cv.map(CvProfileResponse::from)
            .ok_or_else(|| ServiceError::NotFound(CV_NOT_FOUND.to_string()))
    }

    async fn list(&self, user: &ObjectId) -> Result<Vec<CvProfileResponse>, ServiceError> {
        Ok(self.cv_repo.find_by_user(user).await?.into_iter().map(CvProfileResponse::from).collect())
    }

    async fn get_owned(&self, user: &ObjectId, id: &ObjectId) -> Result<CvProfileResponse, ServiceError> {
        Ok(CvProfileResponse::from(self.owned(user, id).await?))
    }

    #[instrument(skip(self, input), fields(user = %user))]
    async fn create(&self, user: &ObjectId, input: CvProfileInput) -> Result<CvProfileResponse, ServiceError> {
        let count = self.ensure_capacity(user).await?;
        let account = self.account(user).await?;

        let title = input
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("CV {}", count + 1));
        let wants_default = input.is_default.unwrap_or(false);

        let mut cv = CvProfile::new(*user, account.display_name().to_string(), title.clone());
        input.apply_to(&mut cv);
        cv.title = title;
        if cv.full_name.trim().is_empty() {
            cv.full_name = account.display_name().to_string();
        }
        cv.is_default = count == 0 || wants_default;

        let res = self.cv_repo.insert(cv).await;
        match &res {
            Ok(cv) => info!(id = ?cv.id, is_default = cv.is_default, "CV profile created"),
            Err(e) => error!("Failed to create CV profile: {e}"),
        }
        let saved = res?;
        self.settle_default(&saved).await?;
        Ok(CvProfileResponse::from(saved))
    }

    #[instrument(skip(self, input), fields(user = %user, id = %id))]
    async fn update(&self, user: &ObjectId, id: &ObjectId, input: CvProfileInput) -> Result<CvProfileResponse, ServiceError> {
        let mut cv = self.owned(user, id).await?;
        let make_default = input.is_default == Some(true);
        input.apply_to(&mut cv);
        if make_default {
            cv.is_default = true;
        }
        let saved = self.save(cv).await?;
        info!("CV profile updated");
        Ok(CvProfileResponse::from(saved))
    }

    #[instrument(skip(self), fields(user = %user, id = %id))]
    async fn delete(&self, user: &ObjectId, id: &ObjectId) -> Result<(), ServiceError> {
        if !self.cv_repo.delete_owned(id, user).await? {
            return Err(ServiceError::NotFound(CV_NOT_FOUND.to_string()));
        }
        info!("CV profile deleted");
        Ok(())
    }

    #[instrument(skip(self), fields(user = %user, id = %id))]
    async fn set_public(&self, user: &ObjectId, id: &ObjectId, public: bool) -> Result<CvProfileResponse, ServiceError> {
        let mut cv = self.owned(user, id).await?;
        cv.is_public = public;
        let saved = self.save(cv).await?;
        info!(public, "CV visibility changed");
        Ok(CvProfileResponse::from(saved))
    }

    #[instrument(skip(self), fields(user = %user, id = %id))]
    async fn set_default(&self, user: &ObjectId, id: &ObjectId) -> Result<CvProfileResponse, ServiceError> {
        let mut cv = self.owned(user, id).await?;
        cv.is_default = true;
        let saved = self.save(cv).await?;
        info!("Default CV changed");
        Ok(CvProfileResponse::from(saved))
    }

    #[instrument(skip(self, image_data), fields(user = %user, id = %id))]
    async fn update_image(&self, user: &ObjectId, id: &ObjectId, image_data: Option<String>) -> Result<CvImageResponse, ServiceError> {
        let image = image_data
            .filter(|data| !data.trim().is_empty())
            .ok_or_else(|| ServiceError::InvalidInput("No image data provided".to_string()))?;
        let mut cv = self.owned(user, id).await?;
        cv.profile_image = image;
        let saved = self.save(cv).await?;
        Ok(CvImageResponse {
            success: true,
            message: "Profile image updated successfully".to_string(),
            profile_image: saved.profile_image,
        })
    }

    #[instrument(skip(self), fields(user = %user, id = %id))]
    async fn duplicate(&self, user: &ObjectId, id: &ObjectId) -> Result<CvProfileResponse, ServiceError> {
        let source = self.owned(user, id).await?;
        self.ensure_capacity(user).await?;
        let res = self.cv_repo.insert(source.duplicate()).await;
        match &res {
            Ok(copy) => info!(copy_id = ?copy.id, "CV profile duplicated"),
            Err(e) => error!("Failed to duplicate CV profile: {e}"),
        }
        Ok(CvProfileResponse::from(res?))
    }

    #[instrument(skip(self), fields(user = %user))]
    async fn sync(&self, user: &ObjectId, sections: Vec<SyncSection>) -> Result<CvProfileResponse, ServiceError> {
        let account = self.account(user).await?;
        let existing = match self.cv_repo.find_default(user).await? {
            Some(cv) => Some(cv),
            None => self.cv_repo.find_first_by_user(user).await?,
        };

        let saved = match existing {
            Some(mut cv) => {
                cv.sync_from_user(&account, &sections);
                self.save(cv).await?
            }
            None => {
                let count = self.ensure_capacity(user).await?;
                let mut cv = CvProfile::new(*user, account.display_name().to_string(), format!("CV {}", count + 1));
                cv.is_default = count == 0;
                cv.sync_from_user(&account, &sections);
                self.cv_repo.insert(cv).await?
            }
        };
        info!(id = ?saved.id, sections = sections.len(), "CV synced from profile");
        Ok(CvProfileResponse::from(saved))
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn public_by_id(&self, id: &ObjectId) -> Result<CvProfileResponse, ServiceError> {
        let cv = self
            .cv_repo
            .find_by_id(id)
            .await?
            .filter(|cv| cv.is_public)
            .ok_or_else(|| ServiceError::NotFound("Public CV not found".to_string()))?;
        Ok(self.with_owner(cv).await)
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn public_by_user(&self, user_id: &ObjectId) -> Result<CvProfileResponse, ServiceError> {
        let cv = self
            .cv_repo
            .find_public_by_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(CV_NOT_FOUND.to_string()))?;
        Ok(self.with_owner(cv).await)
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn search_by_user(&self, user_id: &ObjectId) -> Result<CvProfileResponse, ServiceError> {
        // the public default wins over older public CVs
        let cv = self
            .cv_repo
            .find_by_user(user_id)
            .await?
            .into_iter()
            .filter(|cv| cv.is_public)
            .max_by_key(|cv| cv.is_default)
            .ok_or_else(|| ServiceError::NotFound("CV profile not found for this user".to_string()))?;
        Ok(CvProfileResponse::from(cv))
    }

    #[instrument(skip(self), fields(user = %user, id = %id))]
    async fn render_pdf(&self, user: &ObjectId, id: &ObjectId) -> Result<CvPdf, ServiceError> {
        let mut cv = self.owned(user, id).await?;
        if cv.full_name.trim().is_empty() {
            cv.full_name = self.account(user).await?.display_name().to_string();
        }
        let file_name = pdf_file_name(&cv.full_name);
        let generated_on = chrono::Local::now().date_naive();

        let res = tokio::task::spawn_blocking(move || render::render_cv(&cv, generated_on))
            .await
            .map_err(|e| ServiceError::InternalError(format!("PDF rendering task failed: {}", e)))?;
        match &res {
            Ok(bytes) => info!(bytes = bytes.len(), "CV rendered"),
            Err(e) => error!("Error generating PDF: {e}"),
        }
        Ok(CvPdf { file_name, bytes: res? })
    }
}
