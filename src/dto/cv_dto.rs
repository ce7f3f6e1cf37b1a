use serde::{Deserialize, Serialize};

use crate::dto::user_dto::UserSummary;
use crate::model::cv_profile::{
    Certification, Contact, CustomSection, CvEducation, CvLanguage, CvProfile, CvProject, CvSkill, DisplayOptions,
    Publication, SyncSection, Theme, WorkExperience,
};

/// Create/update body for a CV. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvProfileInput {
    pub title: Option<String>,
    pub full_name: Option<String>,
    pub profile_image: Option<String>,
    pub is_public: Option<bool>,
    pub is_default: Option<bool>,
    pub headline: Option<String>,
    pub summary: Option<String>,
    pub contact: Option<Contact>,
    pub work_experience: Option<Vec<WorkExperience>>,
    pub education: Option<Vec<CvEducation>>,
    pub skills: Option<Vec<CvSkill>>,
    pub languages: Option<Vec<CvLanguage>>,
    pub certifications: Option<Vec<Certification>>,
    pub projects: Option<Vec<CvProject>>,
    pub publications: Option<Vec<Publication>>,
    pub custom_sections: Option<Vec<CustomSection>>,
    pub theme: Option<Theme>,
    pub display_options: Option<DisplayOptions>,
}

impl CvProfileInput {
    /// Copies every present field except `isDefault`, which the service handles.
    pub fn apply_to(self, cv: &mut CvProfile) {
        macro_rules! set {
            ($($field:ident),*) => {
                $(if let Some(value) = self.$field {
                    cv.$field = value;
                })*
            };
        }
        set!(
            title,
            full_name,
            profile_image,
            is_public,
            headline,
            summary,
            contact,
            work_experience,
            education,
            skills,
            languages,
            certifications,
            projects,
            publications,
            custom_sections,
            theme,
            display_options
        );
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncRequest {
    #[serde(default)]
    pub sections: Vec<SyncSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRequest {
    pub image_data: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvProfileResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    #[serde(flatten)]
    pub body: CvProfileBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

/// The stored document minus its ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvProfileBody {
    pub title: String,
    pub full_name: String,
    pub profile_image: String,
    pub is_public: bool,
    pub is_default: bool,
    pub headline: String,
    pub summary: String,
    pub contact: Contact,
    pub work_experience: Vec<WorkExperience>,
    pub education: Vec<CvEducation>,
    pub skills: Vec<CvSkill>,
    pub languages: Vec<CvLanguage>,
    pub certifications: Vec<Certification>,
    pub projects: Vec<CvProject>,
    pub publications: Vec<Publication>,
    pub custom_sections: Vec<CustomSection>,
    pub theme: Theme,
    pub display_options: DisplayOptions,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CvProfile> for CvProfileResponse {
    fn from(cv: CvProfile) -> Self {
        CvProfileResponse {
            id: cv.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: cv.user_id.to_hex(),
            body: CvProfileBody {
                title: cv.title,
                full_name: cv.full_name,
                profile_image: cv.profile_image,
                is_public: cv.is_public,
                is_default: cv.is_default,
                headline: cv.headline,
                summary: cv.summary,
                contact: cv.contact,
                work_experience: cv.work_experience,
                education: cv.education,
                skills: cv.skills,
                languages: cv.languages,
                certifications: cv.certifications,
                projects: cv.projects,
                publications: cv.publications,
                custom_sections: cv.custom_sections,
                theme: cv.theme,
                display_options: cv.display_options,
                created_at: cv.created_at,
                updated_at: cv.updated_at,
            },
            user: None,
        }
    }
}

impl CvProfileResponse {
    pub fn with_owner(mut self, owner: Option<UserSummary>) -> Self {
        self.user = owner;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CvImageResponse {
    pub success: bool,
    pub message: String,
    pub profile_image: String,
}

/// Rendered PDF plus the download name.
#[derive(Debug, Clone)]
pub struct CvPdf {
    pub file_name: String,
    pub bytes: Vec<u8>,
}
