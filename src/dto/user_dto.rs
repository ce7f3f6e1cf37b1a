use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::user::{Education, Experience, User};
use crate::util::jwt::TokenPair;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 50, message = "Username is required"))]
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    pub confirm_password: String,
    #[serde(flatten)]
    #[validate(nested)]
    pub profile: ProfileUpdateRequest,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[validate(length(min = 10))]
    pub refresh_token: String,
}

/// Editable profile fields; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub full_name: Option<String>,
    #[validate(length(max = 500, message = "Bio cannot exceed 500 characters"))]
    pub bio: Option<String>,
    pub profile_image: Option<String>,
    pub skills: Option<Vec<String>>,
    pub area_of_expertise: Option<String>,
    pub education: Option<Vec<Education>>,
    pub experience: Option<Vec<Experience>>,
    pub favorite_languages: Option<Vec<String>>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub portfolio: Option<String>,
}

impl ProfileUpdateRequest {
    pub fn apply_to(self, user: &mut User) {
        let trimmed = |items: Vec<String>| -> Vec<String> {
            items.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
        };
        if let Some(v) = self.full_name {
            user.full_name = v;
        }
        if let Some(v) = self.bio {
            user.bio = v;
        }
        if let Some(v) = self.profile_image {
            user.profile_image = v;
        }
        if let Some(v) = self.skills {
            user.skills = trimmed(v);
        }
        if let Some(v) = self.area_of_expertise {
            user.area_of_expertise = v;
        }
        if let Some(v) = self.education {
            user.education = v;
        }
        if let Some(v) = self.experience {
            user.experience = v;
        }
        if let Some(v) = self.favorite_languages {
            user.favorite_languages = trimmed(v);
        }
        if let Some(v) = self.github {
            user.github = v;
        }
        if let Some(v) = self.linkedin {
            user.linkedin = v;
        }
        if let Some(v) = self.portfolio {
            user.portfolio = v;
        }
    }
}

/// A user as returned to clients: never the password hash, and no email on public views.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: String,
    pub bio: String,
    pub profile_image: String,
    pub skills: Vec<String>,
    pub area_of_expertise: String,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
    pub favorite_languages: Vec<String>,
    pub github: String,
    pub linkedin: String,
    pub portfolio: String,
    pub connections: Vec<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl UserResponse {
    pub fn public(user: User) -> Self {
        UserResponse { email: None, ..UserResponse::from(user) }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            username: user.username,
            full_name: user.full_name,
            email: Some(user.email),
            role: user.role,
            bio: user.bio,
            profile_image: user.profile_image,
            skills: user.skills,
            area_of_expertise: user.area_of_expertise,
            education: user.education,
            experience: user.experience,
            favorite_languages: user.favorite_languages,
            github: user.github,
            linkedin: user.linkedin,
            portfolio: user.portfolio,
            connections: user.connections.iter().map(|id| id.to_hex()).collect(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Identity shown in follower lists and next to CVs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub profile_image: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        UserSummary {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            profile_image: user.profile_image.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Access token, duplicated at the top level for simple clients
    pub token: String,
    pub user: UserResponse,
    pub tokens: TokenPair,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileImageResponse {
    pub message: String,
    pub profile_image: String,
    pub user: UserResponse,
}
