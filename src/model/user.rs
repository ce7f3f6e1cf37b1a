use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

pub const DEFAULT_AVATAR: &str = "/default-avatar.png";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub institution: String,
    pub degree: String,
    pub field_of_study: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_year: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    pub company: String,
    pub position: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    pub email: String,
    /// Argon2 hash
    pub password: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub profile_image: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub area_of_expertise: String,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub favorite_languages: Vec<String>,
    #[serde(default)]
    pub github: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub portfolio: String,
    /// Users this user follows
    #[serde(default)]
    pub connections: Vec<ObjectId>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

fn default_role() -> String {
    "user".to_string()
}

impl User {
    pub fn new(username: String, full_name: String, email: String, password_hash: String) -> Self {
        User {
            id: None,
            username,
            full_name,
            email,
            password: password_hash,
            role: default_role(),
            bio: String::new(),
            profile_image: String::new(),
            skills: Vec::new(),
            area_of_expertise: String::new(),
            education: Vec::new(),
            experience: Vec::new(),
            favorite_languages: Vec::new(),
            github: String::new(),
            linkedin: String::new(),
            portfolio: String::new(),
            connections: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Full name when set, username otherwise.
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }

    pub fn avatar(&self) -> &str {
        if self.profile_image.is_empty() {
            DEFAULT_AVATAR
        } else {
            &self.profile_image
        }
    }

    pub fn follows(&self, other: &ObjectId) -> bool {
        self.connections.contains(other)
    }

    /// Returns false when already following.
    pub fn follow(&mut self, other: ObjectId) -> bool {
        if self.follows(&other) {
            return false;
        }
        self.connections.push(other);
        true
    }

    /// Returns false when not following.
    pub fn unfollow(&mut self, other: &ObjectId) -> bool {
        let before = self.connections.len();
        self.connections.retain(|id| id != other);
        before != self.connections.len()
    }
}
