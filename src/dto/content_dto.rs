use serde::{Deserialize, Serialize};

use crate::dto::user_dto::UserResponse;
use crate::model::comment::Comment;
use crate::model::content::{Content, ContentType, Visibility};
use crate::util::pagination::Pagination;

/// Fields of a new content item once the multipart body has been read.
#[derive(Debug, Clone, Default)]
pub struct CreateContentInput {
    pub content_type: Option<String>,
    pub title: Option<String>,
    pub visibility: Option<String>,
    pub tags: Vec<String>,
    pub extra_fields: serde_json::Value,
    /// Public URL of an image stored with the request
    pub image: Option<String>,
}

/// `json` part of the multipart create request; individual form fields override it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateContentJson {
    pub content_type: Option<String>,
    pub title: Option<String>,
    pub visibility: Option<String>,
    pub tags: Vec<String>,
    pub extra_fields: serde_json::Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContentRequest {
    pub title: Option<String>,
    pub visibility: Option<Visibility>,
    pub tags: Option<Vec<String>>,
    pub image: Option<String>,
    /// Keys merged into the stored payload
    pub extra_fields: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepostRequest {
    pub repost_note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptAnswerRequest {
    pub comment_index: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteAnswerRequest {
    pub comment_index: Option<i64>,
    #[serde(default)]
    pub direction: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagsQuery {
    pub tags: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteEntry {
    pub user_id: String,
    pub vote_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub user_id: String,
    pub username: String,
    pub text: String,
    pub created_at: String,
    pub is_answer: bool,
    pub accepted_answer: bool,
    pub votes: i64,
    pub voted_by: Vec<VoteEntry>,
}

impl From<&Comment> for CommentResponse {
    fn from(comment: &Comment) -> Self {
        CommentResponse {
            user_id: comment.user_id.to_hex(),
            username: comment.username.clone(),
            text: comment.text.clone(),
            created_at: comment.created_at.clone(),
            is_answer: comment.is_answer,
            accepted_answer: comment.accepted_answer,
            votes: comment.votes(),
            voted_by: comment
                .voted_by
                .iter()
                .map(|(user_id, vote)| VoteEntry { user_id: user_id.clone(), vote_type: vote.as_str().to_string() })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub content_type: ContentType,
    pub title: String,
    pub image: String,
    pub visibility: Visibility,
    pub extra_fields: serde_json::Value,
    pub likes: Vec<String>,
    pub dislikes: Vec<String>,
    pub saves: Vec<String>,
    pub reposts: Vec<String>,
    pub comments: Vec<CommentResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_content_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repost_note: Option<String>,
    pub solved: bool,
    pub tags: Vec<String>,
    pub created_at: String,
    pub last_updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_avatar: Option<String>,
}

impl From<&Content> for ContentResponse {
    fn from(content: &Content) -> Self {
        let hex = |ids: &std::collections::BTreeSet<bson::oid::ObjectId>| ids.iter().map(|id| id.to_hex()).collect();
        let mut extra_fields = serde_json::to_value(&content.extra_fields).unwrap_or(serde_json::Value::Null);
        if let Some(map) = extra_fields.as_object_mut() {
            map.remove("kind");
        }
        ContentResponse {
            id: content.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: content.user_id.to_hex(),
            content_type: content.content_type,
            title: content.title.clone(),
            image: content.image.clone(),
            visibility: content.visibility,
            extra_fields,
            likes: hex(&content.likes),
            dislikes: hex(&content.dislikes),
            saves: hex(&content.saves),
            reposts: hex(&content.reposts),
            comments: content.comments.iter().map(CommentResponse::from).collect(),
            original_content_id: content.original_content_id.map(|id| id.to_hex()),
            repost_note: content.repost_note.clone(),
            solved: content.solved,
            tags: content.tags.clone(),
            created_at: content.created_at.clone(),
            last_updated_at: content.last_updated_at.clone(),
            author_name: None,
            author_avatar: None,
        }
    }
}

impl From<Content> for ContentResponse {
    fn from(content: Content) -> Self {
        ContentResponse::from(&content)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentPage {
    pub contents: Vec<ContentResponse>,
    pub pagination: Pagination,
}

/// Flat search hit; title and image are resolved from legacy locations when the root is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchContentItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub image: String,
    #[serde(rename = "type")]
    pub kind: ContentType,
    pub content_type: ContentType,
    pub created_at: String,
}

impl From<&Content> for SearchContentItem {
    fn from(content: &Content) -> Self {
        SearchContentItem {
            id: content.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: content.user_id.to_hex(),
            title: content.display_title().to_string(),
            description: content.display_description().to_string(),
            image: content.display_image().to_string(),
            kind: content.content_type,
            content_type: content.content_type,
            created_at: content.created_at.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub users: Vec<UserResponse>,
    pub contents: Vec<SearchContentItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse { message: message.into() }
    }
}
