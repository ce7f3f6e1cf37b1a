use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::model::comment::{Comment, VoteType};
use crate::model::{timestamp, InteractionError};

pub const DEFAULT_CONTENT_IMAGE: &str = "/default-content.gif";
pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_DESCRIPTION: &str = "No description";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    Post,
    Job,
    Event,
    Project,
    Tutorial,
    Books,
    Question,
}

impl ContentType {
    pub const ALL: [ContentType; 7] = [
        ContentType::Post,
        ContentType::Job,
        ContentType::Event,
        ContentType::Project,
        ContentType::Tutorial,
        ContentType::Books,
        ContentType::Question,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Post => "Post",
            ContentType::Job => "Job",
            ContentType::Event => "Event",
            ContentType::Project => "Project",
            ContentType::Tutorial => "Tutorial",
            ContentType::Books => "Books",
            ContentType::Question => "Question",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown content type: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    Public,
    Connections,
    Private,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Legacy image location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Legacy image location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Full-time, part-time, contract...
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Legacy image location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Legacy image location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_url: Option<String>,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TutorialFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Legacy image location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tutorial_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Legacy image location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestionFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Legacy image location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Type-specific payload of a content item, one variant per [`ContentType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ExtraFields {
    Post(PostFields),
    Job(JobFields),
    Event(EventFields),
    Project(ProjectFields),
    Tutorial(TutorialFields),
    Books(BookFields),
    Question(QuestionFields),
}

impl ExtraFields {
    /// Builds the payload for `content_type` from a client-supplied JSON object.
    /// `null` yields an empty payload; unknown keys are ignored.
    pub fn from_parts(content_type: ContentType, value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let value = match value {
            serde_json::Value::Null => serde_json::Value::Object(serde_json::Map::new()),
            serde_json::Value::Object(_) => value,
            _ => return Err(<serde_json::Error as serde::de::Error>::custom("extraFields must be an object")),
        };
        Ok(match content_type {
            ContentType::Post => ExtraFields::Post(serde_json::from_value(value)?),
            ContentType::Job => ExtraFields::Job(serde_json::from_value(value)?),
            ContentType::Event => ExtraFields::Event(serde_json::from_value(value)?),
            ContentType::Project => ExtraFields::Project(serde_json::from_value(value)?),
            ContentType::Tutorial => ExtraFields::Tutorial(serde_json::from_value(value)?),
            ContentType::Books => ExtraFields::Books(serde_json::from_value(value)?),
            ContentType::Question => ExtraFields::Question(serde_json::from_value(value)?),
        })
    }

    pub fn empty(content_type: ContentType) -> Self {
        match content_type {
            ContentType::Post => ExtraFields::Post(PostFields::default()),
            ContentType::Job => ExtraFields::Job(JobFields::default()),
            ContentType::Event => ExtraFields::Event(EventFields::default()),
            ContentType::Project => ExtraFields::Project(ProjectFields::default()),
            ContentType::Tutorial => ExtraFields::Tutorial(TutorialFields::default()),
            ContentType::Books => ExtraFields::Books(BookFields::default()),
            ContentType::Question => ExtraFields::Question(QuestionFields::default()),
        }
    }

    pub fn content_type(&self) -> ContentType {
        match self {
            ExtraFields::Post(_) => ContentType::Post,
            ExtraFields::Job(_) => ContentType::Job,
            ExtraFields::Event(_) => ContentType::Event,
            ExtraFields::Project(_) => ContentType::Project,
            ExtraFields::Tutorial(_) => ContentType::Tutorial,
            ExtraFields::Books(_) => ContentType::Books,
            ExtraFields::Question(_) => ContentType::Question,
        }
    }

    /// Overlays the keys of `patch` onto this payload, keeping the variant.
    pub fn merged(&self, patch: serde_json::Value) -> Result<Self, serde_json::Error> {
        let serde_json::Value::Object(changes) = patch else {
            return Err(<serde_json::Error as serde::de::Error>::custom("extraFields must be an object"));
        };
        let mut current = serde_json::to_value(self)?;
        if let Some(target) = current.as_object_mut() {
            target.remove("kind");
            for (key, value) in changes {
                if key != "kind" {
                    target.insert(key, value);
                }
            }
        }
        ExtraFields::from_parts(self.content_type(), current)
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            ExtraFields::Post(f) => f.title.as_deref(),
            ExtraFields::Job(f) => f.title.as_deref(),
            ExtraFields::Event(f) => f.title.as_deref(),
            ExtraFields::Project(f) => f.title.as_deref(),
            ExtraFields::Tutorial(f) => f.title.as_deref(),
            ExtraFields::Books(f) => f.title.as_deref(),
            ExtraFields::Question(f) => f.title.as_deref(),
        }
    }

    pub fn post_title(&self) -> Option<&str> {
        match self {
            ExtraFields::Post(f) => f.post_title.as_deref(),
            _ => None,
        }
    }

    pub fn tutorial_title(&self) -> Option<&str> {
        match self {
            ExtraFields::Tutorial(f) => f.tutorial_title.as_deref(),
            _ => None,
        }
    }

    pub fn image(&self) -> Option<&str> {
        match self {
            ExtraFields::Post(f) => f.image.as_deref(),
            ExtraFields::Job(f) => f.image.as_deref(),
            ExtraFields::Event(f) => f.image.as_deref(),
            ExtraFields::Project(f) => f.image.as_deref(),
            ExtraFields::Tutorial(f) => f.image.as_deref(),
            ExtraFields::Books(f) => f.image.as_deref(),
            ExtraFields::Question(f) => f.image.as_deref(),
        }
    }

    pub fn post_image(&self) -> Option<&str> {
        match self {
            ExtraFields::Post(f) => f.post_image.as_deref(),
            _ => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            ExtraFields::Post(f) => f.description.as_deref(),
            ExtraFields::Job(f) => f.description.as_deref(),
            ExtraFields::Event(f) => f.description.as_deref(),
            ExtraFields::Project(f) => f.description.as_deref(),
            ExtraFields::Tutorial(f) => f.description.as_deref(),
            ExtraFields::Books(f) => f.description.as_deref(),
            ExtraFields::Question(f) => f.description.as_deref(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub content_type: ContentType,
    pub title: String,
    pub image: String,
    #[serde(default)]
    pub visibility: Visibility,
    pub extra_fields: ExtraFields,
    #[serde(default)]
    pub likes: BTreeSet<ObjectId>,
    #[serde(default)]
    pub dislikes: BTreeSet<ObjectId>,
    #[serde(default)]
    pub saves: BTreeSet<ObjectId>,
    #[serde(default)]
    pub reposts: BTreeSet<ObjectId>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Set on repost documents only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_content_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repost_note: Option<String>,
    #[serde(default)]
    pub solved: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: String,
    pub last_updated_at: String,
    /// Bumped on every write; guards read-modify-write cycles.
    #[serde(default)]
    pub revision: i64,
}

impl Content {
    pub fn new(user_id: ObjectId, extra_fields: ExtraFields) -> Self {
        let now = timestamp();
        Content {
            id: None,
            user_id,
            content_type: extra_fields.content_type(),
            title: DEFAULT_TITLE.to_string(),
            image: DEFAULT_CONTENT_IMAGE.to_string(),
            visibility: Visibility::Public,
            extra_fields,
            likes: BTreeSet::new(),
            dislikes: BTreeSet::new(),
            saves: BTreeSet::new(),
            reposts: BTreeSet::new(),
            comments: Vec::new(),
            original_content_id: None,
            repost_note: None,
            solved: false,
            tags: Vec::new(),
            created_at: now.clone(),
            last_updated_at: now,
            revision: 0,
        }
    }

    pub fn touch(&mut self) {
        self.last_updated_at = timestamp();
    }

    pub fn is_owned_by(&self, user_id: &ObjectId) -> bool {
        &self.user_id == user_id
    }

    pub fn is_question(&self) -> bool {
        self.content_type == ContentType::Question
    }

    /// Returns whether the user now likes the content. Liking clears a dislike.
    pub fn toggle_like(&mut self, user_id: ObjectId) -> bool {
        if self.likes.remove(&user_id) {
            return false;
        }
        self.dislikes.remove(&user_id);
        self.likes.insert(user_id)
    }

    /// Returns whether the user now dislikes the content. Disliking clears a like.
    pub fn toggle_dislike(&mut self, user_id: ObjectId) -> bool {
        if self.dislikes.remove(&user_id) {
            return false;
        }
        self.likes.remove(&user_id);
        self.dislikes.insert(user_id)
    }

    pub fn toggle_save(&mut self, user_id: ObjectId) -> bool {
        if self.saves.remove(&user_id) {
            return false;
        }
        self.saves.insert(user_id)
    }

    pub fn toggle_repost(&mut self, user_id: ObjectId) -> bool {
        if self.reposts.remove(&user_id) {
            return false;
        }
        self.reposts.insert(user_id)
    }

    /// The document a repost by `user_id` creates: same type, title, image
    /// and payload, always public, linked back to this item.
    pub fn repost_for(&self, user_id: ObjectId, note: Option<String>) -> Content {
        let mut repost = Content::new(user_id, self.extra_fields.clone());
        repost.title = self.title.clone();
        repost.image = self.image.clone();
        repost.visibility = Visibility::Public;
        repost.original_content_id = self.id;
        repost.repost_note = note.filter(|n| !n.trim().is_empty());
        repost
    }

    pub fn add_comment(&mut self, user_id: ObjectId, username: &str, text: &str) -> Result<&Comment, InteractionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(InteractionError::EmptyComment);
        }
        self.comments.push(Comment::new(user_id, username, text, false));
        Ok(&self.comments[self.comments.len() - 1])
    }

    pub fn add_answer(&mut self, user_id: ObjectId, username: &str, text: &str) -> Result<&Comment, InteractionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(InteractionError::EmptyAnswer);
        }
        if !self.is_question() {
            return Err(InteractionError::NotAQuestion);
        }
        self.comments.push(Comment::new(user_id, username, text, true));
        Ok(&self.comments[self.comments.len() - 1])
    }

    fn answer_index(&self, index: i64) -> Result<usize, InteractionError> {
        let index = usize::try_from(index).map_err(|_| InteractionError::InvalidCommentIndex)?;
        if index >= self.comments.len() {
            return Err(InteractionError::InvalidCommentIndex);
        }
        if !self.comments[index].is_answer {
            return Err(InteractionError::NotAnAnswer);
        }
        Ok(index)
    }

    /// Marks the answer at `index` as the accepted one and the question as solved.
    /// Only the question owner may accept. `solved` is never cleared again.
    pub fn accept_answer(&mut self, caller: &ObjectId, index: i64) -> Result<(), InteractionError> {
        if !self.is_question() {
            return Err(InteractionError::NotAQuestion);
        }
        if !self.is_owned_by(caller) {
            return Err(InteractionError::NotQuestionOwner);
        }
        let index = self.answer_index(index)?;
        for (i, comment) in self.comments.iter_mut().enumerate() {
            comment.accepted_answer = i == index;
        }
        self.solved = true;
        Ok(())
    }

    pub fn vote_answer(&mut self, voter: &ObjectId, index: i64, direction: VoteType) -> Result<&Comment, InteractionError> {
        if !self.is_question() {
            return Err(InteractionError::NotAQuestion);
        }
        let index = self.answer_index(index)?;
        self.comments[index].vote(voter, direction)?;
        Ok(&self.comments[index])
    }

    pub fn has_answers(&self) -> bool {
        self.comments.iter().any(|c| c.is_answer)
    }

    /// Likes, comments and saves; ranks trending questions.
    pub fn interaction_score(&self) -> usize {
        self.likes.len() + self.comments.len() + self.saves.len()
    }

    /// Root title, then the legacy title locations inside the payload.
    pub fn display_title(&self) -> &str {
        non_empty(Some(self.title.as_str()))
            .or_else(|| non_empty(self.extra_fields.title()))
            .or_else(|| non_empty(self.extra_fields.post_title()))
            .or_else(|| non_empty(self.extra_fields.tutorial_title()))
            .unwrap_or(DEFAULT_TITLE)
    }

    pub fn display_description(&self) -> &str {
        non_empty(self.extra_fields.description()).unwrap_or(DEFAULT_DESCRIPTION)
    }

    /// Root image, then the legacy image locations inside the payload.
    pub fn display_image(&self) -> &str {
        non_empty(Some(self.image.as_str()))
            .or_else(|| non_empty(self.extra_fields.image()))
            .or_else(|| non_empty(self.extra_fields.post_image()))
            .unwrap_or(DEFAULT_CONTENT_IMAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question(owner: ObjectId) -> Content {
        Content::new(owner, ExtraFields::empty(ContentType::Question))
    }

    #[test]
    fn test_like_twice_restores_state() {
        let user = ObjectId::new();
        let mut content = Content::new(ObjectId::new(), ExtraFields::empty(ContentType::Post));
        assert!(content.toggle_like(user));
        assert!(!content.toggle_like(user));
        assert!(content.likes.is_empty());
        assert!(content.dislikes.is_empty());
    }

    #[test]
    fn test_like_and_dislike_are_exclusive() {
        let user = ObjectId::new();
        let mut content = Content::new(ObjectId::new(), ExtraFields::empty(ContentType::Post));
        content.toggle_dislike(user);
        content.toggle_like(user);
        assert!(content.likes.contains(&user));
        assert!(!content.dislikes.contains(&user));

        content.toggle_dislike(user);
        assert!(!content.likes.contains(&user));
        assert!(content.dislikes.contains(&user));
    }

    #[test]
    fn test_repost_copies_payload_and_forces_public() {
        let mut original = Content::new(
            ObjectId::new(),
            ExtraFields::from_parts(ContentType::Job, json!({"company": "Acme"})).unwrap(),
        );
        original.id = Some(ObjectId::new());
        original.title = "Rust engineer".to_string();
        original.visibility = Visibility::Connections;

        let reposter = ObjectId::new();
        let repost = original.repost_for(reposter, Some("worth a look".to_string()));
        assert_eq!(repost.user_id, reposter);
        assert_eq!(repost.content_type, ContentType::Job);
        assert_eq!(repost.title, "Rust engineer");
        assert_eq!(repost.visibility, Visibility::Public);
        assert_eq!(repost.original_content_id, original.id);
        assert_eq!(repost.extra_fields, original.extra_fields);
        assert_eq!(repost.repost_note.as_deref(), Some("worth a look"));
    }

    #[test]
    fn test_comment_text_is_trimmed_and_required() {
        let mut content = Content::new(ObjectId::new(), ExtraFields::empty(ContentType::Post));
        assert_eq!(content.add_comment(ObjectId::new(), "bob", "   ").unwrap_err(), InteractionError::EmptyComment);
        let comment = content.add_comment(ObjectId::new(), "bob", "  hello ").unwrap();
        assert_eq!(comment.text, "hello");
        assert!(!comment.is_answer);
    }

    #[test]
    fn test_answers_require_question() {
        let mut post = Content::new(ObjectId::new(), ExtraFields::empty(ContentType::Post));
        assert_eq!(post.add_answer(ObjectId::new(), "bob", "42").unwrap_err(), InteractionError::NotAQuestion);

        let mut q = question(ObjectId::new());
        assert!(q.add_answer(ObjectId::new(), "bob", "42").unwrap().is_answer);
    }

    #[test]
    fn test_accept_answer_moves_flag_and_keeps_solved() {
        let owner = ObjectId::new();
        let mut q = question(owner);
        q.add_answer(ObjectId::new(), "a", "first").unwrap();
        q.add_comment(ObjectId::new(), "b", "just a comment").unwrap();
        q.add_answer(ObjectId::new(), "c", "second").unwrap();

        q.accept_answer(&owner, 0).unwrap();
        assert!(q.comments[0].accepted_answer);
        assert!(q.solved);

        q.accept_answer(&owner, 2).unwrap();
        assert!(!q.comments[0].accepted_answer);
        assert!(q.comments[2].accepted_answer);
        assert_eq!(q.comments.iter().filter(|c| c.accepted_answer).count(), 1);
        assert!(q.solved);
    }

    #[test]
    fn test_accept_answer_rejections() {
        let owner = ObjectId::new();
        let mut q = question(owner);
        q.add_answer(ObjectId::new(), "a", "answer").unwrap();
        q.add_comment(ObjectId::new(), "b", "comment").unwrap();

        assert_eq!(q.accept_answer(&ObjectId::new(), 0), Err(InteractionError::NotQuestionOwner));
        assert_eq!(q.accept_answer(&owner, 5), Err(InteractionError::InvalidCommentIndex));
        assert_eq!(q.accept_answer(&owner, -1), Err(InteractionError::InvalidCommentIndex));
        assert_eq!(q.accept_answer(&owner, 1), Err(InteractionError::NotAnAnswer));
        assert!(!q.solved);
    }

    #[test]
    fn test_vote_answer_follows_transition_table() {
        let voter = ObjectId::new();
        let mut q = question(ObjectId::new());
        q.add_answer(ObjectId::new(), "a", "answer").unwrap();

        assert_eq!(q.vote_answer(&voter, 0, VoteType::Up).unwrap().votes(), 1);
        assert_eq!(
            q.vote_answer(&voter, 0, VoteType::Up).unwrap_err(),
            InteractionError::AlreadyVoted(VoteType::Up)
        );
        assert_eq!(q.vote_answer(&voter, 0, VoteType::Down).unwrap().votes(), -1);
        assert_eq!(q.comments[0].voted_by.len(), 1);
    }

    #[test]
    fn test_display_title_fallback_order() {
        let mut content = Content::new(
            ObjectId::new(),
            ExtraFields::from_parts(ContentType::Post, json!({"postTitle": "Legacy post"})).unwrap(),
        );
        content.title = String::new();
        assert_eq!(content.display_title(), "Legacy post");

        let mut tutorial = Content::new(
            ObjectId::new(),
            ExtraFields::from_parts(
                ContentType::Tutorial,
                json!({"title": "Payload title", "tutorialTitle": "Tutorial title"}),
            )
            .unwrap(),
        );
        tutorial.title = String::new();
        assert_eq!(tutorial.display_title(), "Payload title");

        tutorial.title = "Root".to_string();
        assert_eq!(tutorial.display_title(), "Root");

        let mut bare = Content::new(ObjectId::new(), ExtraFields::empty(ContentType::Event));
        bare.title = " ".to_string();
        assert_eq!(bare.display_title(), DEFAULT_TITLE);
        assert_eq!(bare.display_description(), DEFAULT_DESCRIPTION);
    }

    #[test]
    fn test_display_image_fallback_order() {
        let mut post = Content::new(
            ObjectId::new(),
            ExtraFields::from_parts(ContentType::Post, json!({"postImage": "/uploads/legacy-post.png"})).unwrap(),
        );
        post.image = String::new();
        assert_eq!(post.display_image(), "/uploads/legacy-post.png");

        post.extra_fields = post.extra_fields.merged(json!({"image": "/uploads/payload.png"})).unwrap();
        assert_eq!(post.display_image(), "/uploads/payload.png");

        post.image = "/uploads/root.png".to_string();
        assert_eq!(post.display_image(), "/uploads/root.png");

        let mut bare = Content::new(ObjectId::new(), ExtraFields::empty(ContentType::Job));
        bare.image = String::new();
        assert_eq!(bare.display_image(), DEFAULT_CONTENT_IMAGE);
    }

    #[test]
    fn test_extra_fields_parse_per_type() {
        let job = ExtraFields::from_parts(
            ContentType::Job,
            json!({"company": "Acme", "type": "Full-time", "applicationUrl": "https://acme.dev/jobs", "unknown": 1}),
        )
        .unwrap();
        match job {
            ExtraFields::Job(fields) => {
                assert_eq!(fields.company.as_deref(), Some("Acme"));
                assert_eq!(fields.job_type.as_deref(), Some("Full-time"));
                assert_eq!(fields.application_url.as_deref(), Some("https://acme.dev/jobs"));
            }
            other => panic!("unexpected payload {:?}", other),
        }
        assert!(ExtraFields::from_parts(ContentType::Post, json!("text")).is_err());
        assert_eq!(
            ExtraFields::from_parts(ContentType::Books, serde_json::Value::Null).unwrap(),
            ExtraFields::empty(ContentType::Books)
        );
    }

    #[test]
    fn test_merge_keeps_variant_and_existing_keys() {
        let fields = ExtraFields::from_parts(ContentType::Job, json!({"company": "Acme", "salary": "100k"})).unwrap();
        let merged = fields.merged(json!({"salary": "120k", "kind": "Post"})).unwrap();
        match merged {
            ExtraFields::Job(job) => {
                assert_eq!(job.company.as_deref(), Some("Acme"));
                assert_eq!(job.salary.as_deref(), Some("120k"));
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_bson_round_trip_keeps_tag() {
        let mut content = Content::new(
            ObjectId::new(),
            ExtraFields::from_parts(ContentType::Tutorial, json!({"tutorialTitle": "Lifetimes", "tags": ["rust"]})).unwrap(),
        );
        content.id = Some(ObjectId::new());
        content.toggle_save(ObjectId::new());
        let doc = bson::to_document(&content).unwrap();
        assert_eq!(doc.get_document("extraFields").unwrap().get_str("kind").unwrap(), "Tutorial");
        let back: Content = bson::from_document(doc).unwrap();
        assert_eq!(back.extra_fields, content.extra_fields);
        assert_eq!(back.saves, content.saves);
    }

    #[test]
    fn test_content_type_parsing() {
        assert_eq!("Question".parse::<ContentType>().unwrap(), ContentType::Question);
        assert!("Podcast".parse::<ContentType>().is_err());
    }
}
