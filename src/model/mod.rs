pub mod comment;
pub mod content;
pub mod cv_profile;
pub mod user;

use chrono::{SecondsFormat, Utc};

use crate::model::comment::VoteType;

/// UTC timestamp in a fixed-width RFC 3339 form, so stored values sort chronologically.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Rejected content interactions. Messages are returned to clients as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InteractionError {
    #[error("Comment text cannot be empty")]
    EmptyComment,
    #[error("Answer text cannot be empty")]
    EmptyAnswer,
    #[error("This content is not a question")]
    NotAQuestion,
    #[error("Only the question owner can accept an answer")]
    NotQuestionOwner,
    #[error("Invalid comment index")]
    InvalidCommentIndex,
    #[error("The selected comment is not an answer")]
    NotAnAnswer,
    #[error("You have already {}voted this answer", .0.as_str())]
    AlreadyVoted(VoteType),
    #[error("Direction must be 'up' or 'down'")]
    InvalidDirection,
}
