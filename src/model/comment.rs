use std::collections::BTreeMap;

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::model::InteractionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Up,
    Down,
}

impl VoteType {
    pub fn weight(self) -> i64 {
        match self {
            VoteType::Up => 1,
            VoteType::Down => -1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VoteType::Up => "up",
            VoteType::Down => "down",
        }
    }
}

impl std::str::FromStr for VoteType {
    type Err = InteractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(VoteType::Up),
            "down" => Ok(VoteType::Down),
            _ => Err(InteractionError::InvalidDirection),
        }
    }
}

/// A comment on a content item. On questions a comment may be an answer,
/// which can then be voted on and accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub user_id: ObjectId,
    /// Author's username when the comment was written
    pub username: String,
    pub text: String,
    pub created_at: String,
    #[serde(default)]
    pub is_answer: bool,
    #[serde(default)]
    pub accepted_answer: bool,
    /// One entry per voter, keyed by the voter's hex id.
    #[serde(default)]
    pub voted_by: BTreeMap<String, VoteType>,
}

impl Comment {
    pub fn new(user_id: ObjectId, username: &str, text: &str, is_answer: bool) -> Self {
        Comment {
            user_id,
            username: username.to_string(),
            text: text.to_string(),
            created_at: crate::model::timestamp(),
            is_answer,
            accepted_answer: false,
            voted_by: BTreeMap::new(),
        }
    }

    /// Net score, derived from the vote map.
    pub fn votes(&self) -> i64 {
        self.voted_by.values().map(|vote| vote.weight()).sum()
    }

    pub fn vote_of(&self, voter: &ObjectId) -> Option<VoteType> {
        self.voted_by.get(&voter.to_hex()).copied()
    }

    /// Records `direction` for `voter`. Repeating the current direction is rejected
    /// and leaves the comment untouched; switching direction overwrites the entry.
    pub fn vote(&mut self, voter: &ObjectId, direction: VoteType) -> Result<(), InteractionError> {
        if !self.is_answer {
            return Err(InteractionError::NotAnAnswer);
        }
        if self.vote_of(voter) == Some(direction) {
            return Err(InteractionError::AlreadyVoted(direction));
        }
        self.voted_by.insert(voter.to_hex(), direction);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer() -> Comment {
        Comment::new(ObjectId::new(), "alice", "use a BTreeMap", true)
    }

    #[test]
    fn test_first_votes_move_score_by_one() {
        let voter = ObjectId::new();
        let mut up = answer();
        up.vote(&voter, VoteType::Up).unwrap();
        assert_eq!(up.votes(), 1);

        let mut down = answer();
        down.vote(&voter, VoteType::Down).unwrap();
        assert_eq!(down.votes(), -1);
    }

    #[test]
    fn test_switching_direction_moves_score_by_two_in_place() {
        let voter = ObjectId::new();
        let mut comment = answer();
        comment.vote(&voter, VoteType::Up).unwrap();
        comment.vote(&voter, VoteType::Down).unwrap();
        assert_eq!(comment.votes(), -1);
        assert_eq!(comment.voted_by.len(), 1);
        assert_eq!(comment.vote_of(&voter), Some(VoteType::Down));

        comment.vote(&voter, VoteType::Up).unwrap();
        assert_eq!(comment.votes(), 1);
        assert_eq!(comment.voted_by.len(), 1);
    }

    #[test]
    fn test_repeated_vote_is_rejected_without_change() {
        let voter = ObjectId::new();
        let mut comment = answer();
        comment.vote(&voter, VoteType::Up).unwrap();
        let err = comment.vote(&voter, VoteType::Up).unwrap_err();
        assert_eq!(err.to_string(), "You have already upvoted this answer");
        assert_eq!(comment.votes(), 1);

        let other = ObjectId::new();
        comment.vote(&other, VoteType::Down).unwrap();
        let err = comment.vote(&other, VoteType::Down).unwrap_err();
        assert_eq!(err.to_string(), "You have already downvoted this answer");
        assert_eq!(comment.votes(), 0);
    }

    #[test]
    fn test_plain_comment_cannot_be_voted() {
        let mut comment = Comment::new(ObjectId::new(), "bob", "nice", false);
        assert!(matches!(comment.vote(&ObjectId::new(), VoteType::Up), Err(InteractionError::NotAnAnswer)));
        assert!(comment.voted_by.is_empty());
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!("up".parse::<VoteType>().unwrap(), VoteType::Up);
        assert_eq!("down".parse::<VoteType>().unwrap(), VoteType::Down);
        assert!("sideways".parse::<VoteType>().is_err());
    }
}
