use std::fmt;

use crate::{CommentId, PostId, UserId};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct VoteId(pub i64);

/// What a vote applies to
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Target {
    Post(PostId),
    Comment(CommentId),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Post(id) => write!(f, "post {id}"),
            Target::Comment(id) => write!(f, "comment {id}"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Vote {
    pub id: VoteId,
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<PostId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<CommentId>,
    pub positive: bool,
}

impl Vote {
    /// Returns None for malformed votes that reference neither a post nor a comment
    pub fn target(&self) -> Option<Target> {
        match (self.post_id, self.comment_id) {
            (Some(p), _) => Some(Target::Post(p)),
            (None, Some(c)) => Some(Target::Comment(c)),
            (None, None) => None,
        }
    }
}

/// Body of `POST`, `PUT` and `DELETE /votes`
///
/// Exactly one of `post_id` and `comment_id` is set. `positive` is left out
/// of deletions, as removing a vote does not depend on its direction.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct VoteRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<PostId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<CommentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positive: Option<bool>,
}

impl VoteRequest {
    pub fn new(target: Target, positive: Option<bool>) -> VoteRequest {
        let (post_id, comment_id) = match target {
            Target::Post(p) => (Some(p), None),
            Target::Comment(c) => (None, Some(c)),
        };
        VoteRequest {
            post_id,
            comment_id,
            positive,
        }
    }

    pub fn target(&self) -> Option<Target> {
        match (self.post_id, self.comment_id) {
            (Some(p), None) => Some(Target::Post(p)),
            (None, Some(c)) => Some(Target::Comment(c)),
            _ => None,
        }
    }
}
