use serde_json::json;

use crate::{CommentId, PostId, Target};

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Post not found {0}")]
    PostNotFound(PostId),

    #[error("Comment not found {0}")]
    CommentNotFound(CommentId),

    #[error("No vote on {0}")]
    VoteNotFound(Target),

    #[error("Already voted on {0}")]
    VoteAlreadyExists(Target),

    #[error("Parent comment {0} is not in the same post")]
    ParentNotInPost(CommentId),

    #[error("Content must not be empty")]
    EmptyContent,

    #[error("Vote must target exactly one post or comment, and say which way unless deleted")]
    InvalidVote,

    #[error("Response lacks the expected {0}")]
    MissingPayload(&'static str),
}

impl Error {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::PermissionDenied => StatusCode::FORBIDDEN,
            Error::PostNotFound(_) => StatusCode::NOT_FOUND,
            Error::CommentNotFound(_) => StatusCode::NOT_FOUND,
            Error::VoteNotFound(_) => StatusCode::NOT_FOUND,
            Error::VoteAlreadyExists(_) => StatusCode::CONFLICT,
            Error::ParentNotInPost(_) => StatusCode::BAD_REQUEST,
            Error::EmptyContent => StatusCode::BAD_REQUEST,
            Error::InvalidVote => StatusCode::BAD_REQUEST,
            Error::MissingPayload(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        let message = self.to_string();
        let body = match self {
            Error::Unknown(_) => json!({ "message": message, "type": "unknown" }),
            Error::Unauthorized => json!({ "message": message, "type": "unauthorized" }),
            Error::PermissionDenied => json!({ "message": message, "type": "permission-denied" }),
            Error::PostNotFound(id) => json!({
                "message": message,
                "type": "post-not-found",
                "post_id": id,
            }),
            Error::CommentNotFound(id) | Error::ParentNotInPost(id) => json!({
                "message": message,
                "type": match self {
                    Error::ParentNotInPost(_) => "parent-not-in-post",
                    _ => "comment-not-found",
                },
                "comment_id": id,
            }),
            Error::VoteNotFound(t) | Error::VoteAlreadyExists(t) => {
                let mut body = json!({
                    "message": message,
                    "type": match self {
                        Error::VoteAlreadyExists(_) => "conflict-vote",
                        _ => "vote-not-found",
                    },
                });
                match t {
                    Target::Post(id) => body["post_id"] = json!(id),
                    Target::Comment(id) => body["comment_id"] = json!(id),
                }
                body
            }
            Error::EmptyContent => json!({ "message": message, "type": "empty-content" }),
            Error::InvalidVote => json!({ "message": message, "type": "invalid-vote" }),
            Error::MissingPayload(_) => json!({ "message": message, "type": "missing-payload" }),
        };
        serde_json::to_vec(&body).unwrap_or_default()
    }

    /// Rebuilds the error from a non-success response
    ///
    /// Bodies that do not carry a known `type` are classified by status code,
    /// keeping the backend's `message` when there is one.
    pub fn parse(status: http::StatusCode, body: &[u8]) -> Error {
        use http::StatusCode;
        let data: serde_json::Value = serde_json::from_slice(body).unwrap_or_default();
        let message = data
            .get("message")
            .and_then(|m| m.as_str())
            .map(String::from)
            .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned());
        let post_id = data.get("post_id").and_then(|i| i.as_i64()).map(PostId);
        let comment_id = data
            .get("comment_id")
            .and_then(|i| i.as_i64())
            .map(CommentId);
        let target = post_id
            .map(Target::Post)
            .or_else(|| comment_id.map(Target::Comment));
        let typed = match data.get("type").and_then(|t| t.as_str()) {
            Some("unauthorized") => Some(Error::Unauthorized),
            Some("permission-denied") => Some(Error::PermissionDenied),
            Some("post-not-found") => post_id.map(Error::PostNotFound),
            Some("comment-not-found") => comment_id.map(Error::CommentNotFound),
            Some("parent-not-in-post") => comment_id.map(Error::ParentNotInPost),
            Some("vote-not-found") => target.map(Error::VoteNotFound),
            Some("conflict-vote") => target.map(Error::VoteAlreadyExists),
            Some("empty-content") => Some(Error::EmptyContent),
            Some("invalid-vote") => Some(Error::InvalidVote),
            _ => None,
        };
        typed.unwrap_or(match status {
            StatusCode::UNAUTHORIZED => Error::Unauthorized,
            StatusCode::FORBIDDEN => Error::PermissionDenied,
            _ => Error::Unknown(message),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_errors_survive_the_wire() {
        for err in [
            Error::Unauthorized,
            Error::PermissionDenied,
            Error::PostNotFound(PostId(3)),
            Error::CommentNotFound(CommentId(4)),
            Error::ParentNotInPost(CommentId(5)),
            Error::VoteNotFound(Target::Comment(CommentId(6))),
            Error::VoteAlreadyExists(Target::Post(PostId(7))),
            Error::EmptyContent,
            Error::InvalidVote,
        ] {
            assert_eq!(Error::parse(err.status_code(), &err.contents()), err);
        }
    }

    #[test]
    fn untyped_bodies_fall_back_to_status() {
        assert_eq!(
            Error::parse(http::StatusCode::FORBIDDEN, br#"{"message": "nope"}"#),
            Error::PermissionDenied
        );
        assert_eq!(
            Error::parse(http::StatusCode::BAD_REQUEST, br#"{"message": "Invalid tags"}"#),
            Error::Unknown(String::from("Invalid tags"))
        );
        assert_eq!(
            Error::parse(http::StatusCode::BAD_GATEWAY, b"upstream down"),
            Error::Unknown(String::from("upstream down"))
        );
    }
}
