use crate::api::{self, CommentId, PostId, Target};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request could not complete
    #[error(transparent)]
    Network(anyhow::Error),

    /// The backend answered with a failure, or without the expected payload
    #[error("server rejected the request: {0}")]
    Rejected(#[from] api::Error),

    #[error(transparent)]
    Precondition(#[from] Precondition),
}

impl Error {
    pub fn network(err: impl Into<anyhow::Error>, doing: &'static str) -> Error {
        Error::Network(err.into().context(doing))
    }
}

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Precondition {
    #[error("no post is currently open")]
    NoOpenPost,

    #[error("comment must not be empty")]
    EmptyComment,

    #[error("post title must not be empty")]
    EmptyTitle,

    #[error("post {0} is not loaded")]
    UnknownPost(PostId),

    #[error("comment {0} is not loaded")]
    UnknownComment(CommentId),
}

impl Precondition {
    pub fn unknown_target(t: Target) -> Precondition {
        match t {
            Target::Post(id) => Precondition::UnknownPost(id),
            Target::Comment(id) => Precondition::UnknownComment(id),
        }
    }
}
