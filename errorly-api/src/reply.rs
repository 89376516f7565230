use crate::{Comment, Error, Post, Target, Vote};

/// Envelope of every backend response
///
/// Each endpoint fills in at most a couple of these fields. A successful
/// response that lacks the field the caller expects is treated as a
/// failure, see the `into_*` helpers.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Reply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Post>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posts: Option<Vec<Post>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<Comment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote: Option<Vote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub votes: Option<Vec<Vote>>,
}

impl Reply {
    pub fn message(msg: impl Into<String>) -> Reply {
        Reply {
            message: Some(msg.into()),
            ..Reply::default()
        }
    }

    pub fn into_post(self) -> Result<Post, Error> {
        self.post.ok_or(Error::MissingPayload("post"))
    }

    pub fn into_posts(self) -> Result<Vec<Post>, Error> {
        self.posts.ok_or(Error::MissingPayload("posts"))
    }

    pub fn into_comment(self) -> Result<Comment, Error> {
        self.comment.ok_or(Error::MissingPayload("comment"))
    }

    pub fn into_comments(self) -> Result<Vec<Comment>, Error> {
        self.comments.ok_or(Error::MissingPayload("comments"))
    }

    pub fn into_votes(self) -> Result<Vec<Vote>, Error> {
        self.votes.ok_or(Error::MissingPayload("votes"))
    }

    /// Canonical score of `target` as carried by a vote response
    pub fn score_of(&self, target: Target) -> Result<i64, Error> {
        match target {
            Target::Post(id) => match &self.post {
                Some(p) if p.id == id => Ok(p.score),
                _ => Err(Error::MissingPayload("post")),
            },
            Target::Comment(id) => match &self.comment {
                Some(c) if c.id == id => Ok(c.score),
                _ => Err(Error::MissingPayload("comment")),
            },
        }
    }
}
