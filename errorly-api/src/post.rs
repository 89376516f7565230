use std::fmt;

use serde::Deserialize;

use crate::{Error, Time, UserId};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct PostId(pub i64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for PostId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<PostId, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(PostId)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Post {
    pub id: PostId,
    pub user_id: UserId,
    pub title: String,
    pub content: String,
    pub score: i64,
    pub created_at: Time,
    pub last_updated: Time,

    /// The backend may send this as missing or null, both of which mean no tags
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
}

impl Post {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

fn null_as_empty<'de, D>(de: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(de)?.unwrap_or_default())
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PostContent {
    pub title: String,
    pub content: String,
}

/// Body of both post creation and post edition
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewPost {
    pub post: PostContent,
    pub tags: Vec<String>,
}

impl NewPost {
    pub fn new(title: String, content: String, tags: Vec<String>) -> NewPost {
        NewPost {
            post: PostContent { title, content },
            tags,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_content(&self.post.title)
    }
}
