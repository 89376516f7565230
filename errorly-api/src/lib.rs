use chrono::Utc;

pub use uuid::{uuid, Uuid};
pub type Time = chrono::DateTime<Utc>;

pub const STUB_UUID: Uuid = uuid!("ffffffff-ffff-ffff-ffff-ffffffffffff");

mod comment;
pub use comment::{Comment, CommentEdit, CommentId, NewComment};

mod error;
pub use error::Error;

mod post;
pub use post::{NewPost, Post, PostContent, PostId};

mod reply;
pub use reply::Reply;

mod user;
pub use user::{AuthToken, UserId};

mod vote;
pub use vote::{Target, Vote, VoteId, VoteRequest};

pub fn validate_content(s: &str) -> Result<(), Error> {
    if s.trim().is_empty() {
        return Err(Error::EmptyContent);
    }
    Ok(())
}
