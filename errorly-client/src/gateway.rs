use crate::{
    api::{CommentEdit, CommentId, NewComment, NewPost, PostId, Reply, VoteRequest},
    Error, VoteOp,
};

/// The backend, as seen by a session
///
/// Every call answers with the response envelope as sent by the backend.
/// Extracting the expected payload out of it is up to the caller.
#[async_trait::async_trait]
pub trait Gateway {
    async fn fetch_posts(&self) -> Result<Reply, Error>;
    async fn create_post(&self, post: &NewPost) -> Result<Reply, Error>;
    async fn edit_post(&self, id: PostId, post: &NewPost) -> Result<Reply, Error>;
    async fn delete_post(&self, id: PostId) -> Result<Reply, Error>;

    async fn fetch_comments(&self, post: PostId) -> Result<Reply, Error>;
    async fn create_comment(&self, comment: &NewComment) -> Result<Reply, Error>;
    async fn edit_comment(&self, id: CommentId, edit: &CommentEdit) -> Result<Reply, Error>;
    async fn delete_comment(&self, id: CommentId) -> Result<Reply, Error>;

    /// Votes of the current user
    async fn fetch_votes(&self) -> Result<Reply, Error>;
    async fn submit_vote(&self, op: VoteOp, vote: &VoteRequest) -> Result<Reply, Error>;
}
