use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use errorly_client::{
    api::{
        AuthToken, CommentEdit, CommentId, Error as ApiError, NewComment, NewPost, PostId, Reply,
        VoteRequest,
    },
    Error, Gateway, VoteOp,
};

use crate::{MockServer, Shared};

/// Calls straight into a `MockServer`, without any HTTP in between
#[derive(Clone)]
pub struct MockGateway {
    server: Shared,
    token: AuthToken,
    offline: Arc<AtomicBool>,
}

impl MockGateway {
    pub fn new(server: Shared, token: AuthToken) -> MockGateway {
        MockGateway {
            server,
            token,
            offline: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn server(&self) -> &Shared {
        &self.server
    }

    /// While offline, every call fails as if the backend could not be reached
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    async fn call(
        &self,
        doing: &'static str,
        f: impl FnOnce(&mut MockServer, &AuthToken) -> Result<Reply, ApiError>,
    ) -> Result<Reply, Error> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::network(
                anyhow::anyhow!("mock backend is offline"),
                doing,
            ));
        }
        let mut server = self.server.lock().await;
        Ok(f(&mut *server, &self.token)?)
    }
}

#[async_trait::async_trait]
impl Gateway for MockGateway {
    async fn fetch_posts(&self) -> Result<Reply, Error> {
        self.call("fetching posts", |s, tok| {
            Ok(Reply {
                posts: Some(s.fetch_posts(tok)?),
                ..Reply::default()
            })
        })
        .await
    }

    async fn create_post(&self, post: &NewPost) -> Result<Reply, Error> {
        self.call("creating post", |s, tok| {
            Ok(Reply {
                post: Some(s.create_post(tok, post.clone())?),
                ..Reply::message("Post created")
            })
        })
        .await
    }

    async fn edit_post(&self, id: PostId, post: &NewPost) -> Result<Reply, Error> {
        self.call("editing post", |s, tok| {
            Ok(Reply {
                post: Some(s.edit_post(tok, id, post.clone())?),
                ..Reply::message("Post updated")
            })
        })
        .await
    }

    async fn delete_post(&self, id: PostId) -> Result<Reply, Error> {
        self.call("deleting post", |s, tok| {
            s.delete_post(tok, id)?;
            Ok(Reply::message("Post deleted"))
        })
        .await
    }

    async fn fetch_comments(&self, post: PostId) -> Result<Reply, Error> {
        self.call("fetching comments", |s, tok| {
            Ok(Reply {
                comments: Some(s.fetch_comments(tok, post)?),
                ..Reply::default()
            })
        })
        .await
    }

    async fn create_comment(&self, comment: &NewComment) -> Result<Reply, Error> {
        self.call("creating comment", |s, tok| {
            Ok(Reply {
                comment: Some(s.create_comment(tok, comment.clone())?),
                ..Reply::message("Comment created")
            })
        })
        .await
    }

    async fn edit_comment(&self, id: CommentId, edit: &CommentEdit) -> Result<Reply, Error> {
        self.call("editing comment", |s, tok| {
            Ok(Reply {
                comment: Some(s.edit_comment(tok, id, edit.clone())?),
                ..Reply::message("Comment updated")
            })
        })
        .await
    }

    async fn delete_comment(&self, id: CommentId) -> Result<Reply, Error> {
        self.call("deleting comment", |s, tok| {
            s.delete_comment(tok, id)?;
            Ok(Reply::message("Comment deleted"))
        })
        .await
    }

    async fn fetch_votes(&self) -> Result<Reply, Error> {
        self.call("fetching votes", |s, tok| {
            Ok(Reply {
                votes: Some(s.fetch_votes(tok)?),
                ..Reply::default()
            })
        })
        .await
    }

    async fn submit_vote(&self, op: VoteOp, vote: &VoteRequest) -> Result<Reply, Error> {
        self.call("submitting vote", |s, tok| match op {
            VoteOp::Create => s.create_vote(tok, vote.clone()),
            VoteOp::Update => s.update_vote(tok, vote.clone()),
            VoteOp::Delete => s.delete_vote(tok, vote.clone()),
        })
        .await
    }
}
