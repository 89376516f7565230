use reqwest::Method;

use crate::{
    api::{self, AuthToken, CommentEdit, CommentId, NewComment, NewPost, PostId, Reply, VoteRequest},
    Error, Gateway, VoteOp,
};

/// Talks to the REST backend at `host`
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: reqwest::Client,
    host: String,
    token: AuthToken,
}

impl HttpGateway {
    pub fn new(host: impl Into<String>, token: AuthToken) -> HttpGateway {
        HttpGateway::with_client(reqwest::Client::new(), host, token)
    }

    pub fn with_client(client: reqwest::Client, host: impl Into<String>, token: AuthToken) -> HttpGateway {
        let host = host.into().trim_end_matches('/').to_string();
        HttpGateway {
            client,
            host,
            token,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.host, path))
            .bearer_auth(&self.token.0)
    }

    async fn send(&self, req: reqwest::RequestBuilder, doing: &'static str) -> Result<Reply, Error> {
        let resp = req.send().await.map_err(|e| Error::network(e, doing))?;
        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| Error::network(e, doing))?;
        if !status.is_success() {
            let err = api::Error::parse(status, &body);
            tracing::debug!(?status, ?err, "{doing} was rejected");
            return Err(err.into());
        }
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Reply::default());
        }
        serde_json::from_slice(&body).map_err(|e| {
            tracing::debug!(?status, ?e, "{doing} got an unreadable reply");
            Error::Rejected(api::Error::Unknown(format!("unreadable reply: {e}")))
        })
    }
}

fn vote_method(op: VoteOp) -> Method {
    match op {
        VoteOp::Create => Method::POST,
        VoteOp::Update => Method::PUT,
        VoteOp::Delete => Method::DELETE,
    }
}

#[async_trait::async_trait]
impl Gateway for HttpGateway {
    async fn fetch_posts(&self) -> Result<Reply, Error> {
        self.send(self.request(Method::GET, "posts"), "fetching posts")
            .await
    }

    async fn create_post(&self, post: &NewPost) -> Result<Reply, Error> {
        self.send(
            self.request(Method::POST, "posts").json(post),
            "creating post",
        )
        .await
    }

    async fn edit_post(&self, id: PostId, post: &NewPost) -> Result<Reply, Error> {
        self.send(
            self.request(Method::PUT, &format!("posts/{id}")).json(post),
            "editing post",
        )
        .await
    }

    async fn delete_post(&self, id: PostId) -> Result<Reply, Error> {
        self.send(
            self.request(Method::DELETE, &format!("posts/{id}")),
            "deleting post",
        )
        .await
    }

    async fn fetch_comments(&self, post: PostId) -> Result<Reply, Error> {
        self.send(
            self.request(Method::GET, "comments")
                .query(&[("post_id", post.0)]),
            "fetching comments",
        )
        .await
    }

    async fn create_comment(&self, comment: &NewComment) -> Result<Reply, Error> {
        self.send(
            self.request(Method::POST, "comments").json(comment),
            "creating comment",
        )
        .await
    }

    async fn edit_comment(&self, id: CommentId, edit: &CommentEdit) -> Result<Reply, Error> {
        self.send(
            self.request(Method::PUT, &format!("comments/{id}"))
                .json(edit),
            "editing comment",
        )
        .await
    }

    async fn delete_comment(&self, id: CommentId) -> Result<Reply, Error> {
        self.send(
            self.request(Method::DELETE, &format!("comments/{id}")),
            "deleting comment",
        )
        .await
    }

    async fn fetch_votes(&self) -> Result<Reply, Error> {
        self.send(self.request(Method::GET, "votes"), "fetching votes")
            .await
    }

    async fn submit_vote(&self, op: VoteOp, vote: &VoteRequest) -> Result<Reply, Error> {
        self.send(
            self.request(vote_method(op), "votes").json(vote),
            "submitting vote",
        )
        .await
    }
}
