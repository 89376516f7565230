use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query, State},
    http::{self, request},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use errorly_client::api::{
    AuthToken, CommentEdit, CommentId, Error, NewComment, NewPost, PostId, Reply, VoteRequest,
};
use tokio::sync::Mutex;

use crate::MockServer;

pub type Shared = Arc<Mutex<MockServer>>;

pub struct HttpError(Error);

impl From<Error> for HttpError {
    fn from(e: Error) -> HttpError {
        HttpError(e)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        tracing::info!("returning error to client: {}", self.0);
        (
            self.0.status_code(),
            [(http::header::CONTENT_TYPE, "application/json")],
            self.0.contents(),
        )
            .into_response()
    }
}

/// Bearer token of the request
struct Auth(AuthToken);

#[async_trait]
impl<S: Sync> FromRequestParts<S> for Auth {
    type Rejection = HttpError;

    async fn from_request_parts(req: &mut request::Parts, _state: &S) -> Result<Auth, HttpError> {
        let header = req
            .headers
            .get(http::header::AUTHORIZATION)
            .ok_or(Error::Unauthorized)?;
        let header = header.to_str().map_err(|_| Error::Unauthorized)?;
        let mut parts = header.split(' ');
        let scheme = parts.next().ok_or(Error::Unauthorized)?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(Error::Unauthorized.into());
        }
        let token = parts.next().ok_or(Error::Unauthorized)?;
        if parts.next().is_some() {
            return Err(Error::Unauthorized.into());
        }
        Ok(Auth(AuthToken(token.to_string())))
    }
}

#[derive(serde::Deserialize)]
struct CommentsQuery {
    post_id: PostId,
}

type Answer = Result<Json<Reply>, HttpError>;

async fn fetch_posts(Auth(tok): Auth, State(s): State<Shared>) -> Answer {
    let posts = s.lock().await.fetch_posts(&tok)?;
    Ok(Json(Reply {
        posts: Some(posts),
        ..Reply::default()
    }))
}

async fn create_post(Auth(tok): Auth, State(s): State<Shared>, Json(p): Json<NewPost>) -> Answer {
    let post = s.lock().await.create_post(&tok, p)?;
    Ok(Json(Reply {
        post: Some(post),
        ..Reply::message("Post created")
    }))
}

async fn edit_post(
    Auth(tok): Auth,
    State(s): State<Shared>,
    Path(id): Path<PostId>,
    Json(p): Json<NewPost>,
) -> Answer {
    let post = s.lock().await.edit_post(&tok, id, p)?;
    Ok(Json(Reply {
        post: Some(post),
        ..Reply::message("Post updated")
    }))
}

async fn delete_post(Auth(tok): Auth, State(s): State<Shared>, Path(id): Path<PostId>) -> Answer {
    s.lock().await.delete_post(&tok, id)?;
    Ok(Json(Reply::message("Post deleted")))
}

async fn fetch_comments(
    Auth(tok): Auth,
    State(s): State<Shared>,
    Query(q): Query<CommentsQuery>,
) -> Answer {
    let comments = s.lock().await.fetch_comments(&tok, q.post_id)?;
    Ok(Json(Reply {
        comments: Some(comments),
        ..Reply::default()
    }))
}

async fn create_comment(
    Auth(tok): Auth,
    State(s): State<Shared>,
    Json(c): Json<NewComment>,
) -> Answer {
    let comment = s.lock().await.create_comment(&tok, c)?;
    Ok(Json(Reply {
        comment: Some(comment),
        ..Reply::message("Comment created")
    }))
}

async fn edit_comment(
    Auth(tok): Auth,
    State(s): State<Shared>,
    Path(id): Path<CommentId>,
    Json(e): Json<CommentEdit>,
) -> Answer {
    let comment = s.lock().await.edit_comment(&tok, id, e)?;
    Ok(Json(Reply {
        comment: Some(comment),
        ..Reply::message("Comment updated")
    }))
}

async fn delete_comment(
    Auth(tok): Auth,
    State(s): State<Shared>,
    Path(id): Path<CommentId>,
) -> Answer {
    s.lock().await.delete_comment(&tok, id)?;
    Ok(Json(Reply::message("Comment deleted")))
}

async fn fetch_votes(Auth(tok): Auth, State(s): State<Shared>) -> Answer {
    let votes = s.lock().await.fetch_votes(&tok)?;
    Ok(Json(Reply {
        votes: Some(votes),
        ..Reply::default()
    }))
}

async fn create_vote(Auth(tok): Auth, State(s): State<Shared>, Json(v): Json<VoteRequest>) -> Answer {
    Ok(Json(s.lock().await.create_vote(&tok, v)?))
}

async fn update_vote(Auth(tok): Auth, State(s): State<Shared>, Json(v): Json<VoteRequest>) -> Answer {
    Ok(Json(s.lock().await.update_vote(&tok, v)?))
}

async fn delete_vote(Auth(tok): Auth, State(s): State<Shared>, Json(v): Json<VoteRequest>) -> Answer {
    Ok(Json(s.lock().await.delete_vote(&tok, v)?))
}

/// REST routes over a shared `MockServer`
pub fn router(server: Shared) -> Router {
    Router::new()
        .route("/posts", get(fetch_posts).post(create_post))
        .route("/posts/:id", axum::routing::put(edit_post).delete(delete_post))
        .route("/comments", get(fetch_comments).post(create_comment))
        .route(
            "/comments/:id",
            axum::routing::put(edit_comment).delete(delete_comment),
        )
        .route(
            "/votes",
            get(fetch_votes)
                .post(create_vote)
                .put(update_vote)
                .delete(delete_vote),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(server)
}

/// Serves `server` on an ephemeral local port, returning its base url
pub async fn spawn_http(server: Shared) -> anyhow::Result<String> {
    let listener = std::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .context("binding mock backend listener")?;
    listener
        .set_nonblocking(true)
        .context("setting mock backend listener non-blocking")?;
    let addr = listener
        .local_addr()
        .context("retrieving mock backend address")?;
    let serve = axum::Server::from_tcp(listener)
        .context("building mock backend server")?
        .serve(router(server).into_make_service());
    tokio::spawn(async move {
        if let Err(err) = serve.await {
            tracing::error!(?err, "mock backend stopped");
        }
    });
    tracing::info!(%addr, "mock backend listening");
    Ok(format!("http://{addr}"))
}
