use errorly_client::{
    api::{self, AuthToken, PostId, Target},
    walk, Direction, Error, Gateway, HttpGateway, Session, VoteOp, VoteState,
};
use errorly_mock_server::spawn_http;
use tests::{board, tags};

async fn http_user(b: &errorly_mock_server::Shared, host: &str) -> HttpGateway {
    let (_, tok) = b.lock().await.create_user();
    HttpGateway::new(host, tok)
}

#[tokio::test]
async fn full_session_over_http() {
    let b = board();
    let host = spawn_http(b.clone()).await.unwrap();
    let mut s = Session::new(http_user(&b, &host).await);
    s.load().await.unwrap();

    let p = s
        .create_post("Segfault", "in main", tags(&["rust", "ffi"]))
        .await
        .unwrap();
    s.edit_post(p, "Segfault in main", "on startup", tags(&["rust"]))
        .await
        .unwrap();
    s.open_post(p).await.unwrap();
    let c1 = s.create_comment("same here").await.unwrap();
    let c2 = s.reply(c1, "fixed by upgrading").await.unwrap();
    s.edit_comment(c2, "fixed by upgrading libc").await.unwrap();

    let t = Target::Comment(c2);
    let out = s.cast_vote(t, Direction::Negative).await.unwrap();
    assert_eq!((out.op, out.score), (VoteOp::Create, -1));
    let out = s.cast_vote(t, Direction::Positive).await.unwrap();
    assert_eq!((out.op, out.score), (VoteOp::Update, 1));
    let out = s.cast_vote(t, Direction::Positive).await.unwrap();
    assert_eq!((out.op, out.state, out.score), (VoteOp::Delete, VoteState::Absent, 0));

    s.load().await.unwrap();
    s.open_post(p).await.unwrap();
    assert_eq!(s.view().all_tags, tags(&["rust"]));
    assert_eq!(s.store().post(p).unwrap().title, "Segfault in main");
    let shape = walk(&s.thread())
        .map(|n| (n.depth, n.comment.id, n.comment.content.clone()))
        .collect::<Vec<_>>();
    assert_eq!(
        shape,
        vec![
            (0, c1, String::from("same here")),
            (1, c2, String::from("fixed by upgrading libc")),
        ]
    );

    s.delete_comment(c1).await.unwrap();
    s.delete_post(p).await.unwrap();
    assert!(s.store().posts().is_empty());
    assert_eq!(b.lock().await.test_num_comments(), 0);
}

#[tokio::test]
async fn backend_errors_come_back_typed() {
    let b = board();
    let host = spawn_http(b.clone()).await.unwrap();
    let gw = http_user(&b, &host).await;

    let err = gw.delete_post(PostId(42)).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Rejected(api::Error::PostNotFound(PostId(42)))
    ));

    let p = gw
        .create_post(&api::NewPost::new(
            String::from("title"),
            String::from("content"),
            vec![],
        ))
        .await
        .unwrap()
        .into_post()
        .unwrap();
    let req = api::VoteRequest::new(Target::Post(p.id), Some(true));
    gw.submit_vote(VoteOp::Create, &req).await.unwrap();
    let err = gw.submit_vote(VoteOp::Create, &req).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Rejected(api::Error::VoteAlreadyExists(Target::Post(id))) if id == p.id
    ));

    let stranger = HttpGateway::new(host.as_str(), AuthToken::stub());
    let err = stranger.fetch_posts().await.unwrap_err();
    assert!(matches!(err, Error::Rejected(api::Error::Unauthorized)));
}

#[tokio::test]
async fn requests_carry_the_bearer_token() {
    let b = board();
    let host = spawn_http(b.clone()).await.unwrap();
    let client = reqwest::Client::new();

    let resp = client.get(format!("{host}/posts")).send().await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body = resp.bytes().await.unwrap();
    let json = serde_json::from_slice::<serde_json::Value>(&body).unwrap();
    assert_eq!(json["type"], "unauthorized");

    let (_, tok) = b.lock().await.create_user();
    let resp = client
        .get(format!("{host}/posts"))
        .bearer_auth(&tok.0)
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let reply = resp.json::<api::Reply>().await.unwrap();
    assert_eq!(reply.into_posts().unwrap(), vec![]);
}

#[tokio::test]
async fn vote_deletion_sends_no_direction() {
    let b = board();
    let host = spawn_http(b.clone()).await.unwrap();
    let mut s = Session::new(http_user(&b, &host).await);
    s.load().await.unwrap();
    let p = s.create_post("title", "content", vec![]).await.unwrap();
    let t = Target::Post(p);
    s.cast_vote(t, Direction::Negative).await.unwrap();

    let plan = s.store().plan_vote(t, Direction::Negative).unwrap();
    assert_eq!(plan.op, VoteOp::Delete);
    let body = serde_json::to_value(plan.request()).unwrap();
    assert_eq!(body, serde_json::json!({ "post_id": p.0 }));

    let reply = s.gateway().submit_vote(plan.op, &plan.request()).await.unwrap();
    assert_eq!(reply.score_of(t), Ok(0));
    assert_eq!(reply.vote, None);
}

#[tokio::test]
async fn unreadable_success_is_a_rejection() {
    let app = axum::Router::new().route(
        "/posts",
        axum::routing::get(|| async { "<html>down for maintenance</html>" }),
    );
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();
    let serve = axum::Server::from_tcp(listener)
        .unwrap()
        .serve(app.into_make_service());
    tokio::spawn(serve);

    let gw = HttpGateway::new(format!("http://{addr}"), AuthToken::stub());
    let err = gw.fetch_posts().await.unwrap_err();
    assert!(matches!(err, Error::Rejected(api::Error::Unknown(_))));
}
