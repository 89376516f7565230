use errorly_client::{
    api::{self, CommentId, PostId, Target},
    walk, Direction, Error, Order, Pane, Precondition, Session, VoteOp, VoteState,
};
use errorly_mock_server::MockGateway;
use tests::{board, session, tags, user};

fn thread(s: &Session<MockGateway>) -> Vec<(usize, i64)> {
    walk(&s.thread())
        .map(|n| (n.depth, n.comment.id.0))
        .collect()
}

fn visible(s: &Session<MockGateway>) -> Vec<PostId> {
    s.visible_posts().iter().map(|p| p.id).collect()
}

#[tokio::test]
async fn tag_universe_is_refreshed_on_reload_only() {
    let b = board();
    let mut s = session(&b).await;
    let p1 = s
        .create_post("Segfault in parser", "on EOF", tags(&["rust", "async"]))
        .await
        .unwrap();
    let p2 = s
        .create_post("Leak", "in the wasm build", tags(&["rust", "wasm"]))
        .await
        .unwrap();

    let local = s.store().posts().iter().map(|p| p.id).collect::<Vec<_>>();
    assert_eq!(local, vec![p2, p1]);
    assert!(s.view().all_tags.is_empty());

    s.load().await.unwrap();
    assert_eq!(s.view().all_tags, tags(&["rust", "async", "wasm"]));
    assert_eq!(visible(&s), vec![p2, p1]);
}

#[tokio::test]
async fn votes_are_seeded_on_load() {
    let b = board();
    let (_, gw) = user(&b).await;
    let mut first = Session::new(gw.clone());
    first.load().await.unwrap();
    let p = first.create_post("title", "content", vec![]).await.unwrap();
    let out = first
        .cast_vote(Target::Post(p), Direction::Positive)
        .await
        .unwrap();
    assert_eq!((out.op, out.score), (VoteOp::Create, 1));

    let mut second = Session::new(gw);
    second.load().await.unwrap();
    assert_eq!(second.store().vote(Target::Post(p)), VoteState::Positive);
    let out = second
        .cast_vote(Target::Post(p), Direction::Positive)
        .await
        .unwrap();
    assert_eq!(
        (out.op, out.state, out.score),
        (VoteOp::Delete, VoteState::Absent, 0)
    );
    assert_eq!(second.store().post(p).unwrap().score, 0);
}

#[tokio::test]
async fn vote_sequence_takes_the_backend_score() {
    let b = board();
    let mut alice = session(&b).await;
    let mut bob = session(&b).await;
    let p = alice.create_post("title", "content", vec![]).await.unwrap();
    bob.load().await.unwrap();
    bob.cast_vote(Target::Post(p), Direction::Positive)
        .await
        .unwrap();

    let t = Target::Post(p);
    let steps = [
        (Direction::Positive, VoteOp::Create, VoteState::Positive, 2),
        (Direction::Positive, VoteOp::Delete, VoteState::Absent, 1),
        (Direction::Negative, VoteOp::Create, VoteState::Negative, 0),
        (Direction::Positive, VoteOp::Update, VoteState::Positive, 2),
    ];
    for (dir, op, state, score) in steps {
        let out = alice.cast_vote(t, dir).await.unwrap();
        assert_eq!((out.op, out.state, out.score), (op, state, score));
        assert_eq!(alice.store().vote(t), state);
        assert_eq!(alice.store().post(p).unwrap().score, score);
    }
}

#[tokio::test]
async fn comments_nest_and_survive_parent_deletion() {
    let b = board();
    let mut s = session(&b).await;
    let p = s.create_post("title", "content", vec![]).await.unwrap();
    s.open_post(p).await.unwrap();
    let c1 = s.create_comment("first").await.unwrap();
    let c2 = s.reply(c1, "second").await.unwrap();
    let c3 = s.reply(c2, "third").await.unwrap();
    let c4 = s.create_comment("fourth").await.unwrap();
    let expected = vec![(0, c1.0), (1, c2.0), (2, c3.0), (0, c4.0)];
    assert_eq!(thread(&s), expected);

    s.open_post(p).await.unwrap();
    assert_eq!(thread(&s), expected);

    s.view_mut().start_edit_comment(c1);
    s.delete_comment(c1).await.unwrap();
    assert_eq!(s.view().editing_comment, None);
    assert_eq!(thread(&s), vec![(0, c2.0), (1, c3.0), (0, c4.0)]);

    s.open_post(p).await.unwrap();
    assert_eq!(thread(&s), vec![(0, c2.0), (1, c3.0), (0, c4.0)]);
}

#[tokio::test]
async fn replies_go_to_the_parent_post() {
    let b = board();
    let mut s = session(&b).await;
    let p1 = s.create_post("one", "content", vec![]).await.unwrap();
    let p2 = s.create_post("two", "content", vec![]).await.unwrap();
    s.open_post(p1).await.unwrap();
    let c1 = s.create_comment("on one").await.unwrap();
    s.open_post(p2).await.unwrap();

    let r = s.reply(c1, "still on one").await.unwrap();
    assert_eq!(s.store().comment(r).unwrap().post_id, Some(p1));
    assert!(thread(&s).is_empty());
    s.open_post(p1).await.unwrap();
    assert_eq!(thread(&s), vec![(0, c1.0), (1, r.0)]);
}

#[tokio::test]
async fn preconditions_are_checked_locally() {
    let b = board();
    let mut s = session(&b).await;

    let err = s.create_comment("hi").await.unwrap_err();
    assert!(matches!(err, Error::Precondition(Precondition::NoOpenPost)));
    assert!(s.view().last_error.is_some());

    let err = s.create_post("  ", "content", vec![]).await.unwrap_err();
    assert!(matches!(err, Error::Precondition(Precondition::EmptyTitle)));

    let p = s.create_post("title", "content", vec![]).await.unwrap();
    assert_eq!(s.view().last_error, None);
    s.open_post(p).await.unwrap();

    let err = s.create_comment(" \n ").await.unwrap_err();
    assert!(matches!(err, Error::Precondition(Precondition::EmptyComment)));
    let err = s.reply(CommentId(999), "hi").await.unwrap_err();
    assert!(matches!(
        err,
        Error::Precondition(Precondition::UnknownComment(CommentId(999)))
    ));
    let err = s
        .cast_vote(Target::Post(PostId(999)), Direction::Positive)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Precondition(Precondition::UnknownPost(PostId(999)))
    ));
    let err = s.edit_post(PostId(999), "t", "c", vec![]).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Precondition(Precondition::UnknownPost(PostId(999)))
    ));

    assert_eq!(b.lock().await.test_num_posts(), 1);
    assert_eq!(b.lock().await.test_num_comments(), 0);
}

#[tokio::test]
async fn deleting_the_open_post_closes_it() {
    let b = board();
    let mut s = session(&b).await;
    let p = s.create_post("title", "content", vec![]).await.unwrap();
    s.open_post(p).await.unwrap();
    s.create_comment("hi").await.unwrap();
    s.view_mut().start_edit_post(p);

    s.delete_post(p).await.unwrap();
    assert_eq!(s.view().open_post, None);
    assert_eq!(s.view().editing_post, None);
    assert!(s.store().post(p).is_none());
    assert!(s.store().comments().is_empty());
    assert!(s.thread().is_empty());
}

#[tokio::test]
async fn failed_deletions_reload() {
    let b = board();
    let mut alice = session(&b).await;
    let mut bob = session(&b).await;
    let p = alice.create_post("old", "content", vec![]).await.unwrap();
    alice.open_post(p).await.unwrap();
    let c = alice.create_comment("old comment").await.unwrap();
    bob.load().await.unwrap();
    bob.open_post(p).await.unwrap();

    alice
        .edit_post(p, "new", "content", tags(&["rust"]))
        .await
        .unwrap();
    alice.edit_comment(c, "new comment").await.unwrap();

    let err = bob.delete_post(p).await.unwrap_err();
    assert!(matches!(err, Error::Rejected(api::Error::PermissionDenied)));
    assert_eq!(bob.store().post(p).unwrap().title, "new");
    assert!(bob.view().last_error.is_some());

    let err = bob.delete_comment(c).await.unwrap_err();
    assert!(matches!(err, Error::Rejected(api::Error::PermissionDenied)));
    assert_eq!(bob.store().comment(c).unwrap().content, "new comment");
}

#[tokio::test]
async fn network_failures_change_nothing() {
    let b = board();
    let (_, gw) = user(&b).await;
    let mut s = Session::new(gw.clone());
    s.load().await.unwrap();
    let p = s.create_post("title", "content", vec![]).await.unwrap();
    s.open_post(p).await.unwrap();
    let c = s.create_comment("hi").await.unwrap();
    let before = s.store().clone();

    gw.set_offline(true);
    let err = s
        .cast_vote(Target::Comment(c), Direction::Negative)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Network(_)));
    assert!(matches!(
        s.edit_post(p, "other", "content", vec![]).await,
        Err(Error::Network(_))
    ));
    assert!(matches!(s.delete_post(p).await, Err(Error::Network(_))));
    assert!(matches!(s.delete_comment(c).await, Err(Error::Network(_))));
    assert!(matches!(s.load().await, Err(Error::Network(_))));
    assert_eq!(s.store(), &before);
    assert_eq!(s.view().open_post, Some(p));
    assert!(s.view().last_error.is_some());

    gw.set_offline(false);
    let out = s
        .cast_vote(Target::Comment(c), Direction::Negative)
        .await
        .unwrap();
    assert_eq!((out.op, out.score), (VoteOp::Create, -1));
    assert_eq!(s.view().last_error, None);
}

#[tokio::test]
async fn edits_keep_scores() {
    let b = board();
    let mut s = session(&b).await;
    let p = s.create_post("title", "content", vec![]).await.unwrap();
    s.cast_vote(Target::Post(p), Direction::Positive)
        .await
        .unwrap();
    s.view_mut().toggle_post_menu(p);
    s.view_mut().start_edit_post(p);

    s.edit_post(p, "  better title ", "more content", tags(&["a", "b"]))
        .await
        .unwrap();
    let post = s.store().post(p).unwrap();
    assert_eq!(post.title, "better title");
    assert_eq!(post.tags, tags(&["a", "b"]));
    assert_eq!(post.score, 1);
    assert_eq!(s.view().editing_post, None);
    assert_eq!(s.view().post_menu, None);

    s.open_post(p).await.unwrap();
    let c = s.create_comment("typo").await.unwrap();
    s.view_mut().start_edit_comment(c);
    let err = s.edit_comment(c, "   ").await.unwrap_err();
    assert!(matches!(err, Error::Precondition(Precondition::EmptyComment)));
    assert_eq!(s.view().editing_comment, Some(c));
    s.edit_comment(c, " fixed ").await.unwrap();
    assert_eq!(s.store().comment(c).unwrap().content, "fixed");
    assert_eq!(s.view().editing_comment, None);
}

#[tokio::test]
async fn filters_and_orders_apply_to_the_list() {
    let b = board();
    let mut s = session(&b).await;
    let p1 = s
        .create_post("Segfault in parser", "on EOF", tags(&["rust"]))
        .await
        .unwrap();
    let p2 = s
        .create_post("Leak", "the PARSER leaks", tags(&["rust", "wasm"]))
        .await
        .unwrap();
    let p3 = s
        .create_post("UI glitch", "buttons overlap", tags(&["css"]))
        .await
        .unwrap();
    s.cast_vote(Target::Post(p1), Direction::Positive)
        .await
        .unwrap();
    s.cast_vote(Target::Post(p3), Direction::Negative)
        .await
        .unwrap();
    s.load().await.unwrap();

    assert_eq!(visible(&s), vec![p3, p2, p1]);
    s.view_mut().set_order(Order::Popular);
    assert_eq!(visible(&s), vec![p1, p2, p3]);
    s.view_mut().set_order(Order::Unpopular);
    assert_eq!(visible(&s), vec![p3, p2, p1]);

    s.view_mut().set_order(Order::Oldest);
    s.view_mut().set_search("parser");
    assert_eq!(visible(&s), vec![p1, p2]);
    s.view_mut().toggle_tag("wasm");
    assert_eq!(visible(&s), vec![p2]);
    s.view_mut().toggle_tag("wasm");
    assert_eq!(visible(&s), vec![p1, p2]);

    s.view_mut().set_search("");
    s.view_mut().show_pane(Pane::Tags);
    s.view_mut().browse_tag("css");
    assert_eq!(s.view().pane, Pane::Posts);
    assert_eq!(visible(&s), vec![p3]);
}

#[test]
fn any_vote_sequence_ends_in_the_backend_state() {
    bolero::check!()
        .with_type::<Vec<(bool, bool)>>()
        .cloned()
        .for_each(|casts| {
            let rt = tokio::runtime::Builder::new_current_thread()
                .build()
                .expect("building runtime");
            rt.block_on(async {
                let b = board();
                let mut s = session(&b).await;
                let p = s.create_post("title", "content", vec![]).await.unwrap();
                s.open_post(p).await.unwrap();
                let c = s.create_comment("hi").await.unwrap();
                for (on_comment, positive) in casts {
                    let t = match on_comment {
                        true => Target::Comment(c),
                        false => Target::Post(p),
                    };
                    s.cast_vote(t, Direction::from_positive(positive))
                        .await
                        .unwrap();
                }

                let mut fresh = Session::new(s.gateway().clone());
                fresh.load().await.unwrap();
                fresh.open_post(p).await.unwrap();
                for t in [Target::Post(p), Target::Comment(c)] {
                    assert_eq!(s.store().vote(t), fresh.store().vote(t));
                }
                assert_eq!(
                    s.store().post(p).unwrap().score,
                    fresh.store().post(p).unwrap().score
                );
                assert_eq!(
                    s.store().comment(c).unwrap().score,
                    fresh.store().comment(c).unwrap().score
                );
            });
        });
}
