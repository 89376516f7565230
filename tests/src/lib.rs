use std::sync::Arc;

use errorly_client::{api::UserId, Session};
use errorly_mock_server::{MockGateway, MockServer, Shared};
use tokio::sync::Mutex;

pub fn init_tracing() {
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }
}

/// Fresh, empty backend
pub fn board() -> Shared {
    init_tracing();
    Arc::new(Mutex::new(MockServer::new()))
}

/// Registers a user on `board` and returns a gateway authenticated as them
pub async fn user(board: &Shared) -> (UserId, MockGateway) {
    let (id, tok) = board.lock().await.create_user();
    (id, MockGateway::new(board.clone(), tok))
}

/// Session of a new user, with everything already loaded
pub async fn session(board: &Shared) -> Session<MockGateway> {
    let (_, gateway) = user(board).await;
    let mut s = Session::new(gateway);
    s.load().await.expect("loading a fresh session");
    s
}

pub fn tags(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|t| t.to_string()).collect()
}
