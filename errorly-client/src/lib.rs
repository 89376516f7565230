mod comment;
pub use comment::{build_tree, walk, CommentNode, Walk};

mod db;
pub use db::{Keyed, Store, Table};

mod error;
pub use error::{Error, Precondition};

mod gateway;
pub use gateway::Gateway;

mod http;
pub use http::HttpGateway;

mod order;
pub use order::{Order, UnknownOrder};

mod search;
pub use search::{tag_universe, PostFilter};

mod session;
pub use session::Session;

mod view;
pub use view::{parse_tags, Layout, Pane, UnknownLayout, ViewState};

mod vote;
pub use vote::{Direction, VoteOp, VoteOutcome, VotePlan, VoteState};

pub mod api {
    pub use errorly_api::*;
}
