use std::{cmp::Reverse, fmt, str::FromStr, sync::Arc};

use crate::api::Post;

#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    /// Most recently created first
    #[default]
    Newest,
    Oldest,
    /// Highest score first
    Popular,
    Unpopular,
}

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown order {0:?}, expected one of newest, oldest, popular, unpopular")]
pub struct UnknownOrder(pub String);

impl Order {
    pub const ALL: [Order; 4] = [Order::Newest, Order::Oldest, Order::Popular, Order::Unpopular];

    /// Stable: posts that compare equal keep their relative order
    pub fn sort(&self, posts: &mut [Arc<Post>]) {
        match self {
            Order::Newest => posts.sort_by_key(|p| Reverse(p.created_at)),
            Order::Oldest => posts.sort_by_key(|p| p.created_at),
            Order::Popular => posts.sort_by_key(|p| Reverse(p.score)),
            Order::Unpopular => posts.sort_by_key(|p| p.score),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Order::Newest => "newest",
            Order::Oldest => "oldest",
            Order::Popular => "popular",
            Order::Unpopular => "unpopular",
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Order {
    type Err = UnknownOrder;

    fn from_str(s: &str) -> Result<Order, UnknownOrder> {
        Order::ALL
            .into_iter()
            .find(|o| o.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownOrder(s.to_string()))
    }
}
