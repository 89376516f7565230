use std::{fmt, str::FromStr};

use crate::{
    api::{CommentId, PostId},
    Order, PostFilter,
};

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Pane {
    #[default]
    Posts,
    Tags,
    NewPost,
}

/// Width of the post list, remembered across sessions
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Small,
    Medium,
    #[default]
    Large,
}

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown layout {0:?}, expected one of small, medium, large")]
pub struct UnknownLayout(pub String);

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Layout::Small => "small",
            Layout::Medium => "medium",
            Layout::Large => "large",
        })
    }
}

impl FromStr for Layout {
    type Err = UnknownLayout;

    fn from_str(s: &str) -> Result<Layout, UnknownLayout> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(Layout::Small),
            "medium" => Ok(Layout::Medium),
            "large" => Ok(Layout::Large),
            _ => Err(UnknownLayout(s.to_string())),
        }
    }
}

/// Everything the user is currently looking at
///
/// Only ids are kept here, entities are always read back from the store.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ViewState {
    pub pane: Pane,
    pub layout: Layout,
    pub sidebar_collapsed: bool,

    pub search: String,
    pub selected_tags: Vec<String>,
    pub order: Order,

    /// Tags offered for filtering, refreshed only when all posts are reloaded
    pub all_tags: Vec<String>,

    pub open_post: Option<PostId>,
    pub editing_post: Option<PostId>,
    pub post_menu: Option<PostId>,
    pub editing_comment: Option<CommentId>,

    pub last_error: Option<String>,
}

impl ViewState {
    pub fn filter(&self) -> PostFilter {
        PostFilter {
            search: self.search.clone(),
            tags: self.selected_tags.clone(),
        }
    }

    pub fn open_post(&mut self, post: PostId) {
        if self.open_post != Some(post) {
            self.editing_comment = None;
        }
        self.open_post = Some(post);
    }

    pub fn close_post(&mut self) {
        self.open_post = None;
        self.editing_comment = None;
    }

    pub fn show_pane(&mut self, pane: Pane) {
        self.pane = pane;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn set_order(&mut self, order: Order) {
        self.order = order;
    }

    /// Adds `tag` to the filter, or removes it if it was already there
    pub fn toggle_tag(&mut self, tag: &str) {
        match self.selected_tags.iter().position(|t| t == tag) {
            Some(i) => {
                self.selected_tags.remove(i);
            }
            None => self.selected_tags.push(tag.to_string()),
        }
    }

    pub fn browse_tag(&mut self, tag: &str) {
        self.selected_tags = vec![tag.to_string()];
        self.pane = Pane::Posts;
    }

    pub fn toggle_post_menu(&mut self, post: PostId) {
        self.post_menu = match self.post_menu {
            Some(p) if p == post => None,
            _ => Some(post),
        };
    }

    pub fn start_edit_post(&mut self, post: PostId) {
        self.editing_post = Some(post);
        self.post_menu = None;
    }

    pub fn cancel_edit_post(&mut self) {
        self.editing_post = None;
    }

    pub fn start_edit_comment(&mut self, comment: CommentId) {
        self.editing_comment = Some(comment);
    }

    pub fn cancel_edit_comment(&mut self) {
        self.editing_comment = None;
    }

    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_collapsed = !self.sidebar_collapsed;
    }

    /// Drops every reference to a post that no longer exists
    pub fn forget_post(&mut self, post: PostId) {
        if self.open_post == Some(post) {
            self.close_post();
        }
        if self.editing_post == Some(post) {
            self.editing_post = None;
        }
        if self.post_menu == Some(post) {
            self.post_menu = None;
        }
    }

    pub fn forget_comment(&mut self, comment: CommentId) {
        if self.editing_comment == Some(comment) {
            self.editing_comment = None;
        }
    }
}

/// Splits a comma-separated tag field
pub fn parse_tags(field: &str) -> Vec<String> {
    field
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}
