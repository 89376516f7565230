use std::collections::HashSet;

use crate::api::Post;

/// Which posts the list shows
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PostFilter {
    /// Case-insensitive, matched against title and content
    pub search: String,

    /// A post must carry every one of these
    pub tags: Vec<String>,
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        self.matches_search(post) && self.tags.iter().all(|t| post.has_tag(t))
    }

    fn matches_search(&self, post: &Post) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        post.title.to_lowercase().contains(&needle) || post.content.to_lowercase().contains(&needle)
    }
}

/// Every tag used by `posts`, each once, in order of first appearance
pub fn tag_universe<'a>(posts: impl IntoIterator<Item = &'a Post>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut res = Vec::new();
    for p in posts {
        for t in &p.tags {
            if seen.insert(t.as_str()) {
                res.push(t.clone());
            }
        }
    }
    res
}
