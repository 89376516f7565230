use std::{
    collections::{HashMap, HashSet},
    fmt::Debug,
    hash::Hash,
    sync::Arc,
};

use crate::{
    api::{Comment, CommentId, Post, PostId, Target, Vote},
    comment::{self, CommentNode},
    search, Direction, Order, PostFilter, VoteState,
};

pub trait Keyed {
    type Id: Copy + Debug + Eq + Hash;
    fn key(&self) -> Self::Id;
}

impl Keyed for Post {
    type Id = PostId;
    fn key(&self) -> PostId {
        self.id
    }
}

impl Keyed for Comment {
    type Id = CommentId;
    fn key(&self) -> CommentId {
        self.id
    }
}

/// Records keyed by id, remembering insertion order
///
/// Overwriting an existing id keeps its position.
#[derive(Clone, Debug, PartialEq)]
pub struct Table<T: Keyed> {
    order: Vec<T::Id>,
    rows: HashMap<T::Id, Arc<T>>,
}

impl<T: Keyed> Default for Table<T> {
    fn default() -> Self {
        Table {
            order: Vec::new(),
            rows: HashMap::new(),
        }
    }
}

impl<T: Keyed> Table<T> {
    pub fn replace_all(&mut self, items: impl IntoIterator<Item = T>) {
        self.order.clear();
        self.rows.clear();
        for i in items {
            self.upsert(i);
        }
    }

    pub fn upsert(&mut self, item: T) {
        let id = item.key();
        if self.rows.insert(id, Arc::new(item)).is_none() {
            self.order.push(id);
        }
    }

    pub fn upsert_front(&mut self, item: T) {
        let id = item.key();
        if self.rows.insert(id, Arc::new(item)).is_none() {
            self.order.insert(0, id);
        }
    }

    pub fn remove(&mut self, id: &T::Id) -> Option<Arc<T>> {
        let res = self.rows.remove(id)?;
        self.order.retain(|i| i != id);
        Some(res)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        let rows = &mut self.rows;
        self.order.retain(|id| {
            let kept = rows.get(id).map_or(false, |r| keep(&**r));
            if !kept {
                rows.remove(id);
            }
            kept
        });
    }

    pub fn get(&self, id: &T::Id) -> Option<&Arc<T>> {
        self.rows.get(id)
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.rows.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<T>> {
        self.order.iter().filter_map(|id| self.rows.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<T: Keyed + Clone> Table<T> {
    fn get_mut(&mut self, id: &T::Id) -> Option<&mut T> {
        self.rows.get_mut(id).map(Arc::make_mut)
    }
}

/// Local copy of everything the current user sees
///
/// Holds no derived state: the tag universe, comment trees and the list of
/// visible posts are computed on demand by the caller.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Store {
    posts: Table<Post>,
    comments: Table<Comment>,
    votes: HashMap<Target, Direction>,
}

impl Store {
    pub fn posts(&self) -> &Table<Post> {
        &self.posts
    }

    pub fn comments(&self) -> &Table<Comment> {
        &self.comments
    }

    pub fn post(&self, id: PostId) -> Option<&Arc<Post>> {
        self.posts.get(&id)
    }

    pub fn comment(&self, id: CommentId) -> Option<&Arc<Comment>> {
        self.comments.get(&id)
    }

    pub fn contains(&self, target: Target) -> bool {
        match target {
            Target::Post(id) => self.posts.contains(&id),
            Target::Comment(id) => self.comments.contains(&id),
        }
    }

    pub fn vote(&self, target: Target) -> VoteState {
        self.votes
            .get(&target)
            .copied()
            .map(VoteState::from)
            .unwrap_or(VoteState::Absent)
    }

    pub fn replace_posts(&mut self, posts: Vec<Post>) {
        self.posts.replace_all(posts);
    }

    /// New posts go first, as the freshest ones
    pub fn upsert_post(&mut self, post: Post) {
        self.posts.upsert_front(post);
    }

    /// Overwrites the editable fields of a post, leaving its score alone
    ///
    /// Returns false if the post is no longer loaded.
    pub fn apply_post_edit(&mut self, edited: &Post) -> bool {
        match self.posts.get_mut(&edited.id) {
            None => {
                tracing::warn!(post = %edited.id, "edit confirmed for a post that is not loaded");
                false
            }
            Some(p) => {
                p.title = edited.title.clone();
                p.content = edited.content.clone();
                p.tags = edited.tags.clone();
                p.last_updated = edited.last_updated;
                true
            }
        }
    }

    /// Also drops the post's comments and the user's vote on it
    pub fn remove_post(&mut self, id: PostId) -> Option<Arc<Post>> {
        let res = self.posts.remove(&id)?;
        let gone = self.comments_of(id);
        self.comments.retain(|c| !gone.contains(&c.id));
        self.votes.remove(&Target::Post(id));
        self.votes
            .retain(|t, _| !matches!(t, Target::Comment(c) if gone.contains(c)));
        Some(res)
    }

    /// Replaces the comments of one post, leaving the other posts' comments alone
    ///
    /// Comments that come without a post id are attached to `post`, as that is
    /// what they were fetched for.
    pub fn replace_comments(&mut self, post: PostId, comments: Vec<Comment>) {
        let previous = self.comments_of(post);
        self.comments.retain(|c| !previous.contains(&c.id));
        for mut c in comments {
            c.post_id.get_or_insert(post);
            self.comments.upsert(c);
        }
    }

    pub fn upsert_comment(&mut self, comment: Comment) {
        self.comments.upsert(comment);
    }

    /// Overwrites the content of a comment, leaving its score alone
    pub fn apply_comment_edit(&mut self, edited: &Comment) -> bool {
        match self.comments.get_mut(&edited.id) {
            None => {
                tracing::warn!(comment = %edited.id, "edit confirmed for a comment that is not loaded");
                false
            }
            Some(c) => {
                c.content = edited.content.clone();
                c.last_updated = edited.last_updated;
                true
            }
        }
    }

    /// Children of the removed comment stay, and surface as roots
    pub fn remove_comment(&mut self, id: CommentId) -> Option<Arc<Comment>> {
        let res = self.comments.remove(&id)?;
        self.votes.remove(&Target::Comment(id));
        Some(res)
    }

    pub fn replace_votes(&mut self, votes: Vec<Vote>) {
        self.votes.clear();
        for v in votes {
            match v.target() {
                Some(t) => {
                    self.votes.insert(t, Direction::from_positive(v.positive));
                }
                None => tracing::warn!(vote = ?v.id, "ignoring vote without a target"),
            }
        }
    }

    pub fn set_vote(&mut self, target: Target, state: VoteState) {
        match state.direction() {
            Some(d) => self.votes.insert(target, d),
            None => self.votes.remove(&target),
        };
    }

    /// Returns false if the target is no longer loaded
    pub fn patch_score(&mut self, target: Target, score: i64) -> bool {
        let patched = match target {
            Target::Post(id) => self.posts.get_mut(&id).map(|p| p.score = score),
            Target::Comment(id) => self.comments.get_mut(&id).map(|c| c.score = score),
        };
        if patched.is_none() {
            tracing::warn!(%target, score, "score update for an entity that is not loaded");
        }
        patched.is_some()
    }

    /// The post a comment belongs to, following the parent chain if needed
    pub fn comment_post(&self, id: CommentId) -> Option<PostId> {
        let mut seen = HashSet::new();
        let mut cur = self.comments.get(&id)?;
        loop {
            if let Some(p) = cur.post_id {
                return Some(p);
            }
            if !seen.insert(cur.id) {
                return None;
            }
            cur = self.comments.get(&cur.parent_comment_id?)?;
        }
    }

    fn comments_of(&self, post: PostId) -> HashSet<CommentId> {
        self.comments
            .iter()
            .map(|c| c.id)
            .filter(|c| self.comment_post(*c) == Some(post))
            .collect()
    }

    pub fn comment_tree(&self, post: PostId) -> Vec<CommentNode> {
        comment::build_tree(self.comments.iter(), post)
    }

    /// Returns the posts matching `filter`, sorted by `order`
    pub fn visible_posts(&self, filter: &PostFilter, order: Order) -> Vec<Arc<Post>> {
        let mut res = self
            .posts
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect::<Vec<_>>();
        order.sort(&mut res);
        res
    }

    pub fn tag_universe(&self) -> Vec<String> {
        search::tag_universe(self.posts.iter().map(|p| &**p))
    }
}
