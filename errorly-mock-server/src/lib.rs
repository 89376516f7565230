use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::TimeZone;
use errorly_client::api::{
    AuthToken, Comment, CommentEdit, CommentId, Error, NewComment, NewPost, Post, PostId, Reply,
    Target, Time, UserId, Uuid, Vote, VoteId, VoteRequest,
};

mod gateway;
pub use gateway::MockGateway;

mod http;
pub use http::{router, spawn_http, Shared};

/// In-memory backend with the same rules as the real one
///
/// Timestamps come from a clock that advances one second per write, so that
/// runs are reproducible.
pub struct MockServer {
    users: HashMap<AuthToken, UserId>,
    posts: BTreeMap<PostId, Post>,
    comments: BTreeMap<CommentId, Comment>,
    votes: BTreeMap<VoteId, Vote>,
    last_id: i64,
    ticks: i64,
}

impl Default for MockServer {
    fn default() -> Self {
        MockServer::new()
    }
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer {
            users: HashMap::new(),
            posts: BTreeMap::new(),
            comments: BTreeMap::new(),
            votes: BTreeMap::new(),
            last_id: 0,
            ticks: 0,
        }
    }

    /// Registers a new user, returning its id and a token it can authenticate with
    pub fn create_user(&mut self) -> (UserId, AuthToken) {
        let user = UserId(Uuid::new_v4());
        let tok = AuthToken(Uuid::new_v4().to_string());
        self.users.insert(tok.clone(), user);
        (user, tok)
    }

    pub fn test_num_posts(&self) -> usize {
        self.posts.len()
    }

    pub fn test_num_comments(&self) -> usize {
        self.comments.len()
    }

    fn resolve(&self, tok: &AuthToken) -> Result<UserId, Error> {
        self.users.get(tok).copied().ok_or(Error::Unauthorized)
    }

    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn now(&mut self) -> Time {
        self.ticks += 1;
        chrono::Utc
            .timestamp_opt(1_700_000_000 + self.ticks, 0)
            .single()
            .unwrap_or_default()
    }

    fn owned_post(&mut self, tok: &AuthToken, id: PostId) -> Result<&mut Post, Error> {
        let user = self.resolve(tok)?;
        let post = self.posts.get_mut(&id).ok_or(Error::PostNotFound(id))?;
        if post.user_id != user {
            return Err(Error::PermissionDenied);
        }
        Ok(post)
    }

    fn owned_comment(&mut self, tok: &AuthToken, id: CommentId) -> Result<&mut Comment, Error> {
        let user = self.resolve(tok)?;
        let comment = self.comments.get_mut(&id).ok_or(Error::CommentNotFound(id))?;
        if comment.user_id != user {
            return Err(Error::PermissionDenied);
        }
        Ok(comment)
    }

    pub fn fetch_posts(&self, tok: &AuthToken) -> Result<Vec<Post>, Error> {
        self.resolve(tok)?;
        Ok(self.posts.values().cloned().collect())
    }

    pub fn create_post(&mut self, tok: &AuthToken, p: NewPost) -> Result<Post, Error> {
        let user = self.resolve(tok)?;
        p.validate()?;
        let id = PostId(self.next_id());
        let now = self.now();
        let post = Post {
            id,
            user_id: user,
            title: p.post.title,
            content: p.post.content,
            score: 0,
            created_at: now,
            last_updated: now,
            tags: p.tags,
        };
        self.posts.insert(id, post.clone());
        Ok(post)
    }

    pub fn edit_post(&mut self, tok: &AuthToken, id: PostId, p: NewPost) -> Result<Post, Error> {
        self.owned_post(tok, id)?;
        p.validate()?;
        let now = self.now();
        let post = self.owned_post(tok, id)?;
        post.title = p.post.title;
        post.content = p.post.content;
        post.tags = p.tags;
        post.last_updated = now;
        Ok(post.clone())
    }

    /// Also deletes the post's comments, and every vote on any of them
    pub fn delete_post(&mut self, tok: &AuthToken, id: PostId) -> Result<(), Error> {
        self.owned_post(tok, id)?;
        self.posts.remove(&id);
        let gone = self
            .comments
            .values()
            .filter(|c| c.post_id == Some(id))
            .map(|c| c.id)
            .collect::<HashSet<_>>();
        self.comments.retain(|c, _| !gone.contains(c));
        self.votes.retain(|_, v| match v.target() {
            Some(Target::Post(p)) => p != id,
            Some(Target::Comment(c)) => !gone.contains(&c),
            None => true,
        });
        Ok(())
    }

    pub fn fetch_comments(&self, tok: &AuthToken, post: PostId) -> Result<Vec<Comment>, Error> {
        self.resolve(tok)?;
        if !self.posts.contains_key(&post) {
            return Err(Error::PostNotFound(post));
        }
        Ok(self
            .comments
            .values()
            .filter(|c| c.post_id == Some(post))
            .cloned()
            .collect())
    }

    pub fn create_comment(&mut self, tok: &AuthToken, c: NewComment) -> Result<Comment, Error> {
        let user = self.resolve(tok)?;
        if !self.posts.contains_key(&c.post_id) {
            return Err(Error::PostNotFound(c.post_id));
        }
        if let Some(parent) = c.parent_comment_id {
            let p = self
                .comments
                .get(&parent)
                .ok_or(Error::CommentNotFound(parent))?;
            if p.post_id != Some(c.post_id) {
                return Err(Error::ParentNotInPost(parent));
            }
        }
        c.validate()?;
        let id = CommentId(self.next_id());
        let now = self.now();
        let comment = Comment {
            id,
            user_id: user,
            post_id: Some(c.post_id),
            parent_comment_id: c.parent_comment_id,
            content: c.content,
            score: 0,
            created_at: now,
            last_updated: now,
        };
        self.comments.insert(id, comment.clone());
        Ok(comment)
    }

    pub fn edit_comment(
        &mut self,
        tok: &AuthToken,
        id: CommentId,
        e: CommentEdit,
    ) -> Result<Comment, Error> {
        self.owned_comment(tok, id)?;
        e.validate()?;
        let now = self.now();
        let comment = self.owned_comment(tok, id)?;
        comment.content = e.content;
        comment.last_updated = now;
        Ok(comment.clone())
    }

    /// Replies to the comment are kept
    pub fn delete_comment(&mut self, tok: &AuthToken, id: CommentId) -> Result<(), Error> {
        self.owned_comment(tok, id)?;
        self.comments.remove(&id);
        self.votes
            .retain(|_, v| v.target() != Some(Target::Comment(id)));
        Ok(())
    }

    pub fn fetch_votes(&self, tok: &AuthToken) -> Result<Vec<Vote>, Error> {
        let user = self.resolve(tok)?;
        Ok(self
            .votes
            .values()
            .filter(|v| v.user_id == user)
            .cloned()
            .collect())
    }

    fn vote_of(&self, user: UserId, target: Target) -> Option<VoteId> {
        self.votes
            .values()
            .find(|v| v.user_id == user && v.target() == Some(target))
            .map(|v| v.id)
    }

    /// Checks the request names an existing target
    fn vote_target(&self, req: &VoteRequest) -> Result<Target, Error> {
        let target = req.target().ok_or(Error::InvalidVote)?;
        let exists = match target {
            Target::Post(id) => self
                .posts
                .contains_key(&id)
                .then_some(())
                .ok_or(Error::PostNotFound(id)),
            Target::Comment(id) => self
                .comments
                .contains_key(&id)
                .then_some(())
                .ok_or(Error::CommentNotFound(id)),
        };
        exists.map(|()| target)
    }

    /// Recomputes the score of `target` and returns it in a reply envelope
    fn rescore(&mut self, target: Target, vote: Option<Vote>) -> Reply {
        let score = self
            .votes
            .values()
            .filter(|v| v.target() == Some(target))
            .map(|v| if v.positive { 1 } else { -1 })
            .sum::<i64>();
        let mut reply = Reply {
            vote,
            ..Reply::message("Vote recorded")
        };
        match target {
            Target::Post(id) => {
                if let Some(p) = self.posts.get_mut(&id) {
                    p.score = score;
                    reply.post = Some(p.clone());
                }
            }
            Target::Comment(id) => {
                if let Some(c) = self.comments.get_mut(&id) {
                    c.score = score;
                    reply.comment = Some(c.clone());
                }
            }
        }
        reply
    }

    pub fn create_vote(&mut self, tok: &AuthToken, req: VoteRequest) -> Result<Reply, Error> {
        let user = self.resolve(tok)?;
        let target = self.vote_target(&req)?;
        let positive = req.positive.ok_or(Error::InvalidVote)?;
        if self.vote_of(user, target).is_some() {
            return Err(Error::VoteAlreadyExists(target));
        }
        let (post_id, comment_id) = (req.post_id, req.comment_id);
        let vote = Vote {
            id: VoteId(self.next_id()),
            user_id: user,
            post_id,
            comment_id,
            positive,
        };
        self.votes.insert(vote.id, vote.clone());
        Ok(self.rescore(target, Some(vote)))
    }

    pub fn update_vote(&mut self, tok: &AuthToken, req: VoteRequest) -> Result<Reply, Error> {
        let user = self.resolve(tok)?;
        let target = self.vote_target(&req)?;
        let positive = req.positive.ok_or(Error::InvalidVote)?;
        let id = self
            .vote_of(user, target)
            .ok_or(Error::VoteNotFound(target))?;
        let vote = self
            .votes
            .get_mut(&id)
            .ok_or(Error::VoteNotFound(target))?;
        vote.positive = positive;
        let vote = vote.clone();
        Ok(self.rescore(target, Some(vote)))
    }

    pub fn delete_vote(&mut self, tok: &AuthToken, req: VoteRequest) -> Result<Reply, Error> {
        let user = self.resolve(tok)?;
        let target = self.vote_target(&req)?;
        let id = self
            .vote_of(user, target)
            .ok_or(Error::VoteNotFound(target))?;
        self.votes.remove(&id);
        Ok(self.rescore(target, None))
    }
}
