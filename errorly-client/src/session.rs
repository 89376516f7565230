use std::sync::Arc;

use crate::{
    api::{CommentEdit, CommentId, NewComment, NewPost, Post, PostId, Target},
    CommentNode, Direction, Error, Gateway, Pane, Precondition, Store, ViewState, VoteOutcome,
};

/// One user's view of the board, kept in sync with the backend
///
/// Every mutation is sent to the backend first and only applied locally
/// once confirmed. A failed action leaves the store as it was, and its
/// message in `view().last_error`.
pub struct Session<G> {
    gateway: G,
    store: Store,
    view: ViewState,
}

impl<G: Gateway> Session<G> {
    pub fn new(gateway: G) -> Session<G> {
        Session {
            gateway,
            store: Store::default(),
            view: ViewState::default(),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    /// Posts to list, with the current search, tag selection and order
    pub fn visible_posts(&self) -> Vec<Arc<Post>> {
        self.store.visible_posts(&self.view.filter(), self.view.order)
    }

    /// Comment tree of the open post
    pub fn thread(&self) -> Vec<CommentNode> {
        match self.view.open_post {
            Some(p) => self.store.comment_tree(p),
            None => Vec::new(),
        }
    }

    fn report<T>(&mut self, action: &'static str, res: Result<T, Error>) -> Result<T, Error> {
        match &res {
            Ok(_) => self.view.last_error = None,
            Err(e) => {
                tracing::error!(error = %e, "{action} failed");
                self.view.last_error = Some(format!("{action} failed: {e}"));
            }
        }
        res
    }

    /// Reloads every post and the user's votes
    pub async fn load(&mut self) -> Result<(), Error> {
        let res = self.reload_posts().await;
        self.report("loading posts", res)
    }

    async fn reload_posts(&mut self) -> Result<(), Error> {
        let posts = self.gateway.fetch_posts().await?.into_posts()?;
        let votes = self.gateway.fetch_votes().await?.into_votes()?;
        tracing::debug!(posts = posts.len(), votes = votes.len(), "loaded posts");
        self.store.replace_posts(posts);
        self.store.replace_votes(votes);
        self.view.all_tags = self.store.tag_universe();
        let gone = [self.view.open_post, self.view.editing_post, self.view.post_menu]
            .into_iter()
            .flatten()
            .filter(|p| self.store.post(*p).is_none())
            .collect::<Vec<_>>();
        for p in gone {
            self.view.forget_post(p);
        }
        Ok(())
    }

    async fn reload_comments(&mut self, post: PostId) -> Result<(), Error> {
        let comments = self.gateway.fetch_comments(post).await?.into_comments()?;
        tracing::debug!(%post, comments = comments.len(), "loaded comments");
        self.store.replace_comments(post, comments);
        Ok(())
    }

    /// Opens a loaded post and fetches its comments
    pub async fn open_post(&mut self, post: PostId) -> Result<(), Error> {
        let res = self.do_open_post(post).await;
        self.report("opening post", res)
    }

    async fn do_open_post(&mut self, post: PostId) -> Result<(), Error> {
        if self.store.post(post).is_none() {
            return Err(Precondition::UnknownPost(post).into());
        }
        self.view.open_post(post);
        self.reload_comments(post).await
    }

    pub fn close_post(&mut self) {
        self.view.close_post();
    }

    pub async fn create_post(
        &mut self,
        title: &str,
        content: &str,
        tags: Vec<String>,
    ) -> Result<PostId, Error> {
        let res = self.do_create_post(title, content, tags).await;
        self.report("creating post", res)
    }

    async fn do_create_post(
        &mut self,
        title: &str,
        content: &str,
        tags: Vec<String>,
    ) -> Result<PostId, Error> {
        let new = new_post(title, content, tags)?;
        let post = self.gateway.create_post(&new).await?.into_post()?;
        let id = post.id;
        tracing::info!(post = %id, "created post");
        self.store.upsert_post(post);
        self.view.show_pane(Pane::Posts);
        Ok(id)
    }

    pub async fn edit_post(
        &mut self,
        id: PostId,
        title: &str,
        content: &str,
        tags: Vec<String>,
    ) -> Result<(), Error> {
        let res = self.do_edit_post(id, title, content, tags).await;
        self.report("editing post", res)
    }

    async fn do_edit_post(
        &mut self,
        id: PostId,
        title: &str,
        content: &str,
        tags: Vec<String>,
    ) -> Result<(), Error> {
        if self.store.post(id).is_none() {
            return Err(Precondition::UnknownPost(id).into());
        }
        let edit = new_post(title, content, tags)?;
        let post = self.gateway.edit_post(id, &edit).await?.into_post()?;
        tracing::info!(post = %id, "edited post");
        self.store.apply_post_edit(&post);
        self.view.cancel_edit_post();
        self.view.post_menu = None;
        Ok(())
    }

    /// Deletes a post, closing it if it was open
    ///
    /// If the backend refuses, the post list is fetched again.
    pub async fn delete_post(&mut self, id: PostId) -> Result<(), Error> {
        let res = self.do_delete_post(id).await;
        if matches!(res, Err(Error::Network(_) | Error::Rejected(_))) {
            if let Err(e) = self.reload_posts().await {
                tracing::warn!(error = %e, "failed reloading posts after a failed deletion");
            }
        }
        self.report("deleting post", res)
    }

    async fn do_delete_post(&mut self, id: PostId) -> Result<(), Error> {
        if self.store.post(id).is_none() {
            return Err(Precondition::UnknownPost(id).into());
        }
        self.gateway.delete_post(id).await?;
        tracing::info!(post = %id, "deleted post");
        self.store.remove_post(id);
        self.view.forget_post(id);
        Ok(())
    }

    /// Comments at the top level of the open post
    pub async fn create_comment(&mut self, content: &str) -> Result<CommentId, Error> {
        let res = match self.view.open_post {
            None => Err(Precondition::NoOpenPost.into()),
            Some(post) => self.submit_comment(post, None, content).await,
        };
        self.report("creating comment", res)
    }

    /// Answers a loaded comment, on whatever post it belongs to
    pub async fn reply(&mut self, parent: CommentId, content: &str) -> Result<CommentId, Error> {
        let res = match self.store.comment_post(parent) {
            None => Err(Precondition::UnknownComment(parent).into()),
            Some(post) => self.submit_comment(post, Some(parent), content).await,
        };
        self.report("replying", res)
    }

    async fn submit_comment(
        &mut self,
        post: PostId,
        parent: Option<CommentId>,
        content: &str,
    ) -> Result<CommentId, Error> {
        let new = NewComment::new(post, parent, content);
        if new.validate().is_err() {
            return Err(Precondition::EmptyComment.into());
        }
        let comment = self.gateway.create_comment(&new).await?.into_comment()?;
        let id = comment.id;
        tracing::info!(comment = %id, %post, "created comment");
        self.store.upsert_comment(comment);
        Ok(id)
    }

    pub async fn edit_comment(&mut self, id: CommentId, content: &str) -> Result<(), Error> {
        let res = self.do_edit_comment(id, content).await;
        self.report("editing comment", res)
    }

    async fn do_edit_comment(&mut self, id: CommentId, content: &str) -> Result<(), Error> {
        if self.store.comment(id).is_none() {
            return Err(Precondition::UnknownComment(id).into());
        }
        let edit = CommentEdit::new(content);
        if edit.validate().is_err() {
            return Err(Precondition::EmptyComment.into());
        }
        let comment = self.gateway.edit_comment(id, &edit).await?.into_comment()?;
        tracing::info!(comment = %id, "edited comment");
        self.store.apply_comment_edit(&comment);
        self.view.cancel_edit_comment();
        Ok(())
    }

    /// Deletes a comment, leaving its replies in place
    ///
    /// If the backend refuses, the comments of its post are fetched again.
    pub async fn delete_comment(&mut self, id: CommentId) -> Result<(), Error> {
        let post = self.store.comment_post(id);
        let res = self.do_delete_comment(id).await;
        if let (Some(post), Err(Error::Network(_) | Error::Rejected(_))) = (post, &res) {
            if let Err(e) = self.reload_comments(post).await {
                tracing::warn!(error = %e, "failed reloading comments after a failed deletion");
            }
        }
        self.report("deleting comment", res)
    }

    async fn do_delete_comment(&mut self, id: CommentId) -> Result<(), Error> {
        if self.store.comment(id).is_none() {
            return Err(Precondition::UnknownComment(id).into());
        }
        self.gateway.delete_comment(id).await?;
        tracing::info!(comment = %id, "deleted comment");
        self.store.remove_comment(id);
        self.view.forget_comment(id);
        Ok(())
    }

    /// Votes `direction` on `target`, or withdraws the vote if already cast that way
    pub async fn cast_vote(
        &mut self,
        target: Target,
        direction: Direction,
    ) -> Result<VoteOutcome, Error> {
        let res = self.do_cast_vote(target, direction).await;
        self.report("voting", res)
    }

    async fn do_cast_vote(
        &mut self,
        target: Target,
        direction: Direction,
    ) -> Result<VoteOutcome, Error> {
        let plan = self.store.plan_vote(target, direction)?;
        let reply = self.gateway.submit_vote(plan.op, &plan.request()).await?;
        let outcome = self.store.apply_vote(&plan, &reply)?;
        tracing::info!(%target, op = %outcome.op, score = outcome.score, "voted");
        Ok(outcome)
    }
}

fn new_post(title: &str, content: &str, tags: Vec<String>) -> Result<NewPost, Error> {
    let new = NewPost::new(title.trim().to_string(), content.to_string(), tags);
    if new.validate().is_err() {
        return Err(Precondition::EmptyTitle.into());
    }
    Ok(new)
}
