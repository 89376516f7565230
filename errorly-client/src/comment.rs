use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use crate::api::{Comment, CommentId, PostId};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommentNode {
    pub comment: Arc<Comment>,

    /// 0 for top-level comments
    pub depth: usize,

    /// Replies, in the order they were loaded
    pub children: Vec<CommentNode>,
}

impl CommentNode {
    pub fn len(&self) -> usize {
        walk(std::slice::from_ref(self)).count()
    }
}

// Threads may be arbitrarily deep, so children are torn down from a heap
// stack rather than by recursing once per level.
impl Drop for CommentNode {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut n) = stack.pop() {
            stack.append(&mut n.children);
        }
    }
}

/// Depth-first, pre-order walk over a comment forest
pub fn walk(roots: &[CommentNode]) -> Walk<'_> {
    Walk {
        stack: vec![roots.iter()],
    }
}

pub struct Walk<'a> {
    stack: Vec<std::slice::Iter<'a, CommentNode>>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a CommentNode;

    fn next(&mut self) -> Option<&'a CommentNode> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(n) => {
                    self.stack.push(n.children.iter());
                    return Some(n);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Builds the reply tree of `post` out of a flat comment list
///
/// A comment belongs to `post` if it says so, or if its parent does.
/// Comments whose parent is not in the list are shown at the top level,
/// and so are comments whose parent chain loops: the loop is cut at the
/// first of its members in list order. Every comment of the post appears
/// exactly once.
pub fn build_tree<'a>(
    comments: impl IntoIterator<Item = &'a Arc<Comment>>,
    post: PostId,
) -> Vec<CommentNode> {
    let all = comments.into_iter().collect::<Vec<_>>();
    let mut by_id = HashMap::with_capacity(all.len());
    for (i, c) in all.iter().enumerate() {
        by_id.entry(c.id).or_insert(i);
    }
    let owners = owning_posts(&all, &by_id);
    let selected = (0..all.len())
        .filter(|i| owners[*i] == Some(post))
        .collect::<Vec<_>>();
    let in_post = selected.iter().map(|i| all[*i].id).collect::<HashSet<_>>();

    let mut roots = Vec::new();
    let mut children: HashMap<CommentId, Vec<usize>> = HashMap::new();
    for &i in &selected {
        let c = all[i];
        match c.parent_comment_id {
            Some(p) if p != c.id && in_post.contains(&p) => children.entry(p).or_default().push(i),
            _ => roots.push(i),
        }
    }

    let mut visited = HashSet::with_capacity(selected.len());
    let mut res = Vec::with_capacity(roots.len());
    for r in roots {
        visited.insert(all[r].id);
        res.push(grow(r, &all, &children, &mut visited));
    }

    // Whatever is left hangs off a parent chain that loops
    for &i in &selected {
        if visited.contains(&all[i].id) {
            continue;
        }
        let start = loop_member(i, &all, &by_id);
        tracing::warn!(comment = %all[start].id, "comment parent chain loops, showing it at the top level");
        visited.insert(all[start].id);
        res.push(grow(start, &all, &children, &mut visited));
    }

    res
}

fn owning_posts(all: &[&Arc<Comment>], by_id: &HashMap<CommentId, usize>) -> Vec<Option<PostId>> {
    let mut known: Vec<Option<Option<PostId>>> = vec![None; all.len()];
    for start in 0..all.len() {
        let mut path = Vec::new();
        let mut on_path = HashSet::new();
        let mut cur = Some(start);
        let found = loop {
            let Some(i) = cur else { break None };
            if let Some(k) = known[i] {
                break k;
            }
            if !on_path.insert(i) {
                break None;
            }
            path.push(i);
            if let Some(p) = all[i].post_id {
                break Some(p);
            }
            cur = all[i]
                .parent_comment_id
                .and_then(|p| by_id.get(&p).copied());
        };
        for i in path {
            known[i] = Some(found);
        }
    }
    known.into_iter().map(Option::flatten).collect()
}

/// Earliest-listed member of the loop that the parent chain of `i` ends in
fn loop_member(i: usize, all: &[&Arc<Comment>], by_id: &HashMap<CommentId, usize>) -> usize {
    let parent = |c: usize| {
        all[c]
            .parent_comment_id
            .and_then(|p| by_id.get(&p).copied())
    };
    let mut seen = HashSet::new();
    let mut cur = i;
    while seen.insert(cur) {
        match parent(cur) {
            Some(p) => cur = p,
            None => return i,
        }
    }
    let mut first = cur;
    let mut member = parent(cur).unwrap_or(cur);
    while member != cur {
        first = first.min(member);
        member = parent(member).unwrap_or(cur);
    }
    first
}

fn grow(
    root: usize,
    all: &[&Arc<Comment>],
    children: &HashMap<CommentId, Vec<usize>>,
    visited: &mut HashSet<CommentId>,
) -> CommentNode {
    struct Frame {
        node: CommentNode,
        pending: std::vec::IntoIter<usize>,
    }
    let frame = |i: usize, depth: usize| Frame {
        node: CommentNode {
            comment: all[i].clone(),
            depth,
            children: Vec::new(),
        },
        pending: children
            .get(&all[i].id)
            .cloned()
            .unwrap_or_default()
            .into_iter(),
    };

    let mut current = frame(root, 0);
    let mut parents: Vec<Frame> = Vec::new();
    loop {
        match current.pending.next() {
            Some(child) if visited.insert(all[child].id) => {
                let depth = current.node.depth + 1;
                parents.push(std::mem::replace(&mut current, frame(child, depth)));
            }
            Some(child) => {
                tracing::warn!(comment = %all[child].id, "comment already shown, cutting its branch");
            }
            None => match parents.pop() {
                Some(mut parent) => {
                    parent.node.children.push(current.node);
                    current = parent;
                }
                None => return current.node,
            },
        }
    }
}
