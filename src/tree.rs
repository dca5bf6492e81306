//! The owned tree of [`NodeData`], backed by an [`indextree`] arena.
//!
//! A flat arena indexed by integer handles, not a `Box`-owned recursive
//! structure. There are no parent back-pointers anywhere: every traversal
//! carries its ancestors on an explicit stack or the call stack.

use indextree::{Arena, NodeId};

use crate::aabb::{merge, Aabb};
use crate::error::CoreError;
use crate::ObjectIndex;

/// One node of the tree: a closed, two-variant sum type. There is no
/// `is_leaf` flag or sentinel `obj_index`; the variant itself carries that
/// information.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeData {
    /// One tracked object. `leaf_count` is implicitly `1` and not stored.
    Leaf { aabb: Aabb, obj_index: ObjectIndex },
    /// The union of a subtree's leaf AABBs as of the last fit, plus a cached
    /// leaf count so [`crate::subdomain`] can order subtrees without
    /// re-walking them.
    Internal { aabb: Aabb, leaf_count: usize },
}

impl NodeData {
    pub fn aabb(&self) -> Aabb {
        match *self {
            NodeData::Leaf { aabb, .. } => aabb,
            NodeData::Internal { aabb, .. } => aabb,
        }
    }

    pub fn leaf_count(&self) -> usize {
        match *self {
            NodeData::Leaf { .. } => 1,
            NodeData::Internal { leaf_count, .. } => leaf_count,
        }
    }

    pub fn is_leaf(&self) -> bool { matches!(self, NodeData::Leaf { .. }) }
}

/// An owned BVH: an arena of [`NodeData`] plus the id of its root.
///
/// There is always exactly one root (the empty case, `N = 0`, is rejected at
/// [`crate::build`]'s boundary as [`crate::InvalidInputError::EmptyInput`]
/// rather than represented as a tree with no root).
#[derive(Clone, Debug)]
pub struct Tree {
    pub(crate) arena: Arena<NodeData>,
    pub(crate) root: NodeId,
}

impl Tree {
    pub fn root_id(&self) -> NodeId { self.root }

    pub fn arena(&self) -> &Arena<NodeData> { &self.arena }

    /// Number of tracked objects this tree was built or refit from.
    pub fn leaf_total(&self) -> usize { self.data(self.root).leaf_count() }

    pub fn data(&self, id: NodeId) -> &NodeData {
        self.arena
            .get(id)
            .expect("NodeId belongs to this tree's arena")
            .get()
    }

    pub fn aabb_of(&self, id: NodeId) -> Aabb { self.data(id).aabb() }

    pub fn leaf_count_of(&self, id: NodeId) -> usize { self.data(id).leaf_count() }

    pub fn is_leaf(&self, id: NodeId) -> bool { self.data(id).is_leaf() }

    /// The left and right children of an internal node, in append order.
    ///
    /// Errors with [`CoreError::InconsistentTree`] if `id` doesn't have
    /// exactly two children; this should be unreachable given the crate's
    /// own invariants, but the check is cheap and worth surfacing rather
    /// than silently patching around.
    pub fn children_of(&self, id: NodeId) -> Result<(NodeId, NodeId), CoreError> {
        let mut it = id.children(&self.arena);
        let left = it
            .next()
            .ok_or(CoreError::InconsistentTree("internal node has no children"))?;
        let right = it
            .next()
            .ok_or(CoreError::InconsistentTree("internal node has only one child"))?;
        if it.next().is_some() {
            return Err(CoreError::InconsistentTree("internal node has more than two children"));
        }
        Ok((left, right))
    }

    /// Collects every leaf `obj_index` under `id`, via an explicit-stack DFS
    /// (no recursion, no parent pointers).
    pub(crate) fn collect_leaf_indices(&self, id: NodeId) -> Vec<ObjectIndex> {
        let mut out = Vec::with_capacity(self.leaf_count_of(id));
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            match self.data(id) {
                NodeData::Leaf { obj_index, .. } => out.push(*obj_index),
                NodeData::Internal { .. } => {
                    for child in id.children(&self.arena) {
                        stack.push(child);
                    }
                }
            }
        }
        out
    }

    /// Recomputes `aabb`/`leaf_count` for `id` from its two children, which
    /// must already be up to date. Used by the updater's post-order refit.
    pub(crate) fn refresh_internal(&mut self, id: NodeId, left: NodeId, right: NodeId) {
        let aabb = merge(self.aabb_of(left), self.aabb_of(right));
        let leaf_count = self.leaf_count_of(left) + self.leaf_count_of(right);
        *self.arena[id].get_mut() = NodeData::Internal { aabb, leaf_count };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use glam::Vec3;

    fn cube(cx: f32) -> Aabb { Aabb::new(Vec3::new(cx, 0., 0.), Vec3::new(cx + 1., 1., 1.)) }

    #[test]
    fn leaf_total_matches_input_length() {
        let aabbs = vec![cube(0.), cube(10.), cube(20.), cube(30.)];
        let tree = build(&aabbs).unwrap();
        assert_eq!(tree.leaf_total(), 4);
    }

    #[test]
    fn single_leaf_has_no_children() {
        let tree = build(&[cube(0.)]).unwrap();
        assert!(tree.is_leaf(tree.root_id()));
        assert!(tree.children_of(tree.root_id()).is_err());
    }
}
