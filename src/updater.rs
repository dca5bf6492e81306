//! Incremental refit with rebuild fallback.

use tracing::debug;

use crate::aabb::Aabb;
use crate::builder::build;
use crate::error::{CoreError, InvalidInputError};
use crate::tree::{NodeData, Tree};

/// Refits `tree`'s leaves to `aabbs` (same length, same object-index
/// assignment) and propagates internal AABBs/leaf-counts bottom-up. If more
/// than `threshold` of the leaves changed, the refitted tree is discarded
/// and a fresh one is built from `aabbs` instead. Preserving topology, and
/// hence subdomain identity, is cheaper than a full rebuild only while most
/// of the tree is still where it was.
///
/// Errors with [`InvalidInputError::LengthMismatch`] if `aabbs.len()`
/// differs from `tree.leaf_total()`.
pub fn update(mut tree: Tree, aabbs: &[Aabb], threshold: f32) -> Result<Tree, CoreError> {
    let expected = tree.leaf_total();
    if aabbs.len() != expected {
        return Err(InvalidInputError::LengthMismatch { expected, given: aabbs.len() }.into());
    }

    let mut changed = 0usize;
    let root = tree.root_id();
    refit(&mut tree, root, aabbs, &mut changed)?;

    let ratio = changed as f32 / aabbs.len() as f32;
    debug!(changed, total = aabbs.len(), ratio, threshold, "refit pass complete");

    if ratio > threshold {
        debug!("rebuild threshold exceeded, discarding refitted tree");
        return build(aabbs);
    }
    Ok(tree)
}

/// Post-order DFS: leaves compare-and-overwrite, internals recompute from
/// their (already up to date) children. Recursion carries the call stack as
/// the traversal context; there are no parent pointers to maintain.
fn refit(tree: &mut Tree, id: indextree::NodeId, aabbs: &[Aabb], changed: &mut usize) -> Result<(), CoreError> {
    if tree.is_leaf(id) {
        let (aabb, obj_index) = match tree.data(id) {
            NodeData::Leaf { aabb, obj_index } => (*aabb, *obj_index),
            NodeData::Internal { .. } => unreachable!("is_leaf just confirmed this is a Leaf"),
        };
        let new_aabb = aabbs[obj_index];
        if new_aabb != aabb {
            *tree.arena[id].get_mut() = NodeData::Leaf { aabb: new_aabb, obj_index };
            *changed += 1;
        }
        return Ok(());
    }

    let (left, right) = tree.children_of(id)?;
    refit(tree, left, aabbs, changed)?;
    refit(tree, right, aabbs, changed)?;
    tree.refresh_internal(id, left, right);
    Ok(())
}
