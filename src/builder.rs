//! Top-down construction: median-split on the longest axis, from scratch.

use indextree::{Arena, NodeId};
use itertools::Itertools;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use tracing::{debug, trace};

use crate::aabb::{merge, Aabb};
use crate::error::{CoreError, InvalidInputError};
use crate::tree::{NodeData, Tree};
use crate::ObjectIndex;

/// The axis a subtree is split along.
#[derive(Copy, Clone, Debug, EnumIter, Eq, PartialEq)]
enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    fn index(self) -> usize { self as usize }
}

/// Builds a tree from a dense slice of AABBs; entry `i` becomes object `i`.
///
/// Errors with [`InvalidInputError::EmptyInput`] if `aabbs` is empty. `N = 0`
/// is a hard error at this boundary, rather than giving `Tree` an
/// `Option`-shaped root throughout.
pub fn build(aabbs: &[Aabb]) -> Result<Tree, CoreError> {
    if aabbs.is_empty() {
        return Err(InvalidInputError::EmptyInput.into());
    }

    trace!(count = aabbs.len(), "building BVH from scratch");

    let mut arena = Arena::with_capacity(2 * aabbs.len() - 1);
    let items: Vec<(Aabb, ObjectIndex)> = aabbs.iter().copied().enumerate().map(|(i, a)| (a, i)).collect_vec();
    let root = build_node(&mut arena, items);

    debug!(leaves = aabbs.len(), "build complete");
    Ok(Tree { arena, root })
}

/// The longest axis of the combined extent. Ties broken by lowest axis
/// index: `Axis::iter()` visits `X, Y, Z` in that order, and only a strict
/// improvement replaces the running best.
fn argmax_axis(extent: [f32; 3]) -> Axis {
    Axis::iter()
        .reduce(|best, candidate| if extent[candidate.index()] > extent[best.index()] { candidate } else { best })
        .expect("Axis has three variants")
}

fn center_on_axis(aabb: Aabb, axis: Axis) -> f32 {
    let min = aabb.min().to_array();
    let max = aabb.max().to_array();
    (min[axis.index()] + max[axis.index()]) / 2.0
}

/// Recursively partitions `items` into a subtree. `items` is never empty:
/// the caller only recurses on non-empty halves of an already non-empty
/// split (`split_at` below guarantees both halves have at least one item).
fn build_node(arena: &mut Arena<NodeData>, mut items: Vec<(Aabb, ObjectIndex)>) -> NodeId {
    if items.len() == 1 {
        let (aabb, obj_index) = items[0];
        return arena.new_node(NodeData::Leaf { aabb, obj_index });
    }

    let combined = items
        .iter()
        .skip(1)
        .fold(items[0].0, |acc, &(aabb, _)| merge(acc, aabb));

    let min = combined.min().to_array();
    let max = combined.max().to_array();
    let extent = [max[0] - min[0], max[1] - min[1], max[2] - min[2]];
    let axis = argmax_axis(extent);

    // Stable sort: items with equal centers keep their relative input order.
    items.sort_by(|a, b| center_on_axis(a.0, axis).total_cmp(&center_on_axis(b.0, axis)));

    let len = items.len();
    let split = (len / 2).clamp(1, len - 1);
    let right_items = items.split_off(split);
    let left_items = items;

    let left = build_node(arena, left_items);
    let right = build_node(arena, right_items);
    let leaf_count = arena[left].get().leaf_count() + arena[right].get().leaf_count();

    let node = arena.new_node(NodeData::Internal { aabb: combined, leaf_count });
    node.append(left, arena);
    node.append(right, arena);
    node
}
