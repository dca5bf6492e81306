//! Greedy selection of the `K` subtrees with the most leaves.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::trace;

use crate::error::{CoreError, InvalidInputError};
use crate::tree::Tree;
use crate::ObjectIndex;

/// One entry in the bounded priority queue: a candidate subtree, its cached
/// leaf count, and a monotonically increasing insertion counter used to
/// break ties FIFO (the order nodes were pushed, not node identity).
struct Candidate {
    node: indextree::NodeId,
    leaf_count: usize,
    counter: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool { self.leaf_count == other.leaf_count && self.counter == other.counter }
}
impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for Candidate {
    /// Larger `leaf_count` pops first; on a tie, the *earlier* insertion
    /// counter pops first (FIFO), so this reverses counter comparison.
    fn cmp(&self, other: &Self) -> Ordering {
        self.leaf_count.cmp(&other.leaf_count).then_with(|| other.counter.cmp(&self.counter))
    }
}

/// Greedily splits `tree` into exactly `k` groups of object indices: the
/// `k` largest coherent subtrees by leaf count, pairwise disjoint, padded
/// with empty groups if the tree has fewer than `k` leaves.
///
/// Every internal node has `leaf_count >= 2` (it merges at least two
/// leaves), while every leaf has `leaf_count == 1`, the minimum possible.
/// The moment the largest remaining candidate is a leaf, every other
/// candidate in the queue is too, since nothing left can still be split.
/// That termination check falls directly out of the invariant, with no
/// separate pass needed.
pub fn extract_subdomains(tree: &Tree, k: usize) -> Result<Vec<Vec<ObjectIndex>>, CoreError> {
    if k == 0 {
        return Err(InvalidInputError::ZeroK.into());
    }
    trace!(k, leaves = tree.leaf_total(), "extracting subdomains");

    let mut counter = 0usize;
    let mut heap = BinaryHeap::new();
    heap.push(Candidate { node: tree.root_id(), leaf_count: tree.leaf_count_of(tree.root_id()), counter });
    counter += 1;

    while heap.len() < k {
        let Some(top) = heap.peek() else { break };
        if tree.is_leaf(top.node) {
            break;
        }

        let top = heap.pop().expect("just peeked Some");
        let (left, right) = tree.children_of(top.node)?;
        heap.push(Candidate { node: left, leaf_count: tree.leaf_count_of(left), counter });
        counter += 1;
        heap.push(Candidate { node: right, leaf_count: tree.leaf_count_of(right), counter });
        counter += 1;
    }

    let mut groups = Vec::with_capacity(k);
    while let Some(candidate) = heap.pop() {
        groups.push(tree.collect_leaf_indices(candidate.node));
    }
    groups.resize_with(k, Vec::new);

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::{Aabb, CoreError, InvalidInputError};
    use glam::Vec3;
    use std::collections::HashSet;

    fn cube(cx: f32) -> Aabb { Aabb::new(Vec3::new(cx, 0., 0.), Vec3::new(cx + 1., 1., 1.)) }

    fn row(n: usize) -> Vec<Aabb> { (0..n).map(|i| cube(i as f32 * 3.0)).collect() }

    fn assert_partition(groups: &[Vec<ObjectIndex>], k: usize, n: usize) {
        assert_eq!(groups.len(), k);
        let mut seen = HashSet::new();
        for g in groups {
            for &idx in g {
                assert!(seen.insert(idx), "object {idx} appeared in more than one group");
                assert!(idx < n);
            }
        }
    }

    #[test]
    fn zero_k_is_rejected() {
        let tree = build(&row(3)).unwrap();
        assert_eq!(
            extract_subdomains(&tree, 0).unwrap_err(),
            CoreError::InvalidInput(InvalidInputError::ZeroK)
        );
    }

    #[test]
    fn k_one_returns_everything_in_one_group() {
        let n = 9;
        let tree = build(&row(n)).unwrap();
        let groups = extract_subdomains(&tree, 1).unwrap();
        assert_eq!(groups.len(), 1);
        let mut only = groups[0].clone();
        only.sort();
        assert_eq!(only, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn k_equal_to_n_returns_all_singletons() {
        let n = 5;
        let tree = build(&row(n)).unwrap();
        let groups = extract_subdomains(&tree, n).unwrap();
        assert_partition(&groups, n, n);
        assert!(groups.iter().all(|g| g.len() == 1));
    }

    #[test]
    fn k_greater_than_n_pads_with_empty_groups() {
        let n = 5;
        let tree = build(&row(n)).unwrap();
        let groups = extract_subdomains(&tree, n + 1).unwrap();
        assert_partition(&groups, n + 1, n);
        assert_eq!(groups.iter().filter(|g| g.is_empty()).count(), 1);
        assert_eq!(groups.iter().filter(|g| !g.is_empty()).count(), n);
    }

    /// Scenario 5: 7 leaves, K=3, sizes sum to 7, disjoint, and strictly
    /// decreasing (FIFO tie-break only matters for equal sizes).
    #[test]
    fn k_three_partitions_seven_leaves() {
        let n = 7;
        let tree = build(&row(n)).unwrap();
        let groups = extract_subdomains(&tree, 3).unwrap();
        assert_partition(&groups, 3, n);
        let total: usize = groups.iter().map(Vec::len).sum();
        assert_eq!(total, n);
        for pair in groups.windows(2) {
            assert!(pair[0].len() >= pair[1].len());
        }
    }

    #[test]
    fn union_covers_all_objects_when_tree_has_at_least_k_leaves() {
        let n = 12;
        let tree = build(&row(n)).unwrap();
        for k in 1..=n {
            let groups = extract_subdomains(&tree, k).unwrap();
            let covered: usize = groups.iter().map(Vec::len).sum();
            assert_eq!(covered, n, "k={k} should cover every object");
        }
    }
}
