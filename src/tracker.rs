//! Cross-frame subdomain identity via minimum-cost assignment.
//!
//! [`DomainTracker`] holds the previous frame's groups and relabels each new
//! frame's groups so that slot `i` stays slot `i` across frames as much as
//! the symmetric-difference cost allows.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::ObjectIndex;

/// Cost assigned to a padded (phantom) row/column pair so real matches are
/// always preferred; large enough that no real symmetric-difference cost
/// (bounded by the total object count in practice) could compete with it.
const SENTINEL_COST: i64 = i64::MAX / 4;

/// Cardinality of the symmetric difference of two object-index sets.
fn symmetric_difference_card(a: &[ObjectIndex], b: &[ObjectIndex]) -> usize {
    let a: HashSet<ObjectIndex> = a.iter().copied().collect();
    let b: HashSet<ObjectIndex> = b.iter().copied().collect();
    a.symmetric_difference(&b).count()
}

/// Classical O(n^3) Hungarian algorithm (Jonker-Volgenant shortest
/// augmenting path variant) over a square cost matrix. Returns
/// `assignment[i]` = the column matched to row `i`, for every row.
///
/// Ties are broken by lower column index: the inner loop scans columns in
/// increasing order and only replaces the running minimum on a *strict*
/// improvement, so the first-seen minimal column wins.
fn hungarian(cost: &[Vec<i64>]) -> Vec<usize> {
    let n = cost.len();
    // 1-indexed throughout, row/col 0 are sentinels for "unmatched".
    let mut u = vec![0i64; n + 1];
    let mut v = vec![0i64; n + 1];
    let mut p = vec![0usize; n + 1]; // p[j] = row matched to column j
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![i64::MAX; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = i64::MAX;
            let mut j1 = 0usize;

            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let cur = cost[i0 - 1][j - 1] - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0usize; n];
    for j in 1..=n {
        if p[j] != 0 {
            assignment[p[j] - 1] = j - 1;
        }
    }
    assignment
}

/// Stabilizes subdomain identity across frames: `previous_groups` is
/// relabeled, not replaced, so slot `i` at frame `t` corresponds to slot `i`
/// at frame `t-1` under minimum symmetric difference.
#[derive(Debug, Default, Clone)]
pub struct DomainTracker {
    previous_groups: Vec<Vec<ObjectIndex>>,
}

impl DomainTracker {
    pub fn new() -> Self { Self::default() }

    /// On the first call, stores `new_groups` verbatim and returns them. On
    /// every later call, permutes `new_groups` to minimize total symmetric
    /// difference against the previous call's ordering, stores the result,
    /// and returns it.
    pub fn match_domains(&mut self, new_groups: Vec<Vec<ObjectIndex>>) -> Vec<Vec<ObjectIndex>> {
        if self.previous_groups.is_empty() {
            trace!(groups = new_groups.len(), "first frame, storing groups verbatim");
            self.previous_groups = new_groups.clone();
            return new_groups;
        }

        let p = self.previous_groups.len();
        let q = new_groups.len();
        let n = p.max(q);

        let mut cost = vec![vec![SENTINEL_COST; n]; n];
        for (i, prev) in self.previous_groups.iter().enumerate() {
            for (j, new) in new_groups.iter().enumerate() {
                cost[i][j] = symmetric_difference_card(prev, new) as i64;
            }
        }

        let assignment = hungarian(&cost);
        debug!(previous = p, new = q, "matched domains via Hungarian assignment");

        let ordered: Vec<Vec<ObjectIndex>> = (0..n)
            .map(|i| {
                let j = assignment[i];
                if j < q { new_groups[j].clone() } else { Vec::new() }
            })
            .collect();

        self.previous_groups = ordered.clone();
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_is_stored_verbatim() {
        let mut tracker = DomainTracker::new();
        let groups = vec![vec![0, 1, 2], vec![3, 4]];
        assert_eq!(tracker.match_domains(groups.clone()), groups);
    }

    /// Scenario 6: the same sets, shuffled, must come back in the original
    /// slot order (cost 0 on the diagonal after permutation).
    #[test]
    fn stable_sets_resolve_to_the_original_order() {
        let mut tracker = DomainTracker::new();
        tracker.match_domains(vec![vec![0, 1, 2], vec![3, 4], vec![5, 6]]);
        let result = tracker.match_domains(vec![vec![3, 4], vec![5, 6], vec![0, 1, 2]]);
        assert_eq!(result, vec![vec![0, 1, 2], vec![3, 4], vec![5, 6]]);
    }

    /// Scenario 7: one object drifts from slot 1 to slot 0; the minimal
    /// total cost (2) keeps each slot's majority membership.
    #[test]
    fn drifting_membership_keeps_slot_identity() {
        let mut tracker = DomainTracker::new();
        tracker.match_domains(vec![vec![0, 1, 2], vec![3, 4, 5]]);
        let result = tracker.match_domains(vec![vec![0, 1], vec![2, 3, 4, 5]]);
        assert_eq!(result, vec![vec![0, 1], vec![2, 3, 4, 5]]);
    }

    /// Idempotence: once stabilized, matching the same groups again returns
    /// them unchanged.
    #[test]
    fn idempotent_once_stabilized() {
        let mut tracker = DomainTracker::new();
        let groups = vec![vec![0, 1], vec![2, 3], vec![4, 5]];
        let first = tracker.match_domains(groups.clone());
        let second = tracker.match_domains(first.clone());
        assert_eq!(first, second);
        assert_eq!(second, groups);
    }

    #[test]
    fn growing_k_appends_unmatched_new_groups() {
        let mut tracker = DomainTracker::new();
        tracker.match_domains(vec![vec![0, 1]]);
        let result = tracker.match_domains(vec![vec![0, 1], vec![2, 3]]);
        assert_eq!(result, vec![vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn shrinking_k_pads_the_dropped_slot_with_empty() {
        let mut tracker = DomainTracker::new();
        tracker.match_domains(vec![vec![0, 1], vec![2, 3]]);
        let result = tracker.match_domains(vec![vec![0, 1]]);
        assert_eq!(result, vec![vec![0, 1], Vec::new()]);
    }

    #[test]
    fn symmetric_difference_card_matches_definition() {
        assert_eq!(symmetric_difference_card(&[0, 1, 2], &[2, 3]), 3);
        assert_eq!(symmetric_difference_card(&[0, 1], &[0, 1]), 0);
        assert_eq!(symmetric_difference_card(&[], &[1, 2]), 2);
    }
}
