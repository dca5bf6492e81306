//! The [`CoreError`] taxonomy shared by every public entry point.
//!
//! All three kinds are programming errors, not recoverable I/O failures: the
//! crate propagates them with `?` and never retries internally.

use thiserror::Error;

/// Why a call was rejected before doing any work.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum InvalidInputError {
    /// [`crate::build`] was called with an empty AABB slice.
    #[error("cannot build a tree from zero AABBs")]
    EmptyInput,
    /// [`crate::update`] was called with a slice whose length doesn't match
    /// the tree's leaf count.
    #[error("update received {given} AABBs, tree has {expected} leaves")]
    LengthMismatch { expected: usize, given: usize },
    /// [`crate::extract_subdomains`] was called with `k == 0`.
    #[error("k must be at least 1")]
    ZeroK,
}

/// Errors surfaced at the boundary of `build`, `update`, `extract_subdomains`,
/// and `DomainTracker::match_domains`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Bad arguments; see [`InvalidInputError`] for the specific cases.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
    /// An internal node was reached during refit or extraction with fewer
    /// than two children. Unreachable under this crate's own invariants;
    /// surfaced rather than silently patched.
    #[error("inconsistent tree: {0}")]
    InconsistentTree(&'static str),
    /// The Hungarian routine failed to produce a full matching on its
    /// (padded, square) cost matrix. Unreachable for finite costs.
    #[error("assignment failure: {0}")]
    AssignmentFailure(&'static str),
}
