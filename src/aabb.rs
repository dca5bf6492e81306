//! Axis-aligned bounding box primitives: merge, volume, overlap, equality.
//!
//! Everything here is a pure function over [`Aabb`] values; there is no
//! tree-shaped state in this module.

use getset::CopyGetters;
use glam::Vec3;

/// An axis-aligned bounding box, spanning between two corners.
///
/// `min[d] <= max[d]` for every axis `d` is an invariant of every [`Aabb`]
/// this crate constructs, though it is not enforced by the type itself (the
/// builder and updater are the only producers, and both uphold it).
///
/// Equality is bitwise-exact on all six components (`#[derive(PartialEq)]`
/// on `f32`): no epsilon tolerance. Sub-ULP float noise is therefore *not*
/// "equal" here, but the updater treats it as "unchanged" anyway since it
/// uses this same bitwise comparison to flag leaves dirty.
#[derive(CopyGetters, Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[getset(get_copy = "pub")]
pub struct Aabb {
    min: Vec3,
    max: Vec3,
}

impl Aabb {
    /// Builds an AABB from already-sorted corners. Callers are responsible
    /// for `min <= max` componentwise; this is the only constructor, and the
    /// builder/updater are the only callers, both of which read corners
    /// straight from caller-supplied input.
    pub fn new(min: Vec3, max: Vec3) -> Self { Self { min, max } }
}

/// Componentwise `min`/`max` of two boxes; the smallest box containing both.
pub fn merge(a: Aabb, b: Aabb) -> Aabb { Aabb::new(a.min.min(b.min), a.max.max(b.max)) }

/// Product over axes of `max(0, extent)`.
pub fn volume(a: Aabb) -> f32 {
    let extent = (a.max - a.min).max(Vec3::ZERO);
    extent.x * extent.y * extent.z
}

/// Product over axes of the overlapping extent; `0` as soon as any axis has
/// no overlap.
pub fn overlap(a: Aabb, b: Aabb) -> f32 {
    let lo = a.min.max(b.min);
    let hi = a.max.min(b.max);
    let extent = (hi - lo).max(Vec3::ZERO);
    extent.x * extent.y * extent.z
}

/// Bitwise-exact equality; equivalent to `a == b` but spelled out so the
/// "changed leaf" check in [`crate::updater`] reads as a named operation
/// rather than a stray `!=`.
pub fn equal(a: Aabb, b: Aabb) -> bool { a == b }
