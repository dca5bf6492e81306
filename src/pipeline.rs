//! Per-frame glue: build/update -> extract -> match, behind one call.
//!
//! A frame source is an external collaborator; this module is the seam it
//! calls once per frame, the way `rayna_engine::render::renderer::Renderer`
//! ties scene, camera, and render options into one `render()` call for its
//! own external driver to invoke. [`BvhPipeline`] is that seam and nothing
//! more: every operation it performs is one already specified on its own.

use tracing::trace;

use crate::aabb::Aabb;
use crate::builder::build;
use crate::error::CoreError;
use crate::subdomain::extract_subdomains;
use crate::tracker::DomainTracker;
use crate::tree::Tree;
use crate::updater::update;
use crate::ObjectIndex;

/// The seam an external frame source (e.g. a CSV reader) implements. The
/// core ships no implementation of this trait; CSV ingestion remains out of
/// scope, same as `rayna_engine::object::Object` and
/// `rayna_engine::skybox::Skybox` are seams the (also out-of-scope) UI crate
/// implements concrete choices for.
pub trait FrameSource {
    /// Returns the next frame's dense AABB slice (length constant across a
    /// session), or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Option<Vec<Aabb>>;
}

/// Owns a [`Tree`], a [`DomainTracker`], and the fixed `k`/`threshold` for a
/// tracking session; [`BvhPipeline::step`] runs exactly the per-frame
/// sequence build-or-update -> extract -> match and returns the result.
///
/// This is pure convenience over calling [`build`]/[`update`]/
/// [`extract_subdomains`]/[`DomainTracker::match_domains`] by hand.
pub struct BvhPipeline {
    tree: Option<Tree>,
    tracker: DomainTracker,
    k: usize,
    threshold: f32,
}

impl BvhPipeline {
    /// `k` is the number of subdomains extracted each frame;  `threshold` is
    /// the rebuild-vs-refit fraction passed to [`update`].
    pub fn new(k: usize, threshold: f32) -> Self {
        Self { tree: None, tracker: DomainTracker::new(), k, threshold }
    }

    /// Runs one frame: builds (first call) or updates (later calls) the
    /// tree from `aabbs`, extracts `k` subdomains, and relabels them against
    /// the previous frame's ordering. Returns the ordered groups.
    pub fn step(&mut self, aabbs: &[Aabb]) -> Result<Vec<Vec<ObjectIndex>>, CoreError> {
        trace!(k = self.k, has_tree = self.tree.is_some(), "stepping pipeline");

        let tree = match self.tree.take() {
            None => build(aabbs)?,
            Some(tree) => update(tree, aabbs, self.threshold)?,
        };

        let groups = extract_subdomains(&tree, self.k)?;
        self.tree = Some(tree);
        Ok(self.tracker.match_domains(groups))
    }

    /// Drains every frame `source` produces, running [`step`](Self::step) on
    /// each and collecting the ordered groups in order. Stops and propagates
    /// on the first error; does not retry.
    pub fn run(&mut self, mut source: impl FrameSource) -> Result<Vec<Vec<Vec<ObjectIndex>>>, CoreError> {
        let mut history = Vec::new();
        while let Some(aabbs) = source.next_frame() {
            history.push(self.step(&aabbs)?);
        }
        Ok(history)
    }
}
