//! The rendering-surface capability.
//!
//! A host with a live rendering surface (a webview, an embedded HTML
//! renderer, a canvas text stack) implements these traits so the measurer
//! can read real box geometry instead of estimating. Every probe is
//! fallible; the measurer folds all failures into the estimation path, so
//! errors here never escape the crate's public surface.

use quire_types::Rect;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SurfaceError {
    #[error("no rendered element at position {0}")]
    Missing(usize),
    #[error("rendering surface is detached")]
    Detached,
    #[error("surface probe failed: {0}")]
    Probe(String),
}

/// A host-rendered element resolved from a document position.
pub trait SurfaceElement {
    /// Rendered box height in pixels.
    fn box_height_px(&self) -> Result<f32, SurfaceError>;

    /// Rectangles (pixels, element-relative) for every text node and inline
    /// element in the block, in document order. Used by the line splitter.
    fn inline_rects_px(&self) -> Result<Vec<Rect>, SurfaceError>;
}

/// The rendering surface itself. Implementations must be cheap to probe;
/// `flush_layout` is the single forced-layout barrier per measurement batch.
pub trait RenderSurface {
    fn element_at(&self, pos: usize) -> Result<Box<dyn SurfaceElement + '_>, SurfaceError>;

    /// Force the host to flush pending layout so subsequent height reads are
    /// consistent. Called at most once per measurement batch.
    fn flush_layout(&self);

    /// Box height of the first top-level element, or `None` when the surface
    /// has no children yet. Used by the readiness gate.
    fn first_block_height_px(&self) -> Result<Option<f32>, SurfaceError>;

    /// Height of the surface's root container in pixels.
    fn container_height_px(&self) -> Result<f32, SurfaceError>;

    /// Number of top-level rendered children.
    fn child_count(&self) -> Result<usize, SurfaceError>;
}
