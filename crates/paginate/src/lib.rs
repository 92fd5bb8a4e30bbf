//! Pagination core: turns a document tree into an ordered sequence of page
//! boundaries for virtualized rendering and export backends.
//!
//! The crate is built from three coupled pieces: the [`measure::Measurer`]
//! computes block heights (renderer probe or content estimation, behind a
//! content-hash cache), the [`compute::PageComputer`] packs measured blocks
//! into pages, and the [`reflow::PaginationEngine`] owns both and converts
//! editor change notifications into debounced, incremental recomputation.

use quire_types::DimensionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaginationError {
    #[error(transparent)]
    InvalidDimensions(#[from] DimensionError),
    #[error("no measurer attached; attach one before computing pages")]
    MeasurerNotAttached,
}

pub mod compute;
pub mod config;
pub mod line_split;
pub mod measure;
pub mod model;
pub mod readiness;
pub mod reflow;
pub mod scheduler;
pub mod surface;
pub mod visual;

pub use self::compute::PageComputer;
pub use self::config::{ConfigPatch, DocumentMeta, PaginationConfig};
pub use self::line_split::{BlockLines, LineInfo, LineSplitter, SplitPoint};
pub use self::measure::{BlockMeasurement, CacheStats, Measurer};
pub use self::model::{PageBoundary, PaginationModel, Placement};
pub use self::readiness::{ReadinessConfig, ReadinessGate, ReadinessReport};
pub use self::reflow::{EngineStats, PaginationEngine, Subscription};
pub use self::scheduler::{Scheduler, TimerHandle, VirtualScheduler};
pub use self::surface::{RenderSurface, SurfaceElement, SurfaceError};
pub use self::visual::{Spacer, SpacerParams, build_spacers};

#[cfg(test)]
mod test_utils;
