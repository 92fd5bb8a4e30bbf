// --- Module Structure ---
// `quire-types`:    Stable primitive types for page geometry and dimensions.
// `quire-doc`:      The document tree (node vocabulary, positions, changes).
// `quire-paginate`: Measurement, page computation, and reflow orchestration.
//
// This facade crate re-exposes the pagination toolkit as one surface; editor
// bindings and exporters depend on `quire` alone.

pub use quire_doc::{
    ChangeKind, ChangeRange, DocChange, DocNode, Document, ImageAttrs, MappedRange, NodeKind,
};
pub use quire_paginate::{
    BlockLines, BlockMeasurement, CacheStats, ConfigPatch, DocumentMeta, EngineStats, LineInfo,
    LineSplitter, Measurer, PageBoundary, PageComputer, PaginationConfig, PaginationEngine,
    PaginationError, PaginationModel, Placement, ReadinessConfig, ReadinessGate, ReadinessReport,
    RenderSurface, Scheduler, Spacer, SpacerParams, SplitPoint, Subscription, SurfaceElement,
    SurfaceError, TimerHandle, VirtualScheduler, build_spacers,
};
pub use quire_types::{
    DimensionError, Margins, Orientation, PageDimensions, PageSize, Rect, Size,
};
