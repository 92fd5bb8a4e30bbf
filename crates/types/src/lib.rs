pub mod dimension;
pub mod geometry;

pub use dimension::{DimensionError, Margins, Orientation, PageDimensions, PageSize};
pub use geometry::{Rect, Size};
