//! Cell geometry module
//!
//! Partitions a raw frame into disjoint rectangles and exposes the shared buffer view
//! workers mutate concurrently.

pub mod buffer;
mod geometry;
pub mod types;

pub use buffer::CellBuffer;
pub use geometry::{CellGeometry, GridGeometry, validate_tiling};
pub use types::{CellGrid, CellRect, FrameMetadata};
