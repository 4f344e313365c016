//! Image context module
//!
//! The data model passed across the pipeline boundary: one pixel buffer plus the
//! information needed to interpret it.

mod image_context;
mod raw_frame;
pub mod types;

pub use image_context::ImageContext;
pub use raw_frame::{FrameOrigin, RawFrame};
pub use types::{
    BufferLayout, FrameFlags, PixelFormat, Resolution, StoreFormat, TiffCompression, TiffOptions,
};
