//! Image processing pipeline module
//!
//! Cell-parallel image processing: images arrive raw or encoded, get partitioned into
//! rectangular cells and are processed concurrently by one of the bundled strategies
//! before being re-encoded (or handed back raw).

pub mod bridge;
pub mod cells;
pub mod codec;
pub mod common;
pub mod context;
pub mod engine;
pub mod strategies;

pub use common::{PipelineError, Result};

pub use context::{
    BufferLayout, FrameFlags, ImageContext, PixelFormat, Resolution, StoreFormat,
    TiffCompression, TiffOptions,
};

pub use codec::{ImageCodec, TiffCodec};

pub use bridge::{ChannelState, FormatBridge};

pub use cells::{CellGeometry, CellRect, FrameMetadata, GridGeometry};

pub use engine::{CellEngine, CellTask, EngineConfig, EngineConfigBuilder, ImageProcessor};

pub use strategies::{
    CellDelegateProcessor, ConvolutionProcessor, GrayscaleProcessor, Kernel, PixelDelegateProcessor,
    PixelInfo, PixelMetadata, Rgb,
};
