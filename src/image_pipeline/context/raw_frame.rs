use crate::image_pipeline::context::types::{PixelFormat, Resolution};

/// Where the bytes of a [`RawFrame`] came from, which fixes their channel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOrigin {
    /// Taken from a raw context: red-green-blue order.
    Raw,
    /// Produced by the codec: blue-green-red order.
    Decoded,
}

/// The raw working image the engine processes in place.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub data: Vec<u8>,
    pub resolution: Resolution,
    pub stride: usize,
    pub pixel_format: PixelFormat,
    pub origin: FrameOrigin,
}

impl RawFrame {
    pub fn bytes_per_pixel(&self) -> usize {
        self.pixel_format.bytes_per_pixel()
    }
}
