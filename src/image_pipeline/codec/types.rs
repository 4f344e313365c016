//! Codec data types

use crate::image_pipeline::context::PixelFormat;

/// Pixels produced by decoding a container.
///
/// Always packed (`stride == width * bytes_per_pixel`) and in blue-green-red byte order.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: usize,
    pub height: usize,
    pub pixel_format: PixelFormat,
    pub data: Vec<u8>,
}

impl DecodedImage {
    pub fn stride(&self) -> usize {
        self.width * self.pixel_format.bytes_per_pixel()
    }
}

/// A raw buffer to be encoded. Pixels must be in blue-green-red byte order.
#[derive(Debug, Clone, Copy)]
pub struct EncodeSource<'a> {
    pub data: &'a [u8],
    pub width: usize,
    pub height: usize,
    pub stride: usize,
    pub pixel_format: PixelFormat,
}
