//! Codec module
//!
//! Converts between encoded containers and packed raw pixel arrays.

mod image_codec;
mod tiff_codec;
pub mod types;

pub use image_codec::ImageCodec;
pub use tiff_codec::TiffCodec;
pub use types::{DecodedImage, EncodeSource};
