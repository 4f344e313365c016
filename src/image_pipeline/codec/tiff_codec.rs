//! TIFF codec built on the `tiff` crate.
//!
//! Decoding always yields blue-green-red ordered pixels and encoding expects them, so the
//! rest of the pipeline can reason about a single convention for encoded-sourced buffers.

use std::io::Cursor;

use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};
use tracing::debug;

use crate::image_pipeline::codec::image_codec::ImageCodec;
use crate::image_pipeline::codec::types::{DecodedImage, EncodeSource};
use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::context::{PixelFormat, StoreFormat, TiffCompression, TiffOptions};

pub struct TiffCodec;

impl ImageCodec for TiffCodec {
    /// Decodes a TIFF container into packed blue-green-red pixels.
    ///
    /// 8-bit RGB maps to [`PixelFormat::Rgb24`] and 8-bit RGBA to [`PixelFormat::Rgba32`].
    /// Grayscale (with or without alpha) and 16-bit variants are converted to
    /// [`PixelFormat::Rgba32`]; 16-bit samples keep their high byte.
    fn decode(&self, data: &[u8]) -> Result<DecodedImage> {
        debug!("Decoding TIFF image, {} bytes", data.len());

        let mut decoder = Decoder::new(Cursor::new(data))
            .map_err(|e| PipelineError::DecodeError(e.to_string()))?;
        let (width, height) = decoder
            .dimensions()
            .map_err(|e| PipelineError::DecodeError(e.to_string()))?;
        let color_type = decoder
            .colortype()
            .map_err(|e| PipelineError::DecodeError(e.to_string()))?;
        let samples = match decoder
            .read_image()
            .map_err(|e| PipelineError::DecodeError(e.to_string()))?
        {
            DecodingResult::U8(values) => values,
            DecodingResult::U16(values) => values.iter().map(|&v| (v >> 8) as u8).collect(),
            _ => {
                return Err(PipelineError::DecodeError(format!(
                    "unsupported sample type for {:?}",
                    color_type
                )));
            }
        };

        let (width, height) = (width as usize, height as usize);
        debug!("Decoded image: {}x{} {:?}", width, height, color_type);

        let (pixel_format, data) = to_bgr_pixels(&samples, width * height, color_type)?;
        Ok(DecodedImage {
            width,
            height,
            pixel_format,
            data,
        })
    }

    fn encode(&self, source: EncodeSource<'_>, format: &StoreFormat) -> Result<Vec<u8>> {
        let options = match format {
            StoreFormat::Tiff(options) => options,
            other => {
                return Err(PipelineError::EncodeError(format!(
                    "unsupported target format: {:?}",
                    other
                )));
            }
        };

        debug!("Encoding TIFF image: {}x{}", source.width, source.height);

        if source.width == 0 || source.height == 0 {
            return Err(PipelineError::EncodeError(format!(
                "cannot encode an empty {}x{} image",
                source.width, source.height
            )));
        }

        let packed = pack_rgb(source)?;
        let (width, height) = (source.width as u32, source.height as u32);

        let mut buffer = Vec::new();
        {
            let mut encoder = tiff::encoder::TiffEncoder::new(Cursor::new(&mut buffer))
                .map_err(|e| PipelineError::EncodeError(e.to_string()))?
                .with_compression(compression_for(options));

            if let Some(predictor_val) = options.predictor {
                let predictor = match predictor_val {
                    2 => tiff::tags::Predictor::Horizontal,
                    _ => tiff::tags::Predictor::None,
                };
                encoder = encoder.with_predictor(predictor);
            }

            match source.pixel_format {
                PixelFormat::Rgb24 | PixelFormat::Rgb32 => {
                    encoder.write_image::<tiff::encoder::colortype::RGB8>(width, height, &packed)
                }
                PixelFormat::Rgba32 => {
                    encoder.write_image::<tiff::encoder::colortype::RGBA8>(width, height, &packed)
                }
            }
            .map_err(|e| PipelineError::EncodeError(e.to_string()))?;
        }

        debug!("TIFF encoding complete, {} bytes", buffer.len());
        Ok(buffer)
    }
}

fn compression_for(options: &TiffOptions) -> tiff::encoder::Compression {
    use tiff::encoder::compression::DeflateLevel;

    match options.compression {
        TiffCompression::None => tiff::encoder::Compression::Uncompressed,
        TiffCompression::Lzw => tiff::encoder::Compression::Lzw,
        TiffCompression::DeflateFast => tiff::encoder::Compression::Deflate(DeflateLevel::Fast),
        TiffCompression::DeflateBalanced => {
            tiff::encoder::Compression::Deflate(DeflateLevel::Balanced)
        }
        TiffCompression::DeflateBest => tiff::encoder::Compression::Deflate(DeflateLevel::Best),
    }
}

fn to_bgr_pixels(
    samples: &[u8],
    pixel_count: usize,
    color_type: ColorType,
) -> Result<(PixelFormat, Vec<u8>)> {
    let channels = match color_type {
        ColorType::Gray(8 | 16) => 1,
        ColorType::GrayA(8 | 16) => 2,
        ColorType::RGB(8 | 16) => 3,
        ColorType::RGBA(8 | 16) => 4,
        other => {
            return Err(PipelineError::DecodeError(format!(
                "unsupported color type: {:?}",
                other
            )));
        }
    };

    let expected = pixel_count * channels;
    if samples.len() < expected {
        return Err(PipelineError::DecodeError(format!(
            "truncated image data: expected {} samples, got {}",
            expected,
            samples.len()
        )));
    }

    let samples = &samples[..expected];
    let converted = match channels {
        3 => (
            PixelFormat::Rgb24,
            samples
                .chunks_exact(3)
                .flat_map(|p| [p[2], p[1], p[0]])
                .collect(),
        ),
        4 => (
            PixelFormat::Rgba32,
            samples
                .chunks_exact(4)
                .flat_map(|p| [p[2], p[1], p[0], p[3]])
                .collect(),
        ),
        2 => (
            PixelFormat::Rgba32,
            samples
                .chunks_exact(2)
                .flat_map(|p| [p[0], p[0], p[0], p[1]])
                .collect(),
        ),
        _ => (
            PixelFormat::Rgba32,
            samples.iter().flat_map(|&g| [g, g, g, u8::MAX]).collect(),
        ),
    };
    Ok(converted)
}

/// Strips row padding and reorders blue-green-red pixels into the red-green-blue samples
/// TIFF stores. The padding byte of `Rgb32` is dropped.
fn pack_rgb(source: EncodeSource<'_>) -> Result<Vec<u8>> {
    let bpp = source.pixel_format.bytes_per_pixel();
    let row_bytes = source.width * bpp;
    let required = (source.height - 1) * source.stride + row_bytes;
    if source.stride < row_bytes || source.data.len() < required {
        return Err(PipelineError::EncodeError(format!(
            "buffer of {} bytes does not hold {}x{} pixels at stride {}",
            source.data.len(),
            source.width,
            source.height,
            source.stride
        )));
    }

    let keep_alpha = source.pixel_format == PixelFormat::Rgba32;
    let out_channels = if keep_alpha { 4 } else { 3 };
    let mut packed = Vec::with_capacity(source.width * source.height * out_channels);

    for row in source.data.chunks(source.stride).take(source.height) {
        for px in row[..row_bytes].chunks_exact(bpp) {
            packed.extend_from_slice(&[px[2], px[1], px[0]]);
            if keep_alpha {
                packed.push(px[3]);
            }
        }
    }
    Ok(packed)
}
