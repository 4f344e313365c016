use rayon::prelude::*;
use tracing::{debug, warn};

use crate::image_pipeline::bridge::channels::ChannelState;
use crate::image_pipeline::codec::{EncodeSource, ImageCodec, TiffCodec};
use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::context::{
    BufferLayout, FrameOrigin, ImageContext, RawFrame, Resolution,
};

/// Moves images between their caller-facing form and the raw working form the
/// processing strategies operate on.
pub struct FormatBridge<C: ImageCodec = TiffCodec> {
    codec: C,
}

impl FormatBridge<TiffCodec> {
    pub fn new() -> Self {
        Self { codec: TiffCodec }
    }
}

impl Default for FormatBridge<TiffCodec> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ImageCodec> FormatBridge<C> {
    pub fn with_codec(codec: C) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Produces the raw working frame for `ctx`.
    ///
    /// A raw context hands its buffer over without copying; `ctx.data` is left empty until
    /// [`finalize`](Self::finalize) or [`restore`](Self::restore) puts a buffer back. An
    /// encoded context is decoded and left untouched.
    pub fn to_raw(&self, ctx: &mut ImageContext) -> Result<RawFrame> {
        match ctx.layout {
            BufferLayout::Raw {
                stride,
                pixel_format,
            } => {
                let Resolution { width, height } = ctx.resolution;
                if width == 0 || height == 0 {
                    return Err(PipelineError::InvalidDimensions(width, height));
                }
                let row_bytes = width * pixel_format.bytes_per_pixel();
                if stride < row_bytes {
                    return Err(PipelineError::InvalidDimensions(width, height));
                }
                let expected = (height - 1) * stride + row_bytes;
                if ctx.data.len() < expected {
                    return Err(PipelineError::BufferTooSmall {
                        expected,
                        actual: ctx.data.len(),
                    });
                }

                Ok(RawFrame {
                    data: std::mem::take(&mut ctx.data),
                    resolution: ctx.resolution,
                    stride,
                    pixel_format,
                    origin: FrameOrigin::Raw,
                })
            }
            BufferLayout::Encoded => {
                let decoded = self.codec.decode(&ctx.data)?;
                if decoded.width == 0 || decoded.height == 0 {
                    return Err(PipelineError::DecodeError(format!(
                        "decoded image is empty ({}x{})",
                        decoded.width, decoded.height
                    )));
                }
                debug!(
                    "Decoded {}x{} {:?} working frame",
                    decoded.width, decoded.height, decoded.pixel_format
                );

                let stride = decoded.stride();
                let resolution = Resolution::new(decoded.width, decoded.height);
                ctx.resolution = resolution;
                Ok(RawFrame {
                    data: decoded.data,
                    resolution,
                    stride,
                    pixel_format: decoded.pixel_format,
                    origin: FrameOrigin::Decoded,
                })
            }
        }
    }

    /// Resolves the channel convention for `frame` given where `ctx` is headed.
    pub fn channel_offsets(frame: &RawFrame, ctx: &ImageContext) -> ChannelState {
        match (frame.origin, ctx.store_format.is_some()) {
            (FrameOrigin::Raw, false) => ChannelState::RGB,
            (FrameOrigin::Raw, true) => ChannelState::RGB_TO_BGR,
            (FrameOrigin::Decoded, _) => ChannelState::BGR,
        }
    }

    /// Writes the processed `frame` back into `ctx`.
    ///
    /// With a store format the frame (expected in blue-green-red order) is encoded and `ctx`
    /// becomes an encoded context. Without one `ctx` becomes a raw context in red-green-blue
    /// order. If encoding fails, a raw-sourced frame is still handed back raw before the
    /// error is returned; an encoded-sourced context keeps its original bytes.
    pub fn finalize(&self, mut frame: RawFrame, ctx: &mut ImageContext) -> Result<()> {
        let Some(format) = ctx.store_format else {
            if frame.origin == FrameOrigin::Decoded {
                reorder_red_blue(&mut frame);
            }
            return_raw(frame, ctx);
            return Ok(());
        };

        let encoded = self.codec.encode(
            EncodeSource {
                data: &frame.data,
                width: frame.resolution.width,
                height: frame.resolution.height,
                stride: frame.stride,
                pixel_format: frame.pixel_format,
            },
            &format,
        );

        match encoded {
            Ok(bytes) => {
                debug!("Re-encoded frame into {} bytes", bytes.len());
                ctx.data = bytes;
                ctx.layout = BufferLayout::Encoded;
                ctx.resolution = frame.resolution;
                Ok(())
            }
            Err(e) => {
                if frame.origin == FrameOrigin::Raw {
                    warn!("Encoding failed, returning processed buffer raw");
                    reorder_red_blue(&mut frame);
                    return_raw(frame, ctx);
                }
                Err(e)
            }
        }
    }

    /// Hands an unprocessed frame back after a failure between `to_raw` and dispatch.
    pub fn restore(&self, frame: RawFrame, ctx: &mut ImageContext) {
        if frame.origin == FrameOrigin::Raw {
            return_raw(frame, ctx);
        }
    }
}

fn return_raw(frame: RawFrame, ctx: &mut ImageContext) {
    ctx.data = frame.data;
    ctx.resolution = frame.resolution;
    ctx.layout = BufferLayout::Raw {
        stride: frame.stride,
        pixel_format: frame.pixel_format,
    };
}

fn reorder_red_blue(frame: &mut RawFrame) {
    let bpp = frame.bytes_per_pixel();
    let row_bytes = frame.resolution.width * bpp;
    frame
        .data
        .par_chunks_mut(frame.stride)
        .take(frame.resolution.height)
        .for_each(|row| {
            for px in row[..row_bytes].chunks_exact_mut(bpp) {
                px.swap(0, 2);
            }
        });
}
