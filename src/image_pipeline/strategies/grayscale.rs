use crate::image_pipeline::cells::{CellGeometry, GridGeometry};
use crate::image_pipeline::codec::{ImageCodec, TiffCodec};
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::context::ImageContext;
use crate::image_pipeline::engine::{CellEngine, EngineConfig, ImageProcessor};
use crate::image_pipeline::strategies::metadata::{PixelInfo, Rgb};
use crate::image_pipeline::strategies::pixel_delegate::PixelDelegateProcessor;

/// Replaces every pixel with its ITU-R BT.601 luma.
pub struct GrayscaleProcessor<G: CellGeometry = GridGeometry, C: ImageCodec = TiffCodec> {
    delegate: PixelDelegateProcessor<G, C>,
}

impl GrayscaleProcessor<GridGeometry, TiffCodec> {
    pub fn new(config: EngineConfig) -> Result<Self> {
        Ok(Self::with_engine(CellEngine::new(config)?))
    }
}

impl<G: CellGeometry, C: ImageCodec> GrayscaleProcessor<G, C> {
    pub fn with_engine(engine: CellEngine<G, C>) -> Self {
        Self {
            delegate: PixelDelegateProcessor::with_engine(engine),
        }
    }
}

impl<G: CellGeometry, C: ImageCodec> ImageProcessor for GrayscaleProcessor<G, C> {
    fn apply(&self, ctx: &mut ImageContext) -> Result<()> {
        self.delegate
            .apply_channels_only(ctx, luma, PixelInfo::default())
    }
}

fn luma(pixel: &PixelInfo) -> Rgb {
    let y = 0.299 * f64::from(pixel.red)
        + 0.587 * f64::from(pixel.green)
        + 0.114 * f64::from(pixel.blue);
    let y = y.round().min(255.0) as u8;
    (y, y, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luma_weights_channels() {
        let white = PixelInfo {
            red: 255,
            green: 255,
            blue: 255,
            ..Default::default()
        };
        assert_eq!(luma(&white), (255, 255, 255));

        let red = PixelInfo {
            red: 200,
            ..Default::default()
        };
        assert_eq!(luma(&red), (60, 60, 60));
    }
}
