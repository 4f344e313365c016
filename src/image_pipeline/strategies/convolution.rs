//! Matrix convolution strategy.
//!
//! Every cell is filtered in place, column by column. A pixel's neighbourhood may already
//! contain results written earlier in the same pass, so this is a single-pass
//! approximation rather than a convolution over a source snapshot; the fixed visiting
//! order keeps it reproducible.
//!
//! Only pixels with `x > kernel width` and `y > kernel height` are filtered. The band along
//! the top and left edges keeps its source values; the bottom and right edges have no such
//! band. Neighbour coordinates are clamped to the image per axis.
//!
//! When the working buffer has to be reordered for the store format, the red/blue swap
//! runs as a second fork-join over the cells once the whole filtering pass has joined.

use tracing::{debug, instrument};

use crate::image_pipeline::cells::{CellGeometry, GridGeometry};
use crate::image_pipeline::codec::{ImageCodec, TiffCodec};
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::context::ImageContext;
use crate::image_pipeline::engine::{CellEngine, CellTask, EngineConfig, ImageProcessor};
use crate::image_pipeline::strategies::kernel::Kernel;

pub struct ConvolutionProcessor<G: CellGeometry = GridGeometry, C: ImageCodec = TiffCodec> {
    engine: CellEngine<G, C>,
    kernel: Kernel,
}

impl ConvolutionProcessor<GridGeometry, TiffCodec> {
    pub fn new(kernel: Kernel, config: EngineConfig) -> Result<Self> {
        Ok(Self::with_engine(CellEngine::new(config)?, kernel))
    }
}

impl<G: CellGeometry, C: ImageCodec> ConvolutionProcessor<G, C> {
    pub fn with_engine(engine: CellEngine<G, C>, kernel: Kernel) -> Self {
        Self { engine, kernel }
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn engine(&self) -> &CellEngine<G, C> {
        &self.engine
    }

    /// Filters `ctx` with `kernel` instead of the processor's own kernel.
    #[instrument(skip_all, fields(kernel_width = kernel.width(), kernel_height = kernel.height()))]
    pub fn apply_kernel(&self, kernel: &Kernel, ctx: &mut ImageContext) -> Result<()> {
        debug!("Applying convolution, weight sum {:.3}", kernel.sum());

        let mut prepared = self.engine.prepare(ctx)?;
        let swap_needed = prepared.channels.swap_needed;

        let mut dispatched = self.engine.dispatch(&mut prepared, |task| {
            convolve_cell(task, kernel);
            Ok(())
        });
        // Neighbourhoods cross cell borders, so no cell may be reordered before every
        // cell has been filtered.
        if dispatched.is_ok() && swap_needed {
            dispatched = self.engine.dispatch(&mut prepared, |task| {
                task.swap_red_blue();
                Ok(())
            });
        }
        if let Err(e) = dispatched {
            self.engine.abort(prepared, ctx);
            return Err(e);
        }
        self.engine.finalize(prepared, ctx)
    }
}

impl<G: CellGeometry, C: ImageCodec> ImageProcessor for ConvolutionProcessor<G, C> {
    fn apply(&self, ctx: &mut ImageContext) -> Result<()> {
        self.apply_kernel(&self.kernel, ctx)
    }
}

fn convolve_cell(task: CellTask<'_>, kernel: &Kernel) {
    let CellTask {
        cell,
        buffer,
        frame,
        ..
    } = task;
    let (kernel_width, kernel_height) = (kernel.width(), kernel.height());
    let (half_width, half_height) = (kernel_width / 2, kernel_height / 2);
    let (max_x, max_y) = (frame.width - 1, frame.height - 1);

    for x in cell.x..cell.right() {
        for y in cell.y..cell.bottom() {
            if x <= kernel_width || y <= kernel_height {
                continue;
            }

            let mut sums = [0f64; 3];
            for u in 0..kernel_height {
                let source_y = (y + u).saturating_sub(half_height).min(max_y);
                for t in 0..kernel_width {
                    let source_x = (x + t).saturating_sub(half_width).min(max_x);
                    let weight = kernel.weight(t, u);
                    let source = frame.pixel_index(source_x, source_y);
                    for (c, sum) in sums.iter_mut().enumerate() {
                        *sum += weight * f64::from(buffer.get(source + c));
                    }
                }
            }

            let index = frame.pixel_index(x, y);
            for (c, sum) in sums.into_iter().enumerate() {
                buffer.set(index + c, narrow(sum));
            }
        }
    }
}

/// Negative sums floor to zero. There is no upper clamp beyond the saturating cast, so
/// kernels whose weights sum above one can blow out bright regions.
#[inline]
fn narrow(sum: f64) -> u8 {
    sum.max(0.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_floors_negatives_and_rounds() {
        assert_eq!(narrow(-12.0), 0);
        assert_eq!(narrow(9.9999), 10);
        assert_eq!(narrow(300.0), 255);
    }
}
