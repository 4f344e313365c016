//! Per-pixel delegate strategy.
//!
//! Calls a user function once per pixel. Cells run concurrently; pixels inside a cell run
//! in row-major order. Channels are read through the resolved red/blue offsets and written
//! back through the store offsets, so the function always sees and returns red-green-blue.

use tracing::instrument;

use crate::image_pipeline::bridge::ChannelState;
use crate::image_pipeline::cells::{CellGeometry, GridGeometry};
use crate::image_pipeline::codec::{ImageCodec, TiffCodec};
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::context::ImageContext;
use crate::image_pipeline::engine::{CellEngine, CellTask, EngineConfig};
use crate::image_pipeline::strategies::metadata::{PixelMetadata, Rgb};

pub struct PixelDelegateProcessor<G: CellGeometry = GridGeometry, C: ImageCodec = TiffCodec> {
    engine: CellEngine<G, C>,
}

impl PixelDelegateProcessor<GridGeometry, TiffCodec> {
    pub fn new(config: EngineConfig) -> Result<Self> {
        Ok(Self::with_engine(CellEngine::new(config)?))
    }
}

impl<G: CellGeometry, C: ImageCodec> PixelDelegateProcessor<G, C> {
    pub fn with_engine(engine: CellEngine<G, C>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &CellEngine<G, C> {
        &self.engine
    }

    /// Calls `pixel_fn` for every pixel with width, height, position and channels filled in.
    #[instrument(skip_all)]
    pub fn apply<M, F>(&self, ctx: &mut ImageContext, pixel_fn: F, initial: M) -> Result<()>
    where
        M: PixelMetadata,
        F: Fn(&M) -> Rgb + Send + Sync,
    {
        self.process(ctx, pixel_fn, initial, true)
    }

    /// Like [`apply`](Self::apply) but leaves `x`/`y` unset, for functions that only look
    /// at channel values.
    #[instrument(skip_all)]
    pub fn apply_channels_only<M, F>(
        &self,
        ctx: &mut ImageContext,
        pixel_fn: F,
        initial: M,
    ) -> Result<()>
    where
        M: PixelMetadata,
        F: Fn(&M) -> Rgb + Send + Sync,
    {
        self.process(ctx, pixel_fn, initial, false)
    }

    fn process<M, F>(
        &self,
        ctx: &mut ImageContext,
        pixel_fn: F,
        mut initial: M,
        positioned: bool,
    ) -> Result<()>
    where
        M: PixelMetadata,
        F: Fn(&M) -> Rgb + Send + Sync,
    {
        let mut prepared = self.engine.prepare(ctx)?;
        initial.set_width(prepared.grid.frame.width);
        initial.set_height(prepared.grid.frame.height);

        let dispatched = self.engine.dispatch(&mut prepared, |task| {
            process_cell(task, &pixel_fn, &initial, positioned);
            Ok(())
        });
        if let Err(e) = dispatched {
            self.engine.abort(prepared, ctx);
            return Err(e);
        }
        self.engine.finalize(prepared, ctx)
    }
}

fn process_cell<M, F>(task: CellTask<'_>, pixel_fn: &F, initial: &M, positioned: bool)
where
    M: PixelMetadata,
    F: Fn(&M) -> Rgb,
{
    let CellTask {
        cell,
        buffer,
        frame,
        channels,
    } = task;
    let (store_red, store_blue) = (channels.store_red_offset(), channels.store_blue_offset());
    let green = ChannelState::GREEN_OFFSET;

    for y in cell.y..cell.bottom() {
        for x in cell.x..cell.right() {
            let index = frame.pixel_index(x, y);

            let mut pixel = initial.clone();
            if positioned {
                pixel.set_x(x);
                pixel.set_y(y);
            }
            pixel.set_red(buffer.get(index + channels.red_offset));
            pixel.set_green(buffer.get(index + green));
            pixel.set_blue(buffer.get(index + channels.blue_offset));

            let (r, g, b) = pixel_fn(&pixel);
            buffer.set(index + store_red, r);
            buffer.set(index + green, g);
            buffer.set(index + store_blue, b);
        }
    }
}
