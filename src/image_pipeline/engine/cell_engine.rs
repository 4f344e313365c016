use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use anyhow::anyhow;
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::image_pipeline::bridge::{ChannelState, FormatBridge, swap_red_blue};
use crate::image_pipeline::cells::{
    CellBuffer, CellGeometry, CellGrid, CellRect, FrameMetadata, GridGeometry, validate_tiling,
};
use crate::image_pipeline::codec::{ImageCodec, TiffCodec};
use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::context::{ImageContext, RawFrame};
use crate::image_pipeline::engine::config::EngineConfig;

/// Working state of one invocation, produced by [`CellEngine::prepare`] and consumed by
/// [`CellEngine::finalize`].
#[derive(Debug)]
pub struct PreparedFrame {
    pub frame: RawFrame,
    pub grid: CellGrid,
    pub channels: ChannelState,
}

/// Everything a worker needs to process one cell. Copied into each invocation.
#[derive(Clone, Copy)]
pub struct CellTask<'a> {
    pub cell: CellRect,
    pub buffer: &'a CellBuffer<'a>,
    pub frame: FrameMetadata,
    pub channels: ChannelState,
}

impl CellTask<'_> {
    #[inline]
    pub fn pixel_index(&self, x: usize, y: usize) -> usize {
        self.frame.pixel_index(x, y)
    }

    /// Swaps red and blue of every pixel in this cell.
    pub fn swap_red_blue(&self) {
        swap_red_blue(&self.cell, self.buffer, &self.frame);
    }
}

/// Orchestrates prepare, concurrent per-cell dispatch and finalize.
///
/// The engine trusts the geometry provider to return disjoint cells; with
/// `validate_geometry` enabled it checks the tiling before any cell work starts.
pub struct CellEngine<G: CellGeometry = GridGeometry, C: ImageCodec = TiffCodec> {
    geometry: G,
    bridge: FormatBridge<C>,
    config: EngineConfig,
    pool: Option<rayon::ThreadPool>,
}

impl CellEngine<GridGeometry, TiffCodec> {
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_custom(GridGeometry, TiffCodec, config)
    }
}

impl<G: CellGeometry, C: ImageCodec> CellEngine<G, C> {
    pub fn with_custom(geometry: G, codec: C, config: EngineConfig) -> Result<Self> {
        let pool = match config.worker_threads {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("cell-worker-{}", i))
                    .build()
                    .map_err(|e| PipelineError::ThreadPool(e.to_string()))?,
            ),
            None => None,
        };

        Ok(Self {
            geometry,
            bridge: FormatBridge::with_codec(codec),
            config,
            pool,
        })
    }

    /// Converts `ctx` to raw form and partitions it.
    ///
    /// Fails before any pixel is touched; a raw buffer taken from `ctx` is handed back
    /// if partitioning fails.
    #[instrument(skip_all, fields(raw = ctx.is_raw()))]
    pub fn prepare(&self, ctx: &mut ImageContext) -> Result<PreparedFrame> {
        let frame = {
            let _span = tracing::info_span!("to_raw").entered();
            self.bridge.to_raw(ctx)?
        };
        let channels = FormatBridge::<C>::channel_offsets(&frame, ctx);

        let grid = {
            let _span = tracing::info_span!("compute_cells").entered();
            match self.partition(&frame) {
                Ok(grid) => grid,
                Err(e) => {
                    self.bridge.restore(frame, ctx);
                    return Err(e);
                }
            }
        };

        debug!(
            cells = grid.cells.len(),
            red_offset = channels.red_offset,
            blue_offset = channels.blue_offset,
            swap_needed = channels.swap_needed,
            "Frame prepared"
        );
        Ok(PreparedFrame {
            frame,
            grid,
            channels,
        })
    }

    fn partition(&self, frame: &RawFrame) -> Result<CellGrid> {
        let grid = self.geometry.compute_cells(
            frame,
            self.config.horizontal_cells,
            self.config.vertical_cells,
        )?;
        if self.config.validate_geometry {
            validate_tiling(&grid.cells, frame.resolution.width, frame.resolution.height)?;
        }
        Ok(grid)
    }

    /// Runs `work` once per cell on the worker pool and blocks until every cell finished
    /// or one of them failed. There is no ordering between cells and no rollback of cells
    /// that already ran when another fails. A panicking cell is reported as
    /// [`PipelineError::ProcessingError`].
    pub fn dispatch<F>(&self, prepared: &mut PreparedFrame, work: F) -> Result<()>
    where
        F: Fn(CellTask<'_>) -> Result<()> + Send + Sync,
    {
        let _span = tracing::info_span!("dispatch", cells = prepared.grid.cells.len()).entered();

        let PreparedFrame {
            frame,
            grid,
            channels,
        } = prepared;
        let buffer = CellBuffer::new(&mut frame.data);
        let frame_meta = grid.frame;
        let channels = *channels;
        let cells = &grid.cells;

        let fork_join = || {
            cells.par_iter().try_for_each(|&cell| {
                let task = CellTask {
                    cell,
                    buffer: &buffer,
                    frame: frame_meta,
                    channels,
                };
                panic::catch_unwind(AssertUnwindSafe(|| work(task)))
                    .unwrap_or_else(|payload| Err(cell_panic(&cell, payload.as_ref())))
            })
        };

        match &self.pool {
            Some(pool) => pool.install(fork_join),
            None => fork_join(),
        }
    }

    /// Hands the processed frame back to `ctx`, re-encoding it if a store format is set.
    #[instrument(skip_all)]
    pub fn finalize(&self, prepared: PreparedFrame, ctx: &mut ImageContext) -> Result<()> {
        self.bridge.finalize(prepared.frame, ctx)
    }

    /// Ends an invocation whose dispatch failed without encoding anything.
    pub fn abort(&self, prepared: PreparedFrame, ctx: &mut ImageContext) {
        warn!("Cell processing failed, partial results are not rolled back");
        self.bridge.restore(prepared.frame, ctx);
    }

    /// Full lifecycle: prepare, dispatch `work` over every cell, finalize.
    ///
    /// If a cell fails, the partially processed buffer of a raw context is handed back raw;
    /// an encoded context keeps its original bytes.
    pub fn run<F>(&self, ctx: &mut ImageContext, work: F) -> Result<()>
    where
        F: Fn(CellTask<'_>) -> Result<()> + Send + Sync,
    {
        let mut prepared = self.prepare(ctx)?;
        if let Err(e) = self.dispatch(&mut prepared, work) {
            self.abort(prepared, ctx);
            return Err(e);
        }
        self.finalize(prepared, ctx)?;

        info!(
            width = ctx.resolution.width,
            height = ctx.resolution.height,
            raw = ctx.is_raw(),
            "Processing complete"
        );
        Ok(())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn bridge(&self) -> &FormatBridge<C> {
        &self.bridge
    }
}

fn cell_panic(cell: &CellRect, payload: &(dyn Any + Send)) -> PipelineError {
    let message = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload");
    PipelineError::ProcessingError(anyhow!("cell {:?} panicked: {}", cell, message))
}
