//! Whole-cell delegate strategy.
//!
//! A hook for algorithms that run their own inner loop: the hook is called once per cell
//! with the cell rectangle, the shared buffer, the frame metadata and the channel state.
//! The hook is responsible for honouring the channel offsets, including
//! [`CellTask::swap_red_blue`] when `channels.swap_needed` is set.

use tracing::instrument;

use crate::image_pipeline::cells::{CellGeometry, GridGeometry};
use crate::image_pipeline::codec::{ImageCodec, TiffCodec};
use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::context::ImageContext;
use crate::image_pipeline::engine::{CellEngine, CellTask, EngineConfig, ImageProcessor};

pub struct CellDelegateProcessor<F, G: CellGeometry = GridGeometry, C: ImageCodec = TiffCodec>
where
    F: Fn(CellTask<'_>) -> anyhow::Result<()> + Send + Sync,
{
    engine: CellEngine<G, C>,
    hook: F,
}

impl<F> CellDelegateProcessor<F, GridGeometry, TiffCodec>
where
    F: Fn(CellTask<'_>) -> anyhow::Result<()> + Send + Sync,
{
    pub fn new(config: EngineConfig, hook: F) -> Result<Self> {
        Ok(Self::with_engine(CellEngine::new(config)?, hook))
    }
}

impl<F, G: CellGeometry, C: ImageCodec> CellDelegateProcessor<F, G, C>
where
    F: Fn(CellTask<'_>) -> anyhow::Result<()> + Send + Sync,
{
    pub fn with_engine(engine: CellEngine<G, C>, hook: F) -> Self {
        Self { engine, hook }
    }

    pub fn engine(&self) -> &CellEngine<G, C> {
        &self.engine
    }
}

impl<F, G: CellGeometry, C: ImageCodec> ImageProcessor for CellDelegateProcessor<F, G, C>
where
    F: Fn(CellTask<'_>) -> anyhow::Result<()> + Send + Sync,
{
    #[instrument(skip_all)]
    fn apply(&self, ctx: &mut ImageContext) -> Result<()> {
        self.engine.run(ctx, |task| {
            (self.hook)(task).map_err(|e| {
                PipelineError::ProcessingError(e.context(format!("cell {:?}", task.cell)))
            })
        })
    }
}
