use std::path::Path;

use tracing::{info, instrument};

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::context::{ImageContext, StoreFormat};

/// A processing step with all of its arguments bound, applicable to any image context.
pub trait ImageProcessor {
    fn apply(&self, ctx: &mut ImageContext) -> Result<()>;

    /// Reads an encoded image from `input`, processes it and writes it to `output`
    /// re-encoded as `store_format`.
    #[instrument(skip(self))]
    fn process_file(&self, input: &Path, output: &Path, store_format: StoreFormat) -> Result<()> {
        info!(
            input = %input.display(),
            output = %output.display(),
            "Processing file"
        );

        let data = {
            let _span = tracing::info_span!("read_input_file").entered();
            std::fs::read(input).map_err(|e| {
                PipelineError::InputReadError(format!("{}: {}", input.display(), e))
            })?
        };

        let mut ctx = ImageContext::encoded(data).with_store_format(store_format);
        self.apply(&mut ctx)?;

        let _span = tracing::info_span!("write_output_file").entered();
        std::fs::write(output, &ctx.data).map_err(|e| {
            PipelineError::OutputWriteError(format!("{}: {}", output.display(), e))
        })
    }
}
