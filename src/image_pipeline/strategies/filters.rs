use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::engine::{EngineConfig, ImageProcessor};
use crate::image_pipeline::strategies::convolution::ConvolutionProcessor;
use crate::image_pipeline::strategies::grayscale::GrayscaleProcessor;
use crate::image_pipeline::strategies::kernel::{EdgeStrength, GaussianSize, Kernel};

/// Names accepted by [`by_name`].
pub const FILTER_NAMES: &[&str] = &[
    "sharpen",
    "edge-low",
    "edge-medium",
    "edge-high",
    "gaussian3",
    "gaussian5",
    "box-blur",
    "grayscale",
];

/// Builds a bundled filter.
pub fn by_name(name: &str, config: EngineConfig) -> Result<Box<dyn ImageProcessor>> {
    let kernel = match name {
        "sharpen" => Kernel::sharpen(),
        "edge-low" => Kernel::edge_detection(EdgeStrength::Low),
        "edge-medium" => Kernel::edge_detection(EdgeStrength::Medium),
        "edge-high" => Kernel::edge_detection(EdgeStrength::High),
        "gaussian3" => Kernel::gaussian_blur(GaussianSize::Three),
        "gaussian5" => Kernel::gaussian_blur(GaussianSize::Five),
        "box-blur" => Kernel::box_blur(),
        "grayscale" => return Ok(Box::new(GrayscaleProcessor::new(config)?)),
        other => return Err(PipelineError::UnknownFilter(other.to_string())),
    };
    Ok(Box::new(ConvolutionProcessor::new(kernel, config)?))
}
