//! Processing strategies module
//!
//! Three ways of doing cell-parallel work on top of the engine: a whole-cell hook, a
//! per-pixel function, and matrix convolution. Bundled filters are built from them.

mod cell_delegate;
mod convolution;
pub mod filters;
mod grayscale;
pub mod kernel;
pub mod metadata;
mod pixel_delegate;

#[cfg(test)]
mod tests;

pub use cell_delegate::CellDelegateProcessor;
pub use convolution::ConvolutionProcessor;
pub use grayscale::GrayscaleProcessor;
pub use kernel::{EdgeStrength, GaussianSize, Kernel};
pub use metadata::{PixelInfo, PixelMetadata, Rgb};
pub use pixel_delegate::PixelDelegateProcessor;
