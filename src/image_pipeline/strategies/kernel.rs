//! Convolution kernels.

use crate::image_pipeline::common::error::{PipelineError, Result};

/// Edge detection sensitivity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStrength {
    Low,
    Medium,
    High,
}

/// Gaussian blur kernel extent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaussianSize {
    Three,
    Five,
}

/// A 2-D matrix of weights, stored row-major.
///
/// Tap `(t, u)` weighs the source pixel `t - width / 2` columns and `u - height / 2` rows
/// away from the pixel being computed.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    width: usize,
    height: usize,
    weights: Vec<f64>,
}

impl Kernel {
    pub fn new(width: usize, height: usize, weights: Vec<f64>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidKernel(format!(
                "kernel must not be empty, got {}x{}",
                width, height
            )));
        }
        if weights.len() != width * height {
            return Err(PipelineError::InvalidKernel(format!(
                "{}x{} kernel needs {} weights, got {}",
                width,
                height,
                width * height,
                weights.len()
            )));
        }
        Ok(Self {
            width,
            height,
            weights,
        })
    }

    pub fn from_rows<const W: usize, const H: usize>(rows: [[f64; W]; H]) -> Result<Self> {
        Self::new(W, H, rows.iter().flatten().copied().collect())
    }

    /// Builds one of the fixed kernels below; their shape is known to be valid.
    fn fixed<const W: usize, const H: usize>(rows: [[f64; W]; H]) -> Self {
        Self {
            width: W,
            height: H,
            weights: rows.iter().flatten().copied().collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn weight(&self, t: usize, u: usize) -> f64 {
        self.weights[u * self.width + t]
    }

    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Multiplies every weight by `factor`.
    pub fn scaled(mut self, factor: f64) -> Self {
        self.weights.iter_mut().for_each(|w| *w *= factor);
        self
    }

    pub fn identity() -> Self {
        Self::fixed([[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]])
    }

    pub fn sharpen() -> Self {
        Self::fixed([[0.0, -1.0, 0.0], [-1.0, 5.0, -1.0], [0.0, -1.0, 0.0]])
    }

    pub fn edge_detection(strength: EdgeStrength) -> Self {
        match strength {
            EdgeStrength::Low => {
                Self::fixed([[-1.0, 0.0, 1.0], [0.0, 0.0, 0.0], [1.0, 0.0, -1.0]])
            }
            EdgeStrength::Medium => {
                Self::fixed([[0.0, 1.0, 0.0], [1.0, -4.0, 1.0], [0.0, 1.0, 0.0]])
            }
            EdgeStrength::High => {
                Self::fixed([[-1.0, -1.0, -1.0], [-1.0, 8.0, -1.0], [-1.0, -1.0, -1.0]])
            }
        }
    }

    pub fn gaussian_blur(size: GaussianSize) -> Self {
        match size {
            GaussianSize::Three => {
                Self::fixed([[1.0, 2.0, 1.0], [2.0, 4.0, 2.0], [1.0, 2.0, 1.0]]).scaled(1.0 / 16.0)
            }
            GaussianSize::Five => Self::fixed([
                [1.0, 4.0, 6.0, 4.0, 1.0],
                [4.0, 16.0, 24.0, 16.0, 4.0],
                [6.0, 24.0, 36.0, 24.0, 6.0],
                [4.0, 16.0, 24.0, 16.0, 4.0],
                [1.0, 4.0, 6.0, 4.0, 1.0],
            ])
            .scaled(1.0 / 256.0),
        }
    }

    pub fn box_blur() -> Self {
        Self::fixed([[1.0; 3]; 3]).scaled(1.0 / 9.0)
    }
}
