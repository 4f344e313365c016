use tracing::debug;

use crate::image_pipeline::cells::types::{CellGrid, CellRect, FrameMetadata};
use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::context::RawFrame;

/// Upper bound on cells per axis when the caller leaves the count at zero.
const MAX_DEFAULT_CELLS_PER_AXIS: usize = 16;

pub trait CellGeometry: Send + Sync {
    /// Partitions `frame` into `horizontal` x `vertical` cells.
    ///
    /// A zero count asks the provider to pick a resolution-appropriate value for that axis.
    /// The returned cells must tile the whole image without gaps or overlaps.
    fn compute_cells(&self, frame: &RawFrame, horizontal: u32, vertical: u32) -> Result<CellGrid>;
}

/// Uniform grid partition.
///
/// Cells of one axis share the same extent, except the last row/column which also absorbs
/// the remainder when the count does not divide the image evenly.
pub struct GridGeometry;

impl CellGeometry for GridGeometry {
    fn compute_cells(&self, frame: &RawFrame, horizontal: u32, vertical: u32) -> Result<CellGrid> {
        let (width, height) = (frame.resolution.width, frame.resolution.height);
        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidDimensions(width, height));
        }

        let columns = axis_spans(width, horizontal as usize);
        let rows = axis_spans(height, vertical as usize);
        debug!(
            "Partitioning {}x{} into {}x{} cells",
            width,
            height,
            columns.len(),
            rows.len()
        );

        let cells = rows
            .iter()
            .flat_map(|&(y, h)| columns.iter().map(move |&(x, w)| CellRect::new(x, y, w, h)))
            .collect();

        Ok(CellGrid {
            cells,
            frame: FrameMetadata {
                bytes_per_pixel: frame.bytes_per_pixel(),
                stride: frame.stride,
                width,
                height,
            },
        })
    }
}

/// Largest divisor of `extent` not exceeding [`MAX_DEFAULT_CELLS_PER_AXIS`].
fn default_count(extent: usize) -> usize {
    (1..=MAX_DEFAULT_CELLS_PER_AXIS.min(extent))
        .rev()
        .find(|count| extent % count == 0)
        .unwrap_or(1)
}

fn axis_spans(extent: usize, requested: usize) -> Vec<(usize, usize)> {
    let count = match requested {
        0 => default_count(extent),
        n => n.min(extent),
    };
    let base = extent / count;
    (0..count)
        .map(|i| {
            let start = i * base;
            let len = if i + 1 == count { extent - start } else { base };
            (start, len)
        })
        .collect()
}

/// Checks that `cells` exactly tile a `width` x `height` image.
pub fn validate_tiling(cells: &[CellRect], width: usize, height: usize) -> Result<()> {
    if let Some(cell) = cells
        .iter()
        .find(|c| c.area() == 0 || c.right() > width || c.bottom() > height)
    {
        return Err(PipelineError::GeometryError(format!(
            "cell {:?} is empty or outside the {}x{} image",
            cell, width, height
        )));
    }

    for (i, a) in cells.iter().enumerate() {
        if let Some(b) = cells[i + 1..].iter().find(|b| a.overlaps(b)) {
            return Err(PipelineError::GeometryError(format!(
                "cells {:?} and {:?} overlap",
                a, b
            )));
        }
    }

    let covered: usize = cells.iter().map(CellRect::area).sum();
    if covered != width * height {
        return Err(PipelineError::GeometryError(format!(
            "cells cover {} of {} pixels",
            covered,
            width * height
        )));
    }
    Ok(())
}
