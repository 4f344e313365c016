use crate::image_pipeline::cells::{CellBuffer, CellRect, FrameMetadata};

/// Where red and blue live inside one pixel of the working buffer, and whether they must
/// trade places before the buffer reaches the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelState {
    pub red_offset: usize,
    pub blue_offset: usize,
    pub swap_needed: bool,
}

impl ChannelState {
    /// Raw-sourced buffer returned raw.
    pub const RGB: ChannelState = ChannelState {
        red_offset: 0,
        blue_offset: 2,
        swap_needed: false,
    };

    /// Raw-sourced buffer that will be re-encoded.
    pub const RGB_TO_BGR: ChannelState = ChannelState {
        red_offset: 0,
        blue_offset: 2,
        swap_needed: true,
    };

    /// Decoded buffer.
    pub const BGR: ChannelState = ChannelState {
        red_offset: 2,
        blue_offset: 0,
        swap_needed: false,
    };

    pub const GREEN_OFFSET: usize = 1;

    /// Offset red must be written to so the stored order matches what the encoder expects.
    #[inline]
    pub fn store_red_offset(&self) -> usize {
        if self.swap_needed {
            self.blue_offset
        } else {
            self.red_offset
        }
    }

    #[inline]
    pub fn store_blue_offset(&self) -> usize {
        if self.swap_needed {
            self.red_offset
        } else {
            self.blue_offset
        }
    }
}

/// Exchanges the bytes at channel offsets 0 and 2 of every pixel inside `cell`.
pub fn swap_red_blue(cell: &CellRect, buffer: &CellBuffer<'_>, frame: &FrameMetadata) {
    for y in cell.y..cell.bottom() {
        for x in cell.x..cell.right() {
            let index = frame.pixel_index(x, y);
            buffer.swap(index, index + 2);
        }
    }
}
