//! Per-pixel metadata handed to user pixel functions.

/// Channel values returned by a pixel function, in red-green-blue order.
pub type Rgb = (u8, u8, u8);

/// The fields the pixel delegate fills in before every call.
///
/// Implement this on your own record to carry extra per-pixel context into a pixel
/// function. The record is cloned for every pixel, so workers never share one instance.
pub trait PixelMetadata: Clone + Send + Sync {
    fn set_width(&mut self, width: usize);
    fn set_height(&mut self, height: usize);
    fn set_x(&mut self, x: usize);
    fn set_y(&mut self, y: usize);
    fn set_red(&mut self, red: u8);
    fn set_green(&mut self, green: u8);
    fn set_blue(&mut self, blue: u8);
}

/// The plain metadata record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PixelInfo {
    pub width: usize,
    pub height: usize,
    pub x: usize,
    pub y: usize,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl PixelInfo {
    pub fn rgb(&self) -> Rgb {
        (self.red, self.green, self.blue)
    }
}

impl PixelMetadata for PixelInfo {
    #[inline]
    fn set_width(&mut self, width: usize) {
        self.width = width;
    }

    #[inline]
    fn set_height(&mut self, height: usize) {
        self.height = height;
    }

    #[inline]
    fn set_x(&mut self, x: usize) {
        self.x = x;
    }

    #[inline]
    fn set_y(&mut self, y: usize) {
        self.y = y;
    }

    #[inline]
    fn set_red(&mut self, red: u8) {
        self.red = red;
    }

    #[inline]
    fn set_green(&mut self, green: u8) {
        self.green = green;
    }

    #[inline]
    fn set_blue(&mut self, blue: u8) {
        self.blue = blue;
    }
}
