//! Image context data types

/// Packed raw pixel layouts understood by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 3 bytes per pixel, red-green-blue
    Rgb24,
    /// 4 bytes per pixel, red-green-blue plus an unused padding byte
    Rgb32,
    /// 4 bytes per pixel, red-green-blue-alpha
    Rgba32,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb24 => 3,
            PixelFormat::Rgb32 | PixelFormat::Rgba32 => 4,
        }
    }
}

/// Image dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolution {
    pub width: usize,
    pub height: usize,
}

impl Resolution {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

/// TIFF compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    #[default]
    None,
    /// LZW compression (slow, good compression)
    Lzw,
    /// Deflate compression - fast level (good speed/size balance)
    DeflateFast,
    /// Deflate compression - balanced
    DeflateBalanced,
    /// Deflate compression - best compression (slower)
    DeflateBest,
}

/// Options applied when re-encoding into TIFF
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TiffOptions {
    pub compression: TiffCompression,
    /// Predictor value for compression (typically 2 for horizontal differencing)
    pub predictor: Option<u16>,
}

/// Encoded container an image is written back into after processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFormat {
    Tiff(TiffOptions),
    Png,
    Jpeg,
}

impl StoreFormat {
    pub fn tiff() -> Self {
        StoreFormat::Tiff(TiffOptions::default())
    }
}

/// How the bytes held by an [`ImageContext`](super::ImageContext) are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferLayout {
    /// Packed pixels with a known row stride
    Raw { stride: usize, pixel_format: PixelFormat },
    /// An encoded container (e.g. TIFF file bytes)
    Encoded,
}

/// Producer-supplied flags carried through processing untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameFlags {
    pub eos: bool,
    pub key_frame: bool,
    /// Presentation timestamp in microseconds, if the producer supplied one
    pub timestamp: Option<i64>,
}
