use crate::image_pipeline::context::types::{
    BufferLayout, FrameFlags, PixelFormat, Resolution, StoreFormat,
};

/// One image buffer handed to the pipeline by a producer.
///
/// The context owns `data` for the duration of an `apply` call. On return it holds the
/// processed image, either raw or re-encoded depending on `store_format`.
#[derive(Debug, Clone)]
pub struct ImageContext {
    pub data: Vec<u8>,
    pub layout: BufferLayout,
    /// Pixel dimensions. Updated when decoding reveals the true size of an encoded image.
    pub resolution: Resolution,
    pub store_format: Option<StoreFormat>,
    pub flags: FrameFlags,
}

impl ImageContext {
    /// Wraps a packed raw buffer whose rows are exactly `width * bytes_per_pixel` bytes.
    pub fn raw(data: Vec<u8>, resolution: Resolution, pixel_format: PixelFormat) -> Self {
        let stride = resolution.width * pixel_format.bytes_per_pixel();
        Self::raw_with_stride(data, resolution, stride, pixel_format)
    }

    pub fn raw_with_stride(
        data: Vec<u8>,
        resolution: Resolution,
        stride: usize,
        pixel_format: PixelFormat,
    ) -> Self {
        Self {
            data,
            layout: BufferLayout::Raw { stride, pixel_format },
            resolution,
            store_format: None,
            flags: FrameFlags::default(),
        }
    }

    /// Wraps encoded container bytes. The resolution is unknown until decoded.
    pub fn encoded(data: Vec<u8>) -> Self {
        Self {
            data,
            layout: BufferLayout::Encoded,
            resolution: Resolution::default(),
            store_format: None,
            flags: FrameFlags::default(),
        }
    }

    pub fn with_store_format(mut self, store_format: StoreFormat) -> Self {
        self.store_format = Some(store_format);
        self
    }

    pub fn with_flags(mut self, flags: FrameFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn is_raw(&self) -> bool {
        matches!(self.layout, BufferLayout::Raw { .. })
    }

    pub fn stride(&self) -> Option<usize> {
        match self.layout {
            BufferLayout::Raw { stride, .. } => Some(stride),
            BufferLayout::Encoded => None,
        }
    }

    pub fn pixel_format(&self) -> Option<PixelFormat> {
        match self.layout {
            BufferLayout::Raw { pixel_format, .. } => Some(pixel_format),
            BufferLayout::Encoded => None,
        }
    }
}
