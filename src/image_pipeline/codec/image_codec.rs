use crate::image_pipeline::codec::types::{DecodedImage, EncodeSource};
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::context::StoreFormat;

pub trait ImageCodec: Send + Sync {
    fn decode(&self, data: &[u8]) -> Result<DecodedImage>;
    fn encode(&self, source: EncodeSource<'_>, format: &StoreFormat) -> Result<Vec<u8>>;
}
