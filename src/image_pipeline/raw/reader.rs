use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::raw::types::RawImageData;

/// Decodes a container of mosaic images into one `RawImageData` per page.
pub trait RawFrameReader {
    fn read_frames(&self, data: &[u8]) -> Result<Vec<RawImageData>>;
}
