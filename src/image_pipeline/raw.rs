//! Raw frame input module
//!
//! Mosaic frames, per-frame acquisition attributes and the dark reference,
//! plus the reader seam that turns bytes into frames.

mod reader;
mod tiff_stack_reader;
pub mod types;

pub use reader::RawFrameReader;
pub use tiff_stack_reader::TiffStackReader;
pub use types::{DarkReference, FrameAttributes, RawFrame, RawFrameStack, RawImageData};
