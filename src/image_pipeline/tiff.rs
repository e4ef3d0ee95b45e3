//! TIFF writing module
//!
//! Writes radiance cubes as multi-page 32-bit float TIFF, one page per band.

mod standard_tiff_writer;
pub mod types;
mod writer;

pub use standard_tiff_writer::StandardTiffWriter;
pub use types::{TiffCompression, WriterConfig};
pub use writer::RadianceWriter;
