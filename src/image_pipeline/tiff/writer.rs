use std::io::Write;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::radiance::RadianceCube;
use crate::image_pipeline::tiff::types::WriterConfig;

pub trait RadianceWriter {
    fn write_cube(&self, cube: &RadianceCube, output: &mut dyn Write, config: &WriterConfig) -> Result<()>;
}
