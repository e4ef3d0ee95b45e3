use std::io::Write;

use tiff::encoder::{TiffEncoder, colortype::Gray32Float, compression::DeflateLevel};
use tiff::tags::Tag;
use tracing::debug;

use crate::image_pipeline::common::error::{ReconstructionError, Result};
use crate::image_pipeline::radiance::{BandInfo, RadianceCube};
use crate::image_pipeline::tiff::types::{TiffCompression, WriterConfig};
use crate::image_pipeline::tiff::writer::RadianceWriter;

pub struct StandardTiffWriter;

fn encode_err(e: impl std::fmt::Display) -> ReconstructionError {
    ReconstructionError::EncodeError(e.to_string())
}

fn describe(info: &BandInfo) -> String {
    format!(
        "band={} wavelength={:.3} fwhm={:.3} setpoint={} peak={}",
        info.band, info.wavelength, info.fwhm, info.setpoint, info.peak
    )
}

impl RadianceWriter for StandardTiffWriter {
    fn write_cube(&self, cube: &RadianceCube, output: &mut dyn Write, config: &WriterConfig) -> Result<()> {
        debug!("Encoding radiance TIFF: {} band(s) of {}x{}", cube.len(), cube.width, cube.height);

        let mut buffer = Vec::new();

        let compression = match config.compression {
            TiffCompression::None => tiff::encoder::Compression::Uncompressed,
            TiffCompression::Lzw => tiff::encoder::Compression::Lzw,
            TiffCompression::DeflateFast => tiff::encoder::Compression::Deflate(DeflateLevel::Fast),
            TiffCompression::DeflateBalanced => tiff::encoder::Compression::Deflate(DeflateLevel::Balanced),
            TiffCompression::DeflateBest => tiff::encoder::Compression::Deflate(DeflateLevel::Best),
        };

        {
            let mut encoder = TiffEncoder::new(std::io::Cursor::new(&mut buffer))
                .map_err(encode_err)?
                .with_compression(compression);

            for band in cube.bands() {
                let data: Vec<f32> = band.data.iter().map(|&v| v as f32).collect();
                let mut image = encoder
                    .new_image::<Gray32Float>(cube.width as u32, cube.height as u32)
                    .map_err(encode_err)?;
                if config.describe_bands {
                    image
                        .encoder()
                        .write_tag(Tag::ImageDescription, describe(&band.info).as_str())
                        .map_err(encode_err)?;
                }
                image.write_data(&data).map_err(encode_err)?;
            }
        }

        output.write_all(&buffer)?;

        debug!("TIFF encoding complete, {} bytes", buffer.len());
        Ok(())
    }
}
