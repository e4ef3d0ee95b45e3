//! Multi-page grayscale TIFF reader for mosaic stacks.
//!
//! Each page is one setpoint frame. Acquisition attributes are not stored in
//! the TIFF and must be attached by the caller.

use std::io::Cursor;

use tiff::decoder::{Decoder, DecodingResult};
use tracing::debug;

use crate::image_pipeline::common::error::{ReconstructionError, Result};
use crate::image_pipeline::raw::reader::RawFrameReader;
use crate::image_pipeline::raw::types::RawImageData;

pub struct TiffStackReader;

fn decode_err(e: impl std::fmt::Display) -> ReconstructionError {
    ReconstructionError::DecodeError(e.to_string())
}

impl RawFrameReader for TiffStackReader {
    fn read_frames(&self, data: &[u8]) -> Result<Vec<RawImageData>> {
        debug!("Decoding TIFF stack, {} bytes", data.len());

        let mut decoder = Decoder::new(Cursor::new(data)).map_err(decode_err)?;
        let mut frames = Vec::new();

        loop {
            let (width, height) = decoder.dimensions().map_err(decode_err)?;
            let (samples, bits_per_sample) = match decoder.read_image().map_err(decode_err)? {
                DecodingResult::U8(values) => (values.iter().map(|&v| v as u16).collect(), 8),
                DecodingResult::U16(values) => {
                    // Sensor depth from the largest sample; 12-bit data leaves the top bits unused
                    let max = values.iter().max().copied().unwrap_or(0);
                    let bits = if max == 0 { 16 } else { 16 - max.leading_zeros() };
                    (values, bits.max(8))
                }
                _ => {
                    return Err(ReconstructionError::DecodeError(
                        "only 8 and 16 bit grayscale pages are supported".to_string(),
                    ));
                }
            };

            let (width, height) = (width as usize, height as usize);
            if samples.len() != width * height {
                return Err(ReconstructionError::DecodeError(format!(
                    "page {} has {} samples, expected {}x{} single channel",
                    frames.len(),
                    samples.len(),
                    width,
                    height
                )));
            }

            debug!("Decoded page {}: {}x{}, {} bit", frames.len(), width, height, bits_per_sample);
            frames.push(RawImageData {
                width,
                height,
                data: samples,
                bits_per_sample,
            });

            if !decoder.more_images() {
                break;
            }
            decoder.next_image().map_err(decode_err)?;
        }

        Ok(frames)
    }
}
