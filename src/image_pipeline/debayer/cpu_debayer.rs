use std::io::Cursor;

use bayer::{BayerDepth, CFA, Demosaic, RasterDepth, RasterMut};
use tracing::debug;

use crate::image_pipeline::cfa::BayerPattern;
use crate::image_pipeline::common::error::{ReconstructionError, Result};
use crate::image_pipeline::debayer::Debayer;
use crate::image_pipeline::debayer::types::RgbPlanes;

/// Demosaicing through the `bayer` crate's linear interpolation.
///
/// Border handling differs from `KernelDebayer`, so results only agree away from the edges.
pub struct CpuDebayer;

impl CpuDebayer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CpuDebayer {
    fn default() -> Self {
        Self::new()
    }
}

fn cfa(pattern: BayerPattern) -> CFA {
    match pattern {
        BayerPattern::Gbrg => CFA::GBRG,
        BayerPattern::Grbg => CFA::GRBG,
        BayerPattern::Bggr => CFA::BGGR,
        BayerPattern::Rggb => CFA::RGGB,
    }
}

impl Debayer for CpuDebayer {
    fn demosaic(
        &self,
        samples: &[u16],
        width: usize,
        height: usize,
        pattern: BayerPattern,
    ) -> Result<RgbPlanes> {
        if samples.len() != width * height || width < 2 || height < 2 {
            return Err(ReconstructionError::InvalidDimensions(width, height));
        }
        debug!("Running bayer crate demosaic {}x{}, CFA={}, algo=Linear", width, height, pattern);

        let bayer_bytes: Vec<u8> = samples.iter().flat_map(|&val| val.to_le_bytes()).collect();
        let mut cursor = Cursor::new(&bayer_bytes[..]);

        let mut output_buf = vec![0u8; width * height * 3 * 2];
        let mut output_raster = RasterMut::new(width, height, RasterDepth::Depth16, &mut output_buf);

        bayer::run_demosaic(
            &mut cursor,
            BayerDepth::Depth16LE,
            cfa(pattern),
            Demosaic::Linear,
            &mut output_raster,
        )
        .map_err(|e| ReconstructionError::InvalidParameter(format!("demosaic failed: {:?}", e)))?;

        let mut planes = [
            Vec::with_capacity(width * height),
            Vec::with_capacity(width * height),
            Vec::with_capacity(width * height),
        ];
        for pixel in output_buf.chunks_exact(6) {
            for (c, plane) in planes.iter_mut().enumerate() {
                plane.push(u16::from_le_bytes([pixel[2 * c], pixel[2 * c + 1]]) as f64);
            }
        }

        Ok(RgbPlanes { width, height, planes })
    }
}
