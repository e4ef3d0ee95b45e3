//! Debayering module for converting Bayer mosaic frames to dense RGB planes

pub mod cpu_debayer;
pub mod kernel_debayer;
pub mod types;

pub use cpu_debayer::CpuDebayer;
pub use kernel_debayer::KernelDebayer;
pub use types::RgbPlanes;

use crate::image_pipeline::cfa::BayerPattern;
use crate::image_pipeline::common::error::Result;

/// Demosaicing backend used by the radiance reconstructor.
///
/// Implementations must be deterministic and return planes with the input's shape.
pub trait Debayer: Sync {
    fn demosaic(
        &self,
        samples: &[u16],
        width: usize,
        height: usize,
        pattern: BayerPattern,
    ) -> Result<RgbPlanes>;
}
