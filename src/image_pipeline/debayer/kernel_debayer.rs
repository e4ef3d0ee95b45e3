//! Fixed-kernel bilinear demosaicing.
//!
//! Each channel is masked to its own samples, reflect-padded by one pixel and
//! cross-correlated with a normalized 3x3 kernel. Valid-mode correlation of the
//! padded image gives back the original shape.

use tracing::trace;

use crate::image_pipeline::cfa::{BayerPattern, CfaColor, ColorMasks};
use crate::image_pipeline::common::error::{ReconstructionError, Result};
use crate::image_pipeline::debayer::Debayer;
use crate::image_pipeline::debayer::types::RgbPlanes;

type Kernel = [[f64; 3]; 3];

/// G is sampled on a quincunx, so the four orthogonal neighbours suffice.
const G_KERNEL: Kernel = [
    [0.0, 0.25, 0.0],
    [0.25, 1.0, 0.25],
    [0.0, 0.25, 0.0],
];

const RB_KERNEL: Kernel = [
    [0.25, 0.5, 0.25],
    [0.5, 1.0, 0.5],
    [0.25, 0.5, 0.25],
];

pub struct KernelDebayer;

impl KernelDebayer {
    pub fn new() -> Self {
        Self
    }

    /// Demosaics `samples` using explicit colour masks instead of a pattern name.
    pub fn demosaic_with_masks(&self, samples: &[f64], masks: &ColorMasks) -> Result<RgbPlanes> {
        let (height, width) = masks.shape();
        if samples.len() != height * width {
            return Err(ReconstructionError::ShapeMismatch {
                expected: (height, width),
                found: (samples.len() / width.max(1), width),
            });
        }
        if height < 2 || width < 2 {
            return Err(ReconstructionError::InvalidDimensions(width, height));
        }
        trace!("Kernel demosaic {}x{}", width, height);

        let planes = CfaColor::ALL.map(|color| {
            let sparse: Vec<f64> = samples
                .iter()
                .zip(masks.mask(color))
                .map(|(&v, &m)| if m { v } else { 0.0 })
                .collect();
            let kernel = match color {
                CfaColor::G => &G_KERNEL,
                CfaColor::R | CfaColor::B => &RB_KERNEL,
            };
            correlate_reflect(&sparse, width, height, kernel)
        });

        Ok(RgbPlanes { width, height, planes })
    }
}

impl Default for KernelDebayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Debayer for KernelDebayer {
    fn demosaic(
        &self,
        samples: &[u16],
        width: usize,
        height: usize,
        pattern: BayerPattern,
    ) -> Result<RgbPlanes> {
        if samples.len() != width * height {
            return Err(ReconstructionError::InvalidDimensions(width, height));
        }
        let masks = pattern.masks(height, width);
        let samples: Vec<f64> = samples.iter().map(|&v| v as f64).collect();
        self.demosaic_with_masks(&samples, &masks)
    }
}

/// Mirror index about the edge without repeating it: -1 -> 1, n -> n-2.
#[inline(always)]
fn reflect(i: isize, n: usize) -> usize {
    if i < 0 {
        (-i) as usize
    } else if i as usize >= n {
        2 * (n - 1) - i as usize
    } else {
        i as usize
    }
}

/// Equivalent to reflect-padding by one and a valid-mode 3x3 cross-correlation.
fn correlate_reflect(src: &[f64], width: usize, height: usize, kernel: &Kernel) -> Vec<f64> {
    let mut out = vec![0.0; width * height];
    for y in 0..height {
        let rows = [-1isize, 0, 1].map(|dy| reflect(y as isize + dy, height) * width);
        for x in 0..width {
            let cols = [-1isize, 0, 1].map(|dx| reflect(x as isize + dx, width));
            let mut sum = 0.0;
            for (ky, row) in rows.iter().enumerate() {
                for (kx, col) in cols.iter().enumerate() {
                    let k = kernel[ky][kx];
                    if k != 0.0 {
                        sum += k * src[row + col];
                    }
                }
            }
            out[y * width + x] = sum;
        }
    }
    out
}
