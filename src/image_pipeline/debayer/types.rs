//! Types for debayering operations

use crate::image_pipeline::cfa::CfaColor;

/// Dense demosaiced image as three row-major planes (0=R, 1=G, 2=B)
#[derive(Debug, Clone, PartialEq)]
pub struct RgbPlanes {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    pub planes: [Vec<f64>; 3],
}

impl RgbPlanes {
    pub fn plane(&self, color: CfaColor) -> &[f64] {
        &self.planes[color.index()]
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn scaled(&self, k: f64) -> Self {
        Self {
            width: self.width,
            height: self.height,
            planes: self.planes.clone().map(|p| p.into_iter().map(|v| v * k).collect()),
        }
    }
}
