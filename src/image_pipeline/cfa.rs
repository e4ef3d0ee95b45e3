//! Colour filter array layouts
//!
//! Maps a Bayer pattern and a pixel coordinate to the colour channel sampled there.

use std::fmt;
use std::str::FromStr;

use crate::image_pipeline::common::error::{ReconstructionError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CfaColor {
    R,
    G,
    B,
}

impl CfaColor {
    pub const ALL: [CfaColor; 3] = [CfaColor::R, CfaColor::G, CfaColor::B];

    /// Channel index in demosaiced output (0=R, 1=G, 2=B).
    pub fn index(self) -> usize {
        match self {
            CfaColor::R => 0,
            CfaColor::G => 1,
            CfaColor::B => 2,
        }
    }
}

/// Supported 2x2 mosaic layouts, named by the top-left quad read row by row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BayerPattern {
    Gbrg,
    Grbg,
    Bggr,
    Rggb,
}

impl BayerPattern {
    pub const ALL: [BayerPattern; 4] = [
        BayerPattern::Gbrg,
        BayerPattern::Grbg,
        BayerPattern::Bggr,
        BayerPattern::Rggb,
    ];

    fn quad(self) -> [[CfaColor; 2]; 2] {
        use CfaColor::*;
        match self {
            BayerPattern::Gbrg => [[G, B], [R, G]],
            BayerPattern::Grbg => [[G, R], [B, G]],
            BayerPattern::Bggr => [[B, G], [G, R]],
            BayerPattern::Rggb => [[R, G], [G, B]],
        }
    }

    /// Pattern from the integer code stored in VTT header files.
    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(BayerPattern::Gbrg),
            1 => Ok(BayerPattern::Grbg),
            2 => Ok(BayerPattern::Bggr),
            3 => Ok(BayerPattern::Rggb),
            _ => Err(ReconstructionError::UnknownPattern(code.to_string())),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            BayerPattern::Gbrg => 0,
            BayerPattern::Grbg => 1,
            BayerPattern::Bggr => 2,
            BayerPattern::Rggb => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BayerPattern::Gbrg => "GBRG",
            BayerPattern::Grbg => "GRBG",
            BayerPattern::Bggr => "BGGR",
            BayerPattern::Rggb => "RGGB",
        }
    }

    #[inline(always)]
    pub fn color_at(self, y: usize, x: usize) -> CfaColor {
        self.quad()[y & 1][x & 1]
    }

    /// Builds the R, G and B sampling masks for a `height` x `width` mosaic.
    pub fn masks(self, height: usize, width: usize) -> ColorMasks {
        let mut masks = [
            vec![false; height * width],
            vec![false; height * width],
            vec![false; height * width],
        ];
        for y in 0..height {
            for x in 0..width {
                masks[self.color_at(y, x).index()][y * width + x] = true;
            }
        }
        ColorMasks { height, width, masks }
    }
}

impl FromStr for BayerPattern {
    type Err = ReconstructionError;

    /// Accepts plain layout names (`RGGB`) and GenICam `PixelColorFilter`
    /// values (`BayerRG`), case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GBRG" | "BAYERGB" => Ok(BayerPattern::Gbrg),
            "GRBG" | "BAYERGR" => Ok(BayerPattern::Grbg),
            "BGGR" | "BAYERBG" => Ok(BayerPattern::Bggr),
            "RGGB" | "BAYERRG" => Ok(BayerPattern::Rggb),
            _ => Err(ReconstructionError::UnknownPattern(s.to_string())),
        }
    }
}

impl fmt::Display for BayerPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Disjoint per-channel sampling masks over a mosaic, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMasks {
    pub height: usize,
    pub width: usize,
    masks: [Vec<bool>; 3],
}

impl ColorMasks {
    /// Wraps externally built masks. Each must cover `height * width` pixels and
    /// every pixel must be sampled by exactly one channel.
    pub fn from_parts(height: usize, width: usize, masks: [Vec<bool>; 3]) -> Result<Self> {
        for mask in &masks {
            if mask.len() != height * width {
                return Err(ReconstructionError::ShapeMismatch {
                    expected: (height, width),
                    found: (mask.len() / width.max(1), width),
                });
            }
        }
        for i in 0..height * width {
            let hits = masks.iter().filter(|mask| mask[i]).count();
            if hits != 1 {
                return Err(ReconstructionError::InvalidParameter(format!(
                    "pixel ({}, {}) is sampled by {} channels, expected exactly one",
                    i / width,
                    i % width,
                    hits
                )));
            }
        }
        Ok(Self { height, width, masks })
    }

    pub fn mask(&self, color: CfaColor) -> &[bool] {
        &self.masks[color.index()]
    }

    pub fn count(&self, color: CfaColor) -> usize {
        self.mask(color).iter().filter(|&&m| m).count()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}
