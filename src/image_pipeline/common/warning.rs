//! Non-fatal data-quality findings collected during reconstruction

use std::fmt;

/// Dark correction found raw samples below the dark reference.
/// The affected pixels were clamped to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegativeSignalWarning {
    pub setpoint: usize,
    pub clamped_pixels: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconstructionWarning {
    NegativeSignal(NegativeSignalWarning),
}

impl fmt::Display for ReconstructionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconstructionWarning::NegativeSignal(w) => write!(
                f,
                "setpoint {}: {} pixel(s) below dark reference clamped to zero",
                w.setpoint, w.clamped_pixels
            ),
        }
    }
}
