//! Raw to radiance reconstruction
//!
//! Dark correction, demosaicing and per-peak linear unmixing of every setpoint
//! frame, concatenated into a single band-indexed radiance cube.

mod config;
mod dark;
mod reconstructor;
mod reflectance;
mod types;
mod unmix;

#[cfg(test)]
mod tests;

pub use config::{BandOrder, ReconstructionConfig, ReconstructionConfigBuilder};
pub use dark::subtract_dark;
pub use reconstructor::{FrameOutput, RadianceReconstructor};
pub use reflectance::reflectance;
pub use types::{BandInfo, RadianceBand, RadianceCube, Reconstruction};
pub use unmix::{normalize, unmix};
