//! FPI raw to radiance pipeline
//!
//! Mosaic frames from a Fabry-Perot interferometer camera are dark corrected,
//! demosaiced and unmixed per passband peak into a wavelength-band radiance cube.

pub mod calibration;
pub mod cfa;
pub mod common;
pub mod debayer;
pub mod radiance;
pub mod raw;
pub mod synthetic;
pub mod tiff;

pub use common::{
    NegativeSignalWarning,
    PipelineTimings,
    ReconstructionError,
    ReconstructionWarning,
    Result,
};

pub use cfa::{BayerPattern, CfaColor, ColorMasks};

pub use calibration::{CalibrationEntry, CalibrationTable};

pub use raw::{
    DarkReference,
    FrameAttributes,
    RawFrame,
    RawFrameReader,
    RawFrameStack,
    RawImageData,
    TiffStackReader,
};

pub use debayer::{CpuDebayer, Debayer, KernelDebayer, RgbPlanes};

pub use radiance::{
    BandInfo,
    BandOrder,
    RadianceCube,
    RadianceReconstructor,
    Reconstruction,
    ReconstructionConfig,
    ReconstructionConfigBuilder,
};

pub use self::tiff::{
    RadianceWriter,
    StandardTiffWriter,
    TiffCompression,
    WriterConfig,
};
