use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconstructionError {
    #[error("Unknown Bayer pattern: {0}")]
    UnknownPattern(String),

    #[error("Calibration index {index} out of range (table has {len} entries)")]
    CalibrationIndex { index: usize, len: usize },

    #[error("Invalid calibration shape: {0}")]
    CalibrationShape(String),

    #[error("Frame count {frames} does not match calibration entry count {entries}")]
    FrameCountMismatch { frames: usize, entries: usize },

    #[error("Shape mismatch: expected {expected:?} (height, width), found {found:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to decode TIFF stack: {0}")]
    DecodeError(String),

    #[error("Failed to encode TIFF image: {0}")]
    EncodeError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReconstructionError>;
