//! Common utilities module
//!
//! This module contains the error, warning and timing types shared across the pipeline.

pub mod error;
pub mod timing;
pub mod warning;

pub use error::{ReconstructionError, Result};
pub use timing::{PipelineTimings, StepTiming, Timer};
pub use warning::{NegativeSignalWarning, ReconstructionWarning};
