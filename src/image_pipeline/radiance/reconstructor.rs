use rayon::prelude::*;
use tracing::{debug, info, info_span, instrument, warn};

use crate::image_pipeline::{
    calibration::{CalibrationEntry, CalibrationTable},
    common::{
        NegativeSignalWarning, PipelineTimings, ReconstructionError, ReconstructionWarning, Result,
    },
    debayer::{Debayer, KernelDebayer},
    raw::{DarkReference, RawFrame, RawFrameStack},
};

use super::config::{BandOrder, ReconstructionConfig};
use super::dark::subtract_dark;
use super::types::{BandInfo, RadianceBand, RadianceCube, Reconstruction};
use super::unmix::{normalize, unmix};

/// Radiance bands of a single frame, in calibration peak order
#[derive(Debug, Clone)]
pub struct FrameOutput {
    pub bands: Vec<RadianceBand>,
    pub warning: Option<NegativeSignalWarning>,
}

pub struct RadianceReconstructor<D: Debayer> {
    debayer: D,
    config: ReconstructionConfig,
}

impl RadianceReconstructor<KernelDebayer> {
    pub fn new(config: ReconstructionConfig) -> Self {
        Self {
            debayer: KernelDebayer,
            config,
        }
    }
}

impl<D: Debayer> RadianceReconstructor<D> {
    pub fn with_debayer(debayer: D, config: ReconstructionConfig) -> Self {
        Self { debayer, config }
    }

    fn validate_dimensions(&self, width: usize, height: usize) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        if width == 0 || height == 0 {
            return Err(ReconstructionError::InvalidDimensions(width, height));
        }

        if let Some(max) = self.config.max_dimension {
            if width > max || height > max {
                warn!("Frame dimensions {}x{} exceed maximum {}", width, height, max);
                return Err(ReconstructionError::InvalidDimensions(width, height));
            }
        }

        Ok(())
    }

    fn validate_frame(
        &self,
        setpoint: usize,
        frame: &RawFrame,
        expected: (usize, usize),
        dark: Option<&DarkReference>,
    ) -> Result<()> {
        self.validate_dimensions(frame.width, frame.height)?;

        if frame.shape() != expected || frame.data.len() != frame.width * frame.height {
            return Err(ReconstructionError::ShapeMismatch {
                expected,
                found: frame.shape(),
            });
        }
        if !(1..=16).contains(&frame.bits_per_sample) {
            return Err(ReconstructionError::InvalidParameter(format!(
                "setpoint {}: {} bits per sample does not fit 16-bit samples",
                setpoint, frame.bits_per_sample
            )));
        }
        if let Some(&sample) = frame.data.iter().find(|&&v| u32::from(v) >> frame.bits_per_sample != 0) {
            return Err(ReconstructionError::InvalidParameter(format!(
                "setpoint {}: sample {} exceeds {}-bit depth",
                setpoint, sample, frame.bits_per_sample
            )));
        }
        if let Some(dark) = dark {
            if dark.shape() != frame.shape() {
                return Err(ReconstructionError::ShapeMismatch {
                    expected: frame.shape(),
                    found: dark.shape(),
                });
            }
        }
        if !(frame.exposure.is_finite() && frame.exposure > 0.0) {
            return Err(ReconstructionError::InvalidParameter(format!(
                "setpoint {}: exposure must be positive, got {}",
                setpoint, frame.exposure
            )));
        }
        if self.config.normalize_gain && !(frame.gain.is_finite() && frame.gain > 0.0) {
            return Err(ReconstructionError::InvalidParameter(format!(
                "setpoint {}: gain must be positive, got {}",
                setpoint, frame.gain
            )));
        }
        Ok(())
    }

    /// Checks every configuration and shape constraint before any frame is processed.
    fn validate_inputs(
        &self,
        frames: &[RawFrame],
        dark: Option<&DarkReference>,
        calibration: &CalibrationTable,
    ) -> Result<()> {
        let Some(first) = frames.first() else {
            return Err(ReconstructionError::InvalidParameter(
                "no frames to reconstruct".to_string(),
            ));
        };
        if calibration.len() < frames.len() {
            return Err(ReconstructionError::CalibrationIndex {
                index: calibration.len(),
                len: calibration.len(),
            });
        }
        if calibration.len() > frames.len() {
            return Err(ReconstructionError::FrameCountMismatch {
                frames: frames.len(),
                entries: calibration.len(),
            });
        }
        for (setpoint, frame) in frames.iter().enumerate() {
            self.validate_frame(setpoint, frame, first.shape(), dark)?;
        }
        Ok(())
    }

    fn run_frame(
        &self,
        setpoint: usize,
        frame: &RawFrame,
        dark: Option<&DarkReference>,
        entry: &CalibrationEntry,
        timings: &mut PipelineTimings,
    ) -> Result<FrameOutput> {
        let _span = info_span!("frame", setpoint).entered();

        let (corrected, clamped) = timings
            .measure("dark_correction", || subtract_dark(&frame.data, frame.shape(), dark))?;
        let warning = (clamped > 0).then(|| {
            warn!(setpoint, clamped, "Raw signal below dark reference, clamped to zero");
            NegativeSignalWarning {
                setpoint,
                clamped_pixels: clamped,
            }
        });

        let rgb = timings.measure("demosaic", || {
            self.debayer
                .demosaic(&corrected, frame.width, frame.height, frame.pattern)
        })?;

        let gain = self.config.normalize_gain.then_some(frame.gain);
        let bands = timings.measure("unmix", || {
            unmix(&rgb, entry.inversion_matrix())
                .into_iter()
                .enumerate()
                .map(|(peak, mut data)| {
                    normalize(&mut data, frame.exposure, gain);
                    RadianceBand {
                        info: BandInfo {
                            band: 0,
                            setpoint,
                            peak,
                            wavelength: entry.wavelengths()[peak],
                            fwhm: entry.fwhm()[peak],
                        },
                        data,
                    }
                })
                .collect::<Vec<_>>()
        });

        debug!("Setpoint {} produced {} band(s)", setpoint, bands.len());
        Ok(FrameOutput { bands, warning })
    }

    /// Dark-corrects, demosaics and unmixes one frame against its calibration entry.
    ///
    /// The frame is checked on its own: dimensions, dark shape, exposure and gain.
    pub fn process_frame(
        &self,
        setpoint: usize,
        frame: &RawFrame,
        dark: Option<&DarkReference>,
        entry: &CalibrationEntry,
    ) -> Result<FrameOutput> {
        self.validate_frame(setpoint, frame, frame.shape(), dark)?;
        self.run_frame(setpoint, frame, dark, entry, &mut PipelineTimings::new())
    }

    fn assemble(&self, width: usize, height: usize, outputs: Vec<FrameOutput>) -> Reconstruction {
        let _span = info_span!("concatenate").entered();
        let mut warnings = Vec::new();
        let mut bands = Vec::new();
        for output in outputs {
            warnings.extend(output.warning.map(ReconstructionWarning::NegativeSignal));
            bands.extend(output.bands);
        }

        if self.config.band_order == BandOrder::AscendingWavelength {
            bands.sort_by(|a, b| {
                a.info
                    .wavelength
                    .total_cmp(&b.info.wavelength)
                    .then(a.info.setpoint.cmp(&b.info.setpoint))
                    .then(a.info.peak.cmp(&b.info.peak))
            });
        }

        Reconstruction {
            cube: RadianceCube::from_ordered(width, height, bands),
            warnings,
        }
    }

    /// Reconstructs the radiance cube of a whole stack.
    ///
    /// All inputs are validated first; any error aborts without a partial cube.
    /// Band order depends only on the configuration, never on which frame finishes first.
    #[instrument(skip_all, fields(frames = stack.len()))]
    pub fn reconstruct(
        &self,
        stack: &RawFrameStack,
        dark: Option<&DarkReference>,
        calibration: &CalibrationTable,
    ) -> Result<Reconstruction> {
        info!("Starting radiance reconstruction");
        let frames = stack.frames();
        self.validate_inputs(frames, dark, calibration)?;

        let process = |(setpoint, frame): (usize, &RawFrame)| {
            let entry = calibration.entry(setpoint)?;
            self.run_frame(setpoint, frame, dark, entry, &mut PipelineTimings::new())
        };
        let outputs = if self.config.parallel {
            frames.par_iter().enumerate().map(process).collect::<Result<Vec<_>>>()?
        } else {
            frames.iter().enumerate().map(process).collect::<Result<Vec<_>>>()?
        };

        let (height, width) = stack.shape();
        let result = self.assemble(width, height, outputs);
        info!(
            bands = result.cube.len(),
            warnings = result.warnings.len(),
            "Reconstruction complete"
        );
        Ok(result)
    }

    /// Sequential reconstruction that also reports per-step durations.
    pub fn reconstruct_with_timings(
        &self,
        stack: &RawFrameStack,
        dark: Option<&DarkReference>,
        calibration: &CalibrationTable,
    ) -> Result<(Reconstruction, PipelineTimings)> {
        let mut timings = PipelineTimings::new();
        let frames = stack.frames();
        timings.measure("validate", || self.validate_inputs(frames, dark, calibration))?;

        let mut outputs = Vec::with_capacity(frames.len());
        for (setpoint, frame) in frames.iter().enumerate() {
            let entry = calibration.entry(setpoint)?;
            outputs.push(self.run_frame(setpoint, frame, dark, entry, &mut timings)?);
        }

        let (height, width) = stack.shape();
        let result = timings.measure("concatenate", || self.assemble(width, height, outputs));
        Ok((result, timings))
    }

    /// Streams frames one at a time without holding the raw stack in memory.
    /// Output is identical to `reconstruct` on the same frames.
    #[instrument(skip_all)]
    pub fn reconstruct_frames<I>(
        &self,
        frames: I,
        dark: Option<&DarkReference>,
        calibration: &CalibrationTable,
    ) -> Result<Reconstruction>
    where
        I: IntoIterator<Item = RawFrame>,
    {
        let mut outputs = Vec::with_capacity(calibration.len());
        let mut shape = None;
        for (setpoint, frame) in frames.into_iter().enumerate() {
            let entry = calibration.entry(setpoint)?;
            let expected = *shape.get_or_insert(frame.shape());
            self.validate_frame(setpoint, &frame, expected, dark)?;
            outputs.push(self.run_frame(setpoint, &frame, dark, entry, &mut PipelineTimings::new())?);
        }

        let Some((height, width)) = shape else {
            return Err(ReconstructionError::InvalidParameter(
                "no frames to reconstruct".to_string(),
            ));
        };
        if outputs.len() != calibration.len() {
            return Err(ReconstructionError::FrameCountMismatch {
                frames: outputs.len(),
                entries: calibration.len(),
            });
        }
        Ok(self.assemble(width, height, outputs))
    }

    pub fn debayer(&self) -> &D {
        &self.debayer
    }

    pub fn config(&self) -> &ReconstructionConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ReconstructionConfig) {
        self.config = config;
    }
}
