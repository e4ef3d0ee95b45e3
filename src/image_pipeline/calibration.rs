//! Per-setpoint spectral calibration
//!
//! Each setpoint lists the passband peaks it transmits and the inversion
//! coefficients (sinvs) that turn demosaiced R, G, B responses into per-peak radiance.

use crate::image_pipeline::common::error::{ReconstructionError, Result};

/// Calibration for one setpoint. Fields are validated on construction and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationEntry {
    wavelengths: Vec<f64>,
    fwhm: Vec<f64>,
    inversion: Vec<[f64; 3]>,
    setpoints: Vec<f64>,
}

impl CalibrationEntry {
    /// `inversion` holds one row of R, G, B coefficients per peak.
    pub fn new(
        peak_count: usize,
        wavelengths: Vec<f64>,
        fwhm: Vec<f64>,
        inversion: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if peak_count == 0 {
            return Err(ReconstructionError::CalibrationShape(
                "peak count must be at least 1".to_string(),
            ));
        }
        if wavelengths.len() != peak_count || fwhm.len() != peak_count {
            return Err(ReconstructionError::CalibrationShape(format!(
                "{} peaks but {} wavelengths and {} fwhm values",
                peak_count,
                wavelengths.len(),
                fwhm.len()
            )));
        }
        if inversion.len() != peak_count {
            return Err(ReconstructionError::CalibrationShape(format!(
                "{} peaks but {} inversion rows",
                peak_count,
                inversion.len()
            )));
        }
        let inversion = inversion
            .into_iter()
            .enumerate()
            .map(|(peak, row)| {
                <[f64; 3]>::try_from(row.as_slice()).map_err(|_| {
                    ReconstructionError::CalibrationShape(format!(
                        "inversion row {} has {} columns, expected 3",
                        peak,
                        row.len()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            wavelengths,
            fwhm,
            inversion,
            setpoints: Vec::new(),
        })
    }

    /// Builds an entry from rows padded to the camera's maximum peak count,
    /// as stored in header files. Only the first `npeaks` values of each row are kept.
    pub fn from_padded(
        npeaks: usize,
        wavelengths: &[f64],
        fwhm: &[f64],
        inversion: &[Vec<f64>],
    ) -> Result<Self> {
        if wavelengths.len() < npeaks || fwhm.len() < npeaks || inversion.len() < npeaks {
            return Err(ReconstructionError::CalibrationShape(format!(
                "padded rows shorter than npeaks={}",
                npeaks
            )));
        }
        Self::new(
            npeaks,
            wavelengths[..npeaks].to_vec(),
            fwhm[..npeaks].to_vec(),
            inversion[..npeaks].to_vec(),
        )
    }

    /// Attaches the interferometer setpoint voltages this entry was measured at.
    pub fn with_setpoints(mut self, setpoints: Vec<f64>) -> Self {
        self.setpoints = setpoints;
        self
    }

    pub fn peak_count(&self) -> usize {
        self.wavelengths.len()
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    pub fn fwhm(&self) -> &[f64] {
        &self.fwhm
    }

    pub fn inversion_matrix(&self) -> &[[f64; 3]] {
        &self.inversion
    }

    pub fn setpoints(&self) -> &[f64] {
        &self.setpoints
    }
}

/// Calibration entries indexed by setpoint, one per raw frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CalibrationTable {
    entries: Vec<CalibrationEntry>,
}

impl CalibrationTable {
    pub fn new(entries: Vec<CalibrationEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CalibrationEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Result<&CalibrationEntry> {
        self.entries.get(index).ok_or(ReconstructionError::CalibrationIndex {
            index,
            len: self.entries.len(),
        })
    }

    pub fn peak_count(&self, index: usize) -> Result<usize> {
        Ok(self.entry(index)?.peak_count())
    }

    pub fn wavelengths(&self, index: usize) -> Result<&[f64]> {
        Ok(self.entry(index)?.wavelengths())
    }

    pub fn fwhm(&self, index: usize) -> Result<&[f64]> {
        Ok(self.entry(index)?.fwhm())
    }

    pub fn inversion_matrix(&self, index: usize) -> Result<&[[f64; 3]]> {
        Ok(self.entry(index)?.inversion_matrix())
    }

    /// Number of radiance bands a reconstruction with this table produces.
    pub fn total_peaks(&self) -> usize {
        self.entries.iter().map(CalibrationEntry::peak_count).sum()
    }
}
