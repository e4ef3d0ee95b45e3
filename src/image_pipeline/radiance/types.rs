use crate::image_pipeline::common::warning::ReconstructionWarning;

/// Provenance of one radiance band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandInfo {
    /// 1-based position on the band axis after ordering
    pub band: usize,
    /// Index of the source frame / calibration entry
    pub setpoint: usize,
    /// Index of the peak within the setpoint
    pub peak: usize,
    /// Peak center wavelength in nm
    pub wavelength: f64,
    /// Peak full width at half maximum in nm
    pub fwhm: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadianceBand {
    pub info: BandInfo,
    /// Row-major radiance values
    pub data: Vec<f64>,
}

/// Radiance images stacked along one band axis
#[derive(Debug, Clone, PartialEq)]
pub struct RadianceCube {
    pub width: usize,
    pub height: usize,
    bands: Vec<RadianceBand>,
}

impl RadianceCube {
    /// Assembles a cube from bands that are already ordered, numbering them from 1.
    pub(crate) fn from_ordered(width: usize, height: usize, mut bands: Vec<RadianceBand>) -> Self {
        for (i, band) in bands.iter_mut().enumerate() {
            band.info.band = i + 1;
        }
        Self { width, height, bands }
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// (bands, height, width)
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.bands.len(), self.height, self.width)
    }

    pub fn bands(&self) -> &[RadianceBand] {
        &self.bands
    }

    pub fn band(&self, index: usize) -> Option<&RadianceBand> {
        self.bands.get(index)
    }

    pub fn infos(&self) -> impl Iterator<Item = &BandInfo> {
        self.bands.iter().map(|b| &b.info)
    }

    pub fn wavelengths(&self) -> Vec<f64> {
        self.infos().map(|i| i.wavelength).collect()
    }

    /// Flattens into a (band, y, x) array.
    pub fn to_array(&self) -> Vec<f64> {
        self.bands.iter().flat_map(|b| b.data.iter().copied()).collect()
    }
}

/// Successful reconstruction result with the non-fatal findings met along the way
#[derive(Debug, Clone)]
pub struct Reconstruction {
    pub cube: RadianceCube,
    pub warnings: Vec<ReconstructionWarning>,
}
