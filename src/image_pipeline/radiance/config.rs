/// Order of bands in the concatenated radiance cube
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BandOrder {
    /// Ascending peak wavelength; equal wavelengths keep (setpoint, peak) order
    #[default]
    AscendingWavelength,
    /// Frame by frame, peaks in calibration order within each frame
    SetpointMajor,
}

/// Configuration for raw to radiance reconstruction
#[derive(Debug, Clone)]
pub struct ReconstructionConfig {
    pub band_order: BandOrder,
    /// Divide by analog gain as well as exposure. Disable when gain is compensated upstream.
    pub normalize_gain: bool,
    /// Process frames on the rayon pool instead of one at a time
    pub parallel: bool,
    /// Whether to validate frame dimensions before reconstruction
    pub validate_dimensions: bool,
    pub max_dimension: Option<usize>,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            band_order: BandOrder::AscendingWavelength,
            normalize_gain: true,
            parallel: true,
            validate_dimensions: true,
            max_dimension: Some(50000),
        }
    }
}

impl ReconstructionConfig {
    pub fn builder() -> ReconstructionConfigBuilder {
        ReconstructionConfigBuilder::default()
    }
}

/// Builder for ReconstructionConfig
#[derive(Default)]
pub struct ReconstructionConfigBuilder {
    band_order: Option<BandOrder>,
    normalize_gain: Option<bool>,
    parallel: Option<bool>,
    validate_dimensions: Option<bool>,
    max_dimension: Option<Option<usize>>,
}

impl ReconstructionConfigBuilder {
    pub fn band_order(mut self, order: BandOrder) -> Self {
        self.band_order = Some(order);
        self
    }

    pub fn normalize_gain(mut self, enable: bool) -> Self {
        self.normalize_gain = Some(enable);
        self
    }

    pub fn parallel(mut self, enable: bool) -> Self {
        self.parallel = Some(enable);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn max_dimension(mut self, max: Option<usize>) -> Self {
        self.max_dimension = Some(max);
        self
    }

    pub fn build(self) -> ReconstructionConfig {
        let default = ReconstructionConfig::default();
        ReconstructionConfig {
            band_order: self.band_order.unwrap_or(default.band_order),
            normalize_gain: self.normalize_gain.unwrap_or(default.normalize_gain),
            parallel: self.parallel.unwrap_or(default.parallel),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
            max_dimension: self.max_dimension.unwrap_or(default.max_dimension),
        }
    }
}
