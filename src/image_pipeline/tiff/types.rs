//! TIFF output configuration types

/// TIFF compression methods
#[derive(Debug, Clone, Copy, Default)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    #[default]
    None,
    /// LZW compression (slow, good compression)
    Lzw,
    /// Deflate compression - fast level (good speed/size balance)
    DeflateFast,
    /// Deflate compression - balanced
    DeflateBalanced,
    /// Deflate compression - best compression (slower)
    DeflateBest,
}

/// Configuration for radiance cube output
#[derive(Debug, Clone, Default)]
pub struct WriterConfig {
    pub compression: TiffCompression,
    /// Store band provenance (wavelength, fwhm, setpoint, peak) in each page's ImageDescription
    pub describe_bands: bool,
}
