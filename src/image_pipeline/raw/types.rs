//! Raw mosaic data types

use crate::image_pipeline::cfa::BayerPattern;
use crate::image_pipeline::common::error::{ReconstructionError, Result};

/// Decoded single-channel mosaic samples, as produced by a `RawFrameReader`
#[derive(Debug, Clone)]
pub struct RawImageData {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// Raw pixel data (single channel Bayer mosaic), row-major
    pub data: Vec<u16>,
    /// Actual bits per sample from the sensor (e.g., 12, 14, or 16)
    pub bits_per_sample: u32,
}

/// Acquisition attributes recorded alongside each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameAttributes {
    /// Exposure time in milliseconds
    pub exposure: f64,
    /// Analog gain
    pub gain: f64,
    pub pattern: BayerPattern,
}

/// One setpoint's mosaic frame with its acquisition attributes
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u16>,
    /// Sensor depth; the reconstructor rejects samples that do not fit in it
    pub bits_per_sample: u32,
    pub exposure: f64,
    pub gain: f64,
    pub pattern: BayerPattern,
}

impl RawFrame {
    pub fn from_image(image: RawImageData, attrs: FrameAttributes) -> Result<Self> {
        if image.data.len() != image.width * image.height {
            return Err(ReconstructionError::InvalidDimensions(image.width, image.height));
        }
        Ok(Self {
            width: image.width,
            height: image.height,
            data: image.data,
            bits_per_sample: image.bits_per_sample,
            exposure: attrs.exposure,
            gain: attrs.gain,
            pattern: attrs.pattern,
        })
    }

    /// (height, width)
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn attributes(&self) -> FrameAttributes {
        FrameAttributes {
            exposure: self.exposure,
            gain: self.gain,
            pattern: self.pattern,
        }
    }
}

/// Ordered frames, one per setpoint, all with the same spatial shape
#[derive(Debug, Clone)]
pub struct RawFrameStack {
    frames: Vec<RawFrame>,
}

impl RawFrameStack {
    pub fn new(frames: Vec<RawFrame>) -> Result<Self> {
        let Some(first) = frames.first() else {
            return Err(ReconstructionError::InvalidParameter(
                "raw frame stack is empty".to_string(),
            ));
        };
        let expected = first.shape();
        for frame in &frames {
            if frame.data.len() != frame.width * frame.height {
                return Err(ReconstructionError::InvalidDimensions(frame.width, frame.height));
            }
            if frame.shape() != expected {
                return Err(ReconstructionError::ShapeMismatch {
                    expected,
                    found: frame.shape(),
                });
            }
        }
        Ok(Self { frames })
    }

    /// Builds a stack from a (frame, height, width) array and per-frame attributes.
    pub fn from_cube(
        height: usize,
        width: usize,
        data: &[u16],
        bits_per_sample: u32,
        attrs: &[FrameAttributes],
    ) -> Result<Self> {
        let frame_len = height * width;
        if frame_len == 0 || data.len() != frame_len * attrs.len() {
            return Err(ReconstructionError::InvalidParameter(format!(
                "cube of {} samples does not hold {} frames of {}x{}",
                data.len(),
                attrs.len(),
                height,
                width
            )));
        }
        let frames = data
            .chunks_exact(frame_len)
            .zip(attrs)
            .map(|(samples, attrs)| RawFrame {
                width,
                height,
                data: samples.to_vec(),
                bits_per_sample,
                exposure: attrs.exposure,
                gain: attrs.gain,
                pattern: attrs.pattern,
            })
            .collect();
        Self::new(frames)
    }

    /// Removes the leading dark layer that some cameras store as frame 0.
    pub fn split_dark_layer(mut self) -> Result<(RawFrameStack, DarkReference)> {
        if self.frames.len() < 2 {
            return Err(ReconstructionError::InvalidParameter(
                "stack needs a dark layer and at least one frame".to_string(),
            ));
        }
        let dark = self.frames.remove(0);
        let dark = DarkReference::new(dark.width, dark.height, dark.data)?;
        Ok((self, dark))
    }

    pub fn frames(&self) -> &[RawFrame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<RawFrame> {
        self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.frames[0].shape()
    }
}

/// Sensor bias / dark current image subtracted from every frame
#[derive(Debug, Clone, PartialEq)]
pub struct DarkReference {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u16>,
}

impl DarkReference {
    pub fn new(width: usize, height: usize, data: Vec<u16>) -> Result<Self> {
        if data.len() != width * height {
            return Err(ReconstructionError::InvalidDimensions(width, height));
        }
        Ok(Self { width, height, data })
    }

    pub fn constant(width: usize, height: usize, level: u16) -> Self {
        Self {
            width,
            height,
            data: vec![level; width * height],
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}
