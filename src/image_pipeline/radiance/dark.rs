use crate::image_pipeline::common::error::{ReconstructionError, Result};
use crate::image_pipeline::raw::DarkReference;

/// Subtracts the dark reference, clamping underflow to zero.
///
/// `shape` is the (height, width) of `samples`. Returns the corrected samples and
/// the number of clamped pixels. Without a dark reference the samples are returned
/// unchanged.
pub fn subtract_dark(
    samples: &[u16],
    shape: (usize, usize),
    dark: Option<&DarkReference>,
) -> Result<(Vec<u16>, usize)> {
    let (height, width) = shape;
    if samples.len() != height * width {
        return Err(ReconstructionError::InvalidDimensions(width, height));
    }
    let Some(dark) = dark else {
        return Ok((samples.to_vec(), 0));
    };
    if dark.shape() != shape || dark.data.len() != samples.len() {
        return Err(ReconstructionError::ShapeMismatch {
            expected: shape,
            found: dark.shape(),
        });
    }

    let mut clamped = 0;
    let corrected = samples
        .iter()
        .zip(&dark.data)
        .map(|(&v, &d)| {
            if v < d {
                clamped += 1;
            }
            v.saturating_sub(d)
        })
        .collect();
    Ok((corrected, clamped))
}
