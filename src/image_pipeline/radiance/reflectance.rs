use crate::image_pipeline::common::error::{ReconstructionError, Result};

use super::types::{RadianceBand, RadianceCube};

/// Divides each radiance band by the matching band of a white reference cube.
///
/// Both cubes must come from the same calibration and band order. Pixels where
/// the white reference is not positive become NaN.
pub fn reflectance(radiance: &RadianceCube, white: &RadianceCube) -> Result<RadianceCube> {
    if (radiance.height, radiance.width) != (white.height, white.width) {
        return Err(ReconstructionError::ShapeMismatch {
            expected: (radiance.height, radiance.width),
            found: (white.height, white.width),
        });
    }
    if radiance.len() != white.len() {
        return Err(ReconstructionError::InvalidParameter(format!(
            "white reference has {} bands, radiance has {}",
            white.len(),
            radiance.len()
        )));
    }

    let bands = radiance
        .bands()
        .iter()
        .zip(white.bands())
        .map(|(rad, white)| {
            if (rad.info.setpoint, rad.info.peak) != (white.info.setpoint, white.info.peak) {
                return Err(ReconstructionError::InvalidParameter(format!(
                    "band {} is setpoint {} peak {} but white reference has setpoint {} peak {}",
                    rad.info.band, rad.info.setpoint, rad.info.peak, white.info.setpoint, white.info.peak
                )));
            }
            let data = rad
                .data
                .iter()
                .zip(&white.data)
                .map(|(&r, &w)| if w > 0.0 { r / w } else { f64::NAN })
                .collect();
            Ok(RadianceBand { info: rad.info, data })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RadianceCube::from_ordered(radiance.width, radiance.height, bands))
}
