//! Synthetic stacks and calibrations for tests, benchmarks and the demo binary.
//!
//! The calibration cycles through setpoints with 1, 2 and 3 peaks whose inversion
//! rows each pick a distinct sum of channels, so constant-colour mosaics give a
//! distinct, easily predicted radiance per band.

use crate::image_pipeline::calibration::{CalibrationEntry, CalibrationTable};
use crate::image_pipeline::cfa::{BayerPattern, CfaColor};
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::raw::{FrameAttributes, RawFrameStack};

const PEAK_CYCLE: [usize; 3] = [1, 2, 3];

const SINV_CYCLE: [[[f64; 3]; 3]; 3] = [
    [[0.0, 0.0, 1.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]],
    [[0.0, 1.0, 0.0], [0.0, 1.0, 1.0], [0.0, 0.0, 0.0]],
    [[1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [1.0, 1.0, 0.0]],
];

pub const SYNTHETIC_FWHM: f64 = 10.0;

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => (0..n)
            .map(|i| start + (end - start) * i as f64 / (n - 1) as f64)
            .collect(),
    }
}

/// Mosaic samples for one frame with constant per-channel values.
pub fn cfa_frame(height: usize, width: usize, pattern: BayerPattern, rgb: [u16; 3]) -> Vec<u16> {
    (0..height * width)
        .map(|i| rgb[pattern.color_at(i / width, i % width).index()])
        .collect()
}

/// Stack of identical constant-colour frames sharing exposure, gain and pattern.
pub fn raw_stack(
    frames: usize,
    height: usize,
    width: usize,
    pattern: BayerPattern,
    rgb: [u16; 3],
    exposure: f64,
    gain: f64,
) -> Result<RawFrameStack> {
    let frame = cfa_frame(height, width, pattern, rgb);
    let data: Vec<u16> = std::iter::repeat_n(frame, frames).flatten().collect();
    let attrs = vec![FrameAttributes { exposure, gain, pattern }; frames];
    RawFrameStack::from_cube(height, width, &data, 16, &attrs)
}

/// Calibration with peak counts cycling 1, 2, 3 and wavelengths spread evenly over
/// `wl_range`, assigned first peaks first so that wavelength order is peak-major.
pub fn calibration(frames: usize, wl_range: (f64, f64)) -> Result<CalibrationTable> {
    let npeaks: Vec<usize> = (0..frames).map(|i| PEAK_CYCLE[i % 3]).collect();
    let total: usize = npeaks.iter().sum();
    let mut wls = linspace(wl_range.0, wl_range.1, total).into_iter();

    let mut wavelengths = vec![Vec::new(); frames];
    for peak in 0..3 {
        for (idx, &n) in npeaks.iter().enumerate() {
            if peak < n {
                wavelengths[idx].extend(wls.next());
            }
        }
    }

    let entries = wavelengths
        .into_iter()
        .enumerate()
        .map(|(idx, wls)| {
            let n = npeaks[idx];
            let sinvs = SINV_CYCLE[idx % 3][..n].iter().map(|row| row.to_vec()).collect();
            CalibrationEntry::new(n, wls, vec![SYNTHETIC_FWHM; n], sinvs)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(CalibrationTable::new(entries))
}

/// Radiance expected for every (setpoint, peak) of `calibration` when each frame is a
/// constant-colour mosaic of `rgb` with a constant dark level, in setpoint-major order.
pub fn expected_radiance(
    calibration: &CalibrationTable,
    rgb: [u16; 3],
    dark_level: u16,
    exposure: f64,
    gain: f64,
) -> Vec<(usize, usize, f64)> {
    let signal = CfaColor::ALL.map(|c| rgb[c.index()].saturating_sub(dark_level) as f64);
    calibration
        .entries()
        .iter()
        .enumerate()
        .flat_map(|(setpoint, entry)| {
            entry
                .inversion_matrix()
                .iter()
                .enumerate()
                .map(move |(peak, row)| {
                    let value: f64 = row.iter().zip(signal).map(|(k, s)| k * s).sum();
                    (setpoint, peak, value / (exposure * gain))
                })
        })
        .collect()
}
