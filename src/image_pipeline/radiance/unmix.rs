use crate::image_pipeline::cfa::CfaColor;
use crate::image_pipeline::debayer::RgbPlanes;

/// Per-peak linear combination of the demosaiced planes:
/// `radiance[p] = sum_c inversion[p][c] * plane[c]`.
pub fn unmix(rgb: &RgbPlanes, inversion: &[[f64; 3]]) -> Vec<Vec<f64>> {
    let [r, g, b] = CfaColor::ALL.map(|c| rgb.plane(c));
    inversion
        .iter()
        .map(|&[kr, kg, kb]| {
            r.iter()
                .zip(g)
                .zip(b)
                .map(|((&rv, &gv), &bv)| kr * rv + kg * gv + kb * bv)
                .collect()
        })
        .collect()
}

/// Converts accumulated signal into a rate by dividing by exposure and, optionally, gain.
pub fn normalize(plane: &mut [f64], exposure: f64, gain: Option<f64>) {
    let divisor = exposure * gain.unwrap_or(1.0);
    plane.iter_mut().for_each(|v| *v /= divisor);
}
