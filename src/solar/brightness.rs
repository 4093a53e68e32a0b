//! Brightness model.
//!
//! A cubic fitted per elevation band over `x = elevation / 90` gives an
//! illuminance value between 0 and 5.11 (sun at zenith), scaled to percent.
//! Below -12° the model is defined as dark.

use crate::common::constants::BRIGHTNESS_MODEL_MAX;

/// Elevation lower bound and cubic coefficients `c0..c3`, highest band first.
const BANDS: [(f64, [f64; 4]); 5] = [
    (20.0, [3.74, 3.97, -4.07, 1.47]),
    (5.0, [3.05, 13.28, -45.98, 64.33]),
    (-0.8, [2.88, 22.26, -207.64, 1034.30]),
    (-5.0, [2.88, 21.81, -258.11, -858.36]),
    (-12.0, [2.70, 12.17, -431.69, -1899.83]),
];

fn coefficients(elevation: f64) -> [f64; 4] {
    BANDS
        .iter()
        .find(|(lower, _)| elevation >= *lower)
        .map(|(_, c)| *c)
        .unwrap_or([0.0; 4])
}

/// Brightness in percent (0..=100) for an elevation in degrees.
pub fn brightness_percent(elevation: f64) -> u8 {
    let [c0, c1, c2, c3] = coefficients(elevation);
    let x = elevation / 90.0;
    let raw = c0 + c1 * x + c2 * x * x + c3 * x * x * x;
    let percent = (raw / BRIGHTNESS_MODEL_MAX * 100.0).round();
    // The polynomials extrapolate below zero near the bottom of their range.
    if percent.is_nan() {
        0
    } else {
        percent.clamp(0.0, 100.0) as u8
    }
}
