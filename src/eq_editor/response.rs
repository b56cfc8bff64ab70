//! Magnitude response of the band cascade.
//!
//! Bands are independent biquads in series, so their linear magnitudes multiply
//! and their dB magnitudes add. Everything is evaluated at
//! [`VISUALIZATION_SAMPLE_RATE_HZ`].

use std::f64::consts::PI;
use std::slice;

use crate::eq_editor::biquad::{BiquadCoeffs, coeffs_for_band};
use crate::eq_editor::constants::{
    MAGNITUDE_FLOOR, MAX_CURVE_SEGMENTS, VISUALIZATION_SAMPLE_RATE_HZ,
};
use crate::eq_editor::coords::x_to_frequency;
use crate::eq_editor::state::Band;

/// Linear magnitude `|H(e^jw)|` of a normalized section at digital frequency `w`.
fn magnitude(c: &BiquadCoeffs, w: f64) -> f64 {
    let (sin_w, cos_w) = w.sin_cos();
    let (sin_2w, cos_2w) = (2.0 * w).sin_cos();

    let num_re = c.b0 + c.b1 * cos_w + c.b2 * cos_2w;
    let num_im = c.b1 * sin_w + c.b2 * sin_2w;
    let den_re = 1.0 + c.a1 * cos_w + c.a2 * cos_2w;
    let den_im = c.a1 * sin_w + c.a2 * sin_2w;

    (num_re * num_re + num_im * num_im).sqrt() / (den_re * den_re + den_im * den_im).sqrt()
}

fn to_db(linear: f64) -> f64 {
    // NaN from a 0/0 evaluation also lands on the floor.
    20.0 * linear.max(MAGNITUDE_FLOOR).log10()
}

/// Response of one band at `query_hz`, in dB.
///
/// Disabled bands and invalid query frequencies contribute 0 dB.
pub fn band_magnitude_db(band: &Band, query_hz: f64) -> f64 {
    if !band.enabled || !query_hz.is_finite() || query_hz <= 0.0 {
        return 0.0;
    }

    let coeffs = coeffs_for_band(band, VISUALIZATION_SAMPLE_RATE_HZ);
    let w = 2.0 * PI * query_hz / VISUALIZATION_SAMPLE_RATE_HZ;
    to_db(magnitude(&coeffs, w))
}

/// Combined response of all enabled bands at `query_hz`, in dB.
pub fn composite_response_db(bands: &[Band], query_hz: f64) -> f64 {
    bands
        .iter()
        .filter(|band| band.enabled)
        .map(|band| band_magnitude_db(band, query_hz))
        .sum()
}

/// Evenly x-spaced `(frequency_hz, gain_db)` samples across the plot.
///
/// Yields `n + 1` points from `x = 0` to `x = 1` inclusive. Nothing is
/// computed up front; a clone taken before iterating replays the same points.
#[derive(Debug, Clone)]
pub struct CurveSamples<'a> {
    bands: &'a [Band],
    output_gain_db: f64,
    bypass: bool,
    segments: usize,
    next: usize,
    done: bool,
}

impl Iterator for CurveSamples<'_> {
    type Item = (f64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let x = if self.segments == 0 {
            0.0
        } else {
            self.next as f64 / self.segments as f64
        };
        if self.next == self.segments {
            self.done = true;
        } else {
            self.next += 1;
        }

        let frequency = x_to_frequency(x);
        let gain = if self.bypass {
            self.output_gain_db
        } else {
            composite_response_db(self.bands, frequency) + self.output_gain_db
        };

        Some((frequency, gain))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.done {
            0
        } else {
            self.segments - self.next + 1
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CurveSamples<'_> {}

/// Composite curve including output gain; flat at `output_gain_db` when bypassed.
///
/// `n` is capped at [`MAX_CURVE_SEGMENTS`].
pub fn curve_samples(
    bands: &[Band],
    output_gain_db: f64,
    bypass: bool,
    n: usize,
) -> CurveSamples<'_> {
    CurveSamples {
        bands,
        output_gain_db,
        bypass,
        segments: n.min(MAX_CURVE_SEGMENTS),
        next: 0,
        done: false,
    }
}

/// Curve of a single band on its own, without output gain.
pub fn band_curve_samples(band: &Band, n: usize) -> CurveSamples<'_> {
    curve_samples(slice::from_ref(band), 0.0, false, n)
}
