//! Closed-form biquad design (RBJ audio EQ cookbook).
//!
//! Coefficients are returned normalized by `a0`, so evaluation never has to
//! divide again. Designs that come out non-finite (degenerate Q, NaN input)
//! fall back to the identity section.

use std::f64::consts::PI;

use crate::eq_editor::state::{Band, FilterType};

/// Second-order section with `a0` normalized to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl BiquadCoeffs {
    /// Pass-through section.
    pub fn identity() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        }
    }

    /// Always 1 after normalization.
    pub fn a0(&self) -> f64 {
        1.0
    }
}

fn normalize_biquad(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> BiquadCoeffs {
    if !a0.is_finite() || a0.abs() < 1e-12 {
        return BiquadCoeffs::identity();
    }

    let inv_a0 = 1.0 / a0;
    let coeffs = BiquadCoeffs {
        b0: b0 * inv_a0,
        b1: b1 * inv_a0,
        b2: b2 * inv_a0,
        a1: a1 * inv_a0,
        a2: a2 * inv_a0,
    };

    if [coeffs.b0, coeffs.b1, coeffs.b2, coeffs.a1, coeffs.a2]
        .iter()
        .all(|v| v.is_finite())
    {
        coeffs
    } else {
        BiquadCoeffs::identity()
    }
}

struct Prewarp {
    cos_w0: f64,
    sin_w0: f64,
    alpha: f64,
}

impl Prewarp {
    fn new(fs_hz: f64, freq_hz: f64, q: f64) -> Self {
        let w0 = 2.0 * PI * freq_hz / fs_hz;
        let sin_w0 = w0.sin();
        Self {
            cos_w0: w0.cos(),
            sin_w0,
            alpha: sin_w0 / (2.0 * q),
        }
    }
}

/// Amplitude `A` of the cookbook peaking/shelf designs.
fn shelf_amplitude(gain_db: f64) -> f64 {
    10.0_f64.powf(gain_db / 40.0)
}

fn bell(p: &Prewarp, a: f64) -> BiquadCoeffs {
    let b0 = 1.0 + p.alpha * a;
    let b1 = -2.0 * p.cos_w0;
    let b2 = 1.0 - p.alpha * a;
    let a0 = 1.0 + p.alpha / a;
    let a1 = -2.0 * p.cos_w0;
    let a2 = 1.0 - p.alpha / a;

    normalize_biquad(b0, b1, b2, a0, a1, a2)
}

fn low_shelf(p: &Prewarp, a: f64, q: f64) -> BiquadCoeffs {
    let beta = a.sqrt() / q;
    let cos = p.cos_w0;
    let bs = beta * p.sin_w0;

    let b0 = a * ((a + 1.0) - (a - 1.0) * cos + bs);
    let b1 = 2.0 * a * ((a - 1.0) - (a + 1.0) * cos);
    let b2 = a * ((a + 1.0) - (a - 1.0) * cos - bs);
    let a0 = (a + 1.0) + (a - 1.0) * cos + bs;
    let a1 = -2.0 * ((a - 1.0) + (a + 1.0) * cos);
    let a2 = (a + 1.0) + (a - 1.0) * cos - bs;

    normalize_biquad(b0, b1, b2, a0, a1, a2)
}

fn high_shelf(p: &Prewarp, a: f64, q: f64) -> BiquadCoeffs {
    let beta = a.sqrt() / q;
    let cos = p.cos_w0;
    let bs = beta * p.sin_w0;

    let b0 = a * ((a + 1.0) + (a - 1.0) * cos + bs);
    let b1 = -2.0 * a * ((a - 1.0) + (a + 1.0) * cos);
    let b2 = a * ((a + 1.0) + (a - 1.0) * cos - bs);
    let a0 = (a + 1.0) - (a - 1.0) * cos + bs;
    let a1 = 2.0 * ((a - 1.0) - (a + 1.0) * cos);
    let a2 = (a + 1.0) - (a - 1.0) * cos - bs;

    normalize_biquad(b0, b1, b2, a0, a1, a2)
}

fn high_pass(p: &Prewarp) -> BiquadCoeffs {
    let b0 = (1.0 + p.cos_w0) * 0.5;
    let b1 = -(1.0 + p.cos_w0);
    let b2 = (1.0 + p.cos_w0) * 0.5;
    let a0 = 1.0 + p.alpha;
    let a1 = -2.0 * p.cos_w0;
    let a2 = 1.0 - p.alpha;

    normalize_biquad(b0, b1, b2, a0, a1, a2)
}

fn low_pass(p: &Prewarp) -> BiquadCoeffs {
    let b0 = (1.0 - p.cos_w0) * 0.5;
    let b1 = 1.0 - p.cos_w0;
    let b2 = (1.0 - p.cos_w0) * 0.5;
    let a0 = 1.0 + p.alpha;
    let a1 = -2.0 * p.cos_w0;
    let a2 = 1.0 - p.alpha;

    normalize_biquad(b0, b1, b2, a0, a1, a2)
}

/// Designs one band's section.
///
/// # Parameters
///
/// - `filter_type`: Filter shape
/// - `freq_hz`: Center (bell) or corner (shelf, cut) frequency
/// - `gain_db`: Boost/cut; not read for [`FilterType::LowCut`] and [`FilterType::HighCut`]
/// - `q`: Bandwidth for bells, slope for shelves and cuts
/// - `fs_hz`: Sample rate the section is designed at
pub fn design(
    filter_type: FilterType,
    freq_hz: f64,
    gain_db: f64,
    q: f64,
    fs_hz: f64,
) -> BiquadCoeffs {
    if !fs_hz.is_finite() || fs_hz <= 0.0 {
        return BiquadCoeffs::identity();
    }

    let p = Prewarp::new(fs_hz, freq_hz, q);
    match filter_type {
        FilterType::Bell => bell(&p, shelf_amplitude(gain_db)),
        FilterType::LowShelf => low_shelf(&p, shelf_amplitude(gain_db), q),
        FilterType::HighShelf => high_shelf(&p, shelf_amplitude(gain_db), q),
        FilterType::LowCut => high_pass(&p),
        FilterType::HighCut => low_pass(&p),
    }
}

/// Designs the section for `band`, ignoring its enabled flag.
pub fn coeffs_for_band(band: &Band, fs_hz: f64) -> BiquadCoeffs {
    design(band.filter_type, band.frequency, band.gain, band.q, fs_hz)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FS: f64 = 48_000.0;

    fn dc_gain(c: &BiquadCoeffs) -> f64 {
        (c.b0 + c.b1 + c.b2) / (1.0 + c.a1 + c.a2)
    }

    fn nyquist_gain(c: &BiquadCoeffs) -> f64 {
        (c.b0 - c.b1 + c.b2) / (1.0 - c.a1 + c.a2)
    }

    #[test]
    fn test_bell_zero_gain_is_identity() {
        let c = design(FilterType::Bell, 1_000.0, 0.0, 1.0, FS);
        assert!((c.b0 - 1.0).abs() < 1e-12);
        assert!((c.b1 - c.a1).abs() < 1e-12);
        assert!((c.b2 - c.a2).abs() < 1e-12);
    }

    #[test]
    fn test_bell_matches_cookbook_before_normalization() {
        let w0 = 2.0 * PI * 1_000.0 / FS;
        let alpha = w0.sin() / 2.0;
        let a = 10.0_f64.powf(6.0 / 40.0);
        let a0 = 1.0 + alpha / a;

        let c = design(FilterType::Bell, 1_000.0, 6.0, 1.0, FS);
        assert!((c.b0 - (1.0 + alpha * a) / a0).abs() < 1e-12);
        assert!((c.b1 - (-2.0 * w0.cos()) / a0).abs() < 1e-12);
        assert!((c.a2 - (1.0 - alpha / a) / a0).abs() < 1e-12);
        assert_eq!(c.a0(), 1.0);
    }

    #[test]
    fn test_shelves_reach_full_gain_at_the_far_end() {
        let low = design(FilterType::LowShelf, 200.0, 12.0, 0.707, FS);
        let high = design(FilterType::HighShelf, 4_000.0, -9.0, 0.707, FS);

        assert!((20.0 * dc_gain(&low).log10() - 12.0).abs() < 1e-6);
        assert!((20.0 * nyquist_gain(&low).log10()).abs() < 1e-6);
        assert!((20.0 * nyquist_gain(&high).log10() + 9.0).abs() < 1e-6);
        assert!((20.0 * dc_gain(&high).log10()).abs() < 1e-6);
    }

    #[test]
    fn test_cuts_block_the_stop_band() {
        let hp = design(FilterType::LowCut, 100.0, 0.0, 0.707, FS);
        let lp = design(FilterType::HighCut, 10_000.0, 0.0, 0.707, FS);

        assert!(dc_gain(&hp).abs() < 1e-9);
        assert!((nyquist_gain(&hp) - 1.0).abs() < 1e-9);
        assert!(nyquist_gain(&lp).abs() < 1e-9);
        assert!((dc_gain(&lp) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cuts_do_not_read_gain() {
        for filter_type in [FilterType::LowCut, FilterType::HighCut] {
            let a = design(filter_type, 800.0, -24.0, 2.0, FS);
            let b = design(filter_type, 800.0, 24.0, 2.0, FS);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_degenerate_input_falls_back_to_identity() {
        assert_eq!(
            design(FilterType::Bell, 1_000.0, 6.0, 0.0, FS),
            BiquadCoeffs::identity()
        );
        assert_eq!(
            design(FilterType::HighShelf, f64::NAN, 6.0, 1.0, FS),
            BiquadCoeffs::identity()
        );
        assert_eq!(
            design(FilterType::Bell, 1_000.0, 6.0, 1.0, 0.0),
            BiquadCoeffs::identity()
        );
    }
}
