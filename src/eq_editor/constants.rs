//! Editor configuration constants and parameter limits.

/// Number of bands in a default editor.
pub const DEFAULT_BAND_COUNT: usize = 4;

/// Largest band count an editor can be built with.
pub const MAX_BANDS: usize = 8;

/// Lowest band frequency in Hz (left edge of the plot).
pub const FREQ_MIN_HZ: f64 = 20.0;

/// Highest band frequency in Hz (right edge of the plot).
pub const FREQ_MAX_HZ: f64 = 20_000.0;

/// Minimum per-band gain in dB (bottom edge of the plot).
pub const GAIN_MIN_DB: f64 = -24.0;

/// Maximum per-band gain in dB (top edge of the plot).
pub const GAIN_MAX_DB: f64 = 24.0;

/// Minimum Q factor.
pub const Q_MIN: f64 = 0.1;

/// Maximum Q factor.
pub const Q_MAX: f64 = 10.0;

/// Q applied to every band by a reset (Butterworth).
pub const RESET_Q: f64 = 0.707;

/// Minimum output gain in dB.
pub const OUTPUT_GAIN_MIN_DB: f64 = -24.0;

/// Maximum output gain in dB.
pub const OUTPUT_GAIN_MAX_DB: f64 = 24.0;

/// Sample rate the response curve is designed at.
///
/// Independent of the host rate; the curve is a display approximation.
pub const VISUALIZATION_SAMPLE_RATE_HZ: f64 = 48_000.0;

/// Linear magnitude floor applied before converting to dB.
pub const MAGNITUDE_FLOOR: f64 = 1e-10;

/// Handle hit radius in logical pixels (scaled by the device pixel ratio).
pub const HANDLE_HIT_RADIUS_PX: f64 = 15.0;

/// Margin above the plot area in logical pixels.
pub const MARGIN_TOP_PX: f64 = 20.0;

/// Margin right of the plot area in logical pixels.
pub const MARGIN_RIGHT_PX: f64 = 40.0;

/// Margin below the plot area (frequency labels) in logical pixels.
pub const MARGIN_BOTTOM_PX: f64 = 40.0;

/// Margin left of the plot area (gain labels) in logical pixels.
pub const MARGIN_LEFT_PX: f64 = 50.0;

/// Segments in the composite response curve.
pub const COMPOSITE_CURVE_POINTS: usize = 500;

/// Segments in each per-band overlay curve.
pub const BAND_CURVE_POINTS: usize = 200;

/// Largest segment count a curve request may ask for.
pub const MAX_CURVE_SEGMENTS: usize = 1 << 16;
