//! Band model and the editable EQ state.
//!
//! [`EqState`] owns a fixed-length, ordered list of [`Band`]s plus the global
//! output gain and bypass flag. All setters clamp into the declared ranges
//! rather than rejecting values; out-of-range band indices and non-finite
//! numbers are ignored and logged.

use pyo3::prelude::*;
use serde::{Deserialize, Serialize};

use crate::eq_editor::constants::{
    DEFAULT_BAND_COUNT, FREQ_MAX_HZ, FREQ_MIN_HZ, GAIN_MAX_DB, GAIN_MIN_DB, MAX_BANDS,
    OUTPUT_GAIN_MAX_DB, OUTPUT_GAIN_MIN_DB, Q_MAX, Q_MIN, RESET_Q,
};
use crate::eq_editor::coords::x_to_frequency;
use crate::eq_editor::errors::EditorError;

/// Filter shape of a single band.
///
/// The discriminant is the value used by the parameter layer and the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
#[pyclass(eq, eq_int)]
pub enum FilterType {
    /// High-pass. Only available on the first band.
    LowCut = 0,
    Bell = 1,
    LowShelf = 2,
    HighShelf = 3,
    /// Low-pass. Only available on the last band.
    HighCut = 4,
}

impl FilterType {
    pub const ALL: [FilterType; 5] = [
        FilterType::LowCut,
        FilterType::Bell,
        FilterType::LowShelf,
        FilterType::HighShelf,
        FilterType::HighCut,
    ];

    /// Looks up a type by its parameter value. Unknown values yield `None`.
    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.display_name().eq_ignore_ascii_case(name))
    }
}

impl From<FilterType> for i64 {
    fn from(filter_type: FilterType) -> Self {
        filter_type as i64
    }
}

impl TryFrom<i64> for FilterType {
    type Error = String;

    fn try_from(index: i64) -> Result<Self, Self::Error> {
        Self::from_index(index).ok_or_else(|| format!("unknown filter type index {index}"))
    }
}

#[pymethods]
impl FilterType {
    /// Parameter value of this type.
    pub fn index(&self) -> i64 {
        *self as i64
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::LowCut => "Low Cut",
            Self::Bell => "Bell",
            Self::LowShelf => "Low Shelf",
            Self::HighShelf => "High Shelf",
            Self::HighCut => "High Cut",
        }
    }

    /// Whether the gain parameter affects this filter shape.
    pub fn uses_gain(&self) -> bool {
        !matches!(self, Self::LowCut | Self::HighCut)
    }

    /// Label for the Q control of this filter shape.
    pub fn q_label(&self) -> &'static str {
        match self {
            Self::Bell => "Q",
            Self::LowShelf | Self::HighShelf | Self::LowCut | Self::HighCut => "Slope",
        }
    }
}

/// Filter types a band at `position` may use in an editor of `band_count` bands.
///
/// Shelves and bells are allowed everywhere; the first band additionally allows
/// [`FilterType::LowCut`] and the last band [`FilterType::HighCut`].
pub fn allowed_filter_types(position: usize, band_count: usize) -> Vec<FilterType> {
    FilterType::ALL
        .into_iter()
        .filter(|t| is_type_allowed(*t, position, band_count))
        .collect()
}

pub fn is_type_allowed(filter_type: FilterType, position: usize, band_count: usize) -> bool {
    if position >= band_count {
        return false;
    }

    match filter_type {
        FilterType::Bell | FilterType::LowShelf | FilterType::HighShelf => true,
        FilterType::LowCut => position == 0,
        FilterType::HighCut => position + 1 == band_count,
    }
}

/// One equalizer stage.
#[derive(Debug, Clone, Copy, PartialEq)]
#[pyclass(get_all)]
pub struct Band {
    pub filter_type: FilterType,
    /// Center or corner frequency in Hz.
    pub frequency: f64,
    /// Gain in dB. Ignored for cut filters.
    pub gain: f64,
    pub q: f64,
    pub enabled: bool,
}

impl Band {
    pub fn new(filter_type: FilterType, frequency: f64, gain: f64, q: f64) -> Self {
        Self {
            filter_type,
            frequency,
            gain,
            q,
            enabled: true,
        }
    }
}

/// Factory settings of the band at `position` in an editor of `band_count` bands.
pub fn default_band(position: usize, band_count: usize) -> Band {
    match position {
        0 => Band::new(FilterType::LowShelf, 100.0, 0.0, 0.707),
        1 => Band::new(FilterType::Bell, 500.0, 0.0, 1.0),
        2 => Band::new(FilterType::Bell, 2_000.0, 0.0, 1.0),
        3 => Band::new(FilterType::HighShelf, 8_000.0, 0.0, 0.707),
        _ => {
            // Extra bells spread evenly across the log axis.
            let x = (position + 1) as f64 / (band_count + 1) as f64;
            Band::new(FilterType::Bell, x_to_frequency(x), 0.0, 1.0)
        }
    }
}

fn is_finite_or_warn(what: &str, value: f64) -> bool {
    if value.is_finite() {
        true
    } else {
        log::warn!("ignoring non-finite {what}: {value}");
        false
    }
}

/// Editable EQ settings.
#[derive(Debug, Clone, PartialEq)]
pub struct EqState {
    bands: Vec<Band>,
    output_gain: f64,
    bypass: bool,
}

impl Default for EqState {
    fn default() -> Self {
        Self::from_defaults(DEFAULT_BAND_COUNT)
    }
}

impl EqState {
    /// Creates a state with `band_count` bands at their factory settings.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::BandCount`] unless `1 <= band_count <= MAX_BANDS`.
    pub fn with_band_count(band_count: usize) -> Result<Self, EditorError> {
        if band_count == 0 || band_count > MAX_BANDS {
            return Err(EditorError::BandCount {
                count: band_count,
                max: MAX_BANDS,
            });
        }

        Ok(Self::from_defaults(band_count))
    }

    fn from_defaults(band_count: usize) -> Self {
        Self {
            bands: (0..band_count)
                .map(|i| default_band(i, band_count))
                .collect(),
            output_gain: 0.0,
            bypass: false,
        }
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn band(&self, index: usize) -> Option<&Band> {
        self.bands.get(index)
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    pub fn output_gain(&self) -> f64 {
        self.output_gain
    }

    pub fn bypass(&self) -> bool {
        self.bypass
    }

    fn band_mut(&mut self, index: usize) -> Option<&mut Band> {
        let count = self.bands.len();
        let band = self.bands.get_mut(index);
        if band.is_none() {
            log::warn!("band index out of range (expected 0..{count}, got {index})");
        }
        band
    }

    /// Changes a band's filter type if its position allows it.
    ///
    /// Returns `false` when the index is invalid or the type is not allowed at
    /// that position.
    pub fn set_band_type(&mut self, index: usize, filter_type: FilterType) -> bool {
        let count = self.bands.len();
        let Some(band) = self.band_mut(index) else {
            return false;
        };

        if !is_type_allowed(filter_type, index, count) {
            log::warn!(
                "{} is not allowed on band {} of {count}",
                filter_type.display_name(),
                index + 1
            );
            return false;
        }

        band.filter_type = filter_type;
        true
    }

    /// Sets a band's frequency, clamped to the plot range.
    pub fn set_band_frequency(&mut self, index: usize, frequency_hz: f64) -> bool {
        if !is_finite_or_warn("frequency", frequency_hz) {
            return false;
        }
        let Some(band) = self.band_mut(index) else {
            return false;
        };

        band.frequency = frequency_hz.clamp(FREQ_MIN_HZ, FREQ_MAX_HZ);
        true
    }

    /// Sets a band's gain, clamped to the plot range.
    pub fn set_band_gain(&mut self, index: usize, gain_db: f64) -> bool {
        if !is_finite_or_warn("gain", gain_db) {
            return false;
        }
        let Some(band) = self.band_mut(index) else {
            return false;
        };

        band.gain = gain_db.clamp(GAIN_MIN_DB, GAIN_MAX_DB);
        true
    }

    pub fn set_band_q(&mut self, index: usize, q: f64) -> bool {
        if !is_finite_or_warn("q", q) {
            return false;
        }
        let Some(band) = self.band_mut(index) else {
            return false;
        };

        band.q = q.clamp(Q_MIN, Q_MAX);
        true
    }

    pub fn set_band_enabled(&mut self, index: usize, enabled: bool) -> bool {
        let Some(band) = self.band_mut(index) else {
            return false;
        };

        band.enabled = enabled;
        true
    }

    pub fn set_output_gain(&mut self, gain_db: f64) -> bool {
        if !is_finite_or_warn("output gain", gain_db) {
            return false;
        }

        self.output_gain = gain_db.clamp(OUTPUT_GAIN_MIN_DB, OUTPUT_GAIN_MAX_DB);
        true
    }

    pub fn set_bypass(&mut self, bypass: bool) {
        self.bypass = bypass;
    }

    /// Flattens every band: gain to 0 dB and Q to [`RESET_Q`].
    ///
    /// Types, frequencies and enable flags are kept.
    pub fn reset_all_bands(&mut self) {
        for band in &mut self.bands {
            band.gain = 0.0;
            band.q = RESET_Q;
        }
    }
}
