//! Normalized parameter interface.
//!
//! Every editable value is addressable by a string id (`band1Freq`,
//! `outputGain`, ...) and described by a [`ParamDescriptor`] that maps it to
//! and from the `[0, 1]` range a plugin host automates, and to and from the
//! display text the host shows.

use std::fmt;
use std::str::FromStr;

use crate::eq_editor::constants::{
    FREQ_MAX_HZ, FREQ_MIN_HZ, GAIN_MAX_DB, GAIN_MIN_DB, OUTPUT_GAIN_MAX_DB, OUTPUT_GAIN_MIN_DB,
    Q_MAX, Q_MIN,
};
use crate::eq_editor::errors::EditorError;
use crate::eq_editor::state::{EqState, FilterType, default_band};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamScale {
    Linear,
    Logarithmic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Float,
    /// `0.0` or `1.0`; anything above `0.5` reads as on.
    Bool,
    /// Raw [`FilterType`] index, passed through normalization unchanged.
    Enum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BandParam {
    Type,
    Frequency,
    Gain,
    Q,
    Enable,
}

impl BandParam {
    pub const ALL: [BandParam; 5] = [
        BandParam::Type,
        BandParam::Frequency,
        BandParam::Gain,
        BandParam::Q,
        BandParam::Enable,
    ];

    fn suffix(self) -> &'static str {
        match self {
            Self::Type => "Type",
            Self::Frequency => "Freq",
            Self::Gain => "Gain",
            Self::Q => "Q",
            Self::Enable => "Enable",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Type => "Type",
            Self::Frequency => "Frequency",
            Self::Gain => "Gain",
            Self::Q => "Q",
            Self::Enable => "Enable",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.suffix() == suffix)
    }
}

/// Parameter address. Band indices are zero-based; the string form is one-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    Band { index: usize, param: BandParam },
    OutputGain,
    Bypass,
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Band { index, param } => write!(f, "band{}{}", index + 1, param.suffix()),
            Self::OutputGain => f.write_str("outputGain"),
            Self::Bypass => f.write_str("bypass"),
        }
    }
}

impl FromStr for ParamId {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "outputGain" => return Ok(Self::OutputGain),
            "bypass" => return Ok(Self::Bypass),
            _ => {}
        }

        let unknown = || EditorError::UnknownParam(s.to_string());

        let rest = s.strip_prefix("band").ok_or_else(unknown)?;
        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(unknown)?;
        let (number, suffix) = rest.split_at(digits);

        let number: usize = number.parse().map_err(|_| unknown())?;
        if number == 0 {
            return Err(unknown());
        }
        let param = BandParam::from_suffix(suffix).ok_or_else(unknown)?;

        Ok(Self::Band {
            index: number - 1,
            param,
        })
    }
}

/// Range, scale and display rules of one parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDescriptor {
    pub id: ParamId,
    pub label: String,
    pub min: f64,
    pub max: f64,
    pub default_value: f64,
    pub scale: ParamScale,
    pub kind: ParamKind,
}

impl ParamDescriptor {
    /// Maps a plain value to `[0, 1]`. Out-of-range values are clamped first.
    ///
    /// Enum values stay raw indices on the wire, rounded into `[min, max]`.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.kind == ParamKind::Enum {
            return value.round().clamp(self.min, self.max);
        }

        let value = value.clamp(self.min, self.max);
        let norm = match self.scale {
            ParamScale::Linear => (value - self.min) / (self.max - self.min),
            ParamScale::Logarithmic => (value / self.min).ln() / (self.max / self.min).ln(),
        };
        norm.clamp(0.0, 1.0)
    }

    /// Maps `[0, 1]` back to a plain value, snapping bool and enum kinds.
    pub fn denormalize(&self, norm: f64) -> f64 {
        if self.kind == ParamKind::Enum {
            return norm.round().clamp(self.min, self.max);
        }

        let norm = norm.clamp(0.0, 1.0);
        let value = match self.scale {
            ParamScale::Linear => self.min + norm * (self.max - self.min),
            ParamScale::Logarithmic => self.min * (self.max / self.min).powf(norm),
        };

        match self.kind {
            ParamKind::Float => value.clamp(self.min, self.max),
            ParamKind::Bool => {
                if value > 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            ParamKind::Enum => value.round().clamp(self.min, self.max),
        }
    }

    /// Display text of a plain value.
    pub fn value_to_text(&self, value: f64) -> String {
        match self.id {
            ParamId::Band {
                param: BandParam::Type,
                ..
            } => value
                .is_finite()
                .then(|| FilterType::from_index(value.round() as i64))
                .flatten()
                .map_or("Unknown", |t| t.display_name())
                .to_string(),
            ParamId::Band {
                param: BandParam::Frequency,
                ..
            } => format_frequency(value),
            ParamId::Band {
                param: BandParam::Gain,
                ..
            }
            | ParamId::OutputGain => format!("{value:.1} dB"),
            ParamId::Band {
                param: BandParam::Q,
                ..
            } => format!("{value:.2}"),
            ParamId::Band {
                param: BandParam::Enable,
                ..
            }
            | ParamId::Bypass => on_off(value).to_string(),
        }
    }

    /// Parses display text into a plain value clamped to the descriptor range.
    ///
    /// Only the leading number is read, so unit suffixes are tolerated. A `k`
    /// right after a frequency multiplies by 1000 (`"1.50 kHz"`). Bool
    /// parameters also accept `on`/`off`, type parameters their display name.
    pub fn text_to_value(&self, text: &str) -> Option<f64> {
        let text = text.trim();

        match self.kind {
            ParamKind::Bool => match text.to_ascii_lowercase().as_str() {
                "on" | "true" => return Some(1.0),
                "off" | "false" => return Some(0.0),
                _ => {}
            },
            ParamKind::Enum => {
                if let Some(filter_type) = FilterType::from_name(text) {
                    return Some(filter_type.index() as f64);
                }
            }
            ParamKind::Float => {}
        }

        let (mut value, rest) = leading_number(text)?;
        if self.scale == ParamScale::Logarithmic
            && rest.trim_start().starts_with(['k', 'K'])
        {
            value *= 1000.0;
        }

        let value = match self.kind {
            ParamKind::Float => value,
            ParamKind::Bool => {
                if value > 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            ParamKind::Enum => value.round(),
        };
        Some(value.clamp(self.min, self.max))
    }
}

fn on_off(value: f64) -> &'static str {
    if value > 0.5 { "On" } else { "Off" }
}

/// `"1.50 kHz"` from 1000 Hz up, `"440.0 Hz"` below.
pub fn format_frequency(frequency_hz: f64) -> String {
    if frequency_hz >= 1000.0 {
        format!("{:.2} kHz", frequency_hz / 1000.0)
    } else {
        format!("{frequency_hz:.1} Hz")
    }
}

fn leading_number(text: &str) -> Option<(f64, &str)> {
    let end = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .unwrap_or(text.len());

    (1..=end)
        .rev()
        .find_map(|len| {
            text[..len]
                .parse::<f64>()
                .ok()
                .map(|value| (value, &text[len..]))
        })
        .filter(|(value, _)| value.is_finite())
}

/// Descriptor of `id` in an editor with `band_count` bands.
///
/// # Errors
///
/// Returns [`EditorError::UnknownParam`] for a band beyond `band_count`.
pub fn descriptor(id: ParamId, band_count: usize) -> Result<ParamDescriptor, EditorError> {
    let descriptor = match id {
        ParamId::Band { index, param } => {
            if index >= band_count {
                return Err(EditorError::UnknownParam(id.to_string()));
            }

            let defaults = default_band(index, band_count);
            let (min, max, default_value, scale, kind) = match param {
                BandParam::Type => (
                    FilterType::LowCut.index() as f64,
                    FilterType::HighCut.index() as f64,
                    defaults.filter_type.index() as f64,
                    ParamScale::Linear,
                    ParamKind::Enum,
                ),
                BandParam::Frequency => (
                    FREQ_MIN_HZ,
                    FREQ_MAX_HZ,
                    defaults.frequency,
                    ParamScale::Logarithmic,
                    ParamKind::Float,
                ),
                BandParam::Gain => (
                    GAIN_MIN_DB,
                    GAIN_MAX_DB,
                    defaults.gain,
                    ParamScale::Linear,
                    ParamKind::Float,
                ),
                BandParam::Q => (Q_MIN, Q_MAX, defaults.q, ParamScale::Linear, ParamKind::Float),
                BandParam::Enable => (0.0, 1.0, 1.0, ParamScale::Linear, ParamKind::Bool),
            };

            ParamDescriptor {
                id,
                label: format!("Band {} {}", index + 1, param.label()),
                min,
                max,
                default_value,
                scale,
                kind,
            }
        }
        ParamId::OutputGain => ParamDescriptor {
            id,
            label: "Output Gain".to_string(),
            min: OUTPUT_GAIN_MIN_DB,
            max: OUTPUT_GAIN_MAX_DB,
            default_value: 0.0,
            scale: ParamScale::Linear,
            kind: ParamKind::Float,
        },
        ParamId::Bypass => ParamDescriptor {
            id,
            label: "Bypass".to_string(),
            min: 0.0,
            max: 1.0,
            default_value: 0.0,
            scale: ParamScale::Linear,
            kind: ParamKind::Bool,
        },
    };

    Ok(descriptor)
}

/// All parameter ids in host order: band parameters band by band, then globals.
pub fn param_ids(band_count: usize) -> Vec<ParamId> {
    (0..band_count)
        .flat_map(|index| {
            BandParam::ALL
                .into_iter()
                .map(move |param| ParamId::Band { index, param })
        })
        .chain([ParamId::OutputGain, ParamId::Bypass])
        .collect()
}

pub fn descriptors(band_count: usize) -> Vec<ParamDescriptor> {
    param_ids(band_count)
        .into_iter()
        .filter_map(|id| descriptor(id, band_count).ok())
        .collect()
}

/// Current plain value of `id`, or `None` for a band that does not exist.
pub fn param_value(state: &EqState, id: ParamId) -> Option<f64> {
    let bool_value = |on: bool| if on { 1.0 } else { 0.0 };

    match id {
        ParamId::Band { index, param } => {
            let band = state.band(index)?;
            Some(match param {
                BandParam::Type => band.filter_type.index() as f64,
                BandParam::Frequency => band.frequency,
                BandParam::Gain => band.gain,
                BandParam::Q => band.q,
                BandParam::Enable => bool_value(band.enabled),
            })
        }
        ParamId::OutputGain => Some(state.output_gain()),
        ParamId::Bypass => Some(bool_value(state.bypass())),
    }
}

/// Applies a plain value through the state's clamping setters.
///
/// Returns `false` when nothing was applied.
pub fn set_param_value(state: &mut EqState, id: ParamId, value: f64) -> bool {
    if !value.is_finite() {
        log::warn!("ignoring non-finite value {value} for {id}");
        return false;
    }

    match id {
        ParamId::Band { index, param } => match param {
            BandParam::Type => match FilterType::from_index(value.round() as i64) {
                Some(filter_type) => state.set_band_type(index, filter_type),
                None => {
                    log::warn!("ignoring unknown filter type {value} for {id}");
                    false
                }
            },
            BandParam::Frequency => state.set_band_frequency(index, value),
            BandParam::Gain => state.set_band_gain(index, value),
            BandParam::Q => state.set_band_q(index, value),
            BandParam::Enable => state.set_band_enabled(index, value > 0.5),
        },
        ParamId::OutputGain => state.set_output_gain(value),
        ParamId::Bypass => {
            state.set_bypass(value > 0.5);
            true
        }
    }
}

/// Current value of `id` mapped to `[0, 1]`.
pub fn param_normalized(state: &EqState, id: ParamId) -> Option<f64> {
    let descriptor = descriptor(id, state.band_count()).ok()?;
    param_value(state, id).map(|value| descriptor.normalize(value))
}

/// Applies a host-normalized value. `norm` is clamped to `[0, 1]`, except for
/// type parameters, which take the raw filter type index.
pub fn set_param_normalized(state: &mut EqState, id: ParamId, norm: f64) -> bool {
    if !norm.is_finite() {
        log::warn!("ignoring non-finite normalized value for {id}");
        return false;
    }

    match descriptor(id, state.band_count()) {
        Ok(descriptor) => set_param_value(state, id, descriptor.denormalize(norm)),
        Err(e) => {
            log::warn!("{e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eq_editor::constants::DEFAULT_BAND_COUNT;

    fn band(index: usize, param: BandParam) -> ParamId {
        ParamId::Band { index, param }
    }

    #[test]
    fn test_param_ids_round_trip_through_strings() {
        let ids = param_ids(DEFAULT_BAND_COUNT);
        assert_eq!(ids.len(), 22);
        assert_eq!(ids[0].to_string(), "band1Type");
        assert_eq!(ids[6].to_string(), "band2Freq");
        assert_eq!(ids[20].to_string(), "outputGain");

        for id in ids {
            assert_eq!(id.to_string().parse::<ParamId>().unwrap(), id);
        }
    }

    #[test]
    fn test_unknown_param_ids_are_rejected() {
        for text in ["", "band", "band0Freq", "band1", "band1Volume", "Band1Freq", "gain"] {
            assert!(
                matches!(text.parse::<ParamId>(), Err(EditorError::UnknownParam(_))),
                "{text}"
            );
        }
        assert!(descriptor(band(4, BandParam::Gain), 4).is_err());
    }

    #[test]
    fn test_frequency_is_log_normalized() {
        let d = descriptor(band(0, BandParam::Frequency), 4).unwrap();
        assert!(d.normalize(FREQ_MIN_HZ).abs() < 1e-12);
        assert!((d.normalize(FREQ_MAX_HZ) - 1.0).abs() < 1e-12);

        // Geometric mean of the range sits in the middle.
        let mid = (FREQ_MIN_HZ * FREQ_MAX_HZ).sqrt();
        assert!((d.normalize(mid) - 0.5).abs() < 1e-12);
        assert!((d.denormalize(0.5) - mid).abs() < 1e-9);
    }

    #[test]
    fn test_descriptors_round_trip_normalized_values() {
        for d in descriptors(DEFAULT_BAND_COUNT) {
            for value in [d.min, d.default_value, d.max] {
                let back = d.denormalize(d.normalize(value));
                assert!((back - value).abs() <= 1e-9 * value.abs().max(1.0), "{}", d.id);
            }
        }
    }

    #[test]
    fn test_descriptor_defaults_match_default_state() {
        let state = EqState::default();
        for d in descriptors(DEFAULT_BAND_COUNT) {
            assert_eq!(param_value(&state, d.id), Some(d.default_value), "{}", d.id);
        }
    }

    #[test]
    fn test_set_param_normalized_applies_through_setters() {
        let mut state = EqState::default();

        assert!(set_param_normalized(&mut state, band(1, BandParam::Gain), 0.75));
        assert!((state.bands()[1].gain - 12.0).abs() < 1e-12);

        assert!(set_param_normalized(&mut state, band(2, BandParam::Frequency), 2.0));
        assert_eq!(state.bands()[2].frequency, FREQ_MAX_HZ);

        assert!(set_param_normalized(&mut state, band(3, BandParam::Enable), 0.2));
        assert!(!state.bands()[3].enabled);

        assert!(set_param_normalized(&mut state, ParamId::Bypass, 1.0));
        assert!(state.bypass());

        let norm = param_normalized(&state, band(1, BandParam::Gain)).unwrap();
        assert!((norm - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_type_param_respects_band_position() {
        let mut state = EqState::default();
        let low_cut = FilterType::LowCut.index() as f64;
        let high_cut = FilterType::HighCut.index() as f64;

        assert!(!set_param_normalized(&mut state, band(1, BandParam::Type), low_cut));
        assert_eq!(state.bands()[1].filter_type, FilterType::Bell);

        assert!(set_param_normalized(&mut state, band(0, BandParam::Type), low_cut));
        assert_eq!(state.bands()[0].filter_type, FilterType::LowCut);

        assert!(set_param_normalized(&mut state, band(3, BandParam::Type), high_cut));
        assert_eq!(state.bands()[3].filter_type, FilterType::HighCut);

        assert!(!set_param_value(&mut state, band(0, BandParam::Type), 7.0));
        assert_eq!(state.bands()[0].filter_type, FilterType::LowCut);
    }

    #[test]
    fn test_type_param_uses_raw_index() {
        let mut state = EqState::default();
        let low_shelf = FilterType::LowShelf.index() as f64;

        assert_eq!(param_normalized(&state, band(0, BandParam::Type)), Some(low_shelf));
        assert_eq!(param_normalized(&state, band(1, BandParam::Type)), Some(1.0));

        assert!(set_param_normalized(&mut state, band(3, BandParam::Type), low_shelf));
        assert_eq!(state.bands()[3].filter_type, FilterType::LowShelf);

        assert!(set_param_normalized(&mut state, band(1, BandParam::Type), 2.4));
        assert_eq!(state.bands()[1].filter_type, FilterType::LowShelf);

        let d = descriptor(band(0, BandParam::Type), 4).unwrap();
        assert_eq!(d.default_value, low_shelf);
        assert_eq!(d.normalize(3.0), 3.0);
        assert_eq!(d.denormalize(9.0), 4.0);
        assert_eq!(d.denormalize(-1.0), 0.0);
    }

    #[test]
    fn test_invalid_targets_are_ignored() {
        let mut state = EqState::default();
        let before = state.clone();

        assert!(!set_param_normalized(&mut state, band(6, BandParam::Q), 0.5));
        assert!(!set_param_normalized(&mut state, ParamId::OutputGain, f64::NAN));
        assert!(param_value(&state, band(6, BandParam::Q)).is_none());
        assert_eq!(state, before);
    }

    #[test]
    fn test_value_to_text() {
        let text = |id: ParamId, value: f64| descriptor(id, 4).unwrap().value_to_text(value);

        assert_eq!(text(band(0, BandParam::Frequency), 440.0), "440.0 Hz");
        assert_eq!(text(band(0, BandParam::Frequency), 1_500.0), "1.50 kHz");
        assert_eq!(text(band(0, BandParam::Gain), -3.26), "-3.3 dB");
        assert_eq!(text(ParamId::OutputGain, 6.0), "6.0 dB");
        assert_eq!(text(band(0, BandParam::Q), 0.707), "0.71");
        assert_eq!(text(band(0, BandParam::Enable), 1.0), "On");
        assert_eq!(text(ParamId::Bypass, 0.0), "Off");
        assert_eq!(text(band(0, BandParam::Type), 2.0), "Low Shelf");
        assert_eq!(text(band(0, BandParam::Type), 9.0), "Unknown");
        assert_eq!(text(band(0, BandParam::Type), f64::NAN), "Unknown");
    }

    #[test]
    fn test_text_to_value() {
        let parse = |id: ParamId, text: &str| descriptor(id, 4).unwrap().text_to_value(text);

        assert_eq!(parse(band(0, BandParam::Frequency), "1.50 kHz"), Some(1_500.0));
        assert_eq!(parse(band(0, BandParam::Frequency), "440.0 Hz"), Some(440.0));
        assert_eq!(parse(band(0, BandParam::Frequency), "5 Hz"), Some(FREQ_MIN_HZ));
        assert_eq!(parse(band(0, BandParam::Gain), "-3.5 dB"), Some(-3.5));
        assert_eq!(parse(band(0, BandParam::Gain), "99"), Some(GAIN_MAX_DB));
        assert_eq!(parse(band(0, BandParam::Q), " 2.00"), Some(2.0));
        assert_eq!(parse(ParamId::Bypass, "On"), Some(1.0));
        assert_eq!(parse(ParamId::Bypass, "0"), Some(0.0));
        assert_eq!(parse(band(0, BandParam::Type), "high cut"), Some(4.0));
        assert_eq!(parse(band(0, BandParam::Type), "1"), Some(1.0));
        assert_eq!(parse(band(0, BandParam::Gain), "loud"), None);
        assert_eq!(parse(band(0, BandParam::Gain), "-"), None);
    }
}
