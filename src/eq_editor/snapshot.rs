//! JSON export of the editor settings in domain units.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::eq_editor::errors::EditorError;
use crate::eq_editor::state::{Band, EqState, FilterType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandSnapshot {
    #[serde(rename = "type")]
    pub filter_type: FilterType,
    pub frequency: f64,
    pub gain: f64,
    pub q: f64,
    pub enabled: bool,
}

impl From<&Band> for BandSnapshot {
    fn from(band: &Band) -> Self {
        Self {
            filter_type: band.filter_type,
            frequency: band.frequency,
            gain: band.gain,
            q: band.q,
            enabled: band.enabled,
        }
    }
}

/// Point-in-time copy of an [`EqState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EqSnapshot {
    pub bands: Vec<BandSnapshot>,
    pub output_gain: f64,
    pub bypass: bool,
}

impl From<&EqState> for EqSnapshot {
    fn from(state: &EqState) -> Self {
        Self {
            bands: state.bands().iter().map(BandSnapshot::from).collect(),
            output_gain: state.output_gain(),
            bypass: state.bypass(),
        }
    }
}

impl EqSnapshot {
    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the pretty-printed JSON to `path`, replacing any existing file.
    pub fn write_to(&self, path: &Path) -> Result<(), EditorError> {
        let json = self.to_json()?;
        fs::write(path, json)?;
        log::info!("exported EQ settings to {}", path.display());
        Ok(())
    }
}
