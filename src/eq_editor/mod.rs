//! EQ Editor Module
//!
//! This module provides the curve model behind an interactive parametric EQ
//! editor. It is organized into sub-modules, each with a specific responsibility:
//!
//! - [`coords`]: Frequency/gain to plot-space mapping and surface geometry
//! - [`biquad`]: Closed-form filter coefficient design
//! - [`response`]: Magnitude evaluation and curve sampling
//! - [`state`]: Band model, position rules and validated setters
//! - [`interaction`]: Pointer hit-testing and drag state machine
//! - [`params`]: Normalized parameter interface for plugin hosts
//! - [`snapshot`]: JSON export of the settings
//! - [`constants`]: Ranges, defaults and layout constants
//! - [`errors`]: Editor error types
//!
//! The main [`EqEditor`] struct owns the state, the interaction session and the
//! injected plot geometry, and exposes them to Python.

use std::collections::VecDeque;
use std::path::PathBuf;

use env_logger::{Builder, Env};
use numpy::{IntoPyArray, PyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::eq_editor::constants::{BAND_CURVE_POINTS, COMPOSITE_CURVE_POINTS, DEFAULT_BAND_COUNT};
use crate::eq_editor::coords::PlotGeometry;
use crate::eq_editor::errors::EditorError;
use crate::eq_editor::interaction::{BandEdit, InteractionSession, Step};
use crate::eq_editor::params::ParamId;
use crate::eq_editor::snapshot::EqSnapshot;
use crate::eq_editor::state::{Band, EqState, FilterType, allowed_filter_types};
use crate::messages::{EditorEvent, PointerEvent};

pub mod biquad;
pub mod constants;
pub mod coords;
pub mod errors;
pub mod interaction;
pub mod params;
pub mod response;
pub mod snapshot;
pub mod state;

/// Initialize logging once; later calls are no-ops.
pub fn setup_logger() {
    // `RUST_LOG=debug` shows drag and resize traces.
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .try_init()
        .unwrap_or(());
}

fn to_py_err(err: EditorError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Negative Python indices address no band.
fn band_index(index: isize) -> Option<usize> {
    let index = usize::try_from(index).ok();
    if index.is_none() {
        log::warn!("ignoring negative band index");
    }
    index
}

fn parse_param(id: &str) -> Option<ParamId> {
    match id.parse() {
        Ok(id) => Some(id),
        Err(e) => {
            log::warn!("{e}");
            None
        }
    }
}

/// Interactive EQ curve editor.
#[pyclass]
pub struct EqEditor {
    state: EqState,
    session: InteractionSession,
    plot: PlotGeometry,
    events: VecDeque<EditorEvent>,
}

impl EqEditor {
    /// Creates an editor for a drawing surface of `width` x `height` logical pixels.
    ///
    /// # Errors
    ///
    /// Fails when the surface is unusable or `band_count` is outside `1..=MAX_BANDS`.
    pub fn try_new(
        width: f64,
        height: f64,
        device_pixel_ratio: f64,
        band_count: usize,
    ) -> Result<Self, EditorError> {
        setup_logger();

        let plot = PlotGeometry::new(width, height, device_pixel_ratio)?;
        let state = EqState::with_band_count(band_count)?;
        log::info!(
            "EQ editor ready: {band_count} bands on {width}x{height} (ratio {device_pixel_ratio})"
        );

        Ok(Self {
            state,
            session: InteractionSession::default(),
            plot,
            events: VecDeque::new(),
        })
    }

    pub fn state(&self) -> &EqState {
        &self.state
    }

    pub fn session(&self) -> InteractionSession {
        self.session
    }

    pub fn plot(&self) -> &PlotGeometry {
        &self.plot
    }

    /// Feeds one pointer event through the interaction state machine.
    ///
    /// Returns `true` if the selection, drag state or a band changed.
    pub fn apply_pointer(&mut self, event: &PointerEvent) -> bool {
        let step = interaction::step(self.session, event, self.state.bands(), &self.plot);
        self.apply_step(step)
    }

    fn apply_step(&mut self, step: Step) -> bool {
        let Step {
            session,
            edit,
            events,
        } = step;

        let mut changed = session != self.session || !events.is_empty();
        self.session = session;
        self.events.extend(events);

        if let Some(edit) = edit {
            changed |= self.apply_edit(edit);
        }
        changed
    }

    fn apply_edit(&mut self, edit: BandEdit) -> bool {
        let before = self.state.band(edit.index).copied();
        self.state.set_band_frequency(edit.index, edit.frequency);
        self.state.set_band_gain(edit.index, edit.gain);

        let changed = self.state.band(edit.index).copied() != before;
        if changed {
            self.events
                .push_back(EditorEvent::BandChanged { index: edit.index });
        }
        changed
    }

    fn band_changed_if(&mut self, index: usize, applied: bool) -> bool {
        if applied {
            self.events.push_back(EditorEvent::BandChanged { index });
        }
        applied
    }

    fn apply_param(&mut self, id: ParamId, applied: bool) -> bool {
        if applied {
            self.events.push_back(match id {
                ParamId::Band { index, .. } => EditorEvent::BandChanged { index },
                ParamId::OutputGain | ParamId::Bypass => EditorEvent::GlobalChanged(),
            });
        }
        applied
    }
}

#[pymethods]
impl EqEditor {
    /// Create an editor bound to a drawing surface.
    #[new]
    #[pyo3(signature = (width, height, device_pixel_ratio = 1.0, band_count = DEFAULT_BAND_COUNT))]
    pub fn new(
        width: f64,
        height: f64,
        device_pixel_ratio: f64,
        band_count: usize,
    ) -> PyResult<Self> {
        Self::try_new(width, height, device_pixel_ratio, band_count).map_err(to_py_err)
    }

    /// Replace the surface size and optionally the device pixel ratio.
    #[pyo3(signature = (width, height, device_pixel_ratio = None))]
    pub fn resize(
        &mut self,
        width: f64,
        height: f64,
        device_pixel_ratio: Option<f64>,
    ) -> PyResult<()> {
        self.plot
            .resize(width, height, device_pixel_ratio)
            .map_err(to_py_err)?;
        log::debug!(
            "resized to {width}x{height} (ratio {})",
            self.plot.device_pixel_ratio()
        );
        self.events.push_back(EditorEvent::Resized());
        Ok(())
    }

    /// Handle a pointer event. Coordinates are device pixels.
    pub fn handle_pointer(&mut self, event: PyRef<'_, PointerEvent>) -> bool {
        self.apply_pointer(&event)
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        self.apply_pointer(&PointerEvent::down(x, y))
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.apply_pointer(&PointerEvent::moved(x, y))
    }

    pub fn pointer_up(&mut self) -> bool {
        self.apply_pointer(&PointerEvent::up())
    }

    pub fn pointer_leave(&mut self) -> bool {
        self.apply_pointer(&PointerEvent::leave())
    }

    /// Select a band without dragging it.
    pub fn select_band(&mut self, index: isize) -> bool {
        let Some(index) = band_index(index) else {
            return false;
        };
        let step = interaction::select(self.session, index, self.state.band_count());
        self.apply_step(step)
    }

    pub fn selected_band(&self) -> Option<usize> {
        self.session.selected_band
    }

    /// Index of the band being dragged, if any.
    pub fn dragging_band(&self) -> Option<usize> {
        self.session.dragging_band()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.dragging_band().is_some()
    }

    pub fn band_count(&self) -> usize {
        self.state.band_count()
    }

    pub fn band(&self, index: isize) -> Option<Band> {
        band_index(index).and_then(|i| self.state.band(i).copied())
    }

    pub fn bands(&self) -> Vec<Band> {
        self.state.bands().to_vec()
    }

    /// Filter types the band at `index` may switch to.
    pub fn allowed_types(&self, index: isize) -> Vec<FilterType> {
        band_index(index)
            .map(|i| allowed_filter_types(i, self.state.band_count()))
            .unwrap_or_default()
    }

    pub fn set_band_type(&mut self, index: isize, filter_type: FilterType) -> bool {
        let Some(index) = band_index(index) else {
            return false;
        };
        let applied = self.state.set_band_type(index, filter_type);
        self.band_changed_if(index, applied)
    }

    pub fn set_band_frequency(&mut self, index: isize, frequency_hz: f64) -> bool {
        let Some(index) = band_index(index) else {
            return false;
        };
        let applied = self.state.set_band_frequency(index, frequency_hz);
        self.band_changed_if(index, applied)
    }

    pub fn set_band_gain(&mut self, index: isize, gain_db: f64) -> bool {
        let Some(index) = band_index(index) else {
            return false;
        };
        let applied = self.state.set_band_gain(index, gain_db);
        self.band_changed_if(index, applied)
    }

    pub fn set_band_q(&mut self, index: isize, q: f64) -> bool {
        let Some(index) = band_index(index) else {
            return false;
        };
        let applied = self.state.set_band_q(index, q);
        self.band_changed_if(index, applied)
    }

    pub fn set_band_enabled(&mut self, index: isize, enabled: bool) -> bool {
        let Some(index) = band_index(index) else {
            return false;
        };
        let applied = self.state.set_band_enabled(index, enabled);
        self.band_changed_if(index, applied)
    }

    pub fn output_gain(&self) -> f64 {
        self.state.output_gain()
    }

    pub fn set_output_gain(&mut self, gain_db: f64) -> bool {
        let applied = self.state.set_output_gain(gain_db);
        self.apply_param(ParamId::OutputGain, applied)
    }

    pub fn bypass(&self) -> bool {
        self.state.bypass()
    }

    pub fn set_bypass(&mut self, bypass: bool) {
        self.state.set_bypass(bypass);
        self.events.push_back(EditorEvent::GlobalChanged());
    }

    /// Flatten every band (gain 0 dB, Q 0.707).
    pub fn reset_all_bands(&mut self) {
        self.state.reset_all_bands();
        log::debug!("all bands reset");
        self.events.push_back(EditorEvent::BandsReset());
    }

    /// Composite curve as `(frequency_hz, gain_db)` pairs, `n + 1` points.
    ///
    /// `n` is capped at `MAX_CURVE_SEGMENTS`.
    #[pyo3(signature = (n = COMPOSITE_CURVE_POINTS))]
    pub fn curve_samples(&self, n: usize) -> Vec<(f64, f64)> {
        response::curve_samples(
            self.state.bands(),
            self.state.output_gain(),
            self.state.bypass(),
            n,
        )
        .collect()
    }

    /// Curve of a single band. `None` for a missing or disabled band.
    #[pyo3(signature = (index, n = BAND_CURVE_POINTS))]
    pub fn band_curve_samples(&self, index: isize, n: usize) -> Option<Vec<(f64, f64)>> {
        let band = band_index(index).and_then(|i| self.state.band(i))?;
        band.enabled
            .then(|| response::band_curve_samples(band, n).collect())
    }

    /// Composite curve as two NumPy arrays: frequencies and gains.
    #[pyo3(signature = (n = COMPOSITE_CURVE_POINTS))]
    pub fn curve_arrays<'py>(
        &self,
        py: Python<'py>,
        n: usize,
    ) -> (Bound<'py, PyArray1<f64>>, Bound<'py, PyArray1<f64>>) {
        let (frequencies, gains): (Vec<f64>, Vec<f64>) = response::curve_samples(
            self.state.bands(),
            self.state.output_gain(),
            self.state.bypass(),
            n,
        )
        .unzip();

        (frequencies.into_pyarray(py), gains.into_pyarray(py))
    }

    /// `(index, x, y)` in logical pixels for every enabled band.
    pub fn handle_positions(&self) -> Vec<(usize, f64, f64)> {
        self.state
            .bands()
            .iter()
            .enumerate()
            .filter(|(_, band)| band.enabled)
            .map(|(index, band)| {
                let (x, y) = self.plot.point_to_logical(band.frequency, band.gain);
                (index, x, y)
            })
            .collect()
    }

    /// Combined response of all enabled bands at `frequency_hz`, without output gain.
    pub fn magnitude_db(&self, frequency_hz: f64) -> f64 {
        response::composite_response_db(self.state.bands(), frequency_hz)
    }

    pub fn band_magnitude_db(&self, index: isize, frequency_hz: f64) -> Option<f64> {
        let band = band_index(index).and_then(|i| self.state.band(i))?;
        Some(response::band_magnitude_db(band, frequency_hz))
    }

    /// Parameter ids in host order.
    pub fn param_ids(&self) -> Vec<String> {
        params::param_ids(self.state.band_count())
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Current value of a parameter in `[0, 1]`.
    pub fn param_normalized(&self, id: &str) -> Option<f64> {
        params::param_normalized(&self.state, parse_param(id)?)
    }

    /// Apply a host-normalized value. Unknown ids are ignored.
    pub fn set_param_normalized(&mut self, id: &str, value: f64) -> bool {
        let Some(id) = parse_param(id) else {
            return false;
        };
        let applied = params::set_param_normalized(&mut self.state, id, value);
        self.apply_param(id, applied)
    }

    /// Current value of a parameter in its own units.
    pub fn param_value(&self, id: &str) -> Option<f64> {
        params::param_value(&self.state, parse_param(id)?)
    }

    /// Display text of the current value, e.g. `"1.50 kHz"`.
    pub fn param_text(&self, id: &str) -> Option<String> {
        let id = parse_param(id)?;
        let descriptor = params::descriptor(id, self.state.band_count()).ok()?;
        let value = params::param_value(&self.state, id)?;
        Some(descriptor.value_to_text(value))
    }

    /// Parse display text into a plain value for `id`.
    pub fn param_from_text(&self, id: &str, text: &str) -> Option<f64> {
        let id = parse_param(id)?;
        params::descriptor(id, self.state.band_count())
            .ok()?
            .text_to_value(text)
    }

    /// Current settings as pretty-printed JSON.
    pub fn export_json(&self) -> PyResult<String> {
        EqSnapshot::from(&self.state).to_json().map_err(to_py_err)
    }

    pub fn export_to_file(&self, path: PathBuf) -> PyResult<()> {
        EqSnapshot::from(&self.state)
            .write_to(&path)
            .map_err(to_py_err)
    }

    /// Pop the oldest pending notification.
    ///
    /// Returns `None` when the queue is empty.
    pub fn poll_event(&mut self) -> Option<EditorEvent> {
        self.events.pop_front()
    }

    /// Drain every pending notification in order.
    pub fn poll_events(&mut self) -> Vec<EditorEvent> {
        self.events.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eq_editor::constants::{FREQ_MAX_HZ, GAIN_MIN_DB, MAX_BANDS, MAX_CURVE_SEGMENTS};
    use crate::eq_editor::coords::{frequency_to_x, gain_to_y};

    fn editor() -> EqEditor {
        EqEditor::try_new(800.0, 400.0, 2.0, DEFAULT_BAND_COUNT).unwrap()
    }

    fn handle_device_pos(editor: &EqEditor, index: usize) -> (f64, f64) {
        let band = editor.state().bands()[index];
        editor
            .plot()
            .to_device(frequency_to_x(band.frequency), gain_to_y(band.gain))
    }

    #[test]
    fn test_logger_setup() {
        setup_logger();
        setup_logger();
    }

    #[test]
    fn test_construction_rejects_bad_surface() {
        assert!(matches!(
            EqEditor::try_new(0.0, 400.0, 1.0, 4),
            Err(EditorError::MissingSurface { .. })
        ));
        assert!(matches!(
            EqEditor::try_new(800.0, 400.0, 1.0, MAX_BANDS + 1),
            Err(EditorError::BandCount { .. })
        ));
        assert_eq!(EqEditor::try_new(800.0, 400.0, 1.0, 6).unwrap().band_count(), 6);
    }

    #[test]
    fn test_drag_updates_band_and_notifies() {
        let mut editor = editor();
        let (x, y) = handle_device_pos(&editor, 1);

        assert!(editor.pointer_down(x, y));
        assert!(editor.is_dragging());
        assert_eq!(
            editor.poll_events(),
            vec![
                EditorEvent::SelectionChanged { index: Some(1) },
                EditorEvent::DragStarted { index: 1 }
            ]
        );

        let (tx, ty) = editor.plot().to_device(frequency_to_x(800.0), gain_to_y(9.0));
        assert!(editor.pointer_move(tx, ty));
        let band = editor.band(1).unwrap();
        assert!((band.frequency - 800.0).abs() < 1e-9);
        assert!((band.gain - 9.0).abs() < 1e-9);
        assert_eq!(editor.poll_event(), Some(EditorEvent::BandChanged { index: 1 }));
        assert_eq!(editor.poll_event(), None);

        assert!(editor.pointer_up());
        assert!(!editor.is_dragging());
        assert_eq!(editor.selected_band(), Some(1));
        assert_eq!(editor.poll_events(), vec![EditorEvent::DragEnded { index: 1 }]);

        assert!(!editor.pointer_leave());
        assert!(editor.poll_events().is_empty());
    }

    #[test]
    fn test_drag_past_the_plot_clamps() {
        let mut editor = editor();
        let (x, y) = handle_device_pos(&editor, 2);
        editor.pointer_down(x, y);

        editor.pointer_move(1e6, 1e6);
        let band = editor.band(2).unwrap();
        assert_eq!(band.frequency, FREQ_MAX_HZ);
        assert_eq!(band.gain, GAIN_MIN_DB);
    }

    #[test]
    fn test_click_on_empty_space_changes_nothing() {
        let mut editor = editor();
        assert!(!editor.pointer_down(1.0, 1.0));
        assert!(!editor.pointer_move(300.0, 300.0));
        assert_eq!(editor.selected_band(), None);
        assert!(editor.poll_events().is_empty());
    }

    #[test]
    fn test_setters_notify_only_when_applied() {
        let mut editor = editor();

        assert!(editor.set_band_gain(0, 3.0));
        assert!(!editor.set_band_gain(-1, 3.0));
        assert!(!editor.set_band_gain(4, 3.0));
        assert!(!editor.set_band_type(1, FilterType::HighCut));
        assert!(editor.set_band_type(3, FilterType::HighCut));
        assert!(editor.set_output_gain(-2.0));
        editor.reset_all_bands();

        assert_eq!(
            editor.poll_events(),
            vec![
                EditorEvent::BandChanged { index: 0 },
                EditorEvent::BandChanged { index: 3 },
                EditorEvent::GlobalChanged(),
                EditorEvent::BandsReset()
            ]
        );
        assert_eq!(editor.band(0).unwrap().gain, 0.0);
        assert_eq!(editor.output_gain(), -2.0);
    }

    #[test]
    fn test_select_band() {
        let mut editor = editor();
        assert!(editor.select_band(2));
        assert!(!editor.select_band(2));
        assert!(!editor.select_band(-3));
        assert!(!editor.select_band(9));
        assert_eq!(editor.selected_band(), Some(2));
        assert!(!editor.is_dragging());
    }

    #[test]
    fn test_handle_positions_skip_disabled_bands() {
        let mut editor = editor();
        editor.set_band_enabled(1, false);

        let handles = editor.handle_positions();
        let indices: Vec<_> = handles.iter().map(|h| h.0).collect();
        assert_eq!(indices, vec![0, 2, 3]);

        // Logical pixels: 0 dB sits in the vertical middle of the plot.
        let (_, _, y) = handles[0];
        assert!((y - 190.0).abs() < 1e-9);
    }

    #[test]
    fn test_curves() {
        let mut editor = editor();
        editor.set_band_gain(2, 6.0);
        editor.set_band_enabled(3, false);

        assert_eq!(editor.curve_samples(COMPOSITE_CURVE_POINTS).len(), 501);
        assert_eq!(editor.band_curve_samples(2, BAND_CURVE_POINTS).unwrap().len(), 201);
        assert!(editor.band_curve_samples(3, 10).is_none());
        assert!(editor.band_curve_samples(7, 10).is_none());
        assert_eq!(editor.curve_samples(usize::MAX).len(), MAX_CURVE_SEGMENTS + 1);

        editor.set_output_gain(1.5);
        editor.set_bypass(true);
        assert!(editor.curve_samples(50).iter().all(|(_, g)| *g == 1.5));

        let at_center = editor.magnitude_db(2_000.0);
        assert!((at_center - 6.0).abs() < 0.5);
        assert_eq!(editor.band_magnitude_db(3, 2_000.0), Some(0.0));
    }

    #[test]
    fn test_params_by_string_id() {
        let mut editor = editor();
        assert_eq!(editor.param_ids().len(), 22);

        assert!(editor.set_param_normalized("band2Gain", 1.0));
        assert_eq!(editor.param_value("band2Gain"), Some(24.0));
        assert_eq!(editor.param_text("band2Gain").as_deref(), Some("24.0 dB"));
        assert_eq!(editor.param_text("band4Freq").as_deref(), Some("8.00 kHz"));
        assert_eq!(editor.param_from_text("band1Freq", "2.5 kHz"), Some(2_500.0));

        assert!(editor.set_param_normalized("bypass", 1.0));
        assert!(editor.bypass());

        assert!(!editor.set_param_normalized("band9Gain", 0.5));
        assert!(!editor.set_param_normalized("volume", 0.5));
        assert_eq!(editor.param_normalized("volume"), None);

        assert_eq!(
            editor.poll_events(),
            vec![
                EditorEvent::BandChanged { index: 1 },
                EditorEvent::GlobalChanged()
            ]
        );
    }

    #[test]
    fn test_resize_keeps_geometry_on_error() {
        let mut editor = editor();
        editor.resize(1000.0, 500.0, None).unwrap();
        assert_eq!(editor.plot().device_pixel_ratio(), 2.0);
        assert_eq!(editor.poll_events(), vec![EditorEvent::Resized()]);

        assert!(editor.resize(f64::NAN, 500.0, None).is_err());
        assert_eq!(editor.plot().width(), 1000.0);
        assert!(editor.poll_events().is_empty());
    }

    #[test]
    fn test_export() {
        let mut editor = editor();
        editor.set_band_q(2, 3.0);

        let json = editor.export_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["bands"][2]["q"], 3.0);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        editor.export_to_file(path.clone()).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), json);
    }
}
