//! Pointer-driven selection and dragging of band handles.
//!
//! Transitions are pure: [`step`] takes the current [`InteractionSession`], one
//! [`PointerEvent`] and a read-only view of the bands, and returns the next
//! session plus an optional [`BandEdit`] and the notifications to publish. The
//! caller applies the edit to its state; nothing here mutates bands.

use crate::eq_editor::constants::{FREQ_MAX_HZ, FREQ_MIN_HZ, GAIN_MAX_DB, GAIN_MIN_DB};
use crate::eq_editor::coords::{PlotGeometry, x_to_frequency, y_to_gain};
use crate::eq_editor::state::Band;
use crate::messages::{EditorEvent, PointerEvent, PointerPhase};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    /// A handle is held; the index is the band being dragged.
    Dragging(usize),
}

/// Ephemeral selection and drag state of one editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractionSession {
    pub selected_band: Option<usize>,
    pub drag: DragState,
}

impl InteractionSession {
    pub fn dragging_band(&self) -> Option<usize> {
        match self.drag {
            DragState::Dragging(index) => Some(index),
            DragState::Idle => None,
        }
    }
}

/// New frequency and gain for a band, already clamped to the plot range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandEdit {
    pub index: usize,
    pub frequency: f64,
    pub gain: f64,
}

/// Result of one transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub session: InteractionSession,
    pub edit: Option<BandEdit>,
    pub events: Vec<EditorEvent>,
}

impl Step {
    fn unchanged(session: InteractionSession) -> Self {
        Self {
            session,
            edit: None,
            events: Vec::new(),
        }
    }
}

/// Index of the first enabled band whose handle is within the hit radius.
///
/// `x`, `y` are device pixels. Bands are scanned in ascending order and the
/// first match wins, even if a later handle is closer.
pub fn hit_test(bands: &[Band], plot: &PlotGeometry, x: f64, y: f64) -> Option<usize> {
    let radius = plot.hit_radius();
    let ratio = plot.device_pixel_ratio();

    bands
        .iter()
        .enumerate()
        .filter(|(_, band)| band.enabled)
        .find_map(|(index, band)| {
            let (hx, hy) = plot.point_to_logical(band.frequency, band.gain);
            let distance = (x - hx * ratio).hypot(y - hy * ratio);
            (distance < radius).then_some(index)
        })
}

/// Frequency and gain under a device-pixel position, clamped to the plot range.
pub fn drag_target(plot: &PlotGeometry, x: f64, y: f64) -> (f64, f64) {
    let (nx, ny) = plot.from_device(x, y);
    (
        x_to_frequency(nx).clamp(FREQ_MIN_HZ, FREQ_MAX_HZ),
        y_to_gain(ny).clamp(GAIN_MIN_DB, GAIN_MAX_DB),
    )
}

fn is_finite_position(event: &PointerEvent) -> bool {
    if event.x.is_finite() && event.y.is_finite() {
        return true;
    }

    log::warn!(
        "ignoring pointer {:?} at non-finite position ({}, {})",
        event.phase,
        event.x,
        event.y
    );
    false
}

/// Advances the session by one pointer event.
pub fn step(
    session: InteractionSession,
    event: &PointerEvent,
    bands: &[Band],
    plot: &PlotGeometry,
) -> Step {
    match event.phase {
        PointerPhase::Down => pointer_down(session, event, bands, plot),
        PointerPhase::Move => pointer_move(session, event, bands, plot),
        PointerPhase::Up | PointerPhase::Leave => pointer_release(session),
    }
}

fn pointer_down(
    session: InteractionSession,
    event: &PointerEvent,
    bands: &[Band],
    plot: &PlotGeometry,
) -> Step {
    if !is_finite_position(event) {
        return Step::unchanged(session);
    }

    let Some(index) = hit_test(bands, plot, event.x, event.y) else {
        return Step::unchanged(session);
    };

    log::debug!("drag started on band {}", index + 1);

    let mut events = Vec::with_capacity(2);
    if session.selected_band != Some(index) {
        events.push(EditorEvent::SelectionChanged { index: Some(index) });
    }
    events.push(EditorEvent::DragStarted { index });

    Step {
        session: InteractionSession {
            selected_band: Some(index),
            drag: DragState::Dragging(index),
        },
        edit: None,
        events,
    }
}

fn pointer_move(
    session: InteractionSession,
    event: &PointerEvent,
    bands: &[Band],
    plot: &PlotGeometry,
) -> Step {
    let DragState::Dragging(index) = session.drag else {
        return Step::unchanged(session);
    };

    if index >= bands.len() {
        log::warn!(
            "drag references band index {index} but only {} bands exist",
            bands.len()
        );
        return Step::unchanged(session);
    }

    if !is_finite_position(event) {
        return Step::unchanged(session);
    }

    let (frequency, gain) = drag_target(plot, event.x, event.y);
    Step {
        session,
        edit: Some(BandEdit {
            index,
            frequency,
            gain,
        }),
        events: Vec::new(),
    }
}

fn pointer_release(session: InteractionSession) -> Step {
    let mut events = Vec::new();
    if let DragState::Dragging(index) = session.drag {
        log::debug!("drag ended on band {}", index + 1);
        events.push(EditorEvent::DragEnded { index });
    }

    Step {
        session: InteractionSession {
            drag: DragState::Idle,
            ..session
        },
        edit: None,
        events,
    }
}

/// Selects a band without touching the drag state (e.g. a click on its controls).
pub fn select(session: InteractionSession, index: usize, band_count: usize) -> Step {
    if index >= band_count {
        log::warn!("cannot select band index {index} (expected 0..{band_count})");
        return Step::unchanged(session);
    }

    if session.selected_band == Some(index) {
        return Step::unchanged(session);
    }

    Step {
        session: InteractionSession {
            selected_band: Some(index),
            ..session
        },
        edit: None,
        events: vec![EditorEvent::SelectionChanged { index: Some(index) }],
    }
}
