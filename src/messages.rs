//! Message definitions for communication between the Python front-end and the editor.
//!
//! [`PointerEvent`] is the single input type for mouse and touch alike; the host
//! forwards whatever its toolkit delivers as one of the four phases.
//! [`EditorEvent`] is the notification queue the host drains after each input to
//! know what to redraw or which controls to sync.

use pyo3::prelude::*;

/// Phase of a pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[pyclass(eq, eq_int)]
pub enum PointerPhase {
    /// Button pressed or touch started.
    Down,

    /// Pointer moved (with or without a button held).
    Move,

    /// Button released or touch ended.
    Up,

    /// Pointer left the drawing surface.
    Leave,
}

/// Pointer input in device pixels, relative to the drawing surface origin.
#[derive(Debug, Clone, Copy, PartialEq)]
#[pyclass(get_all)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub x: f64,
    pub y: f64,
}

#[pymethods]
impl PointerEvent {
    #[new]
    pub fn new(phase: PointerPhase, x: f64, y: f64) -> Self {
        Self { phase, x, y }
    }

    #[staticmethod]
    pub fn down(x: f64, y: f64) -> Self {
        Self::new(PointerPhase::Down, x, y)
    }

    #[staticmethod]
    #[pyo3(name = "move_to")]
    pub fn moved(x: f64, y: f64) -> Self {
        Self::new(PointerPhase::Move, x, y)
    }

    /// Release. Position is not used.
    #[staticmethod]
    pub fn up() -> Self {
        Self::new(PointerPhase::Up, 0.0, 0.0)
    }

    /// Leave. Position is not used.
    #[staticmethod]
    pub fn leave() -> Self {
        Self::new(PointerPhase::Leave, 0.0, 0.0)
    }
}

/// Notification emitted by the editor after a state change.
#[derive(Debug, Clone, PartialEq)]
#[pyclass]
pub enum EditorEvent {
    /// Parameters of a band changed (drag or control surface).
    BandChanged { index: usize },

    /// The highlighted band changed.
    SelectionChanged { index: Option<usize> },

    /// A handle was grabbed.
    DragStarted { index: usize },

    /// The active drag ended.
    DragEnded { index: usize },

    /// Output gain or bypass changed.
    GlobalChanged(),

    /// Every band was reset.
    BandsReset(),

    /// The drawing surface was resized; cached geometry is stale.
    Resized(),
}

#[pymethods]
impl EditorEvent {
    pub fn band_changed(&self) -> Option<usize> {
        match self {
            EditorEvent::BandChanged { index } => Some(*index),
            _ => None,
        }
    }

    /// Whether the curve must be redrawn after this event.
    pub fn needs_redraw(&self) -> bool {
        !matches!(self, EditorEvent::DragStarted { .. } | EditorEvent::DragEnded { .. })
    }
}
