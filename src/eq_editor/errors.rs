//! Editor error types.

use thiserror::Error;

/// Errors that can occur while building or exporting an editor.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The drawing surface has no usable size.
    #[error("drawing surface is missing or empty ({width}x{height})")]
    MissingSurface {
        /// Surface width in logical pixels.
        width: f64,
        /// Surface height in logical pixels.
        height: f64,
    },

    /// Margins leave no room for the plot area.
    #[error("plot area is empty after margins ({plot_width}x{plot_height})")]
    EmptyPlotArea {
        /// Plot width in logical pixels.
        plot_width: f64,
        /// Plot height in logical pixels.
        plot_height: f64,
    },

    /// A margin is negative or not finite.
    #[error("invalid plot margin: {0}")]
    InvalidMargin(f64),

    /// Device pixel ratio is zero, negative or not finite.
    #[error("invalid device pixel ratio: {0}")]
    InvalidPixelRatio(f64),

    /// Requested band count is outside the supported range.
    #[error("band count out of range (expected 1..={max}, got {count})")]
    BandCount {
        /// Requested number of bands.
        count: usize,
        /// Largest supported number of bands.
        max: usize,
    },

    /// Parameter id does not name a known parameter.
    #[error("unknown parameter id: {0}")]
    UnknownParam(String),

    /// Failed to serialize the settings snapshot.
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Failed to write the settings snapshot.
    #[error("failed to write snapshot: {0}")]
    Io(#[from] std::io::Error),
}
