//! Mapping between EQ domain values and plot space.
//!
//! Frequency runs along x on a log10 scale from [`FREQ_MIN_HZ`] to [`FREQ_MAX_HZ`];
//! gain runs along y on a linear scale, inverted so that [`GAIN_MAX_DB`] sits at
//! the top (`y = 0`). Normalized positions are in `[0, 1]` inside the plot area.
//!
//! Pixel space is reached through a [`PlotGeometry`], which is injected by the
//! host rather than read from any display surface. Three spaces are involved:
//!
//! - normalized: `(x, y)` relative to the plot rectangle
//! - logical: CSS-style pixels including the label margins
//! - device: logical pixels multiplied by the device pixel ratio (pointer input)

use crate::eq_editor::constants::{
    FREQ_MAX_HZ, FREQ_MIN_HZ, GAIN_MAX_DB, GAIN_MIN_DB, HANDLE_HIT_RADIUS_PX, MARGIN_BOTTOM_PX,
    MARGIN_LEFT_PX, MARGIN_RIGHT_PX, MARGIN_TOP_PX,
};
use crate::eq_editor::errors::EditorError;

fn log_span() -> (f64, f64) {
    let log_min = FREQ_MIN_HZ.log10();
    (log_min, FREQ_MAX_HZ.log10() - log_min)
}

/// Normalized x position of a frequency.
pub fn frequency_to_x(frequency_hz: f64) -> f64 {
    let (log_min, span) = log_span();
    (frequency_hz.log10() - log_min) / span
}

/// Frequency at a normalized x position. Exact inverse of [`frequency_to_x`].
pub fn x_to_frequency(x: f64) -> f64 {
    let (log_min, span) = log_span();
    10.0_f64.powf(log_min + x * span)
}

/// Normalized y position of a gain (larger gain, smaller y).
pub fn gain_to_y(gain_db: f64) -> f64 {
    (GAIN_MAX_DB - gain_db) / (GAIN_MAX_DB - GAIN_MIN_DB)
}

/// Gain at a normalized y position. Exact inverse of [`gain_to_y`].
pub fn y_to_gain(y: f64) -> f64 {
    GAIN_MAX_DB - y * (GAIN_MAX_DB - GAIN_MIN_DB)
}

/// Space reserved around the plot area for axis labels, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: MARGIN_TOP_PX,
            right: MARGIN_RIGHT_PX,
            bottom: MARGIN_BOTTOM_PX,
            left: MARGIN_LEFT_PX,
        }
    }
}

/// Size of the drawing surface and how the plot sits inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotGeometry {
    width: f64,
    height: f64,
    margins: Margins,
    device_pixel_ratio: f64,
}

impl PlotGeometry {
    /// Creates a geometry with the default label margins.
    ///
    /// # Parameters
    ///
    /// - `width`, `height`: Surface size in logical pixels
    /// - `device_pixel_ratio`: Device pixels per logical pixel
    ///
    /// # Errors
    ///
    /// Fails when the surface is empty, the margins swallow the whole surface,
    /// or the pixel ratio is not a positive finite number.
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Result<Self, EditorError> {
        Self::with_margins(width, height, Margins::default(), device_pixel_ratio)
    }

    /// Creates a geometry with explicit margins.
    pub fn with_margins(
        width: f64,
        height: f64,
        margins: Margins,
        device_pixel_ratio: f64,
    ) -> Result<Self, EditorError> {
        let geometry = Self {
            width,
            height,
            margins,
            device_pixel_ratio,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    fn validate(&self) -> Result<(), EditorError> {
        if !self.width.is_finite()
            || !self.height.is_finite()
            || self.width <= 0.0
            || self.height <= 0.0
        {
            return Err(EditorError::MissingSurface {
                width: self.width,
                height: self.height,
            });
        }

        let m = self.margins;
        if let Some(bad) = [m.top, m.right, m.bottom, m.left]
            .into_iter()
            .find(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(EditorError::InvalidMargin(bad));
        }

        if self.plot_width() <= 0.0 || self.plot_height() <= 0.0 {
            return Err(EditorError::EmptyPlotArea {
                plot_width: self.plot_width(),
                plot_height: self.plot_height(),
            });
        }

        if !self.device_pixel_ratio.is_finite() || self.device_pixel_ratio <= 0.0 {
            return Err(EditorError::InvalidPixelRatio(self.device_pixel_ratio));
        }

        Ok(())
    }

    /// Replaces the surface size (and optionally the pixel ratio).
    ///
    /// The geometry is left untouched when the new values are invalid.
    pub fn resize(
        &mut self,
        width: f64,
        height: f64,
        device_pixel_ratio: Option<f64>,
    ) -> Result<(), EditorError> {
        let resized = Self::with_margins(
            width,
            height,
            self.margins,
            device_pixel_ratio.unwrap_or(self.device_pixel_ratio),
        )?;
        *self = resized;
        Ok(())
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    /// Width of the plot rectangle in logical pixels.
    pub fn plot_width(&self) -> f64 {
        self.width - self.margins.left - self.margins.right
    }

    /// Height of the plot rectangle in logical pixels.
    pub fn plot_height(&self) -> f64 {
        self.height - self.margins.top - self.margins.bottom
    }

    /// Handle hit radius in device pixels.
    pub fn hit_radius(&self) -> f64 {
        HANDLE_HIT_RADIUS_PX * self.device_pixel_ratio
    }

    /// Normalized plot position to logical pixels.
    pub fn to_logical(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.margins.left + x * self.plot_width(),
            self.margins.top + y * self.plot_height(),
        )
    }

    /// Logical pixels to normalized plot position. Not clamped.
    pub fn from_logical(&self, px: f64, py: f64) -> (f64, f64) {
        (
            (px - self.margins.left) / self.plot_width(),
            (py - self.margins.top) / self.plot_height(),
        )
    }

    /// Normalized plot position to device pixels.
    pub fn to_device(&self, x: f64, y: f64) -> (f64, f64) {
        let (px, py) = self.to_logical(x, y);
        (px * self.device_pixel_ratio, py * self.device_pixel_ratio)
    }

    /// Device pixels to normalized plot position. Not clamped.
    pub fn from_device(&self, px: f64, py: f64) -> (f64, f64) {
        self.from_logical(px / self.device_pixel_ratio, py / self.device_pixel_ratio)
    }

    /// Logical pixel position of a `(frequency, gain)` point.
    pub fn point_to_logical(&self, frequency_hz: f64, gain_db: f64) -> (f64, f64) {
        self.to_logical(frequency_to_x(frequency_hz), gain_to_y(gain_db))
    }
}
