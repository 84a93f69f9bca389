use serde::{Deserialize, Serialize};

use crate::core::types::{AxisOrientation, DrawMargin};
use crate::error::{ChartError, ChartResult};

/// Minimum data-space span substituted when an axis resolves to a zero-width
/// domain, so the linear factor never divides by zero.
pub const MIN_SPAN_EPSILON: f64 = 1e-6;

/// Linear transform between data space and pixel space for one axis.
///
/// Two instances exist per axis per measure pass: the target scaler built
/// from the freshly resolved bounds and the previous pass's scaler used to
/// seed entrance animations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    pixel_start: f64,
    pixel_length: f64,
    min: f64,
    max: f64,
    orientation: AxisOrientation,
    inverted: bool,
}

impl Scaler {
    pub fn new(
        draw_margin: DrawMargin,
        orientation: AxisOrientation,
        min: f64,
        max: f64,
        inverted: bool,
    ) -> ChartResult<Self> {
        let draw_margin = draw_margin.validated()?;
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(ChartError::InvalidData(format!(
                "scaler domain must be finite and ordered, got [{min}, {max}]"
            )));
        }

        let (min, max) = if max - min < MIN_SPAN_EPSILON {
            let half = MIN_SPAN_EPSILON / 2.0;
            (min - half, max + half)
        } else {
            (min, max)
        };

        let (pixel_start, pixel_length) = match orientation {
            AxisOrientation::X => (draw_margin.x, draw_margin.width),
            AxisOrientation::Y => (draw_margin.y, draw_margin.height),
        };

        Ok(Self {
            pixel_start,
            pixel_length,
            min,
            max,
            orientation,
            inverted,
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.min, self.max)
    }

    #[must_use]
    pub fn orientation(self) -> AxisOrientation {
        self.orientation
    }

    /// Whether larger data values map toward smaller pixel coordinates.
    ///
    /// Y axes grow upward by default while pixel rows grow downward, so a
    /// non-inverted Y axis is flipped in pixel space.
    fn flipped(self) -> bool {
        match self.orientation {
            AxisOrientation::X => self.inverted,
            AxisOrientation::Y => !self.inverted,
        }
    }

    #[must_use]
    pub fn to_pixels(self, value: f64) -> f64 {
        let normalized = (value - self.min) / (self.max - self.min);
        let normalized = if self.flipped() {
            1.0 - normalized
        } else {
            normalized
        };
        self.pixel_start + normalized * self.pixel_length
    }

    #[must_use]
    pub fn to_chart_value(self, pixel: f64) -> f64 {
        let normalized = (pixel - self.pixel_start) / self.pixel_length;
        let normalized = if self.flipped() {
            1.0 - normalized
        } else {
            normalized
        };
        self.min + normalized * (self.max - self.min)
    }

    /// Converts a data-space width to a pixel length, independent of the
    /// axis offset. Used for unit widths and geometry sizes.
    #[must_use]
    pub fn measure_in_pixels(self, delta: f64) -> f64 {
        (self.to_pixels(delta) - self.to_pixels(0.0)).abs()
    }
}
