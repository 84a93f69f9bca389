use serde::{Deserialize, Serialize};

use crate::core::scaler::Scaler;
use crate::error::{ChartError, ChartResult};

/// Width-allocation inputs for one bar-like series sharing a category slot.
///
/// The same request shape covers columns, rows (mirrored orientation) and
/// financial/box slots, where the count is the number of series sharing the
/// financial slot rather than a generic bar group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarSlotRequest {
    /// Category slot width in data units, normally the axis unit width.
    pub unit_width: f64,
    /// Padding around the whole category slot, in pixels.
    pub group_padding: f64,
    /// Padding around each individual bar, in pixels.
    pub series_padding: f64,
    /// Upper clamp for one bar's width, in pixels.
    pub max_bar_width: f64,
    /// Number of series sharing this slot (stack groups count as one).
    pub count: usize,
    /// This series' position among the slot's series, `0..count`.
    pub position: usize,
    /// When set the bar centers on the slot instead of taking its grouped offset.
    pub ignores_bar_position: bool,
}

impl BarSlotRequest {
    fn validate(&self) -> ChartResult<()> {
        if !self.unit_width.is_finite() || self.unit_width <= 0.0 {
            return Err(ChartError::InvalidData(format!(
                "bar slot unit width must be finite and > 0, got {}",
                self.unit_width
            )));
        }
        if !self.group_padding.is_finite()
            || self.group_padding < 0.0
            || !self.series_padding.is_finite()
            || self.series_padding < 0.0
        {
            return Err(ChartError::InvalidData(
                "bar paddings must be finite and >= 0".to_owned(),
            ));
        }
        if !self.max_bar_width.is_finite() || self.max_bar_width <= 0.0 {
            return Err(ChartError::InvalidData(format!(
                "max bar width must be finite and > 0, got {}",
                self.max_bar_width
            )));
        }
        if self.count == 0 || self.position >= self.count {
            return Err(ChartError::InvalidData(format!(
                "bar slot position {} is out of range for count {}",
                self.position, self.count
            )));
        }
        Ok(())
    }
}

/// Resolved per-pass bar geometry, not persisted between passes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarMeasure {
    pub unit_width: f64,
    pub half_unit_width: f64,
    pub center_offset: f64,
    pub pivot_pixel: f64,
    /// Slot width before padding and grouping, used for hover-area sizing.
    pub actual_unit_width: f64,
}

/// Allocates width, center offset and pivot pixel for one bar series.
///
/// Widths come from the scaler of the axis the bars spread along; the pivot
/// pixel is precomputed by the caller on the value axis and clamped into
/// `[min_pivot_pixel, max_pivot_pixel]` so bars pinned to an off-screen
/// baseline still anchor at the draw-margin edge.
pub fn measure_bar_slot(
    scaler: Scaler,
    request: BarSlotRequest,
    pivot_pixel: f64,
    min_pivot_pixel: f64,
    max_pivot_pixel: f64,
) -> ChartResult<BarMeasure> {
    request.validate()?;

    if !pivot_pixel.is_finite() {
        return Err(ChartError::InvalidData(
            "bar pivot pixel must be finite".to_owned(),
        ));
    }
    let pivot_pixel = pivot_pixel.clamp(min_pivot_pixel, max_pivot_pixel);

    let actual_unit_width = scaler.measure_in_pixels(request.unit_width);
    let mut unit_width = actual_unit_width;

    // Group padding shrinks before it would push the width below 1px.
    let effective_group_padding = request.group_padding.min((unit_width - 1.0).max(0.0));
    unit_width -= effective_group_padding;

    let count = request.count as f64;
    unit_width /= count;
    if request.max_bar_width < unit_width {
        unit_width = request.max_bar_width;
    }

    let mut center_offset = if request.ignores_bar_position {
        0.0
    } else {
        (request.position as f64 - count / 2.0) * unit_width + unit_width / 2.0
    };

    unit_width -= request.series_padding;
    center_offset += request.series_padding / 2.0;

    let (unit_width, half_unit_width) = if unit_width < 1.0 {
        (1.0, 0.5)
    } else {
        (unit_width, unit_width / 2.0)
    };

    Ok(BarMeasure {
        unit_width,
        half_unit_width,
        center_offset,
        pivot_pixel,
        actual_unit_width,
    })
}
