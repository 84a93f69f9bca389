use serde::{Deserialize, Serialize};

use crate::core::scaler::MIN_SPAN_EPSILON;
use crate::core::types::{DrawMargin, PixelPoint};
use crate::error::{ChartError, ChartResult};

/// Maps (angle, radius) data pairs to pixel coordinates for polar layouts.
///
/// Angle values are normalized over the angle axis's bounds into
/// `[0, total_angle]` degrees, offset by the initial rotation; radius values
/// are projected from the radius axis's bounds into
/// `[inner_radius, max_radius]` from the draw-margin center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarScaler {
    center_x: f64,
    center_y: f64,
    inner_radius: f64,
    max_radius: f64,
    angle_min: f64,
    angle_max: f64,
    radius_min: f64,
    radius_max: f64,
    initial_rotation: f64,
    total_angle: f64,
}

impl PolarScaler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        draw_margin: DrawMargin,
        angle_min: f64,
        angle_max: f64,
        radius_min: f64,
        radius_max: f64,
        inner_radius: f64,
        initial_rotation: f64,
        total_angle: f64,
    ) -> ChartResult<Self> {
        let draw_margin = draw_margin.validated()?;

        if !total_angle.is_finite() || total_angle <= 0.0 || total_angle > 360.0 {
            return Err(ChartError::InvalidData(format!(
                "total angle must be in (0, 360], got {total_angle}"
            )));
        }
        if !inner_radius.is_finite() || inner_radius < 0.0 {
            return Err(ChartError::InvalidData(format!(
                "inner radius must be finite and >= 0, got {inner_radius}"
            )));
        }
        if !initial_rotation.is_finite() {
            return Err(ChartError::InvalidData(
                "initial rotation must be finite".to_owned(),
            ));
        }

        let (angle_min, angle_max) = widen_if_degenerate(angle_min, angle_max)?;
        let (radius_min, radius_max) = widen_if_degenerate(radius_min, radius_max)?;

        let max_radius = draw_margin.width.min(draw_margin.height) / 2.0;
        if max_radius <= inner_radius {
            return Err(ChartError::InvalidData(format!(
                "draw margin leaves no radial room: max radius {max_radius} <= inner radius {inner_radius}"
            )));
        }

        Ok(Self {
            center_x: draw_margin.center_x(),
            center_y: draw_margin.center_y(),
            inner_radius,
            max_radius,
            angle_min,
            angle_max,
            radius_min,
            radius_max,
            initial_rotation,
            total_angle,
        })
    }

    #[must_use]
    pub fn center_x(self) -> f64 {
        self.center_x
    }

    #[must_use]
    pub fn center_y(self) -> f64 {
        self.center_y
    }

    #[must_use]
    pub fn max_radius(self) -> f64 {
        self.max_radius
    }

    /// Absolute rotation in degrees for an angle-axis value, including the
    /// initial rotation. Used to rotate tangent-aligned labels.
    #[must_use]
    pub fn get_angle(self, angle_value: f64) -> f64 {
        let normalized = (angle_value - self.angle_min) / (self.angle_max - self.angle_min);
        self.initial_rotation + normalized * self.total_angle
    }

    #[must_use]
    pub fn to_pixels(self, angle_value: f64, radius_value: f64) -> PixelPoint {
        let angle_rad = self.get_angle(angle_value).to_radians();
        let radius = self.project_radius(radius_value);
        PixelPoint::new(
            self.center_x + radius * angle_rad.cos(),
            self.center_y + radius * angle_rad.sin(),
        )
    }

    /// Inverse mapping from a pixel position back to (angle, radius) data values.
    #[must_use]
    pub fn to_chart_values(self, x: f64, y: f64) -> (f64, f64) {
        let dx = x - self.center_x;
        let dy = y - self.center_y;

        let rotation = (dy.atan2(dx).to_degrees() - self.initial_rotation).rem_euclid(360.0);
        let angle_value = self.angle_min
            + rotation / self.total_angle * (self.angle_max - self.angle_min);

        let radius = (dx * dx + dy * dy).sqrt();
        let radial_span = self.max_radius - self.inner_radius;
        let radius_value = self.radius_min
            + (radius - self.inner_radius) / radial_span * (self.radius_max - self.radius_min);

        (angle_value, radius_value)
    }

    fn project_radius(self, radius_value: f64) -> f64 {
        let normalized = (radius_value - self.radius_min) / (self.radius_max - self.radius_min);
        self.inner_radius + normalized * (self.max_radius - self.inner_radius)
    }
}

fn widen_if_degenerate(min: f64, max: f64) -> ChartResult<(f64, f64)> {
    if !min.is_finite() || !max.is_finite() || min > max {
        return Err(ChartError::InvalidData(format!(
            "polar scaler domain must be finite and ordered, got [{min}, {max}]"
        )));
    }
    if max - min < MIN_SPAN_EPSILON {
        let half = MIN_SPAN_EPSILON / 2.0;
        return Ok((min - half, max + half));
    }
    Ok((min, max))
}
