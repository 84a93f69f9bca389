use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::bounds::{Bounds, DimensionalBounds};
use crate::core::scaler::Scaler;
use crate::core::types::{AxisOrientation, DrawMargin};
use crate::error::{ChartError, ChartResult};
use crate::render::{Paint, Visual, VisualKind, VisualProps};

/// Which edge of the control the axis contributes its footprint to.
///
/// `Start` is bottom for X axes and left for Y axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AxisPosition {
    #[default]
    Start,
    End,
}

/// Fraction of the absolute bound value used to pad a zero-span axis range,
/// with a 0.5 fallback when the bound itself is zero. One consistent rule for
/// Cartesian and polar charts.
const ZERO_SPAN_PADDING_FRACTION: f64 = 0.15;

/// Formats one axis value into a separator label.
#[derive(Clone)]
pub struct LabelFormatter(Arc<dyn Fn(f64) -> String + Send + Sync>);

impl LabelFormatter {
    #[must_use]
    pub fn new(f: impl Fn(f64) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    #[must_use]
    pub fn format(&self, value: f64) -> String {
        (self.0)(value)
    }
}

impl fmt::Debug for LabelFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LabelFormatter(..)")
    }
}

/// One live separator (tick line plus label) at an axis step position.
#[derive(Debug, Clone)]
pub struct Separator {
    pub value: f64,
    pub text: String,
    pub line: Visual,
    pub label: Visual,
}

/// Separators retired this pass; already soft-deleted, drawn once more so
/// the backend can animate them out.
pub type RetiredSeparators = Vec<Separator>;

/// A Cartesian (or polar radius/angle) axis model.
///
/// Bounds restart on `initialize` at the top of every measure pass, are
/// accumulated during bounds discovery and consumed when the range resolves.
/// Separator visuals are tracked per chart token so one axis shared between
/// chart instances never leaks separator state across them.
#[derive(Debug, Clone)]
pub struct Axis {
    pub name: Option<String>,
    pub position: AxisPosition,
    pub inverted: bool,
    /// User overrides pinning the visible range.
    pub min_limit: Option<f64>,
    pub max_limit: Option<f64>,
    /// Width of one category slot in data units.
    pub unit_width: f64,
    /// User step override; `None` enables the automatic 1-2-5 ladder.
    pub step: Option<f64>,
    pub min_step: f64,
    pub force_step_to_min: bool,
    /// Custom separator positions used verbatim instead of stepping.
    pub custom_separators: Option<Vec<f64>>,
    pub labels_enabled: bool,
    pub separator_lines_enabled: bool,
    pub text_size: f64,
    pub label_padding: f64,
    pub label_rotation: f64,
    pub label_formatter: Option<LabelFormatter>,
    pub separator_paint: Option<Paint>,
    pub label_paint: Option<Paint>,

    orientation: Option<AxisOrientation>,
    data_bounds: Bounds,
    visible_data_bounds: Bounds,
    requested_padding: f64,
    geometry_size_hint: f64,
    active_separators: IndexMap<u64, IndexMap<i64, Separator>>,
}

impl Default for Axis {
    fn default() -> Self {
        Self {
            name: None,
            position: AxisPosition::Start,
            inverted: false,
            min_limit: None,
            max_limit: None,
            unit_width: 1.0,
            step: None,
            min_step: 0.0,
            force_step_to_min: false,
            custom_separators: None,
            labels_enabled: true,
            separator_lines_enabled: true,
            text_size: 12.0,
            label_padding: 4.0,
            label_rotation: 0.0,
            label_formatter: None,
            separator_paint: None,
            label_paint: None,
            orientation: None,
            data_bounds: Bounds::new(),
            visible_data_bounds: Bounds::new(),
            requested_padding: 0.0,
            geometry_size_hint: 0.0,
            active_separators: IndexMap::new(),
        }
    }
}

impl Axis {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restarts the axis bounds at the top of a measure pass.
    pub fn initialize(&mut self, orientation: AxisOrientation) {
        self.orientation = Some(orientation);
        self.data_bounds = Bounds::new();
        self.visible_data_bounds = Bounds::new();
        self.requested_padding = 0.0;
        self.geometry_size_hint = 0.0;
    }

    #[must_use]
    pub fn orientation(&self) -> Option<AxisOrientation> {
        self.orientation
    }

    #[must_use]
    pub fn data_bounds(&self) -> Bounds {
        self.data_bounds
    }

    #[must_use]
    pub fn visible_data_bounds(&self) -> Bounds {
        self.visible_data_bounds
    }

    /// Merges one series' bounds report into this axis.
    pub fn register_bounds(&mut self, bounds: &DimensionalBounds) -> ChartResult<()> {
        let Some(orientation) = self.orientation else {
            return Err(ChartError::Configuration(
                "axis bounds registered before initialize".to_owned(),
            ));
        };

        match orientation {
            AxisOrientation::X => {
                self.data_bounds.merge(bounds.secondary);
                self.visible_data_bounds.merge(bounds.visible_secondary);
                if bounds.secondary_padding > self.requested_padding {
                    self.requested_padding = bounds.secondary_padding;
                }
            }
            AxisOrientation::Y => {
                self.data_bounds.merge(bounds.primary);
                self.visible_data_bounds.merge(bounds.visible_primary);
                if bounds.primary_padding > self.requested_padding {
                    self.requested_padding = bounds.primary_padding;
                }
            }
        }
        if bounds.geometry_size_hint > self.geometry_size_hint {
            self.geometry_size_hint = bounds.geometry_size_hint;
        }
        Ok(())
    }

    /// Resolves the plotted data range: user limits win, otherwise the
    /// visible bounds padded by what series requested, with degenerate spans
    /// widened so a flat series still plots mid-axis.
    pub fn resolve_range(&self) -> ChartResult<(f64, f64)> {
        let bounds = if self.visible_data_bounds.is_empty() {
            self.data_bounds
        } else {
            self.visible_data_bounds
        };

        let mut min = self.min_limit.unwrap_or_else(|| {
            if bounds.is_empty() {
                0.0
            } else {
                bounds.min() - self.requested_padding
            }
        });
        let mut max = self.max_limit.unwrap_or_else(|| {
            if bounds.is_empty() {
                1.0
            } else {
                bounds.max() + self.requested_padding
            }
        });

        if !min.is_finite() || !max.is_finite() {
            return Err(ChartError::InvalidData(
                "axis limits must be finite".to_owned(),
            ));
        }
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }

        if max - min == 0.0 {
            let pad = if min == 0.0 {
                0.5
            } else {
                min.abs() * ZERO_SPAN_PADDING_FRACTION
            };
            min -= pad;
            max += pad;
        }

        Ok((min, max))
    }

    /// Builds this axis's target scaler for the given draw margin.
    pub fn scaler(&self, draw_margin: DrawMargin) -> ChartResult<Scaler> {
        let Some(orientation) = self.orientation else {
            return Err(ChartError::Configuration(
                "axis scaler requested before initialize".to_owned(),
            ));
        };
        let (min, max) = self.resolve_range()?;
        Scaler::new(draw_margin, orientation, min, max, self.inverted)
    }

    /// Resolves the separator step: `max(user_step or auto, min_step)`,
    /// forced to `min_step` when configured.
    pub fn resolve_step(&self, axis_span_px: f64) -> ChartResult<f64> {
        if self.force_step_to_min {
            if self.min_step <= 0.0 {
                return Err(ChartError::Configuration(
                    "force_step_to_min requires min_step > 0".to_owned(),
                ));
            }
            return Ok(self.min_step);
        }

        let (min, max) = self.resolve_range()?;
        let range = max - min;
        let step = match self.step {
            Some(step) if step.is_finite() && step > 0.0 => step,
            Some(step) => {
                return Err(ChartError::Configuration(format!(
                    "axis step must be finite and > 0, got {step}"
                )));
            }
            None => auto_step(range, axis_span_px, self.label_spacing_px()),
        };

        Ok(step.max(self.min_step))
    }

    /// Separator positions for the resolved range, either stepped from
    /// `floor(min / step) * step` through `max`, or a custom list verbatim.
    pub fn separator_positions(&self, axis_span_px: f64) -> ChartResult<Vec<f64>> {
        if let Some(custom) = &self.custom_separators {
            return Ok(custom.clone());
        }

        let (min, max) = self.resolve_range()?;
        let step = self.resolve_step(axis_span_px)?;

        let mut positions = Vec::new();
        let start = (min / step).floor() * step;
        let mut index: u32 = 0;
        loop {
            let value = start + f64::from(index) * step;
            if value > max + step * 1e-9 {
                break;
            }
            if value >= min - step * 1e-9 {
                positions.push(value);
            }
            index += 1;
            if index > 10_000 {
                // A pathological step should degrade, not hang the pass.
                debug!(step, min, max, "separator enumeration truncated");
                break;
            }
        }
        Ok(positions)
    }

    /// Pixel footprint this axis adds to its edge of the control: label
    /// extent plus padding, using the deterministic text-size heuristic
    /// (true font metrics belong to the backend).
    pub fn measure_footprint(&self, axis_span_px: f64) -> ChartResult<f64> {
        if !self.labels_enabled {
            return Ok(0.0);
        }

        let positions = self.separator_positions(axis_span_px)?;
        let Some(orientation) = self.orientation else {
            return Err(ChartError::Configuration(
                "axis footprint requested before initialize".to_owned(),
            ));
        };

        let footprint = match orientation {
            AxisOrientation::X => estimate_text_height(self.text_size),
            AxisOrientation::Y => positions
                .iter()
                .map(|value| estimate_text_width(&self.format_value(*value), self.text_size))
                .fold(0.0, f64::max),
        };
        Ok(footprint + self.label_padding * 2.0)
    }

    /// Creates, re-targets and soft-deletes separator visuals for one chart.
    ///
    /// New separators seed from the previous scaler when one exists so they
    /// slide in from where they would have been; separators that fell out of
    /// the surviving set fade out and are returned for one final draw.
    pub fn measure_separators(
        &mut self,
        chart_token: u64,
        scaler: Scaler,
        previous_scaler: Option<Scaler>,
        draw_margin: DrawMargin,
    ) -> ChartResult<RetiredSeparators> {
        let Some(orientation) = self.orientation else {
            return Err(ChartError::Configuration(
                "axis measured before initialize".to_owned(),
            ));
        };

        let axis_span_px = match orientation {
            AxisOrientation::X => draw_margin.width,
            AxisOrientation::Y => draw_margin.height,
        };
        let positions = self.separator_positions(axis_span_px)?;
        // Custom positions are keyed on their own value so close neighbours
        // never collapse into one step-quantized bucket.
        let step = if self.custom_separators.is_some() {
            None
        } else {
            Some(self.resolve_step(axis_span_px)?)
        };

        let texts: Vec<String> = positions
            .iter()
            .map(|&value| self.format_value(value))
            .collect();

        let separators = self.active_separators.entry(chart_token).or_default();
        let mut measured: Vec<i64> = Vec::with_capacity(positions.len());

        for (value, text) in positions.into_iter().zip(texts) {
            let key = match step {
                Some(step) => separator_key(value, step),
                None => custom_separator_key(value),
            };
            measured.push(key);

            let line_target = line_props(orientation, scaler, value, draw_margin);
            let label_target = label_props(
                orientation,
                scaler,
                value,
                draw_margin,
                self.label_padding,
                self.label_rotation,
            );
            if let Some(existing) = separators.get_mut(&key) {
                existing.text = text;
                existing.line.animate_to(line_target);
                existing.label.animate_to(label_target);
                continue;
            }

            let (line, label) = match previous_scaler {
                Some(previous) => {
                    let line_seed = line_props(orientation, previous, value, draw_margin);
                    let label_seed = label_props(
                        orientation,
                        previous,
                        value,
                        draw_margin,
                        self.label_padding,
                        self.label_rotation,
                    );
                    (
                        Visual::seeded(
                            path_kind(orientation, line_seed),
                            line_seed,
                            line_target,
                        ),
                        Visual::seeded(
                            VisualKind::Text {
                                rotation: self.label_rotation,
                            },
                            label_seed,
                            label_target,
                        ),
                    )
                }
                None => (
                    Visual::at_target(path_kind(orientation, line_target), line_target),
                    Visual::at_target(
                        VisualKind::Text {
                            rotation: self.label_rotation,
                        },
                        label_target,
                    ),
                ),
            };

            separators.insert(
                key,
                Separator {
                    value,
                    text,
                    line,
                    label,
                },
            );
        }

        let stale: Vec<i64> = separators
            .keys()
            .copied()
            .filter(|key| !measured.contains(key))
            .collect();

        let mut retired = Vec::with_capacity(stale.len());
        for key in stale {
            if let Some(mut separator) = separators.shift_remove(&key) {
                let mut line_terminal = separator.line.target;
                line_terminal.opacity = 0.0;
                separator.line.soft_delete(line_terminal);

                let mut label_terminal = separator.label.target;
                label_terminal.opacity = 0.0;
                separator.label.soft_delete(label_terminal);

                retired.push(separator);
            }
        }
        Ok(retired)
    }

    #[must_use]
    pub fn active_separators(&self, chart_token: u64) -> Option<&IndexMap<i64, Separator>> {
        self.active_separators.get(&chart_token)
    }

    /// Unload path for one chart: drop its separator state so reattachment
    /// starts from a first draw.
    pub fn detach_chart(&mut self, chart_token: u64) {
        self.active_separators.shift_remove(&chart_token);
    }

    #[must_use]
    pub fn format_value(&self, value: f64) -> String {
        match &self.label_formatter {
            Some(formatter) => formatter.format(value),
            None => format_default(value),
        }
    }

    fn label_spacing_px(&self) -> f64 {
        match self.orientation {
            // Horizontal labels need more room than stacked vertical ones.
            Some(AxisOrientation::X) | None => self.text_size * 6.0,
            Some(AxisOrientation::Y) => self.text_size * 2.5,
        }
    }
}

/// 1-2-5 ladder step sized so labels keep a readable pixel spacing.
#[must_use]
pub fn auto_step(range: f64, axis_span_px: f64, label_spacing_px: f64) -> f64 {
    if !range.is_finite() || range <= 0.0 {
        return 1.0;
    }

    let max_labels = if axis_span_px.is_finite() && axis_span_px > 0.0 && label_spacing_px > 0.0 {
        (axis_span_px / label_spacing_px).floor().max(2.0)
    } else {
        10.0
    };

    let raw_step = range / max_labels;
    let magnitude = 10_f64.powf(raw_step.log10().floor());
    let residual = raw_step / magnitude;

    let nice = if residual <= 1.0 {
        1.0
    } else if residual <= 2.0 {
        2.0
    } else if residual <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

fn separator_key(value: f64, step: f64) -> i64 {
    (value / step).round() as i64
}

fn custom_separator_key(value: f64) -> i64 {
    (value * 1_000.0).round() as i64
}

fn path_kind(orientation: AxisOrientation, props: VisualProps) -> VisualKind {
    match orientation {
        AxisOrientation::X => VisualKind::PathSegment {
            end_x: props.x,
            end_y: props.y + props.height,
        },
        AxisOrientation::Y => VisualKind::PathSegment {
            end_x: props.x + props.width,
            end_y: props.y,
        },
    }
}

fn line_props(
    orientation: AxisOrientation,
    scaler: Scaler,
    value: f64,
    draw_margin: DrawMargin,
) -> VisualProps {
    let pixel = scaler.to_pixels(value);
    match orientation {
        AxisOrientation::X => VisualProps::sized(pixel, draw_margin.y, 0.0, draw_margin.height),
        AxisOrientation::Y => VisualProps::sized(draw_margin.x, pixel, draw_margin.width, 0.0),
    }
}

fn label_props(
    orientation: AxisOrientation,
    scaler: Scaler,
    value: f64,
    draw_margin: DrawMargin,
    label_padding: f64,
    label_rotation: f64,
) -> VisualProps {
    let pixel = scaler.to_pixels(value);
    let mut props = match orientation {
        AxisOrientation::X => VisualProps::at(
            pixel,
            draw_margin.y + draw_margin.height + label_padding,
        ),
        AxisOrientation::Y => VisualProps::at(draw_margin.x - label_padding, pixel),
    };
    props.rotate_transform = label_rotation;
    props
}

fn estimate_text_width(text: &str, text_size: f64) -> f64 {
    text.chars().count() as f64 * text_size * 0.6
}

fn estimate_text_height(text_size: f64) -> f64 {
    text_size * 1.35
}

fn format_default(value: f64) -> String {
    if value == 0.0 {
        return "0".to_owned();
    }
    let magnitude = value.abs();
    if magnitude >= 1e6 || magnitude < 1e-3 {
        return format!("{value:.2e}");
    }
    let formatted = format!("{value:.3}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_owned()
}

#[cfg(test)]
mod tests {
    use super::{Axis, auto_step, format_default};
    use crate::core::bounds::DimensionalBounds;
    use crate::core::types::AxisOrientation;

    #[test]
    fn auto_step_picks_from_the_ladder() {
        let step = auto_step(100.0, 500.0, 50.0);
        assert_eq!(step, 10.0);

        let step = auto_step(1.0, 500.0, 50.0);
        assert_eq!(step, 0.1);
    }

    #[test]
    fn resolve_range_prefers_user_limits() {
        let mut axis = Axis::new();
        axis.initialize(AxisOrientation::X);
        axis.min_limit = Some(-5.0);
        axis.max_limit = Some(5.0);

        let mut bounds = DimensionalBounds::default();
        bounds.secondary.append(100.0);
        bounds.visible_secondary.append(100.0);
        axis.register_bounds(&bounds).expect("register");

        assert_eq!(axis.resolve_range().expect("range"), (-5.0, 5.0));
    }

    #[test]
    fn zero_span_range_is_padded() {
        let mut axis = Axis::new();
        axis.initialize(AxisOrientation::Y);
        let mut bounds = DimensionalBounds::default();
        bounds.primary.append(10.0);
        bounds.visible_primary.append(10.0);
        axis.register_bounds(&bounds).expect("register");

        let (min, max) = axis.resolve_range().expect("range");
        assert!(min < 10.0);
        assert!(max > 10.0);
        assert!((max - min - 3.0).abs() <= 1e-9);
    }

    #[test]
    fn default_formatting_trims_trailing_zeros() {
        assert_eq!(format_default(2.5), "2.5");
        assert_eq!(format_default(3.0), "3");
        assert_eq!(format_default(0.0), "0");
    }
}
