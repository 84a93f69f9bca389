use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use tracing::debug;

use crate::core::axis::{Axis, AxisPosition, Separator};
use crate::core::bounds::DimensionalBounds;
use crate::core::polar::PolarScaler;
use crate::core::scaler::Scaler;
use crate::core::series::{
    CartesianMeasureContext, PieSliceContext, PolarMeasureContext, Series, SeriesKind,
    SlotPlacement,
};
use crate::core::stacking::StackManager;
use crate::core::types::{AxisOrientation, ControlSize, DrawMargin, PixelPoint};
use crate::error::{ChartError, ChartResult};
use crate::render::{Color, Paint, RenderFrame, Transition, Visual, VisualKind, VisualProps};

static NEXT_CHART_TOKEN: AtomicU64 = AtomicU64::new(1);

fn next_token() -> u64 {
    NEXT_CHART_TOKEN.fetch_add(1, Ordering::Relaxed)
}

/// Inputs the view layer resolves before handing a measure pass to a chart.
#[derive(Debug, Clone, Default)]
pub struct MeasureSettings {
    pub control_size: ControlSize,
    /// Explicit plot rectangle; `None` lets the chart resolve it from axis
    /// footprints.
    pub draw_margin_override: Option<DrawMargin>,
    pub transition: Option<Transition>,
    pub palette: Vec<Color>,
}

fn default_separator_paint() -> Paint {
    Paint::stroke(Color::rgba(0.75, 0.75, 0.75, 1.0), 1.0).with_z_index(-10)
}

fn default_label_paint() -> Paint {
    Paint::fill(Color::rgb(0.35, 0.35, 0.35)).with_z_index(10)
}

/// Common surface the update engine drives, regardless of chart geometry.
pub trait Chart: Send {
    /// Runs one measure pass, or skips it when the surface cannot host a plot.
    fn measure(&mut self, settings: &MeasureSettings) -> ChartResult<Option<RenderFrame>>;
    /// Drops visuals and lifecycle state so reattaching behaves as a first draw.
    fn unload(&mut self);
}

/// A Cartesian chart: series plotted against X and Y axis collections.
///
/// `measure` is the engine's single entry point; it never draws, it resolves
/// geometry into a `RenderFrame`. All cross-series state (stacking totals,
/// grouped-bar slots, previous scalers) lives here per chart instance.
#[derive(Debug)]
pub struct CartesianChart {
    pub x_axes: Vec<Axis>,
    pub y_axes: Vec<Axis>,
    pub series: Vec<Series>,
    /// Outer padding between the control edge and the plot, in pixels.
    pub padding: f64,
    /// While a pan/zoom gesture is active, vanished visuals are removed
    /// immediately instead of animating out.
    pub is_panning: bool,

    token: u64,
    next_series_id: u32,
    first_draw: bool,
    previous_x_scalers: IndexMap<usize, Scaler>,
    previous_y_scalers: IndexMap<usize, Scaler>,
}

impl Default for CartesianChart {
    fn default() -> Self {
        Self::new()
    }
}

impl CartesianChart {
    #[must_use]
    pub fn new() -> Self {
        Self {
            x_axes: Vec::new(),
            y_axes: Vec::new(),
            series: Vec::new(),
            padding: 12.0,
            is_panning: false,
            token: next_token(),
            next_series_id: 0,
            first_draw: true,
            previous_x_scalers: IndexMap::new(),
            previous_y_scalers: IndexMap::new(),
        }
    }

    /// Identifier keying per-chart separator state on shared axes.
    #[must_use]
    pub fn token(&self) -> u64 {
        self.token
    }

    /// Runs one full measure pass.
    ///
    /// Returns `Ok(None)` without touching any state when the control size or
    /// the resolved draw margin cannot host a plot; the view simply skips the
    /// frame and re-measures on the next resize.
    pub fn measure(&mut self, settings: &MeasureSettings) -> ChartResult<Option<RenderFrame>> {
        if !settings.control_size.is_valid() {
            debug!(
                width = settings.control_size.width,
                height = settings.control_size.height,
                "skipping measure pass, control size cannot host a plot"
            );
            return Ok(None);
        }

        if self.x_axes.is_empty() {
            self.x_axes.push(Axis::new());
        }
        if self.y_axes.is_empty() {
            self.y_axes.push(Axis::new());
        }

        let mut id = self.next_series_id;
        for series in &mut self.series {
            series.attach(id, &settings.palette)?;
            id += 1;
        }
        self.next_series_id = id;

        for axis in &mut self.x_axes {
            axis.initialize(AxisOrientation::X);
        }
        for axis in &mut self.y_axes {
            axis.initialize(AxisOrientation::Y);
        }

        self.discover_bounds()?;

        let Some(draw_margin) = self.resolve_draw_margin(settings)? else {
            return Ok(None);
        };

        let x_scalers = scalers_for(&self.x_axes, draw_margin)?;
        let y_scalers = scalers_for(&self.y_axes, draw_margin)?;
        let slots = bar_slots(&self.series);

        let mut frame = RenderFrame::new(settings.control_size, draw_margin);
        frame.transition = settings.transition.clone();

        self.measure_axes(draw_margin, &x_scalers, &y_scalers, &mut frame)?;
        self.measure_series(draw_margin, &x_scalers, &y_scalers, &slots, &mut frame)?;

        for (index, scaler) in x_scalers.iter().enumerate() {
            self.previous_x_scalers.insert(index, *scaler);
        }
        for (index, scaler) in y_scalers.iter().enumerate() {
            self.previous_y_scalers.insert(index, *scaler);
        }
        self.first_draw = false;

        frame.sort_by_z_index();
        Ok(Some(frame))
    }

    /// Hover candidates at a pointer position, nearest first.
    #[must_use]
    pub fn find_points_near_to(
        &self,
        pointer: PixelPoint,
        strategy: crate::core::point::TooltipFindingStrategy,
    ) -> Vec<crate::interaction::FoundPoint> {
        crate::interaction::find_points_near_to(&self.series, pointer, strategy)
    }

    /// Unload path: drops visuals, lifecycle state and this chart's separator
    /// state so reattaching behaves as a first draw.
    pub fn unload(&mut self) {
        for series in &mut self.series {
            series.detach();
        }
        for axis in self.x_axes.iter_mut().chain(self.y_axes.iter_mut()) {
            axis.detach_chart(self.token);
        }
        self.previous_x_scalers.clear();
        self.previous_y_scalers.clear();
        self.first_draw = true;
    }

    fn discover_bounds(&mut self) -> ChartResult<()> {
        for series in &mut self.series {
            if !series.visible {
                continue;
            }
            let x_axis = axis_at(&self.x_axes, series.x_axis_index)?;
            let y_axis = axis_at(&self.y_axes, series.y_axis_index)?;

            let bounds = series.get_bounds(
                (x_axis.min_limit, x_axis.max_limit),
                (y_axis.min_limit, y_axis.max_limit),
                x_axis.unit_width,
                y_axis.unit_width,
            );

            axis_at_mut(&mut self.x_axes, series.x_axis_index)?.register_bounds(&bounds)?;
            axis_at_mut(&mut self.y_axes, series.y_axis_index)?.register_bounds(&bounds)?;
        }
        self.register_stacked_totals()
    }

    /// Stacked series autoscale on their summed totals per entity (positive
    /// and negative sides separately), which raw per-series bounds undershoot.
    /// The baseline is always included so stacks keep their anchor visible.
    fn register_stacked_totals(&mut self) -> ChartResult<()> {
        let mut totals: IndexMap<u32, IndexMap<usize, (f64, f64)>> = IndexMap::new();
        for series in &self.series {
            let Some(group) = series.stack_group else {
                continue;
            };
            if !series.visible {
                continue;
            }
            let entities = totals.entry(group).or_default();
            for (index, coordinate) in series.data.iter().enumerate() {
                if coordinate.is_empty() {
                    continue;
                }
                let slot = entities.entry(index).or_insert((0.0, 0.0));
                let value = coordinate.primary();
                if value >= 0.0 {
                    slot.0 += value;
                } else {
                    slot.1 += value;
                }
            }
        }
        if totals.is_empty() {
            return Ok(());
        }

        for series in &self.series {
            let Some(group) = series.stack_group else {
                continue;
            };
            if !series.visible {
                continue;
            }
            let Some(entities) = totals.get(&group) else {
                continue;
            };

            let mut extra = DimensionalBounds::default();
            let stacks_along_x = matches!(series.kind, SeriesKind::Row(_));
            for (positive, negative) in entities.values() {
                if stacks_along_x {
                    extra.secondary.append(*positive);
                    extra.secondary.append(*negative);
                    extra.visible_secondary.append(*positive);
                    extra.visible_secondary.append(*negative);
                } else {
                    extra.primary.append(*positive);
                    extra.primary.append(*negative);
                    extra.visible_primary.append(*positive);
                    extra.visible_primary.append(*negative);
                }
            }

            if stacks_along_x {
                axis_at_mut(&mut self.x_axes, series.x_axis_index)?.register_bounds(&extra)?;
            } else {
                axis_at_mut(&mut self.y_axes, series.y_axis_index)?.register_bounds(&extra)?;
            }
        }
        Ok(())
    }

    /// Resolves the plot rectangle: the explicit override wins, otherwise
    /// axis footprints accumulate onto their edges in declaration order and
    /// half the largest geometry diameter pads every side so edge markers
    /// are not clipped.
    fn resolve_draw_margin(
        &self,
        settings: &MeasureSettings,
    ) -> ChartResult<Option<DrawMargin>> {
        if let Some(margin) = settings.draw_margin_override {
            if !margin.is_valid() {
                debug!(?margin, "skipping measure pass, explicit draw margin is degenerate");
                return Ok(None);
            }
            return Ok(Some(margin));
        }

        let control = settings.control_size;
        let geometry_pad = self
            .series
            .iter()
            .map(|series| series.last_bounds().geometry_size_hint)
            .fold(0.0, f64::max)
            / 2.0;

        let mut left = self.padding + geometry_pad;
        let mut right = self.padding + geometry_pad;
        let mut top = self.padding + geometry_pad;
        let mut bottom = self.padding + geometry_pad;

        for axis in &self.y_axes {
            let footprint = axis.measure_footprint(control.height - top - bottom)?;
            match axis.position {
                AxisPosition::Start => left += footprint,
                AxisPosition::End => right += footprint,
            }
        }
        for axis in &self.x_axes {
            let footprint = axis.measure_footprint(control.width - left - right)?;
            match axis.position {
                AxisPosition::Start => bottom += footprint,
                AxisPosition::End => top += footprint,
            }
        }

        let margin = DrawMargin::new(
            left,
            top,
            control.width - left - right,
            control.height - top - bottom,
        );
        if !margin.is_valid() {
            debug!(?margin, "skipping measure pass, axes left no room to plot");
            return Ok(None);
        }
        Ok(Some(margin))
    }

    fn measure_series(
        &mut self,
        draw_margin: DrawMargin,
        x_scalers: &[Scaler],
        y_scalers: &[Scaler],
        slots: &[SlotPlacement],
        frame: &mut RenderFrame,
    ) -> ChartResult<()> {
        let mut stacks = StackManager::new();
        let first_draw = self.first_draw;
        let is_panning = self.is_panning;
        let x_units: Vec<f64> = self.x_axes.iter().map(|axis| axis.unit_width).collect();
        let y_units: Vec<f64> = self.y_axes.iter().map(|axis| axis.unit_width).collect();

        for (series_index, series) in self.series.iter_mut().enumerate() {
            if !series.visible {
                continue;
            }
            let xi = series.x_axis_index;
            let yi = series.y_axis_index;

            let mut ctx = CartesianMeasureContext {
                draw_margin,
                x_scaler: x_scalers[xi],
                y_scaler: y_scalers[yi],
                previous_x_scaler: if first_draw {
                    None
                } else {
                    self.previous_x_scalers.get(&xi).copied()
                },
                previous_y_scaler: if first_draw {
                    None
                } else {
                    self.previous_y_scalers.get(&yi).copied()
                },
                x_unit_width: x_units[xi],
                y_unit_width: y_units[yi],
                stacks: &mut stacks,
                slot: slots[series_index],
                is_panning,
            };

            let retired = series.measure(&mut ctx)?;
            push_series_ops(series, retired, frame);
        }
        Ok(())
    }

    fn measure_axes(
        &mut self,
        draw_margin: DrawMargin,
        x_scalers: &[Scaler],
        y_scalers: &[Scaler],
        frame: &mut RenderFrame,
    ) -> ChartResult<()> {
        let token = self.token;
        let first_draw = self.first_draw;

        for (index, axis) in self.x_axes.iter_mut().enumerate() {
            let previous = if first_draw {
                None
            } else {
                self.previous_x_scalers.get(&index).copied()
            };
            let retired =
                axis.measure_separators(token, x_scalers[index], previous, draw_margin)?;
            push_axis_ops(axis, token, retired, frame);
        }
        for (index, axis) in self.y_axes.iter_mut().enumerate() {
            let previous = if first_draw {
                None
            } else {
                self.previous_y_scalers.get(&index).copied()
            };
            let retired =
                axis.measure_separators(token, y_scalers[index], previous, draw_margin)?;
            push_axis_ops(axis, token, retired, frame);
        }
        Ok(())
    }
}

impl Chart for CartesianChart {
    fn measure(&mut self, settings: &MeasureSettings) -> ChartResult<Option<RenderFrame>> {
        CartesianChart::measure(self, settings)
    }

    fn unload(&mut self) {
        CartesianChart::unload(self);
    }
}

fn axis_at(axes: &[Axis], index: usize) -> ChartResult<&Axis> {
    axes.get(index).ok_or(ChartError::UnknownAxis {
        index,
        available: axes.len(),
    })
}

fn axis_at_mut(axes: &mut [Axis], index: usize) -> ChartResult<&mut Axis> {
    let available = axes.len();
    axes.get_mut(index)
        .ok_or(ChartError::UnknownAxis { index, available })
}

fn scalers_for(axes: &[Axis], draw_margin: DrawMargin) -> ChartResult<Vec<Scaler>> {
    axes.iter().map(|axis| axis.scaler(draw_margin)).collect()
}

/// Assigns grouped-bar slots: each bar-like series takes the next position
/// on its orientation, except that series sharing a stack group share one
/// position. Vertical (column/financial) and horizontal (row) families are
/// laid out independently.
fn bar_slots(series: &[Series]) -> Vec<SlotPlacement> {
    #[derive(Default)]
    struct Layout {
        group_position: IndexMap<u32, usize>,
        next: usize,
    }

    impl Layout {
        fn assign(&mut self, stack_group: Option<u32>) -> usize {
            match stack_group {
                Some(group) => *self.group_position.entry(group).or_insert_with(|| {
                    let position = self.next;
                    self.next += 1;
                    position
                }),
                None => {
                    let position = self.next;
                    self.next += 1;
                    position
                }
            }
        }
    }

    let mut vertical = Layout::default();
    let mut horizontal = Layout::default();

    let positions: Vec<Option<(usize, bool)>> = series
        .iter()
        .map(|series| match series.kind {
            SeriesKind::Column(_) | SeriesKind::Financial { .. } => {
                Some((vertical.assign(series.stack_group), true))
            }
            SeriesKind::Row(_) => Some((horizontal.assign(series.stack_group), false)),
            _ => None,
        })
        .collect();

    positions
        .into_iter()
        .map(|entry| match entry {
            Some((position, is_vertical)) => SlotPlacement {
                count: if is_vertical {
                    vertical.next.max(1)
                } else {
                    horizontal.next.max(1)
                },
                position,
            },
            None => SlotPlacement::default(),
        })
        .collect()
}

fn push_series_ops(series: &Series, retired: Vec<Visual>, frame: &mut RenderFrame) {
    let Some(main_paint) = series.fill_paint().or_else(|| series.stroke_paint()) else {
        return;
    };
    let stroke_paint = series.stroke_paint().unwrap_or(main_paint);
    let label_paint = default_label_paint();

    for point in series.points().values() {
        for segment in &point.additional_visuals {
            frame.push(stroke_paint, segment.clone());
        }
        if let Some(visual) = &point.visual {
            frame.push(main_paint, visual.clone());

            if let Some(label) = &point.label {
                let anchor = VisualProps::at(
                    visual.target.x + visual.target.width / 2.0,
                    visual.target.y - 4.0,
                );
                frame.push_text(
                    label_paint,
                    Visual::at_target(VisualKind::Text { rotation: 0.0 }, anchor),
                    label.clone(),
                );
            }
        }
    }
    for visual in retired {
        // Segments fade out under the same stroke paint they were drawn with.
        let paint = match visual.kind {
            VisualKind::PathSegment { .. } => stroke_paint,
            _ => main_paint,
        };
        frame.push(paint, visual);
    }
}

fn push_axis_ops(axis: &Axis, token: u64, retired: Vec<Separator>, frame: &mut RenderFrame) {
    let line_paint = axis.separator_paint.unwrap_or_else(default_separator_paint);
    let label_paint = axis.label_paint.unwrap_or_else(default_label_paint);

    if let Some(separators) = axis.active_separators(token) {
        for separator in separators.values() {
            if axis.separator_lines_enabled {
                frame.push(line_paint, separator.line.clone());
            }
            if axis.labels_enabled {
                frame.push_text(label_paint, separator.label.clone(), separator.text.clone());
            }
        }
    }
    for separator in retired {
        if axis.separator_lines_enabled {
            frame.push(line_paint, separator.line);
        }
        if axis.labels_enabled {
            frame.push_text(label_paint, separator.label, separator.text);
        }
    }
}

/// A polar chart: angle and radius axes with polar-line series.
#[derive(Debug)]
pub struct PolarChart {
    pub angle_axis: Axis,
    pub radius_axis: Axis,
    pub series: Vec<Series>,
    pub padding: f64,
    pub inner_radius: f64,
    pub initial_rotation: f64,
    /// Angular extent of the plot in degrees, `(0, 360]`.
    pub total_angle: f64,

    next_series_id: u32,
    first_draw: bool,
    previous_scaler: Option<PolarScaler>,
}

impl Default for PolarChart {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarChart {
    #[must_use]
    pub fn new() -> Self {
        Self {
            angle_axis: Axis::new(),
            radius_axis: Axis::new(),
            series: Vec::new(),
            padding: 12.0,
            inner_radius: 0.0,
            initial_rotation: 0.0,
            total_angle: 360.0,
            next_series_id: 0,
            first_draw: true,
            previous_scaler: None,
        }
    }

    pub fn measure(&mut self, settings: &MeasureSettings) -> ChartResult<Option<RenderFrame>> {
        if !settings.control_size.is_valid() {
            debug!("skipping polar measure pass, control size cannot host a plot");
            return Ok(None);
        }

        let mut id = self.next_series_id;
        for series in &mut self.series {
            series.attach(id, &settings.palette)?;
            id += 1;
        }
        self.next_series_id = id;

        // Angle values ride the secondary slot, radius the primary.
        self.angle_axis.initialize(AxisOrientation::X);
        self.radius_axis.initialize(AxisOrientation::Y);

        for series in &mut self.series {
            if !series.visible {
                continue;
            }
            let bounds = series.get_bounds(
                (self.angle_axis.min_limit, self.angle_axis.max_limit),
                (self.radius_axis.min_limit, self.radius_axis.max_limit),
                self.angle_axis.unit_width,
                self.radius_axis.unit_width,
            );
            self.angle_axis.register_bounds(&bounds)?;
            self.radius_axis.register_bounds(&bounds)?;
        }

        let control = settings.control_size;
        let draw_margin = settings.draw_margin_override.unwrap_or_else(|| {
            DrawMargin::new(
                self.padding,
                self.padding,
                control.width - self.padding * 2.0,
                control.height - self.padding * 2.0,
            )
        });
        if !draw_margin.is_valid() {
            debug!(?draw_margin, "skipping polar measure pass, degenerate draw margin");
            return Ok(None);
        }

        let (angle_min, angle_max) = self.angle_axis.resolve_range()?;
        let (radius_min, radius_max) = self.radius_axis.resolve_range()?;
        let scaler = PolarScaler::new(
            draw_margin,
            angle_min,
            angle_max,
            radius_min,
            radius_max,
            self.inner_radius,
            self.initial_rotation,
            self.total_angle,
        )?;

        let mut frame = RenderFrame::new(control, draw_margin);
        frame.transition = settings.transition.clone();

        self.measure_polar_axes(scaler, &mut frame)?;

        let ctx = PolarMeasureContext {
            scaler,
            previous_scaler: if self.first_draw {
                None
            } else {
                self.previous_scaler
            },
            is_panning: false,
        };
        for series in &mut self.series {
            if !series.visible {
                continue;
            }
            let retired = series.measure_polar(&ctx)?;
            push_series_ops(series, retired, &mut frame);
        }

        self.previous_scaler = Some(scaler);
        self.first_draw = false;
        frame.sort_by_z_index();
        Ok(Some(frame))
    }

    /// Emits angle spokes and radius rings.
    ///
    /// When the angle range wraps the full turn, the position that lands on
    /// an earlier spoke (modulo 360 degrees) is suppressed so the seam never
    /// draws a doubled separator.
    fn measure_polar_axes(
        &mut self,
        scaler: PolarScaler,
        frame: &mut RenderFrame,
    ) -> ChartResult<()> {
        let line_paint = self
            .angle_axis
            .separator_paint
            .unwrap_or_else(default_separator_paint);
        let label_paint = self
            .angle_axis
            .label_paint
            .unwrap_or_else(default_label_paint);

        let circumference = scaler.max_radius() * std::f64::consts::PI * 2.0;
        let positions = self.angle_axis.separator_positions(circumference)?;
        let mut seen_rotations: Vec<f64> = Vec::with_capacity(positions.len());
        let (radius_min, radius_max) = self.radius_axis.resolve_range()?;

        for value in positions {
            let rotation = scaler.get_angle(value).rem_euclid(360.0);
            if seen_rotations
                .iter()
                .any(|seen| (seen - rotation).abs() < 1e-9)
            {
                continue;
            }
            seen_rotations.push(rotation);

            if self.angle_axis.separator_lines_enabled {
                let inner = scaler.to_pixels(value, radius_min);
                let outer = scaler.to_pixels(value, radius_max);
                let spoke = Visual::at_target(
                    VisualKind::PathSegment {
                        end_x: outer.x,
                        end_y: outer.y,
                    },
                    VisualProps::at(inner.x, inner.y),
                );
                frame.push(line_paint, spoke);
            }
            if self.angle_axis.labels_enabled {
                let radians = scaler.get_angle(value).to_radians();
                let label_radius = scaler.max_radius() + self.angle_axis.label_padding + 6.0;
                let label = Visual::at_target(
                    VisualKind::Text { rotation: 0.0 },
                    VisualProps::at(
                        scaler.center_x() + label_radius * radians.cos(),
                        scaler.center_y() + label_radius * radians.sin(),
                    ),
                );
                frame.push_text(label_paint, label, self.angle_axis.format_value(value));
            }
        }

        let ring_paint = self
            .radius_axis
            .separator_paint
            .unwrap_or_else(default_separator_paint);
        let radial_span_px = scaler.max_radius();
        for value in self.radius_axis.separator_positions(radial_span_px)? {
            if value < radius_min || value > radius_max {
                continue;
            }
            if self.radius_axis.separator_lines_enabled {
                let edge = scaler.to_pixels(
                    self.angle_axis.resolve_range()?.0,
                    value,
                );
                let radius = ((edge.x - scaler.center_x()).powi(2)
                    + (edge.y - scaler.center_y()).powi(2))
                .sqrt();
                let ring = Visual::at_target(
                    VisualKind::Arc {
                        start_angle: self.initial_rotation,
                        sweep_angle: self.total_angle,
                        inner_radius: radius,
                    },
                    VisualProps::sized(
                        scaler.center_x() - radius,
                        scaler.center_y() - radius,
                        radius * 2.0,
                        radius * 2.0,
                    ),
                );
                frame.push(ring_paint, ring);
            }
        }
        Ok(())
    }

    pub fn unload(&mut self) {
        for series in &mut self.series {
            series.detach();
        }
        self.previous_scaler = None;
        self.first_draw = true;
    }
}

impl Chart for PolarChart {
    fn measure(&mut self, settings: &MeasureSettings) -> ChartResult<Option<RenderFrame>> {
        PolarChart::measure(self, settings)
    }

    fn unload(&mut self) {
        PolarChart::unload(self);
    }
}

/// A pie/doughnut chart. Each series contributes one slice; sweeps come from
/// the shared stacking engine so slices always total the full angle (or the
/// configured maximum for gauges).
#[derive(Debug)]
pub struct PieChart {
    pub series: Vec<Series>,
    pub padding: f64,
    pub initial_rotation: f64,
    /// Angular extent in degrees, 360 for pies and less for gauges.
    pub total_angle: f64,
    /// Fixed total for gauge layouts; `None` uses the sum of slice values.
    pub max_value: Option<f64>,

    next_series_id: u32,
    first_draw: bool,
}

impl Default for PieChart {
    fn default() -> Self {
        Self::new()
    }
}

impl PieChart {
    #[must_use]
    pub fn new() -> Self {
        Self {
            series: Vec::new(),
            padding: 12.0,
            initial_rotation: 0.0,
            total_angle: 360.0,
            max_value: None,
            next_series_id: 0,
            first_draw: true,
        }
    }

    pub fn measure(&mut self, settings: &MeasureSettings) -> ChartResult<Option<RenderFrame>> {
        if !settings.control_size.is_valid() {
            debug!("skipping pie measure pass, control size cannot host a plot");
            return Ok(None);
        }
        if !self.total_angle.is_finite() || self.total_angle <= 0.0 || self.total_angle > 360.0 {
            return Err(ChartError::Configuration(format!(
                "pie total angle must be in (0, 360], got {}",
                self.total_angle
            )));
        }

        let mut id = self.next_series_id;
        for series in &mut self.series {
            series.attach(id, &settings.palette)?;
            id += 1;
        }
        self.next_series_id = id;

        let control = settings.control_size;
        let draw_margin = settings.draw_margin_override.unwrap_or_else(|| {
            DrawMargin::new(
                self.padding,
                self.padding,
                control.width - self.padding * 2.0,
                control.height - self.padding * 2.0,
            )
        });
        if !draw_margin.is_valid() {
            debug!(?draw_margin, "skipping pie measure pass, degenerate draw margin");
            return Ok(None);
        }

        // One stacking pass resolves each slice's interval within the total.
        let mut stacks = StackManager::new();
        let mut intervals = Vec::with_capacity(self.series.len());
        for series in &self.series {
            let value: f64 = if series.visible {
                series
                    .data
                    .iter()
                    .filter(|c| !c.is_empty())
                    .map(super::point::Coordinate::primary)
                    .sum()
            } else {
                0.0
            };
            if value < 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "pie slice values must be >= 0, got {value}"
                )));
            }
            intervals.push(stacks.group_mut(0).stack(0, value));
        }

        let total = self
            .max_value
            .unwrap_or_else(|| intervals.last().map_or(0.0, |interval| interval.end))
            .max(f64::MIN_POSITIVE);

        let radius = draw_margin.width.min(draw_margin.height) / 2.0;
        let center_x = draw_margin.center_x();
        let center_y = draw_margin.center_y();
        let first_draw = self.first_draw;

        let mut frame = RenderFrame::new(control, draw_margin);
        frame.transition = settings.transition.clone();

        for (series, interval) in self.series.iter_mut().zip(intervals) {
            let start_fraction = (interval.start / total).clamp(0.0, 1.0);
            let end_fraction = (interval.end / total).clamp(0.0, 1.0);
            let ctx = PieSliceContext {
                center_x,
                center_y,
                radius,
                start_angle: self.initial_rotation + start_fraction * self.total_angle,
                sweep_angle: (end_fraction - start_fraction) * self.total_angle,
                first_draw,
            };
            let retired = series.measure_pie(&ctx)?;
            push_series_ops(series, retired, &mut frame);
        }

        self.first_draw = false;
        frame.sort_by_z_index();
        Ok(Some(frame))
    }

    pub fn unload(&mut self) {
        for series in &mut self.series {
            series.detach();
        }
        self.first_draw = true;
    }
}

impl Chart for PieChart {
    fn measure(&mut self, settings: &MeasureSettings) -> ChartResult<Option<RenderFrame>> {
        PieChart::measure(self, settings)
    }

    fn unload(&mut self) {
        PieChart::unload(self);
    }
}
