use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::bar_measure::{BarSlotRequest, measure_bar_slot};
use crate::core::bounds::DimensionalBounds;
use crate::core::lifecycle::PointLifecycleTracker;
use crate::core::point::{ChartPoint, Coordinate, HoverArea, TooltipFindingStrategy};
use crate::core::polar::PolarScaler;
use crate::core::scaler::Scaler;
use crate::core::stacking::StackManager;
use crate::core::types::DrawMargin;
use crate::error::{ChartError, ChartResult};
use crate::render::{Color, Paint, Visual, VisualKind, VisualProps};

/// Bar-family styling shared by column, row and financial width allocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarStyle {
    /// Padding around the whole category slot, in pixels.
    pub group_padding: f64,
    /// Padding around each individual bar, in pixels.
    pub padding: f64,
    pub max_bar_width: f64,
    pub corner_radius: f64,
    /// Centers every bar on the slot regardless of its grouped position.
    pub ignores_bar_position: bool,
}

impl Default for BarStyle {
    fn default() -> Self {
        Self {
            group_padding: 0.0,
            padding: 2.0,
            max_bar_width: 50.0,
            corner_radius: 0.0,
            ignores_bar_position: false,
        }
    }
}

/// Closed set of series kinds the measurement core understands.
///
/// Each kind carries only the styling that changes its geometry; shared
/// state (paints, data, stacking, axes) lives on `Series`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SeriesKind {
    Line { geometry_size: f64 },
    Column(BarStyle),
    /// Horizontal bars: categories on the Y axis, values growing along X.
    Row(BarStyle),
    Scatter { min_geometry_size: f64, max_geometry_size: f64 },
    Financial { max_bar_width: f64, up: Color, down: Color },
    Heat { cold: Color, hot: Color },
    Pie { inner_radius: f64 },
    PolarLine { geometry_size: f64 },
}

impl SeriesKind {
    /// Hover rule applied when the tooltip strategy is `Automatic`.
    #[must_use]
    pub fn default_hover_strategy(self) -> TooltipFindingStrategy {
        match self {
            Self::Column(_) | Self::Financial { .. } => TooltipFindingStrategy::CompareOnlyX,
            Self::Row(_) => TooltipFindingStrategy::CompareOnlyY,
            _ => TooltipFindingStrategy::CompareAll,
        }
    }

    #[must_use]
    fn is_bar_like(self) -> bool {
        matches!(
            self,
            Self::Column(_) | Self::Row(_) | Self::Financial { .. }
        )
    }
}

/// Grouped-bar placement resolved by the chart for one series:
/// how many series share the category slot and where this one sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotPlacement {
    pub count: usize,
    pub position: usize,
}

/// Everything a Cartesian series needs to measure one pass.
///
/// Built by the orchestrator after axes resolve; the stack manager inside is
/// the per-pass accumulator consumed in series-registration order.
pub struct CartesianMeasureContext<'a> {
    pub draw_margin: DrawMargin,
    pub x_scaler: Scaler,
    pub y_scaler: Scaler,
    pub previous_x_scaler: Option<Scaler>,
    pub previous_y_scaler: Option<Scaler>,
    pub x_unit_width: f64,
    pub y_unit_width: f64,
    pub stacks: &'a mut StackManager,
    pub slot: SlotPlacement,
    pub is_panning: bool,
}

/// Measure context for polar-line series.
pub struct PolarMeasureContext {
    pub scaler: PolarScaler,
    pub previous_scaler: Option<PolarScaler>,
    pub is_panning: bool,
}

/// One resolved pie slice, angles in degrees. The chart computes the sweep
/// from the shared stacking totals; the series only places the visual.
#[derive(Debug, Clone, Copy)]
pub struct PieSliceContext {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
    pub start_angle: f64,
    pub sweep_angle: f64,
    pub first_draw: bool,
}

/// Visuals whose points vanished this pass; already soft-deleted, drawn one
/// final time so the backend can animate them out.
pub type RetiredVisuals = Vec<Visual>;

/// A data series: shared state plus a kind-specific measure strategy.
#[derive(Debug, Clone)]
pub struct Series {
    pub name: Option<String>,
    pub kind: SeriesKind,
    pub data: Vec<Coordinate>,
    /// Series sharing a stack group sum per category instead of drawing
    /// independently.
    pub stack_group: Option<u32>,
    pub fill: Option<Paint>,
    pub stroke: Option<Paint>,
    pub x_axis_index: usize,
    pub y_axis_index: usize,
    /// Baseline data value bars grow from.
    pub pivot: f64,
    pub visible: bool,
    pub data_labels: bool,

    id: Option<u32>,
    theme_fill: Option<Paint>,
    theme_stroke: Option<Paint>,
    points: IndexMap<usize, ChartPoint>,
    tracker: PointLifecycleTracker,
    last_bounds: DimensionalBounds,
}

impl Series {
    #[must_use]
    pub fn new(kind: SeriesKind) -> Self {
        Self {
            name: None,
            kind,
            data: Vec::new(),
            stack_group: None,
            fill: None,
            stroke: None,
            x_axis_index: 0,
            y_axis_index: 0,
            pivot: 0.0,
            visible: true,
            data_labels: false,
            id: None,
            theme_fill: None,
            theme_stroke: None,
            points: IndexMap::new(),
            tracker: PointLifecycleTracker::new(),
            last_bounds: DimensionalBounds::default(),
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: Vec<Coordinate>) -> Self {
        self.data = data;
        self
    }

    /// Ingests host data through a coordinate mapper.
    #[must_use]
    pub fn with_mapped_data<T>(
        mut self,
        items: &[T],
        mapper: &crate::core::point::CoordinateMapper<T>,
    ) -> Self {
        self.data = items
            .iter()
            .enumerate()
            .map(|(index, item)| mapper.map(item, index))
            .collect();
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_stack_group(mut self, group: u32) -> Self {
        self.stack_group = Some(group);
        self
    }

    #[must_use]
    pub fn id(&self) -> Option<u32> {
        self.id
    }

    /// Assigns the stable numeric id on first sight and resolves theme
    /// paints from the palette. Fails fast on an empty palette.
    pub fn attach(&mut self, id: u32, palette: &[Color]) -> ChartResult<()> {
        if self.id.is_none() {
            self.id = Some(id);
        }
        if self.fill.is_none() && self.theme_fill.is_none() {
            let color = theme_color(palette, self.id.unwrap_or(id))?;
            self.theme_fill = Some(Paint::fill(color));
        }
        if self.stroke.is_none() && self.theme_stroke.is_none() {
            let color = theme_color(palette, self.id.unwrap_or(id))?;
            self.theme_stroke = Some(Paint::stroke(color, 2.0));
        }
        Ok(())
    }

    #[must_use]
    pub fn fill_paint(&self) -> Option<Paint> {
        self.fill.or(self.theme_fill)
    }

    #[must_use]
    pub fn stroke_paint(&self) -> Option<Paint> {
        self.stroke.or(self.theme_stroke)
    }

    #[must_use]
    pub fn points(&self) -> &IndexMap<usize, ChartPoint> {
        &self.points
    }

    #[must_use]
    pub fn live_point_count(&self) -> usize {
        self.tracker.live_count()
    }

    #[must_use]
    pub fn last_bounds(&self) -> DimensionalBounds {
        self.last_bounds
    }

    /// Unload path: drop visuals and lifecycle state so the next measure
    /// behaves as a first draw. Idempotent.
    pub fn detach(&mut self) {
        self.points.clear();
        self.tracker.clear();
        self.last_bounds = DimensionalBounds::default();
    }

    /// Scans the mapped data and reports bounds for the owning axes.
    ///
    /// Axis limit overrides filter the visible variants; bar-like kinds also
    /// request half a unit of padding so edge bars stay inside the margin.
    pub fn get_bounds(
        &mut self,
        x_limits: (Option<f64>, Option<f64>),
        y_limits: (Option<f64>, Option<f64>),
        x_unit_width: f64,
        y_unit_width: f64,
    ) -> DimensionalBounds {
        let mut bounds = DimensionalBounds::default();

        for coordinate in &self.data {
            if coordinate.is_empty() {
                continue;
            }

            // Row series transpose: values run along X, categories along Y.
            let (x_value, y_value) = match self.kind {
                SeriesKind::Row(_) => (coordinate.primary(), coordinate.secondary()),
                _ => (coordinate.secondary(), coordinate.primary()),
            };

            let in_x = within(x_value, x_limits);
            let in_y = match self.kind {
                SeriesKind::Financial { .. } => {
                    within(coordinate.low(), y_limits) || within(coordinate.high(), y_limits)
                }
                _ => within(y_value, y_limits),
            };

            bounds.secondary.append(x_value);
            if in_x && in_y {
                bounds.visible_secondary.append(x_value);
            }

            match self.kind {
                SeriesKind::Financial { .. } => {
                    bounds.primary.append(coordinate.low());
                    bounds.primary.append(coordinate.high());
                    if in_x && in_y {
                        bounds.visible_primary.append(coordinate.low());
                        bounds.visible_primary.append(coordinate.high());
                    }
                }
                _ => {
                    bounds.primary.append(y_value);
                    if in_x && in_y {
                        bounds.visible_primary.append(y_value);
                    }
                }
            }

            match self.kind {
                SeriesKind::Scatter { .. } | SeriesKind::Heat { .. } => {
                    bounds.tertiary.append(coordinate.tertiary());
                }
                _ => {}
            }
        }

        match self.kind {
            SeriesKind::Column(_) | SeriesKind::Financial { .. } | SeriesKind::Heat { .. } => {
                bounds.secondary_padding = x_unit_width / 2.0;
                if matches!(self.kind, SeriesKind::Heat { .. }) {
                    bounds.primary_padding = y_unit_width / 2.0;
                }
            }
            SeriesKind::Row(_) => {
                bounds.primary_padding = y_unit_width / 2.0;
            }
            SeriesKind::Line { geometry_size } | SeriesKind::PolarLine { geometry_size } => {
                bounds.geometry_size_hint = geometry_size;
            }
            SeriesKind::Scatter {
                max_geometry_size, ..
            } => {
                bounds.geometry_size_hint = max_geometry_size;
            }
            SeriesKind::Pie { .. } => {}
        }

        self.last_bounds = bounds;
        bounds
    }

    /// Runs the kind-specific Cartesian measure strategy for this pass.
    pub fn measure(&mut self, ctx: &mut CartesianMeasureContext<'_>) -> ChartResult<RetiredVisuals> {
        match self.kind {
            SeriesKind::Line { geometry_size } => self.measure_line(ctx, geometry_size),
            SeriesKind::Column(style) => self.measure_column(ctx, style),
            SeriesKind::Row(style) => self.measure_row(ctx, style),
            SeriesKind::Scatter {
                min_geometry_size,
                max_geometry_size,
            } => self.measure_scatter(ctx, min_geometry_size, max_geometry_size),
            SeriesKind::Financial { max_bar_width, up, down } => {
                self.measure_financial(ctx, max_bar_width, up, down)
            }
            SeriesKind::Heat { cold, hot } => self.measure_heat(ctx, cold, hot),
            SeriesKind::Pie { .. } | SeriesKind::PolarLine { .. } => {
                Err(ChartError::Configuration(format!(
                    "series kind {:?} cannot be measured by a Cartesian chart",
                    self.kind
                )))
            }
        }
    }

    fn measure_line(
        &mut self,
        ctx: &mut CartesianMeasureContext<'_>,
        geometry_size: f64,
    ) -> ChartResult<RetiredVisuals> {
        self.tracker.begin_pass();
        let stack_group = self.stack_group;
        let hover_size = geometry_size.max(10.0);
        let mut previous_point: Option<(f64, f64, Option<(f64, f64)>)> = None;

        for (index, coordinate) in self.data.iter().enumerate() {
            if coordinate.is_empty() {
                // A gap breaks the path.
                previous_point = None;
                continue;
            }

            let value = match stack_group {
                Some(group) => ctx.stacks.group_mut(group).stack(index, coordinate.primary()).end,
                None => coordinate.primary(),
            };

            let x = ctx.x_scaler.to_pixels(coordinate.secondary());
            let y = ctx.y_scaler.to_pixels(value);
            let target = marker_props(x, y, geometry_size);

            let seed = previous_position(
                ctx.previous_x_scaler,
                ctx.previous_y_scaler,
                coordinate.secondary(),
                value,
            )
            .map(|(sx, sy)| marker_props(sx, sy, geometry_size));

            let created = self.tracker.mark_seen(index);
            let point = self
                .points
                .entry(index)
                .or_insert_with(|| ChartPoint::new(index, coordinate.clone()));
            point.coordinate = coordinate.clone();
            upsert_visual(point, VisualKind::SizedPoint, target, seed, created);

            if let Some((prev_x, prev_y, prev_seed)) = previous_point {
                let segment_target = VisualProps::at(prev_x, prev_y);
                let kind = VisualKind::PathSegment { end_x: x, end_y: y };
                let segment_seed = match (prev_seed, seed) {
                    (Some((sx, sy)), Some(marker_seed)) => {
                        Some((VisualProps::at(sx, sy), marker_seed))
                    }
                    _ => None,
                };
                upsert_segment(point, kind, segment_target, segment_seed, created);
            } else {
                point.additional_visuals.clear();
            }

            point.hover_area = HoverArea::new(
                x - hover_size / 2.0,
                y - hover_size / 2.0,
                hover_size,
                hover_size,
            );
            point.stacked = None;
            previous_point = Some((x, y, seed.map(|p| (p.x, p.y))));
        }

        self.retire_vanished(ctx.is_panning, |props| VisualProps {
            opacity: 0.0,
            ..props
        })
    }

    fn measure_column(
        &mut self,
        ctx: &mut CartesianMeasureContext<'_>,
        style: BarStyle,
    ) -> ChartResult<RetiredVisuals> {
        let request = BarSlotRequest {
            unit_width: ctx.x_unit_width,
            group_padding: style.group_padding,
            series_padding: style.padding,
            max_bar_width: style.max_bar_width,
            count: ctx.slot.count.max(1),
            position: ctx.slot.position,
            ignores_bar_position: style.ignores_bar_position,
        };
        let pivot_pixel = ctx.y_scaler.to_pixels(self.pivot);
        let measure = measure_bar_slot(
            ctx.x_scaler,
            request,
            pivot_pixel,
            ctx.draw_margin.y,
            ctx.draw_margin.y + ctx.draw_margin.height,
        )?;
        let previous_measure = ctx
            .previous_x_scaler
            .map(|scaler| {
                let previous_pivot = ctx
                    .previous_y_scaler
                    .map_or(pivot_pixel, |y| y.to_pixels(self.pivot));
                measure_bar_slot(
                    scaler,
                    request,
                    previous_pivot,
                    ctx.draw_margin.y,
                    ctx.draw_margin.y + ctx.draw_margin.height,
                )
            })
            .transpose()?;

        let kind = bar_kind(style);
        let stack_group = self.stack_group;
        self.tracker.begin_pass();

        for (index, coordinate) in self.data.iter().enumerate() {
            if coordinate.is_empty() {
                continue;
            }

            let (start_value, end_value, stacked) = match stack_group {
                Some(group) => {
                    let interval = ctx.stacks.group_mut(group).stack(index, coordinate.primary());
                    (interval.start, interval.end, Some(interval))
                }
                None => (self.pivot, coordinate.primary(), None),
            };

            let x_center = ctx.x_scaler.to_pixels(coordinate.secondary()) + measure.center_offset;
            let y_start = if stacked.is_some() {
                ctx.y_scaler.to_pixels(start_value)
            } else {
                measure.pivot_pixel
            };
            let y_end = ctx.y_scaler.to_pixels(end_value);
            let target = VisualProps::sized(
                x_center - measure.half_unit_width,
                y_start.min(y_end),
                measure.unit_width,
                (y_end - y_start).abs(),
            );

            let seed = match (ctx.previous_x_scaler, ctx.previous_y_scaler, previous_measure) {
                (Some(px), Some(py), Some(pm)) => {
                    let sx = px.to_pixels(coordinate.secondary()) + pm.center_offset;
                    let sy_start = if stacked.is_some() {
                        py.to_pixels(start_value)
                    } else {
                        pm.pivot_pixel
                    };
                    let sy_end = py.to_pixels(end_value);
                    Some(VisualProps::sized(
                        sx - pm.half_unit_width,
                        sy_start.min(sy_end),
                        pm.unit_width,
                        (sy_end - sy_start).abs(),
                    ))
                }
                _ => None,
            };

            let created = self.tracker.mark_seen(index);
            let point = self
                .points
                .entry(index)
                .or_insert_with(|| ChartPoint::new(index, coordinate.clone()));
            point.coordinate = coordinate.clone();
            upsert_visual(point, kind, target, seed, created);

            point.hover_area = HoverArea::new(
                x_center - measure.actual_unit_width / 2.0,
                ctx.draw_margin.y,
                measure.actual_unit_width,
                ctx.draw_margin.height,
            );
            point.stacked = stacked;
            if self.data_labels {
                point.label = Some(format_label(end_value));
            }
        }

        let pivot = measure.pivot_pixel;
        self.retire_vanished(ctx.is_panning, move |props| VisualProps {
            y: pivot,
            height: 0.0,
            ..props
        })
    }

    fn measure_row(
        &mut self,
        ctx: &mut CartesianMeasureContext<'_>,
        style: BarStyle,
    ) -> ChartResult<RetiredVisuals> {
        let request = BarSlotRequest {
            unit_width: ctx.y_unit_width,
            group_padding: style.group_padding,
            series_padding: style.padding,
            max_bar_width: style.max_bar_width,
            count: ctx.slot.count.max(1),
            position: ctx.slot.position,
            ignores_bar_position: style.ignores_bar_position,
        };
        let pivot_pixel = ctx.x_scaler.to_pixels(self.pivot);
        let measure = measure_bar_slot(
            ctx.y_scaler,
            request,
            pivot_pixel,
            ctx.draw_margin.x,
            ctx.draw_margin.x + ctx.draw_margin.width,
        )?;
        let previous_measure = ctx
            .previous_y_scaler
            .map(|scaler| {
                let previous_pivot = ctx
                    .previous_x_scaler
                    .map_or(pivot_pixel, |x| x.to_pixels(self.pivot));
                measure_bar_slot(
                    scaler,
                    request,
                    previous_pivot,
                    ctx.draw_margin.x,
                    ctx.draw_margin.x + ctx.draw_margin.width,
                )
            })
            .transpose()?;

        let kind = bar_kind(style);
        let stack_group = self.stack_group;
        self.tracker.begin_pass();

        for (index, coordinate) in self.data.iter().enumerate() {
            if coordinate.is_empty() {
                continue;
            }

            let (start_value, end_value, stacked) = match stack_group {
                Some(group) => {
                    let interval = ctx.stacks.group_mut(group).stack(index, coordinate.primary());
                    (interval.start, interval.end, Some(interval))
                }
                None => (self.pivot, coordinate.primary(), None),
            };

            let y_center = ctx.y_scaler.to_pixels(coordinate.secondary()) + measure.center_offset;
            let x_start = if stacked.is_some() {
                ctx.x_scaler.to_pixels(start_value)
            } else {
                measure.pivot_pixel
            };
            let x_end = ctx.x_scaler.to_pixels(end_value);
            let target = VisualProps::sized(
                x_start.min(x_end),
                y_center - measure.half_unit_width,
                (x_end - x_start).abs(),
                measure.unit_width,
            );

            let seed = match (ctx.previous_x_scaler, ctx.previous_y_scaler, previous_measure) {
                (Some(px), Some(py), Some(pm)) => {
                    let sy = py.to_pixels(coordinate.secondary()) + pm.center_offset;
                    let sx_start = if stacked.is_some() {
                        px.to_pixels(start_value)
                    } else {
                        pm.pivot_pixel
                    };
                    let sx_end = px.to_pixels(end_value);
                    Some(VisualProps::sized(
                        sx_start.min(sx_end),
                        sy - pm.half_unit_width,
                        (sx_end - sx_start).abs(),
                        pm.unit_width,
                    ))
                }
                _ => None,
            };

            let created = self.tracker.mark_seen(index);
            let point = self
                .points
                .entry(index)
                .or_insert_with(|| ChartPoint::new(index, coordinate.clone()));
            point.coordinate = coordinate.clone();
            upsert_visual(point, kind, target, seed, created);

            point.hover_area = HoverArea::new(
                ctx.draw_margin.x,
                y_center - measure.actual_unit_width / 2.0,
                ctx.draw_margin.width,
                measure.actual_unit_width,
            );
            point.stacked = stacked;
            if self.data_labels {
                point.label = Some(format_label(end_value));
            }
        }

        let pivot = measure.pivot_pixel;
        self.retire_vanished(ctx.is_panning, move |props| VisualProps {
            x: pivot,
            width: 0.0,
            ..props
        })
    }

    fn measure_scatter(
        &mut self,
        ctx: &mut CartesianMeasureContext<'_>,
        min_geometry_size: f64,
        max_geometry_size: f64,
    ) -> ChartResult<RetiredVisuals> {
        let weight_bounds = self.last_bounds.tertiary;
        self.tracker.begin_pass();

        for (index, coordinate) in self.data.iter().enumerate() {
            if coordinate.is_empty() {
                continue;
            }

            let diameter = if weight_bounds.is_empty() || weight_bounds.delta() == 0.0 {
                min_geometry_size
            } else {
                let normalized =
                    (coordinate.tertiary() - weight_bounds.min()) / weight_bounds.delta();
                min_geometry_size + normalized * (max_geometry_size - min_geometry_size)
            };

            let x = ctx.x_scaler.to_pixels(coordinate.secondary());
            let y = ctx.y_scaler.to_pixels(coordinate.primary());
            let target = marker_props(x, y, diameter);

            let seed = previous_position(
                ctx.previous_x_scaler,
                ctx.previous_y_scaler,
                coordinate.secondary(),
                coordinate.primary(),
            )
            .map(|(sx, sy)| marker_props(sx, sy, diameter));

            let created = self.tracker.mark_seen(index);
            let point = self
                .points
                .entry(index)
                .or_insert_with(|| ChartPoint::new(index, coordinate.clone()));
            point.coordinate = coordinate.clone();
            upsert_visual(point, VisualKind::SizedPoint, target, seed, created);

            let hover = diameter.max(10.0);
            point.hover_area =
                HoverArea::new(x - hover / 2.0, y - hover / 2.0, hover, hover);
        }

        self.retire_vanished(ctx.is_panning, |props| VisualProps {
            width: 0.0,
            height: 0.0,
            opacity: 0.0,
            ..props
        })
    }

    fn measure_financial(
        &mut self,
        ctx: &mut CartesianMeasureContext<'_>,
        max_bar_width: f64,
        up: Color,
        down: Color,
    ) -> ChartResult<RetiredVisuals> {
        let request = BarSlotRequest {
            unit_width: ctx.x_unit_width,
            group_padding: 0.0,
            series_padding: 2.0,
            max_bar_width,
            count: ctx.slot.count.max(1),
            position: ctx.slot.position,
            ignores_bar_position: false,
        };
        let pivot_pixel = ctx.y_scaler.to_pixels(self.pivot);
        let measure = measure_bar_slot(
            ctx.x_scaler,
            request,
            pivot_pixel,
            ctx.draw_margin.y,
            ctx.draw_margin.y + ctx.draw_margin.height,
        )?;

        self.tracker.begin_pass();

        for (index, coordinate) in self.data.iter().enumerate() {
            if coordinate.is_empty() {
                continue;
            }

            let x_center = ctx.x_scaler.to_pixels(coordinate.secondary()) + measure.center_offset;
            let high_y = ctx.y_scaler.to_pixels(coordinate.high());
            let low_y = ctx.y_scaler.to_pixels(coordinate.low());
            let open_y = ctx.y_scaler.to_pixels(coordinate.open());
            let close_y = ctx.y_scaler.to_pixels(coordinate.close());

            let mut target = VisualProps::sized(
                x_center - measure.half_unit_width,
                high_y.min(low_y),
                measure.unit_width,
                (low_y - high_y).abs(),
            );
            target.color = Some(if coordinate.close() >= coordinate.open() {
                up
            } else {
                down
            });
            let kind = VisualKind::Candle { open_y, close_y };

            let seed = previous_position(
                ctx.previous_x_scaler,
                ctx.previous_y_scaler,
                coordinate.secondary(),
                coordinate.close(),
            )
            .map(|(sx, sy)| VisualProps {
                x: sx - measure.half_unit_width,
                y: sy,
                height: 0.0,
                ..target
            });

            let created = self.tracker.mark_seen(index);
            let point = self
                .points
                .entry(index)
                .or_insert_with(|| ChartPoint::new(index, coordinate.clone()));
            point.coordinate = coordinate.clone();
            upsert_visual(point, kind, target, seed, created);

            point.hover_area = HoverArea::new(
                x_center - measure.actual_unit_width / 2.0,
                ctx.draw_margin.y,
                measure.actual_unit_width,
                ctx.draw_margin.height,
            );
        }

        self.retire_vanished(ctx.is_panning, |props| VisualProps {
            height: 0.0,
            opacity: 0.0,
            ..props
        })
    }

    fn measure_heat(
        &mut self,
        ctx: &mut CartesianMeasureContext<'_>,
        cold: Color,
        hot: Color,
    ) -> ChartResult<RetiredVisuals> {
        let weight_bounds = self.last_bounds.tertiary;
        let cell_width = ctx.x_scaler.measure_in_pixels(ctx.x_unit_width);
        let cell_height = ctx.y_scaler.measure_in_pixels(ctx.y_unit_width);
        self.tracker.begin_pass();

        for (index, coordinate) in self.data.iter().enumerate() {
            if coordinate.is_empty() {
                continue;
            }

            let heat = if weight_bounds.is_empty() || weight_bounds.delta() == 0.0 {
                0.0
            } else {
                (coordinate.tertiary() - weight_bounds.min()) / weight_bounds.delta()
            };

            let x = ctx.x_scaler.to_pixels(coordinate.secondary());
            let y = ctx.y_scaler.to_pixels(coordinate.primary());
            let mut target = VisualProps::sized(
                x - cell_width / 2.0,
                y - cell_height / 2.0,
                cell_width,
                cell_height,
            );
            target.color = Some(lerp_color(cold, hot, heat));

            let created = self.tracker.mark_seen(index);
            let point = self
                .points
                .entry(index)
                .or_insert_with(|| ChartPoint::new(index, coordinate.clone()));
            point.coordinate = coordinate.clone();
            upsert_visual(point, VisualKind::Rectangle, target, None, created);

            point.hover_area = HoverArea::new(target.x, target.y, cell_width, cell_height);
        }

        self.retire_vanished(ctx.is_panning, |props| VisualProps {
            opacity: 0.0,
            ..props
        })
    }

    /// Polar-line measure strategy; only valid for `PolarLine` series.
    pub fn measure_polar(&mut self, ctx: &PolarMeasureContext) -> ChartResult<RetiredVisuals> {
        let SeriesKind::PolarLine { geometry_size } = self.kind else {
            return Err(ChartError::Configuration(format!(
                "series kind {:?} cannot be measured by a polar chart",
                self.kind
            )));
        };

        self.tracker.begin_pass();
        let hover_size = geometry_size.max(10.0);
        let mut previous_point: Option<(f64, f64)> = None;

        for (index, coordinate) in self.data.iter().enumerate() {
            if coordinate.is_empty() {
                previous_point = None;
                continue;
            }

            let pixel = ctx
                .scaler
                .to_pixels(coordinate.secondary(), coordinate.primary());
            let target = marker_props(pixel.x, pixel.y, geometry_size);
            let seed = ctx.previous_scaler.map(|previous| {
                let p = previous.to_pixels(coordinate.secondary(), coordinate.primary());
                marker_props(p.x, p.y, geometry_size)
            });

            let created = self.tracker.mark_seen(index);
            let point = self
                .points
                .entry(index)
                .or_insert_with(|| ChartPoint::new(index, coordinate.clone()));
            point.coordinate = coordinate.clone();
            upsert_visual(point, VisualKind::SizedPoint, target, seed, created);

            if let Some((prev_x, prev_y)) = previous_point {
                let segment_target = VisualProps::at(prev_x, prev_y);
                let kind = VisualKind::PathSegment {
                    end_x: pixel.x,
                    end_y: pixel.y,
                };
                upsert_segment(point, kind, segment_target, None, created);
            } else {
                point.additional_visuals.clear();
            }

            point.hover_area = HoverArea::new(
                pixel.x - hover_size / 2.0,
                pixel.y - hover_size / 2.0,
                hover_size,
                hover_size,
            );
            previous_point = Some((pixel.x, pixel.y));
        }

        self.retire_vanished(ctx.is_panning, |props| VisualProps {
            opacity: 0.0,
            ..props
        })
    }

    /// Places this series' single pie slice; only valid for `Pie` series.
    ///
    /// Slices animate position and opacity through props; sweep changes are
    /// re-targeted through the kind, which backends snap rather than tween.
    pub fn measure_pie(&mut self, ctx: &PieSliceContext) -> ChartResult<RetiredVisuals> {
        let SeriesKind::Pie { inner_radius } = self.kind else {
            return Err(ChartError::Configuration(format!(
                "series kind {:?} cannot be measured by a pie chart",
                self.kind
            )));
        };

        self.tracker.begin_pass();
        let has_value = self.visible && ctx.sweep_angle > 0.0;

        if has_value {
            let kind = VisualKind::Arc {
                start_angle: ctx.start_angle,
                sweep_angle: ctx.sweep_angle,
                inner_radius,
            };
            let target = VisualProps::sized(
                ctx.center_x - ctx.radius,
                ctx.center_y - ctx.radius,
                ctx.radius * 2.0,
                ctx.radius * 2.0,
            );
            let seed = if ctx.first_draw {
                None
            } else {
                Some(VisualProps {
                    opacity: 0.0,
                    ..target
                })
            };

            let created = self.tracker.mark_seen(0);
            let point = self
                .points
                .entry(0)
                .or_insert_with(|| ChartPoint::new(0, Coordinate::new(0.0, 0.0)));
            upsert_visual(point, kind, target, seed, created);
            point.hover_area = HoverArea::new(target.x, target.y, target.width, target.height);
            if self.data_labels {
                point.label = Some(format_label(
                    self.data
                        .iter()
                        .filter(|c| !c.is_empty())
                        .map(Coordinate::primary)
                        .sum(),
                ));
            }
        }

        self.retire_vanished(false, |props| VisualProps {
            opacity: 0.0,
            ..props
        })
    }

    /// Soft-deletes every point missing from this pass's fetched sequence.
    ///
    /// `terminal` maps a visual's current target to its collapse state.
    /// While a pan/zoom gesture is active the collapse is skipped and the
    /// visual is removed at once.
    fn retire_vanished(
        &mut self,
        is_panning: bool,
        terminal: impl Fn(VisualProps) -> VisualProps,
    ) -> ChartResult<RetiredVisuals> {
        let series_id = self.id.unwrap_or(0);
        let mut retired = Vec::new();

        for index in self.tracker.finish_pass() {
            let Some(mut point) = self.points.shift_remove(&index) else {
                return Err(ChartError::MissingVisual {
                    series_id,
                    entity_index: index,
                });
            };
            let Some(mut visual) = point.visual.take() else {
                return Err(ChartError::MissingVisual {
                    series_id,
                    entity_index: index,
                });
            };

            visual.soft_delete(terminal(visual.target));
            if is_panning {
                visual.complete_transition();
            }
            retired.push(visual);

            for mut auxiliary in point.additional_visuals.drain(..) {
                auxiliary.soft_delete(VisualProps {
                    opacity: 0.0,
                    ..auxiliary.target
                });
                if is_panning {
                    auxiliary.complete_transition();
                }
                retired.push(auxiliary);
            }
        }
        Ok(retired)
    }
}

fn within(value: f64, limits: (Option<f64>, Option<f64>)) -> bool {
    limits.0.is_none_or(|min| value >= min) && limits.1.is_none_or(|max| value <= max)
}

fn theme_color(palette: &[Color], id: u32) -> ChartResult<Color> {
    if palette.is_empty() {
        return Err(ChartError::Configuration(
            "theme palette is empty".to_owned(),
        ));
    }
    Ok(palette[id as usize % palette.len()])
}

fn marker_props(center_x: f64, center_y: f64, diameter: f64) -> VisualProps {
    VisualProps::sized(center_x, center_y, diameter, diameter)
}

fn bar_kind(style: BarStyle) -> VisualKind {
    if style.corner_radius > 0.0 {
        VisualKind::RoundedRectangle {
            radius: style.corner_radius,
        }
    } else {
        VisualKind::Rectangle
    }
}

fn previous_position(
    previous_x: Option<Scaler>,
    previous_y: Option<Scaler>,
    x_value: f64,
    y_value: f64,
) -> Option<(f64, f64)> {
    match (previous_x, previous_y) {
        (Some(px), Some(py)) => Some((px.to_pixels(x_value), py.to_pixels(y_value))),
        _ => None,
    }
}

/// Creates or re-targets the point's main visual.
///
/// New points seed from the previous scale when a seed is available, so the
/// entrance animates from where the point would have been; on the first draw
/// the visual appears directly at its target.
fn upsert_visual(
    point: &mut ChartPoint,
    kind: VisualKind,
    target: VisualProps,
    seed: Option<VisualProps>,
    created: bool,
) {
    match &mut point.visual {
        Some(visual) => {
            visual.kind = kind;
            visual.animate_to(target);
        }
        None => {
            let visual = match (created, seed) {
                (true, Some(seed)) => Visual::seeded(kind, seed, target),
                _ => Visual::at_target(kind, target),
            };
            point.visual = Some(visual);
        }
    }
}

fn upsert_segment(
    point: &mut ChartPoint,
    kind: VisualKind,
    target: VisualProps,
    seed: Option<(VisualProps, VisualProps)>,
    created: bool,
) {
    match point.additional_visuals.first_mut() {
        Some(segment) => {
            segment.kind = kind;
            segment.animate_to(target);
        }
        None => {
            let segment = match (created, seed) {
                (true, Some((seed_start, _))) => Visual::seeded(kind, seed_start, target),
                _ => Visual::at_target(kind, target),
            };
            point.additional_visuals.push(segment);
        }
    }
}

fn lerp_color(cold: Color, hot: Color, t: f64) -> Color {
    let t = t.clamp(0.0, 1.0) as f32;
    Color::rgba(
        cold.r + (hot.r - cold.r) * t,
        cold.g + (hot.g - cold.g) * t,
        cold.b + (hot.b - cold.b) * t,
        cold.a + (hot.a - cold.a) * t,
    )
}

fn format_label(value: f64) -> String {
    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_owned()
}
