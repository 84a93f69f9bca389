use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::warn;

use crate::api::view::{ChartEnvironment, ChartView};
use crate::core::chart::{CartesianChart, Chart};
use crate::core::point::TooltipFindingStrategy;
use crate::core::throttler::UpdateThrottler;
use crate::core::types::{ControlSize, DrawMargin, PixelPoint};
use crate::error::ChartResult;
use crate::interaction::FoundPoint;
use crate::render::Renderer;

/// Drives one chart: owns the shared state, coalesces update requests and
/// runs measure passes onto the renderer.
///
/// Updates are explicit. Mutating the chart or the view changes nothing on
/// screen until `request_update` (throttled) or `force_update` (immediate)
/// runs a pass. Gestures ride a shorter throttle window so panning stays
/// responsive without flooding the renderer.
pub struct ChartEngine<C: Chart + 'static, R: Renderer + Send + 'static> {
    state: Arc<Mutex<EngineState<C, R>>>,
    update_throttler: UpdateThrottler,
    gesture_throttler: UpdateThrottler,
}

pub type CartesianEngine<R> = ChartEngine<CartesianChart, R>;

struct EngineState<C, R> {
    chart: C,
    view: ChartView,
    environment: ChartEnvironment,
    renderer: R,
    last_draw_margin: Option<DrawMargin>,
}

impl<C: Chart + 'static, R: Renderer + Send + 'static> ChartEngine<C, R> {
    pub fn new(
        chart: C,
        view: ChartView,
        environment: ChartEnvironment,
        renderer: R,
    ) -> ChartResult<Self> {
        environment.validate()?;
        let update_window = environment.update_lock_window;
        let gesture_window = environment.gesture_lock_window;

        let state = Arc::new(Mutex::new(EngineState {
            chart,
            view,
            environment,
            renderer,
            last_draw_margin: None,
        }));

        let update_state = Arc::clone(&state);
        let update_throttler = UpdateThrottler::new(update_window, move || {
            run_measure_pass(&mut lock(&update_state));
        });

        let gesture_state = Arc::clone(&state);
        let gesture_throttler = UpdateThrottler::new(gesture_window, move || {
            run_measure_pass(&mut lock(&gesture_state));
        });

        Ok(Self {
            state,
            update_throttler,
            gesture_throttler,
        })
    }

    /// Schedules a measure pass after the update lock window; requests
    /// arriving inside the window collapse into one pass.
    pub fn request_update(&self) {
        self.update_throttler.call();
    }

    /// Runs a measure pass synchronously on the calling thread.
    pub fn force_update(&self) {
        self.update_throttler.force_call();
    }

    #[must_use]
    pub fn is_update_pending(&self) -> bool {
        self.update_throttler.is_pending() || self.gesture_throttler.is_pending()
    }

    /// Reports a new surface size and schedules a pass.
    pub fn resize(&self, width: f64, height: f64) {
        lock(&self.state).view.control_size = ControlSize::new(width, height);
        self.request_update();
    }

    /// Mutates the chart under the engine lock. Call `request_update` after
    /// the mutation to reflect it on screen.
    pub fn with_chart<T>(&self, f: impl FnOnce(&mut C) -> T) -> T {
        f(&mut lock(&self.state).chart)
    }

    /// Mutates the view under the engine lock.
    pub fn with_view<T>(&self, f: impl FnOnce(&mut ChartView) -> T) -> T {
        f(&mut lock(&self.state).view)
    }

    /// Unloads the chart so the next pass behaves as a first draw.
    pub fn unload(&self) {
        let mut state = lock(&self.state);
        state.chart.unload();
        state.last_draw_margin = None;
    }
}

impl<R: Renderer + Send + 'static> ChartEngine<CartesianChart, R> {
    /// Hover candidates at a pointer position, nearest first.
    #[must_use]
    pub fn find_points_near_to(
        &self,
        pointer: PixelPoint,
        strategy: TooltipFindingStrategy,
    ) -> Vec<FoundPoint> {
        lock(&self.state).chart.find_points_near_to(pointer, strategy)
    }

    /// Shifts every axis range by a pixel delta and schedules a gesture pass.
    pub fn pan(&self, delta: PixelPoint) {
        {
            let mut state = lock(&self.state);
            let Some(margin) = state.last_draw_margin else {
                return;
            };
            state.chart.is_panning = true;

            for axis in &mut state.chart.x_axes {
                let Ok((min, max)) = axis.resolve_range() else {
                    continue;
                };
                let per_pixel = (max - min) / margin.width;
                let direction = if axis.inverted { 1.0 } else { -1.0 };
                let shift = delta.x * per_pixel * direction;
                axis.min_limit = Some(min + shift);
                axis.max_limit = Some(max + shift);
            }
            for axis in &mut state.chart.y_axes {
                let Ok((min, max)) = axis.resolve_range() else {
                    continue;
                };
                let per_pixel = (max - min) / margin.height;
                let direction = if axis.inverted { -1.0 } else { 1.0 };
                let shift = delta.y * per_pixel * direction;
                axis.min_limit = Some(min + shift);
                axis.max_limit = Some(max + shift);
            }
        }
        self.gesture_throttler.call();
    }

    /// Scales every axis range around the data value under the pointer.
    /// `factor > 1` zooms in.
    pub fn zoom(&self, pivot: PixelPoint, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        {
            let mut state = lock(&self.state);
            let Some(margin) = state.last_draw_margin else {
                return;
            };
            state.chart.is_panning = true;

            for axis in &mut state.chart.x_axes {
                let Ok(scaler) = axis.scaler(margin) else {
                    continue;
                };
                let Ok((min, max)) = axis.resolve_range() else {
                    continue;
                };
                let pivot_value = scaler.to_chart_value(pivot.x);
                axis.min_limit = Some(pivot_value - (pivot_value - min) / factor);
                axis.max_limit = Some(pivot_value + (max - pivot_value) / factor);
            }
            for axis in &mut state.chart.y_axes {
                let Ok(scaler) = axis.scaler(margin) else {
                    continue;
                };
                let Ok((min, max)) = axis.resolve_range() else {
                    continue;
                };
                let pivot_value = scaler.to_chart_value(pivot.y);
                axis.min_limit = Some(pivot_value - (pivot_value - min) / factor);
                axis.max_limit = Some(pivot_value + (max - pivot_value) / factor);
            }
        }
        self.gesture_throttler.call();
    }

    /// Ends a pan/zoom gesture, restoring exit animations for vanished
    /// visuals, and schedules a settling pass.
    pub fn end_gesture(&self) {
        lock(&self.state).chart.is_panning = false;
        self.update_throttler.call();
    }
}

fn run_measure_pass<C: Chart, R: Renderer>(state: &mut EngineState<C, R>) {
    let settings = state.environment.measure_settings(&state.view);
    match state.chart.measure(&settings) {
        Ok(Some(frame)) => {
            state.last_draw_margin = Some(frame.draw_margin);
            if let Err(error) = state.renderer.render(&frame) {
                warn!(%error, "renderer rejected a frame");
            }
        }
        Ok(None) => {}
        Err(error) => warn!(%error, "measure pass failed"),
    }
}

fn lock<C, R>(state: &Arc<Mutex<EngineState<C, R>>>) -> MutexGuard<'_, EngineState<C, R>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::ChartEngine;
    use crate::api::view::{ChartEnvironment, ChartView};
    use crate::core::chart::CartesianChart;
    use crate::core::point::Coordinate;
    use crate::core::series::{Series, SeriesKind};
    use crate::error::ChartResult;
    use crate::render::{RenderFrame, Renderer};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingRenderer(Arc<AtomicUsize>);

    impl Renderer for CountingRenderer {
        fn render(&mut self, _frame: &RenderFrame) -> ChartResult<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn engine_with_counter() -> (ChartEngine<CartesianChart, CountingRenderer>, Arc<AtomicUsize>) {
        let frames = Arc::new(AtomicUsize::new(0));
        let mut chart = CartesianChart::new();
        chart.series.push(
            Series::new(SeriesKind::Line { geometry_size: 5.0 })
                .with_data(vec![Coordinate::new(0.0, 1.0), Coordinate::new(1.0, 3.0)]),
        );
        let engine = ChartEngine::new(
            chart,
            ChartView::new(640.0, 480.0),
            ChartEnvironment::default(),
            CountingRenderer(Arc::clone(&frames)),
        )
        .expect("engine");
        (engine, frames)
    }

    #[test]
    fn force_update_renders_synchronously() {
        let (engine, frames) = engine_with_counter();
        engine.force_update();
        assert_eq!(frames.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn chart_mutation_does_not_render_until_requested() {
        let (engine, frames) = engine_with_counter();
        engine.with_chart(|chart| {
            chart.series[0].data.push(Coordinate::new(2.0, 5.0));
        });
        assert_eq!(frames.load(Ordering::SeqCst), 0);

        engine.force_update();
        assert_eq!(frames.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn pan_requires_a_previous_pass() {
        let (engine, frames) = engine_with_counter();
        // No pass has run, so there is no margin to pan against.
        engine.pan(crate::core::types::PixelPoint::new(10.0, 0.0));
        assert_eq!(frames.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn pan_shifts_axis_limits() {
        let (engine, _frames) = engine_with_counter();
        engine.force_update();
        engine.pan(crate::core::types::PixelPoint::new(50.0, 0.0));

        engine.with_chart(|chart| {
            let axis = &chart.x_axes[0];
            assert!(axis.min_limit.is_some());
            assert!(axis.max_limit.is_some());
            assert!(chart.is_panning);
        });
    }
}
