use std::time::Duration;

use crate::core::chart::MeasureSettings;
use crate::core::types::{ControlSize, DrawMargin};
use crate::error::{ChartError, ChartResult};
use crate::render::{Color, Transition};

/// Where the legend sits relative to the plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegendPosition {
    #[default]
    Hidden,
    Top,
    Bottom,
    Left,
    Right,
}

/// Where tooltips anchor relative to the hovered points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TooltipPosition {
    /// Picks the side with the most room around the hovered points.
    #[default]
    Auto,
    Hidden,
    Top,
    Bottom,
    Left,
    Right,
    Center,
}

/// Per-control presentation state the hosting view owns.
///
/// The view reports its surface size here and may pin the plot rectangle or
/// override the ambient transition; everything else comes from the
/// environment.
#[derive(Debug, Clone, Default)]
pub struct ChartView {
    pub control_size: ControlSize,
    /// Pins the plot rectangle, bypassing axis footprint resolution.
    pub draw_margin: Option<DrawMargin>,
    pub legend_position: LegendPosition,
    pub tooltip_position: TooltipPosition,
    /// Overrides the environment's default transition.
    pub transition: Option<Transition>,
}

impl ChartView {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            control_size: ControlSize::new(width, height),
            ..Self::default()
        }
    }
}

/// Ambient configuration shared by every chart an application hosts,
/// passed explicitly instead of read from process-global state.
#[derive(Debug, Clone)]
pub struct ChartEnvironment {
    /// Theme colors assigned to series without explicit paints.
    pub palette: Vec<Color>,
    pub default_transition: Transition,
    /// Coalescing window for data/config update requests.
    pub update_lock_window: Duration,
    /// Shorter window for pan/zoom gestures, roughly one frame.
    pub gesture_lock_window: Duration,
}

impl Default for ChartEnvironment {
    fn default() -> Self {
        Self {
            palette: default_palette(),
            default_transition: Transition::default(),
            update_lock_window: Duration::from_millis(50),
            gesture_lock_window: Duration::from_millis(16),
        }
    }
}

impl ChartEnvironment {
    /// Fails fast on configurations every measure pass would reject anyway.
    pub fn validate(&self) -> ChartResult<()> {
        if self.palette.is_empty() {
            return Err(ChartError::Configuration(
                "chart environment palette is empty".to_owned(),
            ));
        }
        Ok(())
    }

    /// Resolves one pass's measure inputs from this environment and a view.
    #[must_use]
    pub fn measure_settings(&self, view: &ChartView) -> MeasureSettings {
        MeasureSettings {
            control_size: view.control_size,
            draw_margin_override: view.draw_margin,
            transition: Some(
                view.transition
                    .clone()
                    .unwrap_or_else(|| self.default_transition.clone()),
            ),
            palette: self.palette.clone(),
        }
    }
}

fn default_palette() -> Vec<Color> {
    vec![
        Color::rgb(0.13, 0.46, 0.82),
        Color::rgb(0.94, 0.42, 0.16),
        Color::rgb(0.18, 0.64, 0.33),
        Color::rgb(0.84, 0.19, 0.27),
        Color::rgb(0.55, 0.36, 0.75),
        Color::rgb(0.55, 0.47, 0.40),
        Color::rgb(0.89, 0.47, 0.76),
        Color::rgb(0.47, 0.47, 0.47),
    ]
}
