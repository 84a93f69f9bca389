//! User-facing surface: the view/environment configuration layer and the
//! throttled update engine.

mod engine;
mod view;

pub use engine::{CartesianEngine, ChartEngine};
pub use view::{ChartEnvironment, ChartView, LegendPosition, TooltipPosition};
