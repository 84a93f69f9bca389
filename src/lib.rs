//! plotkit: a chart measurement engine.
//!
//! The crate resolves chart geometry without drawing anything: data bounds,
//! axis ranges and separators, bar slots, stacking, polar projection and the
//! animated lifecycle of per-point visuals. Each measure pass materializes a
//! deterministic [`render::RenderFrame`] that a backend rasterizes; backends
//! own the animation clock and interpolate between each visual's `props` and
//! `target` states.

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{CartesianEngine, ChartEngine, ChartEnvironment, ChartView};
pub use core::{Axis, CartesianChart, Coordinate, PieChart, PolarChart, Series, SeriesKind};
pub use error::{ChartError, ChartResult};
