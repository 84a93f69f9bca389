//! The measurement core: data bounds, scales, stacking, bar geometry,
//! point lifecycle and the chart orchestrators.

pub mod axis;
pub mod bar_measure;
pub mod bounds;
pub mod chart;
pub mod lifecycle;
pub mod point;
pub mod polar;
pub mod scaler;
pub mod series;
pub mod stacking;
pub mod throttler;
pub mod types;

pub use axis::{Axis, AxisPosition, LabelFormatter, Separator};
pub use bar_measure::{BarMeasure, BarSlotRequest, measure_bar_slot};
pub use bounds::{Bounds, DimensionalBounds};
pub use chart::{CartesianChart, Chart, MeasureSettings, PieChart, PolarChart};
pub use lifecycle::PointLifecycleTracker;
pub use point::{ChartPoint, Coordinate, CoordinateMapper, HoverArea, TooltipFindingStrategy};
pub use polar::PolarScaler;
pub use scaler::{MIN_SPAN_EPSILON, Scaler};
pub use series::{BarStyle, Series, SeriesKind, SlotPlacement};
pub use stacking::{StackAccumulator, StackManager, StackPosition, StackedValue};
pub use throttler::UpdateThrottler;
pub use types::{AxisOrientation, ControlSize, DrawMargin, PixelPoint};
