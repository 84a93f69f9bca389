use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::stacking::StackedValue;
use crate::core::types::{PixelPoint, decimal_to_f64};
use crate::error::ChartResult;
use crate::render::Visual;

/// A logical plotted value with up to six numeric slots.
///
/// Slot layout: `[secondary, primary, tertiary, quaternary, quinary, ..]`.
/// Plain XY data uses two slots, weighted scatter and heat use the tertiary
/// slot, financial points use five (close as the primary value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    slots: SmallVec<[f64; 6]>,
    empty: bool,
}

impl Coordinate {
    #[must_use]
    pub fn new(secondary: f64, primary: f64) -> Self {
        let mut coordinate = Self {
            slots: SmallVec::from_slice(&[secondary, primary]),
            empty: false,
        };
        if !secondary.is_finite() || !primary.is_finite() {
            coordinate.empty = true;
        }
        coordinate
    }

    /// Weighted coordinate for bubble/heat data.
    #[must_use]
    pub fn weighted(secondary: f64, primary: f64, weight: f64) -> Self {
        let mut coordinate = Self::new(secondary, primary);
        coordinate.slots.push(weight);
        if !weight.is_finite() {
            coordinate.empty = true;
        }
        coordinate
    }

    /// Financial coordinate; `close` doubles as the primary value.
    #[must_use]
    pub fn financial(secondary: f64, open: f64, high: f64, low: f64, close: f64) -> Self {
        let mut coordinate = Self {
            slots: SmallVec::from_slice(&[secondary, close, open, high, low]),
            empty: false,
        };
        if [secondary, open, high, low, close]
            .iter()
            .any(|v| !v.is_finite())
        {
            coordinate.empty = true;
        }
        coordinate
    }

    /// An explicit gap in the series; skipped by measurement.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            slots: SmallVec::from_slice(&[f64::NAN, f64::NAN]),
            empty: true,
        }
    }

    /// Convenience mapper for timestamped decimal samples.
    pub fn from_decimal_time(time: DateTime<Utc>, value: Decimal) -> ChartResult<Self> {
        Ok(Self::new(
            super::types::datetime_to_unix_seconds(time),
            decimal_to_f64(value, "value")?,
        ))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    #[must_use]
    pub fn secondary(&self) -> f64 {
        self.slots[0]
    }

    #[must_use]
    pub fn primary(&self) -> f64 {
        self.slots[1]
    }

    #[must_use]
    pub fn tertiary(&self) -> f64 {
        self.slot(2)
    }

    #[must_use]
    pub fn open(&self) -> f64 {
        self.slot(2)
    }

    #[must_use]
    pub fn high(&self) -> f64 {
        self.slot(3)
    }

    #[must_use]
    pub fn low(&self) -> f64 {
        self.slot(4)
    }

    #[must_use]
    pub fn close(&self) -> f64 {
        self.primary()
    }

    fn slot(&self, index: usize) -> f64 {
        self.slots.get(index).copied().unwrap_or(f64::NAN)
    }
}

/// Maps one item of host data to a coordinate during ingestion.
///
/// The entity index is the item's position in the source sequence; mappers
/// producing non-finite slots yield empty coordinates, which measurement
/// skips as gaps.
#[derive(Clone)]
pub struct CoordinateMapper<T>(Arc<dyn Fn(&T, usize) -> Coordinate + Send + Sync>);

impl<T> CoordinateMapper<T> {
    #[must_use]
    pub fn new(f: impl Fn(&T, usize) -> Coordinate + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    #[must_use]
    pub fn map(&self, item: &T, entity_index: usize) -> Coordinate {
        (self.0)(item, entity_index)
    }
}

impl<T> fmt::Debug for CoordinateMapper<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CoordinateMapper(..)")
    }
}

/// Pointer comparison rule used when resolving hover/tooltip candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TooltipFindingStrategy {
    /// Let each series pick its natural rule (bars compare X, rows compare Y).
    #[default]
    Automatic,
    CompareOnlyX,
    CompareOnlyY,
    CompareAll,
    ExactMatch,
}

/// Rectangle used for pointer hit testing, refreshed every measure pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct HoverArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl HoverArea {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn center(self) -> PixelPoint {
        PixelPoint::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether the pointer position activates this area under `strategy`.
    ///
    /// `Automatic` must be resolved by the caller before this predicate runs;
    /// it behaves like `CompareAll` here.
    #[must_use]
    pub fn is_triggered_by(self, point: PixelPoint, strategy: TooltipFindingStrategy) -> bool {
        let within_x = point.x >= self.x && point.x <= self.x + self.width;
        let within_y = point.y >= self.y && point.y <= self.y + self.height;

        match strategy {
            TooltipFindingStrategy::CompareOnlyX => within_x,
            TooltipFindingStrategy::CompareOnlyY => within_y,
            TooltipFindingStrategy::CompareAll
            | TooltipFindingStrategy::ExactMatch
            | TooltipFindingStrategy::Automatic => within_x && within_y,
        }
    }
}

/// A plotted point and everything measured for it in the current pass.
///
/// Points are mutated in place across passes (never replaced) so the backend
/// can animate position and size changes; the visual is created lazily and
/// soft-deleted when the point disappears from the fetched sequence.
#[derive(Debug, Clone)]
pub struct ChartPoint {
    pub entity_index: usize,
    pub coordinate: Coordinate,
    pub visual: Option<Visual>,
    pub label: Option<String>,
    pub hover_area: HoverArea,
    /// Auxiliary geometry such as error bars.
    pub additional_visuals: Vec<Visual>,
    pub stacked: Option<StackedValue>,
}

impl ChartPoint {
    #[must_use]
    pub fn new(entity_index: usize, coordinate: Coordinate) -> Self {
        Self {
            entity_index,
            coordinate,
            visual: None,
            label: None,
            hover_area: HoverArea::default(),
            additional_visuals: Vec::new(),
            stacked: None,
        }
    }
}
