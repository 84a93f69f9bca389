use serde::{Deserialize, Serialize};

/// Running min/max/delta tracker for one numeric dimension.
///
/// Bounds are rebuilt from scratch on every measure pass; there is no removal
/// operation. Non-finite samples are ignored so a misbehaving mapper cannot
/// poison an axis range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    min: f64,
    max: f64,
    min_delta: f64,
    last_appended: f64,
    count: u64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new()
    }
}

impl Bounds {
    #[must_use]
    pub fn new() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            min_delta: f64::INFINITY,
            last_appended: f64::NAN,
            count: 0,
        }
    }

    /// Widens the bounds with one sample.
    ///
    /// The gap to the previously appended sample feeds `min_delta`, which
    /// axis stepping uses to avoid zero-width steps.
    pub fn append(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }

        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }

        if self.count > 0 {
            let gap = (value - self.last_appended).abs();
            if gap > 0.0 && gap < self.min_delta {
                self.min_delta = gap;
            }
        }

        self.last_appended = value;
        self.count += 1;
    }

    /// Merges another bounds instance, as when an axis absorbs series bounds.
    pub fn merge(&mut self, other: Bounds) {
        if other.is_empty() {
            return;
        }
        if other.min < self.min {
            self.min = other.min;
        }
        if other.max > self.max {
            self.max = other.max;
        }
        if other.min_delta < self.min_delta {
            self.min_delta = other.min_delta;
        }
        self.count += other.count;
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.count == 0
    }

    #[must_use]
    pub fn min(self) -> f64 {
        self.min
    }

    #[must_use]
    pub fn max(self) -> f64 {
        self.max
    }

    /// Smallest observed gap between consecutive appended samples.
    ///
    /// Falls back to the full span (or 1.0 for single-sample bounds) when no
    /// pairwise gap was observed.
    #[must_use]
    pub fn min_delta(self) -> f64 {
        if self.min_delta.is_finite() {
            return self.min_delta;
        }
        let span = self.delta();
        if span > 0.0 && span.is_finite() { span } else { 1.0 }
    }

    #[must_use]
    pub fn delta(self) -> f64 {
        self.max - self.min
    }
}

/// Per-series bounds report consumed by the axes that own the series.
///
/// Produced once per series per measure pass by `get_bounds`; the visible
/// variants only accumulate samples inside the axis limit overrides.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DimensionalBounds {
    pub primary: Bounds,
    pub secondary: Bounds,
    pub visible_primary: Bounds,
    pub visible_secondary: Bounds,
    pub tertiary: Bounds,
    /// Extra data-space room the series wants on the secondary axis
    /// (bars request half a unit so edge bars are not clipped).
    pub secondary_padding: f64,
    /// Extra data-space room the series wants on the primary axis.
    pub primary_padding: f64,
    /// Largest geometry diameter the series will draw, in pixels.
    pub geometry_size_hint: f64,
}
