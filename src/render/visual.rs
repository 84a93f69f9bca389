use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::render::primitives::Color;

/// Closed set of geometry shapes the measurement core can emit.
///
/// Keeping this a tagged enum (instead of generic visual type parameters)
/// keeps the numeric measure algorithms monomorphic and lets backends switch
/// on the shape once per visual.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VisualKind {
    Rectangle,
    RoundedRectangle { radius: f64 },
    /// Candle body plus wick; `open_y`/`close_y` sit inside the high/low
    /// extent described by the visual's y/height.
    Candle { open_y: f64, close_y: f64 },
    /// Circle or marker centered on x/y with width as diameter.
    SizedPoint,
    /// Straight stroke segment from (x, y) to (end_x, end_y).
    PathSegment { end_x: f64, end_y: f64 },
    /// Pie/doughnut slice around a center, angles in degrees.
    Arc {
        start_angle: f64,
        sweep_angle: f64,
        inner_radius: f64,
    },
    /// Axis label anchored at x/y.
    Text { rotation: f64 },
}

/// Mutable geometry fields shared by every visual kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualProps {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub opacity: f64,
    pub rotate_transform: f64,
    /// Per-visual color override (heat cells); `None` uses the paint color.
    pub color: Option<Color>,
}

impl VisualProps {
    #[must_use]
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            width: 0.0,
            height: 0.0,
            opacity: 1.0,
            rotate_transform: 0.0,
            color: None,
        }
    }

    #[must_use]
    pub fn sized(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::at(x, y)
        }
    }
}

/// A drawable owned by one chart point or axis separator.
///
/// The core mutates visuals in place: `props` holds the state the backend
/// should animate from (the creation seed, or wherever the previous pass
/// left the visual) and `target` the state resolved by the current pass.
/// The backend owns the animation clock and interpolation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visual {
    pub kind: VisualKind,
    pub props: VisualProps,
    pub target: VisualProps,
    /// Set on soft delete; the backend drops the visual once its current
    /// transition completes.
    pub remove_on_completed: bool,
}

impl Visual {
    /// Creates a visual drawn directly at its target, with no entrance animation.
    #[must_use]
    pub fn at_target(kind: VisualKind, target: VisualProps) -> Self {
        Self {
            kind,
            props: target,
            target,
            remove_on_completed: false,
        }
    }

    /// Creates a visual seeded away from its target so the entrance animates.
    #[must_use]
    pub fn seeded(kind: VisualKind, seed: VisualProps, target: VisualProps) -> Self {
        Self {
            kind,
            props: seed,
            target,
            remove_on_completed: false,
        }
    }

    pub fn animate_to(&mut self, target: VisualProps) {
        self.target = target;
        self.remove_on_completed = false;
    }

    /// Jumps the visual to its target state, skipping any pending transition.
    pub fn complete_transition(&mut self) {
        self.props = self.target;
    }

    /// Animates toward a terminal state and flags the visual for removal.
    pub fn soft_delete(&mut self, terminal: VisualProps) {
        self.target = terminal;
        self.remove_on_completed = true;
    }
}

/// Injected easing function `f: [0, 1] -> [0, 1]` applied by backends.
#[derive(Clone)]
pub struct EasingFunction(Arc<dyn Fn(f64) -> f64 + Send + Sync>);

impl EasingFunction {
    #[must_use]
    pub fn new(f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    #[must_use]
    pub fn linear() -> Self {
        Self::new(|t| t)
    }

    #[must_use]
    pub fn ease_out_cubic() -> Self {
        Self::new(|t| {
            let inv = 1.0 - t;
            1.0 - inv * inv * inv
        })
    }

    #[must_use]
    pub fn apply(&self, t: f64) -> f64 {
        (self.0)(t.clamp(0.0, 1.0))
    }
}

impl Default for EasingFunction {
    fn default() -> Self {
        Self::ease_out_cubic()
    }
}

impl fmt::Debug for EasingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EasingFunction(..)")
    }
}

/// Transition parameters the backend applies to every animated change.
#[derive(Debug, Clone)]
pub struct Transition {
    pub duration_ms: f64,
    pub easing: EasingFunction,
}

impl Default for Transition {
    fn default() -> Self {
        Self {
            duration_ms: 800.0,
            easing: EasingFunction::default(),
        }
    }
}
