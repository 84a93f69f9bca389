mod frame;
mod null_renderer;
mod primitives;
mod visual;

pub use frame::{DrawOp, RenderFrame};
pub use null_renderer::NullRenderer;
pub use primitives::{Color, Paint, PaintStyle};
pub use visual::{EasingFunction, Transition, Visual, VisualKind, VisualProps};

use crate::error::ChartResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized, deterministic `RenderFrame`; they
/// own rasterization, the animation clock and transition interpolation.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()>;
}
