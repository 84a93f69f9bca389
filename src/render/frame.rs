use serde::{Deserialize, Serialize};

use crate::core::types::{ControlSize, DrawMargin};
use crate::render::primitives::Paint;
use crate::render::visual::{Transition, Visual};

/// One drawable unit: a visual, the paint it renders with and optional text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawOp {
    pub paint: Paint,
    pub visual: Visual,
    pub text: Option<String>,
}

/// Fully materialized output of one measure pass.
///
/// Backends receive a deterministic frame so drawing code stays isolated from
/// chart domain and scheduling logic. Ops are ordered by paint z-index, then
/// by emission order within a paint.
#[derive(Debug, Clone, Default)]
pub struct RenderFrame {
    pub control_size: ControlSize,
    pub draw_margin: DrawMargin,
    pub transition: Option<Transition>,
    pub ops: Vec<DrawOp>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(control_size: ControlSize, draw_margin: DrawMargin) -> Self {
        Self {
            control_size,
            draw_margin,
            transition: None,
            ops: Vec::new(),
        }
    }

    pub fn push(&mut self, paint: Paint, visual: Visual) {
        self.ops.push(DrawOp {
            paint,
            visual,
            text: None,
        });
    }

    pub fn push_text(&mut self, paint: Paint, visual: Visual, text: String) {
        self.ops.push(DrawOp {
            paint,
            visual,
            text: Some(text),
        });
    }

    /// Stable sort by z-index so series/axis emission order breaks ties.
    pub fn sort_by_z_index(&mut self) {
        self.ops.sort_by_key(|op| op.paint.z_index);
    }

    /// JSON snapshot of the frame's ops, for golden tests and debugging.
    pub fn ops_to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.ops)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
