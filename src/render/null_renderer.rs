use crate::error::ChartResult;
use crate::render::frame::RenderFrame;
use crate::render::Renderer;

/// Renderer that draws nothing; used by headless hosts and tests.
#[derive(Debug, Default)]
pub struct NullRenderer {
    frames_rendered: usize,
    last_op_count: usize,
}

impl NullRenderer {
    #[must_use]
    pub fn frames_rendered(&self) -> usize {
        self.frames_rendered
    }

    #[must_use]
    pub fn last_op_count(&self) -> usize {
        self.last_op_count
    }
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        self.frames_rendered += 1;
        self.last_op_count = frame.len();
        Ok(())
    }
}
