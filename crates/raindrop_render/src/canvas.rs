//! Window canvas

use std::sync::Arc;

use raindrop_core::Canvas;
use winit::window::Window;

/// A winit window used as the render target
#[derive(Clone, Debug)]
pub struct WindowCanvas {
    window: Arc<Window>,
}

impl WindowCanvas {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// Ask the windowing system for another redraw
    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }
}

impl Canvas for WindowCanvas {
    fn size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }
}
