use winit::window::{Window, WindowId};

use crate::input::InputSnapshot;
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

/// Per-window handles and immutable window metadata.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Returns the logical window size as `(width, height)` in logical pixels.
    pub fn logical_size(&self) -> (f32, f32) {
        let phys = self.window.inner_size();
        let scale = self.window.scale_factor();
        let logi: winit::dpi::LogicalSize<f64> = phys.to_logical(scale);
        (logi.width as f32, logi.height as f32)
    }

    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }
}

/// Per-tick context passed to `core::App::on_frame`.
///
/// `window` is `None` when running headless.
pub struct FrameCtx<'a> {
    pub window: Option<WindowCtx<'a>>,
    pub input: &'a InputSnapshot,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl FrameCtx<'_> {
    /// Logical size of the window, or `None` when headless.
    pub fn logical_size(&self) -> Option<(f32, f32)> {
        self.window.as_ref().map(WindowCtx::logical_size)
    }
}
