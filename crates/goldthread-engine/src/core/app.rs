use winit::event::WindowEvent;
use winit::window::WindowId;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
///
/// The same app runs under the windowed runtime and under the headless one;
/// `on_frame` is the only callback the headless runner invokes.
pub trait App {
    /// Called for raw window events, after the runtime has recorded their input.
    fn on_window_event(&mut self, window_id: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// Called once per simulation tick.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl;
}
