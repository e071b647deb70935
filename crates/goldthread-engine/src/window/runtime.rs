use anyhow::{Context, Result};
use std::collections::HashMap;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx, WindowCtx};
use crate::input::platform::winit::{feed_window_event, PlatformInputState};
use crate::input::{InputSource, TouchAccumulator};
use crate::time::FrameClock;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Arrow keys stand in for a tilt sensor.
    pub keyboard_tilt: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "goldthread".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            keyboard_tilt: true,
        }
    }
}

/// Runtime context passed to the application.
///
/// An exit request takes effect after the current callback returns.
#[derive(Debug, Default)]
pub struct RuntimeCtx {
    exit_requested: bool,
}

impl RuntimeCtx {
    pub fn exit(&mut self) {
        self.exit_requested = true;
    }
}

/// Headless run parameters.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Deterministic clock driving every tick.
    pub clock: FrameClock,
    /// Upper bound on ticks; `None` runs until the app exits.
    pub max_frames: Option<u64>,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            clock: FrameClock::fixed(std::time::Duration::from_micros(16_667)),
            max_frames: None,
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Runs `app` inside a winit event loop, one tick per redraw.
    pub fn run<A>(initial: RuntimeConfig, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(initial, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        Ok(())
    }

    /// Drives `app` from `source` without a window.
    ///
    /// Returns the number of ticks executed.
    pub fn run_headless<A, S>(config: HeadlessConfig, mut source: S, app: &mut A) -> u64
    where
        A: CoreApp,
        S: InputSource,
    {
        let HeadlessConfig { mut clock, max_frames } = config;
        let mut frames = 0u64;

        while max_frames.is_none_or(|max| frames < max) {
            let time = clock.tick();
            let snapshot = source.poll(time.dt);
            let mut runtime_ctx = RuntimeCtx::default();

            let control = {
                let mut ctx = FrameCtx {
                    window: None,
                    input: &snapshot,
                    time,
                    runtime: &mut runtime_ctx,
                };
                app.on_frame(&mut ctx)
            };
            frames += 1;

            if control == AppControl::Exit || runtime_ctx.exit_requested {
                break;
            }
        }

        log::debug!("headless run finished after {frames} frames");
        frames
    }
}

struct WindowEntry {
    window: Window,
    platform: PlatformInputState,
    accumulator: TouchAccumulator,
    clock: FrameClock,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    initial: RuntimeConfig,
    app: A,

    windows: HashMap<WindowId, WindowEntry>,
    exit_requested: bool,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(initial: RuntimeConfig, app: A) -> Self {
        Self {
            initial,
            app,
            windows: HashMap::new(),
            exit_requested: false,
        }
    }

    fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    fn create_window_entry(
        &mut self,
        event_loop: &ActiveEventLoop,
        config: RuntimeConfig,
    ) -> Result<WindowId> {
        let attrs = Window::default_attributes()
            .with_title(config.title)
            .with_inner_size(config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let id = window.id();
        self.windows.insert(
            id,
            WindowEntry {
                window,
                platform: PlatformInputState::default(),
                accumulator: TouchAccumulator::new().with_keyboard_tilt(config.keyboard_tilt),
                clock: FrameClock::default(),
            },
        );
        Ok(id)
    }

    fn destroy_window_entry(&mut self, id: WindowId) {
        self.windows.remove(&id);
    }

    fn finish_frame(&mut self, event_loop: &ActiveEventLoop, ctx: RuntimeCtx) {
        if ctx.exit_requested || self.windows.is_empty() {
            self.request_exit();
        }

        if self.exit_requested {
            event_loop.exit();
        }
    }

    fn run_frame(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId) {
        let mut runtime_ctx = RuntimeCtx::default();
        let mut app_control = AppControl::Continue;

        if let Some(entry) = self.windows.get_mut(&window_id) {
            let time = entry.clock.tick();
            let snapshot = entry.accumulator.poll(time.dt);

            let mut ctx = FrameCtx {
                window: Some(WindowCtx { id: window_id, window: &entry.window }),
                input: &snapshot,
                time,
                runtime: &mut runtime_ctx,
            };
            app_control = self.app.on_frame(&mut ctx);
        }

        if app_control == AppControl::Exit {
            runtime_ctx.exit();
        }

        self.finish_frame(event_loop, runtime_ctx);
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if !self.windows.is_empty() {
            for entry in self.windows.values_mut() {
                entry.clock.reset();
            }
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop, self.initial.clone()) {
            log::error!("failed to create initial window: {e:#}");
            self.request_exit();
            event_loop.exit();
            return;
        }

        for entry in self.windows.values() {
            entry.window.request_redraw();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous ticking: the craft simulation animates even without input.
        for entry in self.windows.values() {
            entry.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let Some(entry) = self.windows.get_mut(&window_id) else {
            return;
        };

        feed_window_event(&entry.window, &mut entry.platform, &mut entry.accumulator, &event);

        if self.app.on_window_event(window_id, &event) == AppControl::Exit {
            self.request_exit();
            event_loop.exit();
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                self.destroy_window_entry(window_id);
                if self.windows.is_empty() {
                    self.request_exit();
                    event_loop.exit();
                }
            }

            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.windows.get(&window_id) {
                    entry.window.request_redraw();
                }
            }

            WindowEvent::RedrawRequested => self.run_frame(event_loop, window_id),

            _ => {}
        }

        if self.exit_requested {
            event_loop.exit();
        }
    }
}
