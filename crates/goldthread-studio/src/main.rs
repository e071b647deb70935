use anyhow::{Context, Result};
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

use goldthread_craft::{
    CraftConfig,
    CraftEvent,
    LightMode,
    PlaneGeometry,
    Session,
    Subscription,
    ThreadState,
    TickInput,
};
use goldthread_engine::coords::{Vec2, Vec3};
use goldthread_engine::core::{App, AppControl, FrameCtx};
use goldthread_engine::input::{Attitude, ContactSample, InputSnapshot, ScriptedInput, SensorSample};
use goldthread_engine::logging::{init_logging, LoggingConfig};
use goldthread_engine::time::FrameClock;
use goldthread_engine::window::{HeadlessConfig, Runtime, RuntimeConfig};

const PIXELS_PER_UNIT: f32 = 120.0;
const CLOTH_WIDTH: f32 = 6.0;
const CLOTH_HEIGHT: f32 = 3.5;
/// Logical size before the first window resize, and for scripted runs.
const DEFAULT_VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);
/// Exact in binary, keeps scripted runs reproducible.
const SIM_DT: f32 = 0.125;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let flag = |name: &str| args.iter().any(|a| a == name);

    let logging = if flag("--verbose") {
        LoggingConfig::verbose()
    } else {
        LoggingConfig::default()
    };
    init_logging(logging);

    // Startup banner.
    println!();
    println!("  ╔════════════════════════════════════════╗");
    println!("  ║         GOLDTHREAD STUDIO v0.1         ║");
    println!("  ║   touch · pinch · tilt · thread core   ║");
    println!("  ╠════════════════════════════════════════╣");
    println!("  ║  Long-press the anchor, drag onto the  ║");
    println!("  ║  cloth, right-click to pin apertures.  ║");
    println!("  ║  Arrows tilt · C calibrate · L light   ║");
    println!("  ╚════════════════════════════════════════╝");
    println!();

    let session = Session::new(CraftConfig::default()).context("invalid craft configuration")?;
    if flag("--simulate") {
        run_simulation(session);
        Ok(())
    } else {
        Runtime::run(
            RuntimeConfig {
                title: "Goldthread Studio".to_string(),
                ..RuntimeConfig::default()
            },
            Studio::new(session, DEFAULT_VIEWPORT),
        )
    }
}

fn geometry_for(viewport: Vec2) -> PlaneGeometry {
    PlaneGeometry::centered(viewport, PIXELS_PER_UNIT, CLOTH_WIDTH, CLOTH_HEIGHT)
}

struct Studio {
    session: Session,
    geometry: PlaneGeometry,
    events: Subscription<CraftEvent>,
    last_state: ThreadState,
}

impl Studio {
    fn new(mut session: Session, viewport: Vec2) -> Self {
        let events = session.subscribe();
        Self {
            session,
            geometry: geometry_for(viewport),
            events,
            last_state: ThreadState::Idle,
        }
    }

    fn report(&mut self) {
        for event in self.events.drain() {
            print_event(&event);
        }
    }
}

impl App for Studio {
    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        let WindowEvent::KeyboardInput { event, .. } = event else {
            return AppControl::Continue;
        };
        if event.state != ElementState::Pressed || event.repeat {
            return AppControl::Continue;
        }
        match event.physical_key {
            PhysicalKey::Code(KeyCode::Escape) => return AppControl::Exit,
            PhysicalKey::Code(KeyCode::KeyC) => {
                self.session.tilt_mut().request_calibration();
                println!("  [TILT] calibration requested");
            }
            PhysicalKey::Code(KeyCode::KeyL) => {
                let light = self.session.light_mut();
                let next = match light.mode() {
                    LightMode::Lerp => LightMode::Spring,
                    LightMode::Spring => LightMode::Lerp,
                };
                light.set_mode(next);
                println!("  [LIGHT] mode {next:?}");
            }
            _ => {}
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        if let Some((w, h)) = ctx.logical_size() {
            let viewport = Vec2::new(w, h);
            if viewport.is_finite() && viewport != self.geometry.screen_origin * 2.0 {
                self.geometry = geometry_for(viewport);
            }
        }

        let tick = TickInput::new(ctx.input, ctx.time.dt);
        self.session.tick(&tick, &self.geometry);
        self.report();

        let snap = self.session.snapshot();
        if snap.thread != self.last_state {
            self.last_state = snap.thread;
            if let Some(window) = &ctx.window {
                window.set_title(&format!(
                    "Goldthread Studio · {:?} · {} patches",
                    snap.thread, snap.committed_patches
                ));
            }
        }
        AppControl::Continue
    }
}

fn print_event(event: &CraftEvent) {
    match event {
        CraftEvent::Touch(t) => log::trace!("touch {t:?}"),
        CraftEvent::GestureStateChanged { from, to } => println!("  [GESTURE] {from:?} -> {to:?}"),
        CraftEvent::PinchDelta(d) => println!("  [PINCH]   {d:+.4}"),
        CraftEvent::PathStateChanged(snap) => println!(
            "  [THREAD]  {:?}  points={} fixed={}",
            snap.state,
            snap.points.len(),
            snap.fixed_points.len()
        ),
        CraftEvent::ApertureSpawned([a, b]) => println!(
            "  [PIN]     apertures at ({:.2}, {:.2}) and ({:.2}, {:.2})",
            a.x, a.y, b.x, b.y
        ),
        CraftEvent::ApertureConfirmed(p) => {
            println!("  [PIN]     confirmed ({:.2}, {:.2})", p.x, p.y)
        }
        CraftEvent::PathDisconnected { committed } => {
            println!("  [THREAD]  disconnected, coverage committed: {committed}")
        }
        CraftEvent::TiltChanged(t) => log::debug!("tilt ({:.3}, {:.3})", t.x, t.y),
    }
}

// ── Scripted run ──────────────────────────────────────────────────────────

/// Builds the demo: grab, drag onto the cloth, pass a checkpoint, pin both
/// apertures with a second finger, continue, tilt the device, lift.
fn demo_script(geo: &PlaneGeometry) -> Vec<InputSnapshot> {
    use goldthread_craft::SceneGeometry;

    let mut frames = Vec::new();
    let level = SensorSample { attitude: Some(Attitude::default()), ..SensorSample::none() };
    let mut push = |contacts: Vec<ContactSample>, sensors: SensorSample| {
        frames.push(InputSnapshot::new(contacts, sensors));
    };
    let screen = |x: f32, y: f32| geo.world_to_screen(Vec3::new(x, y, 0.0));

    let anchor = geo.world_to_screen(geo.anchor());
    push(vec![ContactSample::began(0, anchor.x, anchor.y)], level);
    for _ in 0..4 {
        push(vec![ContactSample::stationary(0, anchor.x, anchor.y)], level);
    }

    // Drag in 0.2-unit steps from off-cloth to past the first checkpoint.
    let mut x = geo.anchor().x;
    let mut last = anchor;
    while x < -2.2 {
        x += 0.2;
        last = screen(x, 0.0);
        push(vec![ContactSample::moved(0, last.x, last.y)], level);
    }

    let held = ContactSample::stationary(0, last.x, last.y);
    for side in [-0.1f32, 0.1] {
        let mid = screen(x - 0.3, side);
        push(vec![held, ContactSample::began(1, mid.x, mid.y)], level);
        push(vec![held, ContactSample::ended(1, mid.x, mid.y)], level);
    }

    for i in 1..=4 {
        let tilted = SensorSample {
            attitude: Some(Attitude { pitch: 0.1 * i as f32, roll: -0.15 * i as f32, yaw: 0.0 }),
            ..SensorSample::none()
        };
        let p = screen(x, 0.15 * i as f32);
        push(vec![ContactSample::moved(0, p.x, p.y)], tilted);
        last = p;
    }

    push(vec![ContactSample::ended(0, last.x, last.y)], level);
    push(vec![], level);
    frames
}

fn run_simulation(session: Session) {
    let mut studio = Studio::new(session, DEFAULT_VIEWPORT);
    let script = demo_script(&studio.geometry);
    let frames = script.len() as u64;

    println!("  [SIM] replaying {frames} scripted frames");
    println!();

    let config = HeadlessConfig {
        clock: FrameClock::fixed(std::time::Duration::from_secs_f32(SIM_DT)),
        max_frames: Some(frames),
    };
    Runtime::run_headless(config, ScriptedInput::new(script), &mut studio);

    let snap = studio.session.snapshot();
    println!();
    println!("  ╔════════════════════════════════════════╗");
    println!("  ║            SIMULATION COMPLETE         ║");
    println!("  ╚════════════════════════════════════════╝");
    println!("  thread      {:?}", snap.thread);
    println!("  patches     {}", snap.committed_patches);
    println!("  samples     {}", studio.session.coverage().total_samples());
    println!("  tilt        ({:.3}, {:.3}) via {:?}", snap.tilt.x, snap.tilt.y, snap.tilt_source);
    println!(
        "  light       ({:.2}, {:.2}, {:.2})",
        snap.light_position.x, snap.light_position.y, snap.light_position.z
    );
    println!();
}
