//! Per-tick orchestration.
//!
//! [`Session`] owns every subsystem and runs them in a fixed order:
//!
//! 1. `TouchTracker` ingests the contact list (reconciling first).
//! 2. `GestureClassifier` updates from the active contacts.
//! 3. `PathBuilder` consumes this tick's touch events.
//! 4. `TiltFilter` and `LightRig` update from the sensor sample.
//!
//! Events produced along the way are returned from [`Session::tick`] and
//! published on the session's bus, in the same order.

use goldthread_engine::coords::{Vec2, Vec3};
use goldthread_engine::input::{
    ContactId,
    GestureClassifier,
    GestureState,
    InputSnapshot,
    TouchEvent,
    TouchFrame,
    TouchTracker,
};

use crate::config::CraftConfig;
use crate::coverage::CommittedCoverage;
use crate::error::ConfigError;
use crate::events::{CraftEvent, EventBus, Subscription};
use crate::geometry::SceneGeometry;
use crate::light::LightRig;
use crate::path::{PathBuilder, PathSnapshot, ThreadState};
use crate::tilt::{TiltFilter, TiltSource};

/// Inputs for one tick.
#[derive(Debug, Clone, Copy)]
pub struct TickInput<'a> {
    pub input: &'a InputSnapshot,
    /// Seconds since the previous tick.
    pub dt: f32,
}

impl<'a> TickInput<'a> {
    pub fn new(input: &'a InputSnapshot, dt: f32) -> Self {
        Self { input, dt }
    }
}

/// Read-only view for renderers and UI.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub active_contacts: usize,
    pub gesture: GestureState,
    pub thread: ThreadState,
    pub path: PathSnapshot,
    pub tilt: Vec2,
    pub tilt_source: TiltSource,
    pub light_position: Vec3,
    pub light_direction: Vec3,
    pub committed_patches: usize,
}

#[derive(Debug)]
pub struct Session {
    config: CraftConfig,
    tracker: TouchTracker,
    touch_frame: TouchFrame,
    gesture: GestureClassifier,
    path: PathBuilder,
    coverage: CommittedCoverage,
    tilt: TiltFilter,
    light: LightRig,
    bus: EventBus<CraftEvent>,
    /// Contact whose long press grabbed the anchor.
    driver: Option<ContactId>,
    /// Last successful projection, reused when projection fails.
    last_world: Option<Vec3>,
    events: Vec<CraftEvent>,
}

impl Session {
    pub fn new(config: CraftConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            tracker: TouchTracker::new(config.touch),
            touch_frame: TouchFrame::default(),
            gesture: GestureClassifier::new(config.pinch),
            path: PathBuilder::new(config.path, config.coverage),
            coverage: CommittedCoverage::new(config.coverage),
            tilt: TiltFilter::new(config.tilt),
            light: LightRig::new(config.light),
            bus: EventBus::new(),
            driver: None,
            last_world: None,
            events: Vec::new(),
            config,
        })
    }

    pub fn config(&self) -> &CraftConfig {
        &self.config
    }

    pub fn subscribe(&mut self) -> Subscription<CraftEvent> {
        self.bus.subscribe()
    }

    pub fn tracker(&self) -> &TouchTracker {
        &self.tracker
    }

    pub fn gesture(&self) -> &GestureClassifier {
        &self.gesture
    }

    pub fn path(&self) -> &PathBuilder {
        &self.path
    }

    pub fn coverage(&self) -> &CommittedCoverage {
        &self.coverage
    }

    pub fn tilt(&self) -> &TiltFilter {
        &self.tilt
    }

    pub fn tilt_mut(&mut self) -> &mut TiltFilter {
        &mut self.tilt
    }

    pub fn light(&self) -> &LightRig {
        &self.light
    }

    pub fn light_mut(&mut self) -> &mut LightRig {
        &mut self.light
    }

    /// Contact currently driving the thread.
    pub fn driver(&self) -> Option<ContactId> {
        self.driver
    }

    /// Advances every subsystem by one tick and returns the events produced.
    pub fn tick(&mut self, tick: &TickInput<'_>, geometry: &dyn SceneGeometry) -> &[CraftEvent] {
        self.events.clear();
        let dt = if tick.dt.is_finite() { tick.dt.max(0.0) } else { 0.0 };

        // 1. contacts
        self.touch_frame.clear();
        self.tracker.ingest(&mut self.touch_frame, &tick.input.contacts, dt);
        self.events
            .extend(self.touch_frame.events.iter().copied().map(CraftEvent::Touch));

        // 2. gestures
        let out = self.gesture.update(&self.tracker.active_positions());
        if let Some((from, to)) = out.transition {
            self.events.push(CraftEvent::GestureStateChanged { from, to });
        }
        if let Some(delta) = out.pinch_delta {
            self.events.push(CraftEvent::PinchDelta(delta));
        }

        // 3. thread
        self.update_path(geometry);

        // 4. tilt and light
        if let Some(tilt) = self.tilt.update(&tick.input.sensors, dt) {
            self.events.push(CraftEvent::TiltChanged(tilt));
        }
        self.light.update(self.tilt.tilt(), dt);

        for event in &self.events {
            self.bus.publish(event.clone());
        }
        &self.events
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            active_contacts: self.tracker.active_count(),
            gesture: self.gesture.state(),
            thread: self.path.state(),
            path: self.path.snapshot(),
            tilt: self.tilt.tilt(),
            tilt_source: self.tilt.source(),
            light_position: self.light.position(),
            light_direction: self.light.direction(),
            committed_patches: self.coverage.patches().len(),
        }
    }

    /// Drops the active path and all contacts; committed coverage is kept.
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.gesture.reset();
        self.path.reset();
        self.driver = None;
        self.last_world = None;
    }

    fn update_path(&mut self, geometry: &dyn SceneGeometry) {
        self.path.reconcile();

        for i in 0..self.touch_frame.events.len() {
            let event = self.touch_frame.events[i];
            match event {
                TouchEvent::LongPress { id, pos } => {
                    if self.driver.is_some() || !geometry.hits_anchor(pos) {
                        continue;
                    }
                    let world = self.project(geometry, pos);
                    if self.path.grab(geometry.anchor(), world, &mut self.events) {
                        log::debug!("contact {id} grabbed the anchor");
                        self.driver = Some(id);
                    }
                }
                TouchEvent::ContactMoved { id, pos } if self.driver == Some(id) => {
                    let world = self.project(geometry, pos);
                    let on_surface = geometry.on_surface(world);
                    self.path
                        .drive_moved(world, on_surface, &mut self.coverage, &mut self.events);
                }
                TouchEvent::ContactEnded { id, .. } if self.driver == Some(id) => {
                    self.path.lift(&mut self.coverage, &mut self.events);
                }
                TouchEvent::Tap { id, pos } if self.driver != Some(id) => {
                    let world = self.project(geometry, pos);
                    self.path.tap(world, &mut self.events);
                }
                _ => {}
            }

            if !self.path.state().is_active() {
                self.driver = None;
            }
        }
    }

    /// Screen to world, falling back to the last good projection.
    fn project(&mut self, geometry: &dyn SceneGeometry, screen: Vec2) -> Vec3 {
        match geometry.screen_to_world(screen).filter(|w| w.is_finite()) {
            Some(world) => {
                self.last_world = Some(world);
                world
            }
            None => {
                let fallback = self.last_world.unwrap_or_else(|| geometry.anchor());
                log::warn!("projection failed at {screen:?}; reusing {fallback:?}");
                fallback
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PlaneGeometry;
    use goldthread_engine::input::{Attitude, ContactSample, SensorSample};

    const DT: f32 = 0.125;

    /// 100 px per unit, origin at (400, 300); anchor at (-2.5, 0) = (150, 300).
    fn geo() -> PlaneGeometry {
        PlaneGeometry::centered(Vec2::new(800.0, 600.0), 100.0, 4.0, 3.0)
    }

    fn session() -> Session {
        goldthread_engine::logging::init_test_logging();
        Session::new(CraftConfig::default()).unwrap()
    }

    fn step(s: &mut Session, g: &PlaneGeometry, contacts: Vec<ContactSample>) -> Vec<CraftEvent> {
        let input = InputSnapshot::contacts(contacts);
        s.tick(&TickInput::new(&input, DT), g).to_vec()
    }

    /// Long-presses the anchor with contact 0.
    fn grab(s: &mut Session, g: &PlaneGeometry) {
        step(s, g, vec![ContactSample::began(0, 150.0, 300.0)]);
        for _ in 0..4 {
            step(s, g, vec![ContactSample::stationary(0, 150.0, 300.0)]);
        }
        assert_eq!(s.path().state(), ThreadState::Dragging);
        assert_eq!(s.driver(), Some(0));
    }

    fn tap(s: &mut Session, g: &PlaneGeometry, id: ContactId, x: f32, y: f32, held: ContactSample) {
        step(s, g, vec![held, ContactSample::began(id, x, y)]);
        step(s, g, vec![held, ContactSample::ended(id, x, y)]);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut cfg = CraftConfig::default();
        cfg.coverage.sample_radius = -1.0;
        assert!(Session::new(cfg).is_err());
    }

    // ── Thread driving ────────────────────────────────────────────────────

    #[test]
    fn long_press_off_the_anchor_does_not_grab() {
        let mut s = session();
        let g = geo();
        step(&mut s, &g, vec![ContactSample::began(0, 400.0, 300.0)]);
        for _ in 0..6 {
            step(&mut s, &g, vec![ContactSample::stationary(0, 400.0, 300.0)]);
        }
        assert_eq!(s.path().state(), ThreadState::Idle);
        assert_eq!(s.driver(), None);
    }

    #[test]
    fn drag_onto_cloth_roots_and_lift_commits() {
        let mut s = session();
        let g = geo();
        grab(&mut s, &g);

        // Still off the cloth at x = -2.2.
        step(&mut s, &g, vec![ContactSample::moved(0, 180.0, 300.0)]);
        assert_eq!(s.path().state(), ThreadState::Dragging);

        // x = -1.5 is on the cloth.
        step(&mut s, &g, vec![ContactSample::moved(0, 250.0, 300.0)]);
        assert_eq!(s.path().state(), ThreadState::Rooted);

        step(&mut s, &g, vec![ContactSample::moved(0, 270.0, 300.0)]);
        let events = step(&mut s, &g, vec![ContactSample::ended(0, 270.0, 300.0)]);
        assert!(events.contains(&CraftEvent::PathDisconnected { committed: true }));
        assert_eq!(s.snapshot().committed_patches, 1);
        assert_eq!(s.driver(), None);
    }

    #[test]
    fn restarted_driver_contact_drops_the_thread() {
        let mut s = session();
        let g = geo();
        grab(&mut s, &g);

        // The platform reuses id 0 for a brand-new touch elsewhere.
        let events = step(&mut s, &g, vec![ContactSample::began(0, 600.0, 100.0)]);
        assert!(events.contains(&CraftEvent::PathDisconnected { committed: false }));
        assert_eq!(s.path().state(), ThreadState::Idle);
        assert_eq!(s.driver(), None);

        // The new touch does not pull a thread along.
        step(&mut s, &g, vec![ContactSample::moved(0, 620.0, 120.0)]);
        assert_eq!(s.path().state(), ThreadState::Idle);
    }

    #[test]
    fn other_contacts_do_not_move_the_thread() {
        let mut s = session();
        let g = geo();
        grab(&mut s, &g);
        let held = ContactSample::stationary(0, 150.0, 300.0);
        step(&mut s, &g, vec![held, ContactSample::began(1, 500.0, 300.0)]);
        step(&mut s, &g, vec![held, ContactSample::moved(1, 520.0, 300.0)]);
        let points = s.path().path().unwrap().points().to_vec();
        assert_eq!(points[1], Vec3::new(-2.5, 0.0, 0.0));
    }

    #[test]
    fn taps_from_a_second_finger_confirm_apertures() {
        let mut s = session();
        let g = geo();
        grab(&mut s, &g);
        step(&mut s, &g, vec![ContactSample::moved(0, 250.0, 300.0)]);
        // 0.6 units along +x.
        step(&mut s, &g, vec![ContactSample::moved(0, 310.0, 300.0)]);
        assert_eq!(s.path().state(), ThreadState::WaitingForConfirmation);

        // Apertures at x = -1.2, y = -/+0.1 -> screen (280, 310) and (280, 290).
        let held = ContactSample::stationary(0, 310.0, 300.0);
        tap(&mut s, &g, 1, 280.0, 310.0, held);
        assert_eq!(s.path().apertures().iter().filter(|a| a.confirmed).count(), 1);
        tap(&mut s, &g, 2, 280.0, 290.0, held);
        assert_eq!(s.path().state(), ThreadState::Rooted);
    }

    #[test]
    fn lost_driver_contact_ends_the_path() {
        let mut s = session();
        let g = geo();
        grab(&mut s, &g);
        step(&mut s, &g, vec![ContactSample::moved(0, 250.0, 300.0)]);
        // Contact 0 disappears without an end phase.
        let events = step(&mut s, &g, vec![]);
        assert!(events.contains(&CraftEvent::PathDisconnected { committed: true }));
        assert_eq!(s.path().state(), ThreadState::Idle);
    }

    // ── Gestures, tilt and delivery ───────────────────────────────────────

    #[test]
    fn pinch_deltas_reach_the_bus() {
        let mut s = session();
        let g = geo();
        let sub = s.subscribe();
        step(&mut s, &g, vec![ContactSample::began(0, 400.0, 100.0)]);
        step(
            &mut s,
            &g,
            vec![ContactSample::stationary(0, 400.0, 100.0), ContactSample::began(1, 500.0, 100.0)],
        );
        step(
            &mut s,
            &g,
            vec![ContactSample::stationary(0, 400.0, 100.0), ContactSample::moved(1, 550.0, 100.0)],
        );
        let deltas: Vec<f32> = sub
            .drain()
            .into_iter()
            .filter_map(|e| match e {
                CraftEvent::PinchDelta(d) => Some(d),
                _ => None,
            })
            .collect();
        assert_eq!(deltas.len(), 1);
        assert!((deltas[0] - 0.5).abs() < 1e-5);
        assert_eq!(s.snapshot().gesture, GestureState::Pinching);
    }

    #[test]
    fn tilt_steers_the_light() {
        let mut s = session();
        let g = geo();
        let level = SensorSample { attitude: Some(Attitude::default()), ..SensorSample::none() };
        let tilted = SensorSample {
            attitude: Some(Attitude { pitch: 0.0, roll: 0.5, yaw: 0.0 }),
            ..SensorSample::none()
        };

        let input = InputSnapshot::new(vec![], level);
        s.tick(&TickInput::new(&input, DT), &g);
        let start = s.snapshot().light_position;

        let input = InputSnapshot::new(vec![], tilted);
        let events = s.tick(&TickInput::new(&input, DT), &g).to_vec();
        assert!(events.iter().any(|e| matches!(e, CraftEvent::TiltChanged(_))));
        for _ in 0..40 {
            s.tick(&TickInput::new(&input, DT), &g);
        }
        let snap = s.snapshot();
        assert_eq!(snap.tilt_source, TiltSource::Attitude);
        assert!(snap.tilt.x > 0.9);
        // Inverse mapping: roll to +x swings the light towards -x.
        assert!(snap.light_position.x < start.x - 0.1);
    }

    #[test]
    fn projection_failure_reuses_last_good_point() {
        struct Flaky(PlaneGeometry);
        impl SceneGeometry for Flaky {
            fn screen_to_world(&self, screen: Vec2) -> Option<Vec3> {
                if screen.x > 600.0 { None } else { self.0.screen_to_world(screen) }
            }
            fn hits_anchor(&self, screen: Vec2) -> bool {
                self.0.hits_anchor(screen)
            }
            fn on_surface(&self, world: Vec3) -> bool {
                self.0.on_surface(world)
            }
            fn anchor(&self) -> Vec3 {
                self.0.anchor()
            }
        }

        let mut s = session();
        let g = Flaky(geo());
        let input = |c: ContactSample| InputSnapshot::contacts(vec![c]);

        s.tick(&TickInput::new(&input(ContactSample::began(0, 150.0, 300.0)), DT), &g);
        for _ in 0..4 {
            s.tick(&TickInput::new(&input(ContactSample::stationary(0, 150.0, 300.0)), DT), &g);
        }
        s.tick(&TickInput::new(&input(ContactSample::moved(0, 180.0, 300.0)), DT), &g);
        s.tick(&TickInput::new(&input(ContactSample::moved(0, 700.0, 300.0)), DT), &g);

        let points = s.path().path().unwrap().points().to_vec();
        assert!(points[1].distance(Vec3::new(-2.2, 0.0, 0.0)) < 1e-5);
    }
}
