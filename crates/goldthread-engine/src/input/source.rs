use std::collections::{BTreeMap, VecDeque};

use crate::coords::Vec2;

use super::types::{Attitude, ContactId, ContactPhase, ContactSample, InputSnapshot, SensorSample};

/// Anything that can deliver one [`InputSnapshot`] per tick.
///
/// Core state machines only ever see snapshots; whether they came from
/// hardware or from a script is invisible to them.
pub trait InputSource {
    /// Returns the complete contact list and sensor reading for this tick.
    fn poll(&mut self, dt: f32) -> InputSnapshot;
}

// ── ScriptedInput ─────────────────────────────────────────────────────────

/// Simulated source replaying pre-built snapshots, one per poll.
///
/// Once the script runs out every poll returns an empty snapshot.
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    frames: VecDeque<InputSnapshot>,
}

impl ScriptedInput {
    pub fn new<I>(frames: I) -> Self
    where
        I: IntoIterator<Item = InputSnapshot>,
    {
        Self { frames: frames.into_iter().collect() }
    }

    pub fn push(&mut self, frame: InputSnapshot) {
        self.frames.push_back(frame);
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }

    pub fn is_finished(&self) -> bool {
        self.frames.is_empty()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, _dt: f32) -> InputSnapshot {
        self.frames.pop_front().unwrap_or_default()
    }
}

// ── TouchAccumulator ──────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone)]
struct HeldContact {
    position: Vec2,
    phase: ContactPhase,
    /// Release that arrived before the `Began` could be reported.
    pending_end: Option<Vec2>,
}

/// Hardware-backed source.
///
/// Platform layers push individual contact changes as they arrive; the
/// accumulator remembers every contact between events and reports unchanged
/// ones as `Stationary`, so each poll yields the full contact list.
///
/// Keyboard tilt simulation reports an attitude built from the last axis
/// values set through [`set_key_tilt`](TouchAccumulator::set_key_tilt).
#[derive(Debug, Clone)]
pub struct TouchAccumulator {
    contacts: BTreeMap<ContactId, HeldContact>,
    keyboard_tilt: bool,
    key_axes: Vec2,
    /// Attitude angle (radians) produced by a fully pressed axis.
    key_tilt_angle: f32,
}

impl TouchAccumulator {
    pub fn new() -> Self {
        Self {
            contacts: BTreeMap::new(),
            keyboard_tilt: false,
            key_axes: Vec2::zero(),
            key_tilt_angle: 0.35,
        }
    }

    /// Enables the keyboard-driven attitude substitute.
    pub fn with_keyboard_tilt(mut self, enabled: bool) -> Self {
        self.keyboard_tilt = enabled;
        self
    }

    pub fn began(&mut self, id: ContactId, position: Vec2) {
        self.contacts.insert(
            id,
            HeldContact { position, phase: ContactPhase::Began, pending_end: None },
        );
    }

    pub fn moved(&mut self, id: ContactId, position: Vec2) {
        if let Some(c) = self.contacts.get_mut(&id) {
            c.position = position;
            if c.phase == ContactPhase::Stationary {
                c.phase = ContactPhase::Moved;
            }
        }
    }

    pub fn ended(&mut self, id: ContactId, position: Vec2) {
        if let Some(c) = self.contacts.get_mut(&id) {
            if c.phase == ContactPhase::Began {
                c.pending_end = Some(position);
            } else {
                c.position = position;
                c.phase = ContactPhase::Ended;
            }
        }
    }

    /// Ends every held contact, e.g. on focus loss.
    pub fn release_all(&mut self) {
        let ids: Vec<ContactId> = self.contacts.keys().copied().collect();
        for id in ids {
            let pos = self.contacts[&id].position;
            self.ended(id, pos);
        }
    }

    pub fn is_held(&self, id: ContactId) -> bool {
        self.contacts
            .get(&id)
            .is_some_and(|c| c.phase != ContactPhase::Ended && c.pending_end.is_none())
    }

    pub fn position(&self, id: ContactId) -> Option<Vec2> {
        self.contacts.get(&id).map(|c| c.position)
    }

    /// Keyboard tilt axes in [-1, 1].
    pub fn set_key_tilt(&mut self, x: f32, y: f32) {
        self.key_axes = Vec2::new(x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0));
    }

    fn sensor_sample(&self) -> SensorSample {
        if !self.keyboard_tilt {
            return SensorSample::none();
        }
        SensorSample {
            attitude: Some(Attitude {
                pitch: self.key_axes.y * self.key_tilt_angle,
                roll: self.key_axes.x * self.key_tilt_angle,
                yaw: 0.0,
            }),
            ..SensorSample::none()
        }
    }
}

impl Default for TouchAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for TouchAccumulator {
    fn poll(&mut self, _dt: f32) -> InputSnapshot {
        let contacts = self
            .contacts
            .iter()
            .map(|(&id, c)| ContactSample::new(id, c.position, c.phase))
            .collect();

        self.contacts.retain(|_, c| c.phase != ContactPhase::Ended);
        for c in self.contacts.values_mut() {
            c.phase = match c.pending_end.take() {
                Some(pos) => {
                    c.position = pos;
                    ContactPhase::Ended
                }
                None => ContactPhase::Stationary,
            };
        }

        InputSnapshot::new(contacts, self.sensor_sample())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phases(snap: &InputSnapshot) -> Vec<(ContactId, ContactPhase)> {
        snap.contacts.iter().map(|c| (c.id, c.phase)).collect()
    }

    #[test]
    fn scripted_input_replays_then_goes_quiet() {
        let mut src = ScriptedInput::new([
            InputSnapshot::contacts(vec![ContactSample::began(0, 1.0, 1.0)]),
            InputSnapshot::contacts(vec![ContactSample::ended(0, 1.0, 1.0)]),
        ]);
        assert_eq!(src.poll(0.016).contacts.len(), 1);
        assert_eq!(src.remaining(), 1);
        src.poll(0.016);
        assert!(src.is_finished());
        assert_eq!(src.poll(0.016), InputSnapshot::default());
    }

    #[test]
    fn accumulator_reports_held_contacts_as_stationary() {
        let mut acc = TouchAccumulator::new();
        acc.began(0, Vec2::new(5.0, 5.0));
        assert_eq!(phases(&acc.poll(0.016)), vec![(0, ContactPhase::Began)]);
        assert_eq!(phases(&acc.poll(0.016)), vec![(0, ContactPhase::Stationary)]);

        acc.moved(0, Vec2::new(6.0, 5.0));
        let snap = acc.poll(0.016);
        assert_eq!(phases(&snap), vec![(0, ContactPhase::Moved)]);
        assert_eq!(snap.contacts[0].position, Vec2::new(6.0, 5.0));

        acc.ended(0, Vec2::new(7.0, 5.0));
        assert_eq!(phases(&acc.poll(0.016)), vec![(0, ContactPhase::Ended)]);
        assert!(acc.poll(0.016).contacts.is_empty());
    }

    #[test]
    fn release_in_same_frame_as_press_is_deferred() {
        let mut acc = TouchAccumulator::new();
        acc.began(3, Vec2::new(1.0, 1.0));
        acc.ended(3, Vec2::new(2.0, 2.0));
        assert!(!acc.is_held(3));
        assert_eq!(phases(&acc.poll(0.016)), vec![(3, ContactPhase::Began)]);
        let snap = acc.poll(0.016);
        assert_eq!(phases(&snap), vec![(3, ContactPhase::Ended)]);
        assert_eq!(snap.contacts[0].position, Vec2::new(2.0, 2.0));
    }

    #[test]
    fn keyboard_tilt_becomes_attitude() {
        let mut acc = TouchAccumulator::new().with_keyboard_tilt(true);
        acc.set_key_tilt(1.0, -2.0);
        let att = acc.poll(0.016).sensors.attitude.unwrap();
        assert!((att.roll - 0.35).abs() < 1e-6);
        assert!((att.pitch + 0.35).abs() < 1e-6);
    }

    #[test]
    fn no_sensors_without_keyboard_tilt() {
        let mut acc = TouchAccumulator::new();
        assert!(!acc.poll(0.016).sensors.is_available());
    }
}
