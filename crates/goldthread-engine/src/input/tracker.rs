use std::collections::{BTreeMap, HashSet};

use crate::coords::Vec2;

use super::frame::TouchFrame;
use super::types::{ContactId, ContactPhase, ContactSample, TouchEvent};

/// Thresholds for contact tracking.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TouchConfig {
    /// Seconds a contact must stay still before `LongPress` fires.
    pub long_press_duration: f32,
    /// Maximum displacement from the start position (logical pixels) that
    /// still counts as "still" for long press and tap.
    pub move_threshold: f32,
    /// Longest contact (seconds) that still counts as a tap.
    pub tap_max_duration: f32,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            long_press_duration: 0.5,
            move_threshold: 20.0,
            tap_max_duration: 0.3,
        }
    }
}

/// One tracked finger.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FingerContact {
    pub id: ContactId,
    pub position: Vec2,
    pub start_position: Vec2,
    /// Movement applied by the most recent sample.
    pub delta: Vec2,
    /// Seconds since the contact began.
    pub elapsed: f32,
    pub long_press_fired: bool,
    /// Cleared for good once the contact strays beyond the move threshold.
    pub long_press_eligible: bool,
    pub active: bool,
}

impl FingerContact {
    fn new(id: ContactId, pos: Vec2) -> Self {
        Self {
            id,
            position: pos,
            start_position: pos,
            delta: Vec2::zero(),
            elapsed: 0.0,
            long_press_fired: false,
            long_press_eligible: true,
            active: true,
        }
    }

    /// Distance between the current and the start position.
    #[inline]
    pub fn displacement(&self) -> f32 {
        self.position.distance(self.start_position)
    }
}

/// Turns the raw per-tick contact list into begin/move/end, long-press and
/// tap events.
///
/// Contacts that end stay readable (inactive) until the start of the next
/// [`ingest`](TouchTracker::ingest); removal never happens mid-tick.
#[derive(Debug)]
pub struct TouchTracker {
    config: TouchConfig,
    contacts: BTreeMap<ContactId, FingerContact>,
    pending_removal: Vec<ContactId>,
    is_touching: bool,
    last_contact: Option<(ContactId, Vec2)>,
}

impl TouchTracker {
    pub fn new(config: TouchConfig) -> Self {
        Self {
            config,
            contacts: BTreeMap::new(),
            pending_removal: Vec::new(),
            is_touching: false,
            last_contact: None,
        }
    }

    pub fn config(&self) -> &TouchConfig {
        &self.config
    }

    /// Processes one tick worth of samples and writes the derived events to `frame`.
    ///
    /// `dt` is the frame delta in seconds; long-press timing is driven by it.
    pub fn ingest(&mut self, frame: &mut TouchFrame, samples: &[ContactSample], dt: f32) {
        self.reconcile(frame);

        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        // Timers advance once per tick, however many samples a contact carries.
        for contact in self.contacts.values_mut().filter(|c| c.active) {
            contact.elapsed += dt;
        }

        let mut seen: HashSet<ContactId> = HashSet::with_capacity(samples.len());
        let mut fresh: HashSet<ContactId> = HashSet::new();

        for sample in samples {
            seen.insert(sample.id);
            match sample.phase {
                ContactPhase::Began => {
                    self.begin(frame, sample.id, sample.position);
                    fresh.insert(sample.id);
                }
                ContactPhase::Moved => self.advance(frame, sample.id, sample.position, true),
                ContactPhase::Stationary => self.advance(frame, sample.id, sample.position, false),
                ContactPhase::Ended => self.end(frame, sample.id, sample.position, false),
            }
        }

        let lost: Vec<ContactId> = self
            .contacts
            .values()
            .filter(|c| c.active && !seen.contains(&c.id))
            .map(|c| c.id)
            .collect();
        for id in lost {
            log::warn!("contact {id} vanished without an end phase; ending it");
            frame.reconciled += 1;
            if let Some(pos) = self.contacts.get(&id).map(|c| c.position) {
                self.end(frame, id, pos, true);
            }
        }

        self.check_long_presses(frame, &fresh);

        self.is_touching = self.active_count() > 0;
    }

    /// Start-of-tick repair: purge contacts that ended last tick and make the
    /// aggregate touching flag agree with the contact set.
    fn reconcile(&mut self, frame: &mut TouchFrame) {
        for id in self.pending_removal.drain(..) {
            if self.contacts.get(&id).is_some_and(|c| !c.active) {
                self.contacts.remove(&id);
            }
        }

        if self.is_touching && self.active_count() == 0 {
            log::warn!("touching flag set with no active contacts; forcing release");
            self.is_touching = false;
            frame.reconciled += 1;
            if let Some((id, pos)) = self.last_contact {
                frame.push_event(TouchEvent::ContactEnded { id, pos });
            }
        }
    }

    fn begin(&mut self, frame: &mut TouchFrame, id: ContactId, pos: Vec2) {
        if let Some(old) = self.contacts.get(&id).filter(|c| c.active).map(|c| c.position) {
            log::warn!("contact {id} began while already active; ending the old touch first");
            frame.reconciled += 1;
            self.end(frame, id, old, true);
        }
        self.pending_removal.retain(|&p| p != id);
        self.contacts.insert(id, FingerContact::new(id, pos));
        self.is_touching = true;
        self.last_contact = Some((id, pos));
        log::trace!("contact {id} began at ({:.1}, {:.1})", pos.x, pos.y);
        frame.push_event(TouchEvent::ContactBegan { id, pos });
    }

    fn advance(&mut self, frame: &mut TouchFrame, id: ContactId, pos: Vec2, moved: bool) {
        let threshold = self.config.move_threshold;
        let Some(contact) = self.contacts.get_mut(&id).filter(|c| c.active) else {
            log::debug!("ignoring sample for unknown contact {id}");
            return;
        };

        contact.delta = if moved { pos - contact.position } else { Vec2::zero() };

        if moved && pos != contact.position {
            contact.position = pos;
            if contact.displacement() > threshold {
                contact.long_press_eligible = false;
            }
            self.last_contact = Some((id, pos));
            frame.push_event(TouchEvent::ContactMoved { id, pos });
        }
    }

    fn end(&mut self, frame: &mut TouchFrame, id: ContactId, pos: Vec2, synthetic: bool) {
        let cfg = self.config;
        let Some(contact) = self.contacts.get_mut(&id).filter(|c| c.active) else {
            log::debug!("ignoring end for unknown contact {id}");
            return;
        };

        contact.delta = pos - contact.position;
        contact.position = pos;
        contact.active = false;

        let is_tap = !synthetic
            && !contact.long_press_fired
            && contact.elapsed <= cfg.tap_max_duration
            && contact.displacement() <= cfg.move_threshold;

        log::trace!("contact {id} ended after {:.2}s", contact.elapsed);
        self.last_contact = Some((id, pos));
        self.pending_removal.push(id);
        frame.push_event(TouchEvent::ContactEnded { id, pos });
        if is_tap {
            frame.push_event(TouchEvent::Tap { id, pos });
        }
    }

    fn check_long_presses(&mut self, frame: &mut TouchFrame, fresh: &HashSet<ContactId>) {
        let cfg = self.config;
        for contact in self.contacts.values_mut() {
            if !contact.active
                || !contact.long_press_eligible
                || contact.long_press_fired
                || fresh.contains(&contact.id)
            {
                continue;
            }
            if contact.elapsed >= cfg.long_press_duration
                && contact.displacement() <= cfg.move_threshold
            {
                contact.long_press_fired = true;
                log::debug!("long press on contact {}", contact.id);
                frame.push_event(TouchEvent::LongPress { id: contact.id, pos: contact.position });
            }
        }
    }

    /// Number of contacts currently down.
    pub fn active_count(&self) -> usize {
        self.contacts.values().filter(|c| c.active).count()
    }

    pub fn is_touching(&self) -> bool {
        self.is_touching
    }

    /// Tracked contact, including one that ended during the current tick.
    pub fn contact(&self, id: ContactId) -> Option<&FingerContact> {
        self.contacts.get(&id)
    }

    /// Active contacts ordered by id.
    pub fn active_contacts(&self) -> impl Iterator<Item = &FingerContact> + '_ {
        self.contacts.values().filter(|c| c.active)
    }

    /// Positions of the active contacts ordered by id.
    pub fn active_positions(&self) -> Vec<Vec2> {
        self.active_contacts().map(|c| c.position).collect()
    }

    /// Mean position of the active contacts.
    pub fn average_position(&self) -> Option<Vec2> {
        let (sum, n) = self
            .active_contacts()
            .fold((Vec2::zero(), 0u32), |(s, n), c| (s + c.position, n + 1));
        (n > 0).then(|| sum / n as f32)
    }

    /// Drops every contact without emitting events.
    pub fn reset(&mut self) {
        self.contacts.clear();
        self.pending_removal.clear();
        self.is_touching = false;
        self.last_contact = None;
    }
}

impl Default for TouchTracker {
    fn default() -> Self {
        Self::new(TouchConfig::default())
    }
}
