use crate::coords::{Vec2, Vec3};

/// Stable identifier of one finger (or simulated pointer) for the lifetime of a touch.
pub type ContactId = u64;

/// Per-tick phase reported by the platform for one contact.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ContactPhase {
    Began,
    Moved,
    Stationary,
    Ended,
}

/// One raw contact as delivered by an input source for a single tick.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ContactSample {
    pub id: ContactId,
    /// Screen position in logical pixels.
    pub position: Vec2,
    pub phase: ContactPhase,
}

impl ContactSample {
    #[inline]
    pub const fn new(id: ContactId, position: Vec2, phase: ContactPhase) -> Self {
        Self { id, position, phase }
    }

    #[inline]
    pub const fn began(id: ContactId, x: f32, y: f32) -> Self {
        Self::new(id, Vec2::new(x, y), ContactPhase::Began)
    }

    #[inline]
    pub const fn moved(id: ContactId, x: f32, y: f32) -> Self {
        Self::new(id, Vec2::new(x, y), ContactPhase::Moved)
    }

    #[inline]
    pub const fn stationary(id: ContactId, x: f32, y: f32) -> Self {
        Self::new(id, Vec2::new(x, y), ContactPhase::Stationary)
    }

    #[inline]
    pub const fn ended(id: ContactId, x: f32, y: f32) -> Self {
        Self::new(id, Vec2::new(x, y), ContactPhase::Ended)
    }
}

/// Discrete events derived by [`super::TouchTracker`] from the raw sample stream.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TouchEvent {
    ContactBegan { id: ContactId, pos: Vec2 },
    /// Only emitted when the position actually changed since the previous tick.
    ContactMoved { id: ContactId, pos: Vec2 },
    ContactEnded { id: ContactId, pos: Vec2 },
    /// Contact held still for the long-press duration. Fires at most once per touch.
    LongPress { id: ContactId, pos: Vec2 },
    /// Short, still contact; emitted right after its `ContactEnded`.
    Tap { id: ContactId, pos: Vec2 },
}

impl TouchEvent {
    pub fn id(&self) -> ContactId {
        match *self {
            TouchEvent::ContactBegan { id, .. }
            | TouchEvent::ContactMoved { id, .. }
            | TouchEvent::ContactEnded { id, .. }
            | TouchEvent::LongPress { id, .. }
            | TouchEvent::Tap { id, .. } => id,
        }
    }

    pub fn position(&self) -> Vec2 {
        match *self {
            TouchEvent::ContactBegan { pos, .. }
            | TouchEvent::ContactMoved { pos, .. }
            | TouchEvent::ContactEnded { pos, .. }
            | TouchEvent::LongPress { pos, .. }
            | TouchEvent::Tap { pos, .. } => pos,
        }
    }
}

/// Absolute device attitude in radians.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Attitude {
    pub pitch: f32,
    pub roll: f32,
    pub yaw: f32,
}

/// One reading of every motion sensor the platform exposes this tick.
///
/// A `None` field means that sensor is unavailable right now; availability may
/// change from one tick to the next.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct SensorSample {
    pub attitude: Option<Attitude>,
    /// Gyroscope reading, rad/s.
    pub angular_velocity: Option<Vec3>,
    /// Accelerometer reading, in g.
    pub acceleration: Option<Vec3>,
}

impl SensorSample {
    /// No sensor available.
    pub const fn none() -> Self {
        Self { attitude: None, angular_velocity: None, acceleration: None }
    }

    pub fn is_available(&self) -> bool {
        self.attitude.is_some() || self.angular_velocity.is_some() || self.acceleration.is_some()
    }
}

/// Everything an input source delivers for one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    pub contacts: Vec<ContactSample>,
    pub sensors: SensorSample,
}

impl InputSnapshot {
    pub fn new(contacts: Vec<ContactSample>, sensors: SensorSample) -> Self {
        Self { contacts, sensors }
    }

    pub fn contacts(contacts: Vec<ContactSample>) -> Self {
        Self { contacts, sensors: SensorSample::none() }
    }
}
