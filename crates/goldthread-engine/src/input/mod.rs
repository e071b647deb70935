//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! Platform code pushes raw changes into a [`TouchAccumulator`]; everything
//! downstream consumes one [`InputSnapshot`] per tick:
//!
//! 1. [`TouchTracker::ingest`] turns the contact list into [`TouchEvent`]s
//!    (written to a [`TouchFrame`]), including long press and tap.
//! 2. [`GestureClassifier::update`] derives the pinch state and delta from
//!    the active contacts.

mod frame;
mod gesture;
mod source;
mod tracker;
mod types;

pub mod platform;

pub use frame::TouchFrame;
pub use gesture::{GestureClassifier, GestureOutput, GestureState, PinchConfig};
pub use source::{InputSource, ScriptedInput, TouchAccumulator};
pub use tracker::{FingerContact, TouchConfig, TouchTracker};
pub use types::{
    Attitude,
    ContactId,
    ContactPhase,
    ContactSample,
    InputSnapshot,
    SensorSample,
    TouchEvent,
};
