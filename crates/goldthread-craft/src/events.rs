//! Outbound events and their delivery.
//!
//! The session owns one [`EventBus<CraftEvent>`]. Consumers (renderer, UI,
//! audio) hold a [`Subscription`] for as long as they want events; dropping it
//! is enough to stop delivery, the bus prunes dead channels on the next
//! publish.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use goldthread_engine::coords::{Vec2, Vec3};
use goldthread_engine::input::{GestureState, TouchEvent};

use crate::path::PathSnapshot;

#[derive(Debug, Clone, PartialEq)]
pub enum CraftEvent {
    /// Contact begin/move/end, long press and tap, in screen space.
    Touch(TouchEvent),
    GestureStateChanged { from: GestureState, to: GestureState },
    PinchDelta(f32),
    PathStateChanged(PathSnapshot),
    /// Both apertures of a new checkpoint, world space.
    ApertureSpawned([Vec3; 2]),
    ApertureConfirmed(Vec3),
    /// `committed` is true when the path's coverage was stored.
    PathDisconnected { committed: bool },
    TiltChanged(Vec2),
}

/// Single-threaded fan-out over `mpsc` channels.
#[derive(Debug)]
pub struct EventBus<E> {
    subscribers: Vec<Sender<E>>,
}

impl<E: Clone> EventBus<E> {
    pub fn new() -> Self {
        Self { subscribers: Vec::new() }
    }

    pub fn subscribe(&mut self) -> Subscription<E> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        Subscription { rx }
    }

    /// Sends `event` to every live subscriber, dropping the disconnected ones.
    pub fn publish(&mut self, event: E) {
        let before = self.subscribers.len();
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        let pruned = before - self.subscribers.len();
        if pruned > 0 {
            log::debug!("event bus: pruned {pruned} dropped subscriber(s)");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<E: Clone> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving end of an [`EventBus`] registration.
#[derive(Debug)]
pub struct Subscription<E> {
    rx: Receiver<E>,
}

impl<E> Subscription<E> {
    /// Next pending event, if any. Never blocks.
    pub fn try_recv(&self) -> Option<E> {
        match self.rx.try_recv() {
            Ok(e) => Some(e),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// All events published since the last drain.
    pub fn drain(&self) -> Vec<E> {
        self.rx.try_iter().collect()
    }

    /// Ends the subscription. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {}
}
