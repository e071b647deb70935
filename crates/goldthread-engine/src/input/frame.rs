use std::collections::HashSet;

use super::types::{ContactId, TouchEvent};

/// Per-tick touch deltas.
///
/// `TouchTracker` holds the current contact set.
/// `TouchFrame` holds the events and transition sets produced during one tick.
#[derive(Debug, Default)]
pub struct TouchFrame {
    /// Derived events in emission order.
    pub events: Vec<TouchEvent>,

    /// Contacts that began this tick.
    pub began: HashSet<ContactId>,

    /// Contacts that ended this tick (including synthetic ends).
    pub ended: HashSet<ContactId>,

    /// Number of bookkeeping inconsistencies repaired during this tick.
    pub reconciled: u32,
}

impl TouchFrame {
    pub fn clear(&mut self) {
        self.events.clear();
        self.began.clear();
        self.ended.clear();
        self.reconciled = 0;
    }

    pub fn push_event(&mut self, ev: TouchEvent) {
        match ev {
            TouchEvent::ContactBegan { id, .. } => {
                self.began.insert(id);
            }
            TouchEvent::ContactEnded { id, .. } => {
                self.ended.insert(id);
            }
            _ => {}
        }
        self.events.push(ev);
    }

    pub fn long_presses(&self) -> impl Iterator<Item = &TouchEvent> + '_ {
        self.events.iter().filter(|e| matches!(e, TouchEvent::LongPress { .. }))
    }
}
