//! Thread path state machine.
//!
//! ```text
//!          grab                 on surface            checkpoint reached
//!   Idle ───────▶ Dragging ─────────────────▶ Rooted ────────────────────▶ WaitingForConfirmation
//!    ▲               │                         │  ▲                                   │
//!    │               │ lift                    │  └──────── all apertures tapped ─────┘
//!    │               ▼                         ▼ lift / crosses coverage             │ lift
//!    └─────────── Disconnected ◀───────────────┴─────────────────────────────────────┘
//! ```
//!
//! `Disconnected` is transient: it is entered and left within the same call,
//! and only ever observed through the events emitted on the way to `Idle`.
//!
//! All positions are world space. The builder does no hit-testing or
//! projection of its own; the caller supplies the anchor, the grab position
//! and the "on surface" verdict for every move.

use goldthread_engine::coords::Vec3;

use crate::config::{CoverageConfig, PathConfig};
use crate::coverage::{CoverageStore, RegionIndex};
use crate::events::CraftEvent;

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum ThreadState {
    #[default]
    Idle,
    Dragging,
    Rooted,
    WaitingForConfirmation,
    Disconnected,
}

impl ThreadState {
    /// States in which a path exists and follows the driving contact.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            ThreadState::Dragging | ThreadState::Rooted | ThreadState::WaitingForConfirmation
        )
    }
}

/// A confirmation marker beside the path.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aperture {
    pub position: Vec3,
    /// Index into the path points of the point that triggered the checkpoint.
    pub path_point_index: usize,
    pub confirmed: bool,
}

/// Ordered points starting at the anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadPath {
    anchor: Vec3,
    points: Vec<Vec3>,
}

impl ThreadPath {
    fn new(anchor: Vec3, grab: Vec3) -> Self {
        Self { anchor, points: vec![anchor, grab] }
    }

    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Leading point of the thread.
    pub fn last(&self) -> Vec3 {
        self.points.last().copied().unwrap_or(self.anchor)
    }
}

/// Read-only view of the builder, carried by `PathStateChanged`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathSnapshot {
    pub state: ThreadState,
    pub anchor: Option<Vec3>,
    pub points: Vec<Vec3>,
    /// Points laid on the surface, from the anchor to the leading point.
    pub fixed_points: Vec<Vec3>,
    pub apertures: Vec<Aperture>,
}

#[derive(Debug, Clone)]
pub struct PathBuilder {
    config: PathConfig,
    state: ThreadState,
    path: Option<ThreadPath>,
    fixed_points: Vec<Vec3>,
    apertures: Vec<Aperture>,
    region: RegionIndex,
    distance_since_checkpoint: f32,
    reached_root: bool,
}

impl PathBuilder {
    pub fn new(config: PathConfig, coverage: CoverageConfig) -> Self {
        Self {
            config,
            state: ThreadState::Idle,
            path: None,
            fixed_points: Vec::new(),
            apertures: Vec::new(),
            region: RegionIndex::new(coverage),
            distance_since_checkpoint: 0.0,
            reached_root: false,
        }
    }

    pub fn state(&self) -> ThreadState {
        self.state
    }

    pub fn path(&self) -> Option<&ThreadPath> {
        self.path.as_ref()
    }

    pub fn fixed_points(&self) -> &[Vec3] {
        &self.fixed_points
    }

    pub fn apertures(&self) -> &[Aperture] {
        &self.apertures
    }

    /// Coverage laid by the active path.
    pub fn region(&self) -> &RegionIndex {
        &self.region
    }

    /// Whether the active path has touched the surface at least once.
    pub fn reached_root(&self) -> bool {
        self.reached_root
    }

    pub fn distance_since_checkpoint(&self) -> f32 {
        self.distance_since_checkpoint
    }

    pub fn snapshot(&self) -> PathSnapshot {
        PathSnapshot {
            state: self.state,
            anchor: self.path.as_ref().map(ThreadPath::anchor),
            points: self.path.as_ref().map(|p| p.points.clone()).unwrap_or_default(),
            fixed_points: self.fixed_points.clone(),
            apertures: self.apertures.clone(),
        }
    }

    /// Repairs leftovers of an aborted path found while `Idle`.
    ///
    /// Returns true when something had to be discarded.
    pub fn reconcile(&mut self) -> bool {
        if self.state != ThreadState::Idle {
            return false;
        }
        let stale = self.path.is_some()
            || !self.apertures.is_empty()
            || !self.fixed_points.is_empty()
            || !self.region.is_empty();
        if stale {
            log::warn!("path builder idle with leftover path state; resetting");
            self.clear();
        }
        stale
    }

    /// Starts a path from `anchor` towards `grab`. Ignored unless `Idle`.
    pub fn grab(&mut self, anchor: Vec3, grab: Vec3, events: &mut Vec<CraftEvent>) -> bool {
        if self.state != ThreadState::Idle {
            log::debug!("grab ignored in {:?}", self.state);
            return false;
        }
        self.clear();
        self.path = Some(ThreadPath::new(anchor, grab));
        self.set_state(ThreadState::Dragging, events);
        true
    }

    /// Follows a move of the driving contact to `pos`.
    pub fn drive_moved<S>(
        &mut self,
        pos: Vec3,
        on_surface: bool,
        store: &mut S,
        events: &mut Vec<CraftEvent>,
    ) where
        S: CoverageStore + ?Sized,
    {
        match self.state {
            ThreadState::Dragging => {
                let Some(path) = self.path.as_mut() else {
                    return;
                };
                if let Some(last) = path.points.last_mut() {
                    *last = pos;
                }
                if on_surface {
                    self.root(pos, events);
                }
            }
            ThreadState::Rooted => self.extend(pos, true, store, events),
            ThreadState::WaitingForConfirmation => {
                let Some(last) = self.path.as_ref().map(ThreadPath::last) else {
                    return;
                };
                if last.distance(pos) > self.config.escape_distance() {
                    self.extend(pos, false, store, events);
                } else {
                    log::trace!("move suppressed while waiting for confirmation");
                }
            }
            ThreadState::Idle | ThreadState::Disconnected => {}
        }
    }

    /// A tap at `pos` from a contact other than the driving one.
    ///
    /// Confirms the nearest unconfirmed aperture strictly within the confirm
    /// radius. Returns true when an aperture was confirmed.
    pub fn tap(&mut self, pos: Vec3, events: &mut Vec<CraftEvent>) -> bool {
        if self.state != ThreadState::WaitingForConfirmation {
            return false;
        }

        let radius = self.config.aperture_confirm_radius;
        let hit = self
            .apertures
            .iter_mut()
            .filter(|a| !a.confirmed)
            .map(|a| (a.position.distance(pos), a))
            .filter(|(d, _)| *d < radius)
            .min_by(|(da, _), (db, _)| da.total_cmp(db));

        let Some((_, aperture)) = hit else {
            return false;
        };
        aperture.confirmed = true;
        events.push(CraftEvent::ApertureConfirmed(aperture.position));

        if self.apertures.iter().all(|a| a.confirmed) {
            self.apertures.clear();
            self.set_state(ThreadState::Rooted, events);
        }
        true
    }

    /// The driving contact lifted off.
    pub fn lift<S>(&mut self, store: &mut S, events: &mut Vec<CraftEvent>)
    where
        S: CoverageStore + ?Sized,
    {
        if self.state.is_active() {
            self.disconnect(store, events);
        }
    }

    /// Drops the active path without committing anything.
    pub fn reset(&mut self) {
        self.clear();
        self.state = ThreadState::Idle;
    }

    fn root(&mut self, pos: Vec3, events: &mut Vec<CraftEvent>) {
        if let Some(path) = &self.path {
            self.fixed_points = path.points.clone();
        }
        self.region.insert_segment(pos, pos);
        self.reached_root = true;
        self.distance_since_checkpoint = 0.0;
        self.set_state(ThreadState::Rooted, events);
    }

    fn extend<S>(
        &mut self,
        pos: Vec3,
        counts_to_checkpoint: bool,
        store: &mut S,
        events: &mut Vec<CraftEvent>,
    ) where
        S: CoverageStore + ?Sized,
    {
        let Some(path) = self.path.as_mut() else {
            return;
        };
        let last = path.last();
        if last == pos {
            return;
        }

        if store.overlaps(pos) {
            log::info!("thread crossed committed coverage at {pos:?}; disconnecting");
            self.disconnect(store, events);
            return;
        }

        path.points.push(pos);
        let index = path.points.len() - 1;
        self.fixed_points.push(pos);
        self.region.insert_segment(last, pos);

        if !counts_to_checkpoint {
            return;
        }
        self.distance_since_checkpoint += last.distance(pos);
        if self.distance_since_checkpoint >= self.config.checkpoint_distance {
            self.spawn_apertures(last, pos, index, events);
        }
    }

    fn spawn_apertures(
        &mut self,
        from: Vec3,
        to: Vec3,
        index: usize,
        events: &mut Vec<CraftEvent>,
    ) {
        let mid = from.lerp(to, 0.5);
        let dir = (to - from).normalized_or_zero();
        let mut side = dir.cross(Vec3::UP).normalized_or_zero();
        if side == Vec3::zero() {
            // Vertical segment: any horizontal axis will do.
            side = Vec3::new(0.0, 1.0, 0.0);
        }
        let offset = side * self.config.aperture_offset;
        let pair = [mid + offset, mid - offset];

        self.apertures = pair
            .iter()
            .map(|&position| Aperture { position, path_point_index: index, confirmed: false })
            .collect();
        self.distance_since_checkpoint = 0.0;

        log::debug!("checkpoint at point #{index}: apertures {:?}", pair);
        events.push(CraftEvent::ApertureSpawned(pair));
        self.set_state(ThreadState::WaitingForConfirmation, events);
    }

    fn disconnect<S>(&mut self, store: &mut S, events: &mut Vec<CraftEvent>)
    where
        S: CoverageStore + ?Sized,
    {
        let committed = if self.reached_root {
            match self.region.take_patch() {
                Some(patch) => {
                    store.commit(patch);
                    true
                }
                None => false,
            }
        } else {
            false
        };

        self.set_state(ThreadState::Disconnected, events);
        events.push(CraftEvent::PathDisconnected { committed });

        self.clear();
        self.set_state(ThreadState::Idle, events);
    }

    fn clear(&mut self) {
        self.path = None;
        self.fixed_points.clear();
        self.apertures.clear();
        self.region.clear();
        self.distance_since_checkpoint = 0.0;
        self.reached_root = false;
    }

    fn set_state(&mut self, next: ThreadState, events: &mut Vec<CraftEvent>) {
        if self.state == next {
            return;
        }
        log::debug!("thread {:?} -> {next:?}", self.state);
        self.state = next;
        events.push(CraftEvent::PathStateChanged(self.snapshot()));
    }
}
