//! Two-finger pinch recognition.
//!
//! [`GestureClassifier`] runs once per tick on the active contact positions
//! reported by [`super::TouchTracker`]. It is a three-state machine driven by
//! the active contact count `n`:
//!
//! ```text
//!            n == 1                 n == 2 && prev n == 1
//!   None ─────────────▶ SingleTouch ─────────────────────▶ Pinching
//!    ▲                     │   ▲                              │
//!    └──────── n == 0 ─────┘   └────────── n == 1 ────────────┤
//!    ▲                                                        │
//!    └──────────────────────────── n == 0 ────────────────────┘
//! ```
//!
//! A pinch only starts when a second finger joins an existing single touch.
//! Two contacts landing in the same tick keep the classifier in `None` until
//! the count is later seen at exactly 1, so two-finger taps never produce a
//! delta.

use crate::coords::Vec2;

/// Pinch tuning.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PinchConfig {
    /// Deltas with magnitude at or below this are treated as jitter.
    pub noise_floor: f32,
    /// Multiplier applied to the raw distance change (pixels) before emission.
    pub scale: f32,
}

impl Default for PinchConfig {
    fn default() -> Self {
        Self {
            noise_floor: 0.0005,
            scale: 0.01,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum GestureState {
    #[default]
    None,
    SingleTouch,
    Pinching,
}

/// Result of one classifier tick.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct GestureOutput {
    /// Scaled distance change, present only above the noise floor.
    pub pinch_delta: Option<f32>,
    /// `(from, to)` when the state changed this tick.
    pub transition: Option<(GestureState, GestureState)>,
}

#[derive(Debug, Clone)]
pub struct GestureClassifier {
    config: PinchConfig,
    state: GestureState,
    last_count: usize,
    /// `None` while the two-finger baseline has to be (re)captured.
    last_distance: Option<f32>,
}

impl GestureClassifier {
    pub fn new(config: PinchConfig) -> Self {
        Self {
            config,
            state: GestureState::None,
            last_count: 0,
            last_distance: None,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Distance between the two pinching contacts on the previous tick; 0 outside a pinch.
    pub fn last_distance(&self) -> f32 {
        self.last_distance.unwrap_or(0.0)
    }

    /// Advances the state machine. `active` holds the positions of the
    /// currently active contacts, ordered by contact id.
    pub fn update(&mut self, active: &[Vec2]) -> GestureOutput {
        let n = active.len();
        let from = self.state;
        let mut out = GestureOutput::default();

        match self.state {
            GestureState::None => {
                if n == 1 {
                    self.state = GestureState::SingleTouch;
                }
            }
            GestureState::SingleTouch => {
                if n == 2 && self.last_count == 1 {
                    self.state = GestureState::Pinching;
                    self.last_distance = Some(active[0].distance(active[1]));
                } else if n == 0 {
                    self.state = GestureState::None;
                }
            }
            GestureState::Pinching => match n {
                2 => {
                    let current = active[0].distance(active[1]);
                    if let Some(last) = self.last_distance {
                        let delta = (current - last) * self.config.scale;
                        if delta.abs() > self.config.noise_floor {
                            out.pinch_delta = Some(delta);
                        }
                    }
                    self.last_distance = Some(current);
                }
                0 | 1 => {
                    self.state =
                        if n == 1 { GestureState::SingleTouch } else { GestureState::None };
                    self.last_distance = None;
                }
                // A third finger suspends emission; the pair is re-measured
                // once the count is back to two.
                _ => self.last_distance = None,
            },
        }

        self.last_count = n;

        if self.state != from {
            log::debug!("gesture {from:?} -> {:?}", self.state);
            out.transition = Some((from, self.state));
        }
        out
    }

    pub fn reset(&mut self) {
        self.state = GestureState::None;
        self.last_count = 0;
        self.last_distance = None;
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(PinchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn contacts(n: usize, spread: f32) -> Vec<Vec2> {
        (0..n).map(|i| Vec2::new(i as f32 * spread, 0.0)).collect()
    }

    #[test]
    fn count_sequence_walks_the_full_cycle() {
        let mut g = GestureClassifier::default();
        let mut states = Vec::new();
        let mut deltas = Vec::new();
        for (n, spread) in [(0, 0.0), (1, 0.0), (2, 100.0), (2, 150.0), (1, 0.0), (0, 0.0)] {
            let out = g.update(&contacts(n, spread));
            states.push(g.state());
            deltas.push(out.pinch_delta);
        }
        assert_eq!(
            states,
            vec![
                GestureState::None,
                GestureState::SingleTouch,
                GestureState::Pinching,
                GestureState::Pinching,
                GestureState::SingleTouch,
                GestureState::None,
            ]
        );
        // Nothing on the entry tick; (150 - 100) * 0.01 on the next one.
        assert_eq!(deltas[2], None);
        assert!((deltas[3].unwrap() - 0.5).abs() < 1e-6);
        assert_eq!(g.last_distance(), 0.0);
    }

    #[test]
    fn simultaneous_two_finger_landing_never_pinches() {
        let mut g = GestureClassifier::default();
        for n in [0, 2, 0] {
            let out = g.update(&contacts(n, 100.0));
            assert_ne!(g.state(), GestureState::Pinching);
            assert!(out.pinch_delta.is_none());
        }
    }

    #[test]
    fn two_fingers_then_one_then_two_pinches() {
        let mut g = GestureClassifier::default();
        g.update(&contacts(2, 100.0));
        assert_eq!(g.state(), GestureState::None);
        g.update(&contacts(1, 0.0));
        assert_eq!(g.state(), GestureState::SingleTouch);
        g.update(&contacts(2, 100.0));
        assert_eq!(g.state(), GestureState::Pinching);
    }

    #[test]
    fn jitter_below_noise_floor_is_swallowed_but_tracked() {
        let mut g = GestureClassifier::default();
        g.update(&contacts(1, 0.0));
        g.update(&contacts(2, 100.0));
        // 0.04px * 0.01 = 0.0004 <= 0.0005
        let out = g.update(&contacts(2, 100.04));
        assert!(out.pinch_delta.is_none());
        assert!((g.last_distance() - 100.04).abs() < 1e-4);
    }

    #[test]
    fn third_finger_suspends_and_reseeds() {
        let mut g = GestureClassifier::default();
        g.update(&contacts(1, 0.0));
        g.update(&contacts(2, 100.0));
        let out = g.update(&contacts(3, 100.0));
        assert!(out.pinch_delta.is_none());
        assert_eq!(g.state(), GestureState::Pinching);
        // Back to two fingers far apart: baseline is re-captured, no jump.
        let out = g.update(&contacts(2, 400.0));
        assert!(out.pinch_delta.is_none());
        let out = g.update(&contacts(2, 410.0));
        assert!(out.pinch_delta.is_some());
    }

    #[test]
    fn transitions_are_reported() {
        let mut g = GestureClassifier::default();
        let out = g.update(&contacts(1, 0.0));
        assert_eq!(out.transition, Some((GestureState::None, GestureState::SingleTouch)));
        let out = g.update(&contacts(1, 0.0));
        assert_eq!(out.transition, None);
    }

    proptest! {
        #[test]
        fn deltas_only_between_consecutive_two_finger_ticks(
            ticks in prop::collection::vec((0usize..4, 10.0f32..300.0), 1..60)
        ) {
            let mut g = GestureClassifier::default();
            let mut prev_n = 0usize;
            for (n, spread) in ticks {
                let out = g.update(&contacts(n, spread));
                if out.pinch_delta.is_some() {
                    prop_assert_eq!(n, 2);
                    prop_assert_eq!(prev_n, 2);
                }
                prev_n = n;
            }
        }

        #[test]
        fn never_pinches_without_a_single_touch_first(
            ticks in prop::collection::vec(
                prop_oneof![Just(0usize), Just(2usize), Just(3usize)],
                1..40,
            )
        ) {
            let mut g = GestureClassifier::default();
            for n in ticks {
                g.update(&contacts(n, 50.0));
                prop_assert_ne!(g.state(), GestureState::Pinching);
            }
        }
    }
}
