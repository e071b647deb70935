use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Time elapsed since the previous tick, in seconds.
    pub dt: f32,

    /// Total simulated time since the clock started, in seconds.
    pub elapsed: f64,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

#[derive(Debug, Clone)]
enum Mode {
    /// Wall-clock deltas, clamped.
    Realtime { last: Instant, dt_min: Duration, dt_max: Duration },
    /// Every tick advances by the same step. Used by headless and test runs.
    Fixed { step: Duration },
}

/// Frame clock producing `FrameTime` snapshots.
///
/// One clock per window (or per loop) so that multi-window applications do
/// not share delta-time state.
///
/// In realtime mode delta time is clamped to avoid pathological values when
/// the application is paused by the debugger, minimized, or stalls.
#[derive(Debug, Clone)]
pub struct FrameClock {
    mode: Mode,
    elapsed: f64,
    frame_index: u64,
}

impl FrameClock {
    /// Creates a realtime clock with default clamps.
    ///
    /// - minimum prevents zero-dt behavior from tight loops on some platforms
    /// - maximum prevents simulation explosions after long stalls
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a realtime clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            mode: Mode::Realtime { last: Instant::now(), dt_min, dt_max },
            elapsed: 0.0,
            frame_index: 0,
        }
    }

    /// Creates a deterministic clock that advances by `step` on every tick.
    pub fn fixed(step: Duration) -> Self {
        Self {
            mode: Mode::Fixed { step },
            elapsed: 0.0,
            frame_index: 0,
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self.mode, Mode::Fixed { .. })
    }

    /// Resets the realtime baseline.
    ///
    /// Useful after a window is resumed from suspension. No-op for fixed clocks.
    pub fn reset(&mut self) {
        if let Mode::Realtime { last, .. } = &mut self.mode {
            *last = Instant::now();
        }
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        let dt = match &mut self.mode {
            Mode::Realtime { last, dt_min, dt_max } => {
                let now = Instant::now();
                let dt = now.saturating_duration_since(*last).clamp(*dt_min, *dt_max);
                *last = now;
                dt
            }
            Mode::Fixed { step } => *step,
        };

        self.elapsed += dt.as_secs_f64();

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            elapsed: self.elapsed,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_is_deterministic() {
        let mut clock = FrameClock::fixed(Duration::from_millis(125));
        let a = clock.tick();
        let b = clock.tick();
        assert_eq!(a.dt, 0.125);
        assert_eq!(a.frame_index, 0);
        assert_eq!(b.frame_index, 1);
        assert_eq!(b.elapsed, 0.25);
        assert!(clock.is_fixed());
    }

    #[test]
    fn realtime_clock_respects_clamps() {
        let mut clock =
            FrameClock::with_clamps(Duration::from_millis(5), Duration::from_millis(10));
        let ft = clock.tick();
        assert!(ft.dt >= 0.005 && ft.dt <= 0.010);
        assert!(!clock.is_fixed());
    }
}
