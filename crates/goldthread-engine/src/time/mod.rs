//! Time subsystem.
//!
//! Provides stable, testable frame timing utilities without coupling to the runtime.
//! Intended usage:
//! - one `FrameClock` per window (or per headless loop)
//! - call `tick()` once per simulation step to obtain `FrameTime`
//! - use `FrameClock::fixed` wherever runs must be reproducible

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
