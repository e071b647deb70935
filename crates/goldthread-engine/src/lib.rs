//! Goldthread engine crate.
//!
//! Platform-facing pieces shared by the craft simulation and its hosts:
//! geometry primitives, touch/sensor input, frame timing, logging and the
//! windowed or headless runtime loop.

pub mod coords;
pub mod core;
pub mod input;
pub mod logging;
pub mod time;
pub mod window;
