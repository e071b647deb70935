//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and windows and feeds their input into the
//! per-tick app callback. A headless runner drives the same callback from any
//! `InputSource`.

mod runtime;

pub use runtime::{HeadlessConfig, Runtime, RuntimeConfig, RuntimeCtx};
