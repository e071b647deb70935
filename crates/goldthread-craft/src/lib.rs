//! Gold-thread craft core.
//!
//! A thread is dragged from a fixed anchor onto the cloth, extended across it
//! while avoiding material laid down by earlier threads, and periodically
//! pinned through pairs of apertures that must be confirmed with a tap. A tilt
//! sensor steers the light around the work.
//!
//! [`Session`] owns every subsystem and advances them in a fixed order once
//! per tick; outbound [`CraftEvent`]s are fanned out through an [`EventBus`].

pub mod config;
pub mod coverage;
pub mod error;
pub mod events;
pub mod geometry;
pub mod light;
pub mod path;
pub mod session;
pub mod tilt;

pub use config::{CoverageConfig, CraftConfig, LightConfig, PathConfig, TiltConfig};
pub use coverage::{CommittedCoverage, CoveragePatch, CoverageStore, RegionIndex};
pub use error::ConfigError;
pub use events::{CraftEvent, EventBus, Subscription};
pub use geometry::{PlaneGeometry, SceneGeometry};
pub use light::{LightMode, LightRig};
pub use path::{Aperture, PathBuilder, PathSnapshot, ThreadPath, ThreadState};
pub use session::{Session, SessionSnapshot, TickInput};
pub use tilt::{TiltFilter, TiltSource};
