//! Tuning for every craft subsystem.
//!
//! All values are plain data with defaults matching the shipped experience.
//! [`CraftConfig::validate`] is run by [`crate::Session::new`]; subsystems
//! assume a validated config and never re-check.

use std::f32::consts::FRAC_PI_2;

use goldthread_engine::coords::Vec3;
use goldthread_engine::input::{PinchConfig, TouchConfig};

use crate::error::ConfigError;
use crate::light::LightMode;

/// Thread path state machine tuning. Distances are world units.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PathConfig {
    /// Travel since the last checkpoint that spawns a new aperture pair.
    pub checkpoint_distance: f32,
    /// Distance of each aperture from the path, perpendicular to it.
    pub aperture_offset: f32,
    /// A tap strictly closer than this confirms an aperture.
    pub aperture_confirm_radius: f32,
    pub break_threshold: f32,
    /// While waiting for confirmation the path only extends when the contact
    /// moves further than `break_threshold * break_threshold_multiplier`.
    pub break_threshold_multiplier: f32,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            checkpoint_distance: 0.5,
            aperture_offset: 0.1,
            aperture_confirm_radius: 0.1,
            break_threshold: 0.2,
            break_threshold_multiplier: 3.0,
        }
    }
}

impl PathConfig {
    pub fn escape_distance(&self) -> f32 {
        self.break_threshold * self.break_threshold_multiplier
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CoverageConfig {
    /// Radius covered by each sample; also the overlap query radius.
    pub sample_radius: f32,
    /// Maximum spacing between samples; capped at `sample_radius / 2`.
    pub sample_step: f32,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            sample_radius: 0.1,
            sample_step: 0.05,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TiltConfig {
    /// Per-axis magnitude below which the tilt reads as zero.
    pub dead_zone: f32,
    /// Fraction of the remaining gap closed per 1/60 s.
    pub smoothing: f32,
    /// Gain applied after baseline subtraction; clamped to [0.5, 5].
    pub sensitivity: f32,
    /// Gain applied to angular velocity when the gyroscope is the source.
    pub gyro_gain: f32,
    /// Minimum movement of the smoothed tilt before a change is published.
    pub change_threshold: f32,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            dead_zone: 0.05,
            smoothing: 0.3,
            sensitivity: 2.0,
            gyro_gain: 50.0,
            change_threshold: 0.01,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LightConfig {
    /// Point the light orbits and looks at.
    pub center: Vec3,
    pub sphere_radius: f32,
    /// Radians of polar angle per unit of tilt.
    pub sensitivity: f32,
    /// Polar angle cap, radians from straight up.
    pub max_angle: f32,
    pub mode: LightMode,
    /// Lerp mode: fraction per second.
    pub smooth_speed: f32,
    /// Spring mode: angular frequency of the critically damped spring.
    pub responsiveness: f32,
    /// Spring mode: seconds of target velocity to lead by.
    pub prediction_factor: f32,
    /// Light moves opposite to the tilt, like a fixed lamp over a tilted cloth.
    pub inverse_mapping: bool,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            center: Vec3::zero(),
            sphere_radius: 5.0,
            sensitivity: 0.1,
            max_angle: FRAC_PI_2,
            mode: LightMode::Lerp,
            smooth_speed: 3.0,
            responsiveness: 8.0,
            prediction_factor: 0.05,
            inverse_mapping: true,
        }
    }
}

/// Top-level configuration handed to [`crate::Session::new`].
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct CraftConfig {
    pub touch: TouchConfig,
    pub pinch: PinchConfig,
    pub path: PathConfig,
    pub coverage: CoverageConfig,
    pub tilt: TiltConfig,
    pub light: LightConfig,
}

impl CraftConfig {
    /// Rejects values that would break subsystem invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.touch;
        non_negative("touch.long_press_duration", t.long_press_duration)?;
        non_negative("touch.move_threshold", t.move_threshold)?;
        non_negative("touch.tap_max_duration", t.tap_max_duration)?;

        non_negative("pinch.noise_floor", self.pinch.noise_floor)?;
        finite("pinch.scale", self.pinch.scale)?;

        let p = &self.path;
        positive("path.checkpoint_distance", p.checkpoint_distance)?;
        non_negative("path.aperture_offset", p.aperture_offset)?;
        positive("path.aperture_confirm_radius", p.aperture_confirm_radius)?;
        non_negative("path.break_threshold", p.break_threshold)?;
        non_negative("path.break_threshold_multiplier", p.break_threshold_multiplier)?;

        positive("coverage.sample_radius", self.coverage.sample_radius)?;
        positive("coverage.sample_step", self.coverage.sample_step)?;

        let tl = &self.tilt;
        non_negative("tilt.dead_zone", tl.dead_zone)?;
        positive("tilt.smoothing", tl.smoothing)?;
        if tl.smoothing > 1.0 {
            return Err(ConfigError::new("tilt.smoothing", "must be in (0, 1]"));
        }
        positive("tilt.sensitivity", tl.sensitivity)?;
        finite("tilt.gyro_gain", tl.gyro_gain)?;
        non_negative("tilt.change_threshold", tl.change_threshold)?;

        let l = &self.light;
        if !l.center.is_finite() {
            return Err(ConfigError::new("light.center", "must be finite"));
        }
        positive("light.sphere_radius", l.sphere_radius)?;
        finite("light.sensitivity", l.sensitivity)?;
        non_negative("light.max_angle", l.max_angle)?;
        positive("light.smooth_speed", l.smooth_speed)?;
        positive("light.responsiveness", l.responsiveness)?;
        non_negative("light.prediction_factor", l.prediction_factor)?;

        Ok(())
    }
}

fn finite(field: &'static str, v: f32) -> Result<(), ConfigError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::new(field, format!("must be finite, got {v}")))
    }
}

fn non_negative(field: &'static str, v: f32) -> Result<(), ConfigError> {
    finite(field, v)?;
    if v < 0.0 {
        return Err(ConfigError::new(field, format!("must be >= 0, got {v}")));
    }
    Ok(())
}

fn positive(field: &'static str, v: f32) -> Result<(), ConfigError> {
    finite(field, v)?;
    if v <= 0.0 {
        return Err(ConfigError::new(field, format!("must be > 0, got {v}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert_eq!(CraftConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_sample_radius_is_rejected() {
        let mut cfg = CraftConfig::default();
        cfg.coverage.sample_radius = 0.0;
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.field, "coverage.sample_radius");
        assert!(err.to_string().contains("coverage.sample_radius"));
    }

    #[test]
    fn smoothing_above_one_is_rejected() {
        let mut cfg = CraftConfig::default();
        cfg.tilt.smoothing = 1.5;
        assert_eq!(cfg.validate().unwrap_err().field, "tilt.smoothing");
        cfg.tilt.smoothing = 1.0;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let mut cfg = CraftConfig::default();
        cfg.path.checkpoint_distance = f32::NAN;
        assert_eq!(cfg.validate().unwrap_err().field, "path.checkpoint_distance");
    }

    #[test]
    fn escape_distance_is_break_threshold_times_multiplier() {
        let p = PathConfig::default();
        assert!((p.escape_distance() - 0.6).abs() < 1e-6);
    }
}
