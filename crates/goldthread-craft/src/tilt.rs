//! Tilt signal conditioning.
//!
//! Per tick: pick the best available sensor, extract a planar raw tilt,
//! subtract the calibration baseline, apply sensitivity and the per-axis dead
//! zone, then smooth. The smoothed value is published only when it moved by
//! more than the change threshold since the last publication.

use goldthread_engine::coords::Vec2;
use goldthread_engine::input::SensorSample;

use crate::config::TiltConfig;

const MIN_SENSITIVITY: f32 = 0.5;
const MAX_SENSITIVITY: f32 = 5.0;
/// Smoothing factors are specified per 1/60 s.
const REFERENCE_RATE: f32 = 60.0;

/// Sensor the raw tilt was read from, in order of preference.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum TiltSource {
    Attitude,
    Gyroscope,
    Accelerometer,
    #[default]
    None,
}

impl TiltSource {
    /// Chooses the preferred available sensor and extracts its raw tilt.
    fn select(sample: &SensorSample, gyro_gain: f32) -> (TiltSource, Vec2) {
        if let Some(att) = sample.attitude {
            return (TiltSource::Attitude, Vec2::new(att.roll.sin(), att.pitch.sin()));
        }
        if let Some(w) = sample.angular_velocity {
            return (TiltSource::Gyroscope, Vec2::new(w.x, w.y) * gyro_gain);
        }
        if let Some(a) = sample.acceleration {
            return (TiltSource::Accelerometer, Vec2::new(a.x, a.y));
        }
        (TiltSource::None, Vec2::zero())
    }
}

#[derive(Debug, Clone)]
pub struct TiltFilter {
    config: TiltConfig,
    source: TiltSource,
    baseline: Vec2,
    calibration_pending: bool,
    smoothed: Vec2,
    last_published: Vec2,
}

impl TiltFilter {
    pub fn new(mut config: TiltConfig) -> Self {
        config.sensitivity = config.sensitivity.clamp(MIN_SENSITIVITY, MAX_SENSITIVITY);
        Self {
            config,
            source: TiltSource::None,
            baseline: Vec2::zero(),
            calibration_pending: true,
            smoothed: Vec2::zero(),
            last_published: Vec2::zero(),
        }
    }

    /// Current smoothed tilt.
    pub fn tilt(&self) -> Vec2 {
        self.smoothed
    }

    pub fn source(&self) -> TiltSource {
        self.source
    }

    pub fn baseline(&self) -> Vec2 {
        self.baseline
    }

    pub fn sensitivity(&self) -> f32 {
        self.config.sensitivity
    }

    /// Sets the gain, clamped to [0.5, 5].
    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        self.config.sensitivity = sensitivity.clamp(MIN_SENSITIVITY, MAX_SENSITIVITY);
    }

    /// Captures a new baseline from the next available sample.
    pub fn request_calibration(&mut self) {
        self.calibration_pending = true;
    }

    /// Advances the filter. Returns the new tilt when it should be published.
    pub fn update(&mut self, sample: &SensorSample, dt: f32) -> Option<Vec2> {
        let (source, raw) = TiltSource::select(sample, self.config.gyro_gain);

        if source != self.source {
            match source {
                TiltSource::None => {
                    log::warn!("tilt: no orientation sensor available, holding neutral")
                }
                s => log::info!("tilt: reading from {s:?}"),
            }
            // Baselines are not comparable across sensors.
            self.calibration_pending = true;
            self.source = source;
        }

        if source == TiltSource::None {
            self.smoothed = Vec2::zero();
        } else {
            if self.calibration_pending {
                self.baseline = raw;
                self.calibration_pending = false;
                log::debug!("tilt: calibrated baseline {raw:?} from {source:?}");
            }

            let dz = self.config.dead_zone;
            let target = ((raw - self.baseline) * self.config.sensitivity)
                .map(|v| if v.abs() < dz { 0.0 } else { v });

            let alpha = smoothing_alpha(self.config.smoothing, dt);
            self.smoothed = self.smoothed.lerp(target, alpha);
        }

        if self.smoothed.distance(self.last_published) > self.config.change_threshold {
            self.last_published = self.smoothed;
            Some(self.smoothed)
        } else {
            None
        }
    }
}

/// Frame-rate independent lerp factor for a per-1/60 s smoothing constant.
fn smoothing_alpha(smoothing: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }
    let keep = (1.0 - smoothing.clamp(0.0, 1.0)).max(0.0);
    1.0 - keep.powf(dt * REFERENCE_RATE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use goldthread_engine::coords::Vec3;
    use goldthread_engine::input::Attitude;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn attitude(roll: f32, pitch: f32) -> SensorSample {
        SensorSample { attitude: Some(Attitude { pitch, roll, yaw: 0.0 }), ..SensorSample::none() }
    }

    fn accel(x: f32, y: f32) -> SensorSample {
        SensorSample { acceleration: Some(Vec3::new(x, y, -9.8)), ..SensorSample::none() }
    }

    fn settle(f: &mut TiltFilter, sample: &SensorSample) {
        for _ in 0..600 {
            f.update(sample, DT);
        }
    }

    // ── Source selection ──────────────────────────────────────────────────

    #[test]
    fn attitude_is_preferred_over_other_sensors() {
        let mut f = TiltFilter::new(TiltConfig::default());
        let sample = SensorSample {
            attitude: Some(Attitude::default()),
            angular_velocity: Some(Vec3::new(1.0, 1.0, 0.0)),
            acceleration: Some(Vec3::new(1.0, 1.0, 0.0)),
        };
        f.update(&sample, DT);
        assert_eq!(f.source(), TiltSource::Attitude);

        let gyro_only = SensorSample { attitude: None, ..sample };
        f.update(&gyro_only, DT);
        assert_eq!(f.source(), TiltSource::Gyroscope);
    }

    #[test]
    fn missing_sensors_hold_neutral() {
        let mut f = TiltFilter::new(TiltConfig::default());
        f.update(&accel(0.0, 0.0), DT);
        settle(&mut f, &accel(0.5, 0.0));
        assert!(f.tilt().x > 0.9);

        f.update(&SensorSample::none(), DT);
        assert_eq!(f.tilt(), Vec2::zero());
        assert_eq!(f.source(), TiltSource::None);
    }

    // ── Calibration ───────────────────────────────────────────────────────

    #[test]
    fn first_sample_becomes_the_baseline() {
        let mut f = TiltFilter::new(TiltConfig::default());
        settle(&mut f, &accel(0.3, -0.2));
        assert_eq!(f.baseline(), Vec2::new(0.3, -0.2));
        assert_eq!(f.tilt(), Vec2::zero());
    }

    #[test]
    fn recalibration_rezeroes_the_output() {
        let mut f = TiltFilter::new(TiltConfig::default());
        f.update(&accel(0.0, 0.0), DT);
        settle(&mut f, &accel(0.4, 0.0));
        assert!(f.tilt().x > 0.7);

        f.request_calibration();
        settle(&mut f, &accel(0.4, 0.0));
        assert!(f.tilt().length() < 1e-3);
    }

    #[test]
    fn sensitivity_is_clamped() {
        let mut f = TiltFilter::new(TiltConfig::default());
        f.set_sensitivity(100.0);
        assert_eq!(f.sensitivity(), 5.0);
        f.set_sensitivity(0.0);
        assert_eq!(f.sensitivity(), 0.5);
    }

    // ── Filtering ─────────────────────────────────────────────────────────

    #[test]
    fn dead_zone_swallows_small_tilts() {
        let mut f = TiltFilter::new(TiltConfig::default());
        f.update(&attitude(0.0, 0.0), DT);
        // sin(0.02) * 2 = 0.04 < 0.05
        settle(&mut f, &attitude(0.02, 0.0));
        assert_eq!(f.tilt(), Vec2::zero());
    }

    #[test]
    fn smoothing_converges_on_the_scaled_tilt() {
        let mut f = TiltFilter::new(TiltConfig::default());
        f.update(&accel(0.0, 0.0), DT);
        let first = {
            f.update(&accel(0.25, 0.0), DT);
            f.tilt().x
        };
        // One reference frame closes 30% of the gap to 0.5.
        assert!((first - 0.15).abs() < 1e-4);
        settle(&mut f, &accel(0.25, 0.0));
        assert!((f.tilt().x - 0.5).abs() < 1e-3);
    }

    #[test]
    fn smoothing_is_frame_rate_independent() {
        let mut fast = TiltFilter::new(TiltConfig::default());
        let mut slow = TiltFilter::new(TiltConfig::default());
        fast.update(&accel(0.0, 0.0), DT);
        slow.update(&accel(0.0, 0.0), DT);
        for _ in 0..4 {
            fast.update(&accel(0.25, 0.0), DT);
        }
        slow.update(&accel(0.25, 0.0), DT * 4.0);
        assert!((fast.tilt().x - slow.tilt().x).abs() < 1e-4);
    }

    #[test]
    fn publication_is_gated_by_change_threshold() {
        let mut f = TiltFilter::new(TiltConfig::default());
        assert_eq!(f.update(&accel(0.0, 0.0), DT), None);
        assert!(f.update(&accel(0.25, 0.0), DT).is_some());
        settle(&mut f, &accel(0.25, 0.0));
        assert_eq!(f.update(&accel(0.25, 0.0), DT), None);
    }

    proptest! {
        #[test]
        fn output_stays_bounded_by_the_scaled_range(
            samples in prop::collection::vec((-1.0f32..1.0, -1.0f32..1.0), 1..100)
        ) {
            let mut f = TiltFilter::new(TiltConfig::default());
            f.update(&accel(0.0, 0.0), DT);
            for (x, y) in samples {
                f.update(&accel(x, y), DT);
                let t = f.tilt();
                prop_assert!(t.x.abs() <= 2.0 + 1e-4 && t.y.abs() <= 2.0 + 1e-4);
            }
        }
    }
}
