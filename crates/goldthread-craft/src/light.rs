//! Tilt-steered light.
//!
//! The filtered tilt picks a point on a sphere around the work: its magnitude
//! sets the polar angle away from straight up, its direction sets the
//! azimuth. The light then chases that target either by plain interpolation
//! or with a critically damped spring that leads the target slightly.

use goldthread_engine::coords::{Vec2, Vec3};

use crate::config::LightConfig;

/// Integration step for the spring.
const SPRING_SUBSTEP: f32 = 0.016;

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum LightMode {
    /// Moves a fixed fraction of the remaining gap per second.
    #[default]
    Lerp,
    /// Critically damped spring with target prediction.
    Spring,
}

#[derive(Debug, Clone)]
pub struct LightRig {
    config: LightConfig,
    position: Vec3,
    velocity: Vec3,
    last_target: Option<Vec3>,
}

impl LightRig {
    /// Starts directly above the center.
    pub fn new(config: LightConfig) -> Self {
        Self {
            position: config.center + Vec3::UP * config.sphere_radius,
            velocity: Vec3::zero(),
            last_target: None,
            config,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn mode(&self) -> LightMode {
        self.config.mode
    }

    pub fn set_mode(&mut self, mode: LightMode) {
        if mode != self.config.mode {
            self.velocity = Vec3::zero();
            self.config.mode = mode;
        }
    }

    /// Unit vector from the light towards the center.
    pub fn direction(&self) -> Vec3 {
        (self.config.center - self.position).normalized_or_zero()
    }

    /// Point on the light sphere for `tilt`.
    pub fn target_for(&self, tilt: Vec2) -> Vec3 {
        let c = &self.config;
        let theta = (tilt.length() * c.sensitivity).clamp(0.0, c.max_angle);
        let phi = tilt.y.atan2(tilt.x);
        let r = c.sphere_radius;

        let mut offset = Vec3::new(
            r * theta.sin() * phi.cos(),
            r * theta.sin() * phi.sin(),
            r * theta.cos(),
        );
        if c.inverse_mapping {
            offset.x = -offset.x;
            offset.y = -offset.y;
        }
        c.center + offset
    }

    /// Moves the light towards the target for `tilt`; returns the new position.
    pub fn update(&mut self, tilt: Vec2, dt: f32) -> Vec3 {
        let target = self.target_for(tilt);
        if dt <= 0.0 {
            return self.position;
        }

        match self.config.mode {
            LightMode::Lerp => {
                let t = (dt * self.config.smooth_speed).min(1.0);
                self.position = self.position.lerp(target, t);
            }
            LightMode::Spring => {
                let target_velocity = match self.last_target {
                    Some(prev) => (target - prev) / dt,
                    None => Vec3::zero(),
                };
                let predicted = target + target_velocity * self.config.prediction_factor;
                self.spring_towards(predicted, dt);
            }
        }

        self.last_target = Some(target);
        self.position
    }

    fn spring_towards(&mut self, goal: Vec3, dt: f32) {
        let omega = self.config.responsiveness;
        let stiffness = omega * omega;
        let damping = 2.0 * omega;

        let mut elapsed = 0.0;
        while elapsed < dt {
            let step = SPRING_SUBSTEP.min(dt - elapsed);
            let force = (goal - self.position) * stiffness - self.velocity * damping;
            self.velocity += force * step;
            self.position += self.velocity * step;
            elapsed += step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn rig(mode: LightMode) -> LightRig {
        LightRig::new(LightConfig { mode, ..LightConfig::default() })
    }

    fn close(a: Vec3, b: Vec3, eps: f32) -> bool {
        a.distance(b) < eps
    }

    // ── Target mapping ────────────────────────────────────────────────────

    #[test]
    fn neutral_tilt_targets_the_zenith() {
        let r = rig(LightMode::Lerp);
        assert!(close(r.target_for(Vec2::zero()), Vec3::new(0.0, 0.0, 5.0), 1e-6));
        assert!(close(r.position(), Vec3::new(0.0, 0.0, 5.0), 1e-6));
        assert!(close(r.direction(), Vec3::new(0.0, 0.0, -1.0), 1e-6));
    }

    #[test]
    fn inverse_mapping_mirrors_horizontally() {
        let r = rig(LightMode::Lerp);
        let t = r.target_for(Vec2::new(2.0, 0.0));
        // theta = 0.2 rad, azimuth along +x, mirrored to -x.
        assert!(close(t, Vec3::new(-5.0 * 0.2f32.sin(), 0.0, 5.0 * 0.2f32.cos()), 1e-5));

        let direct =
            LightRig::new(LightConfig { inverse_mapping: false, ..LightConfig::default() });
        let t = direct.target_for(Vec2::new(2.0, 0.0));
        assert!(t.x > 0.0);
    }

    #[test]
    fn polar_angle_is_clamped() {
        let r = rig(LightMode::Lerp);
        let t = r.target_for(Vec2::new(0.0, 1000.0));
        let expected = Vec3::new(0.0, -5.0 * FRAC_PI_2.sin(), 5.0 * FRAC_PI_2.cos());
        assert!(close(t, expected, 1e-4));
    }

    #[test]
    fn targets_stay_on_the_sphere() {
        let r = rig(LightMode::Lerp);
        for tilt in [Vec2::new(0.3, -0.7), Vec2::new(-4.0, 2.0), Vec2::new(10.0, 10.0)] {
            assert!((r.target_for(tilt).length() - 5.0).abs() < 1e-4);
        }
    }

    // ── Motion ────────────────────────────────────────────────────────────

    #[test]
    fn lerp_mode_moves_a_fraction_per_tick() {
        let mut r = rig(LightMode::Lerp);
        let start = r.position();
        let target = r.target_for(Vec2::new(5.0, 0.0));
        let p = r.update(Vec2::new(5.0, 0.0), 0.1);
        // 0.1 s * 3 /s = 30% of the way.
        assert!(close(p, start.lerp(target, 0.3), 1e-5));
    }

    #[test]
    fn lerp_factor_saturates_on_long_frames() {
        let mut r = rig(LightMode::Lerp);
        let target = r.target_for(Vec2::new(5.0, 5.0));
        assert!(close(r.update(Vec2::new(5.0, 5.0), 2.0), target, 1e-5));
    }

    #[test]
    fn spring_settles_without_overshoot() {
        let mut r = rig(LightMode::Spring);
        let tilt = Vec2::new(5.0, 0.0);
        let target = r.target_for(tilt);
        // Inverse mapping puts the target at -x; track the furthest excursion.
        let mut furthest = 0.0f32;
        for _ in 0..240 {
            let p = r.update(tilt, 1.0 / 60.0);
            furthest = furthest.min(p.x);
        }
        assert!(close(r.position(), target, 1e-3));
        // Critically damped: no meaningful travel past the target.
        assert!(furthest >= target.x - 0.02);
    }

    #[test]
    fn spring_leads_a_moving_target() {
        let mut lagging = LightRig::new(LightConfig {
            mode: LightMode::Spring,
            prediction_factor: 0.0,
            ..LightConfig::default()
        });
        let mut leading = rig(LightMode::Spring);
        for i in 0..30 {
            let tilt = Vec2::new(i as f32 * 0.3, 0.0);
            lagging.update(tilt, 1.0 / 60.0);
            leading.update(tilt, 1.0 / 60.0);
        }
        // Inverse mapping: the target runs towards -x.
        assert!(leading.position().x < lagging.position().x);
    }

    #[test]
    fn zero_dt_holds_position() {
        let mut r = rig(LightMode::Spring);
        let before = r.position();
        assert_eq!(r.update(Vec2::new(3.0, 3.0), 0.0), before);
    }
}
