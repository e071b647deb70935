//! Scene geometry the session consults but does not own.

use goldthread_engine::coords::{Vec2, Vec3};

/// Screen/world mapping and hit tests supplied by the host scene.
pub trait SceneGeometry {
    /// Projects a screen position into the world; `None` when the ray misses.
    fn screen_to_world(&self, screen: Vec2) -> Option<Vec3>;

    /// Whether a press at `screen` lands on the thread anchor.
    fn hits_anchor(&self, screen: Vec2) -> bool;

    /// Whether `world` lies on the deposition surface.
    fn on_surface(&self, world: Vec3) -> bool;

    /// World position of the thread anchor.
    fn anchor(&self) -> Vec3;
}

/// Top-down orthographic view onto a horizontal cloth.
///
/// Screen pixels map linearly onto the plane `z = plane_height`; screen +Y
/// (down) is world -Y. The anchor is hit within a pixel radius of its
/// projected position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneGeometry {
    /// Screen position of the world origin, logical pixels.
    pub screen_origin: Vec2,
    pub pixels_per_unit: f32,
    /// Height of the projection plane.
    pub plane_height: f32,
    pub anchor: Vec3,
    pub anchor_hit_radius: f32,
    /// Cloth extent on the XY plane.
    pub cloth_min: Vec2,
    pub cloth_max: Vec2,
    pub cloth_height: f32,
    /// Allowed distance from `cloth_height` for a point to count as on the cloth.
    pub surface_tolerance: f32,
}

impl PlaneGeometry {
    /// A cloth of `width x height` world units centered under the origin,
    /// with the anchor half a unit off its left edge.
    pub fn centered(viewport: Vec2, pixels_per_unit: f32, width: f32, height: f32) -> Self {
        let half = Vec2::new(width * 0.5, height * 0.5);
        Self {
            screen_origin: viewport * 0.5,
            pixels_per_unit,
            plane_height: 0.0,
            anchor: Vec3::new(-half.x - 0.5, 0.0, 0.0),
            anchor_hit_radius: 50.0,
            cloth_min: -half,
            cloth_max: half,
            cloth_height: 0.0,
            surface_tolerance: 0.1,
        }
    }

    pub fn world_to_screen(&self, world: Vec3) -> Vec2 {
        Vec2::new(
            self.screen_origin.x + world.x * self.pixels_per_unit,
            self.screen_origin.y - world.y * self.pixels_per_unit,
        )
    }
}

impl SceneGeometry for PlaneGeometry {
    fn screen_to_world(&self, screen: Vec2) -> Option<Vec3> {
        if !screen.is_finite() || !self.pixels_per_unit.is_finite() || self.pixels_per_unit <= 0.0 {
            return None;
        }
        let rel = (screen - self.screen_origin) / self.pixels_per_unit;
        let world = Vec3::new(rel.x, -rel.y, self.plane_height);
        world.is_finite().then_some(world)
    }

    fn hits_anchor(&self, screen: Vec2) -> bool {
        self.world_to_screen(self.anchor).distance(screen) <= self.anchor_hit_radius
    }

    fn on_surface(&self, world: Vec3) -> bool {
        (world.z - self.cloth_height).abs() < self.surface_tolerance
            && world.x >= self.cloth_min.x
            && world.x <= self.cloth_max.x
            && world.y >= self.cloth_min.y
            && world.y <= self.cloth_max.y
    }

    fn anchor(&self) -> Vec3 {
        self.anchor
    }
}
