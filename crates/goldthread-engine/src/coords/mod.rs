//! Coordinate and geometry types shared by the input layer and the craft core.
//!
//! Two spaces are in play:
//! - screen space: logical pixels, origin top-left, +X right, +Y down ([`Vec2`])
//! - world space: deposition surface on the XY plane, +Z up ([`Vec3`], [`Aabb`])
//!
//! Mapping between them is owned by the scene-geometry collaborator, not here.

mod aabb;
mod vec2;
mod vec3;

pub use aabb::Aabb;
pub use vec2::Vec2;
pub use vec3::Vec3;
