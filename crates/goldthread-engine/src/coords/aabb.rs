use super::Vec3;

/// Axis-aligned bounding box in world units.
///
/// `min`/`max` are inclusive. An "empty" box is one where any `min`
/// component exceeds the matching `max` component; [`Aabb::EMPTY`] is the
/// identity for [`Aabb::include`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Degenerate box containing exactly `p`.
    #[inline]
    pub const fn from_point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    /// Smallest box containing all `points`; `None` when the iterator is empty.
    pub fn from_points<I>(points: I) -> Option<Aabb>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let b = points.into_iter().fold(Aabb::EMPTY, Aabb::include);
        if b.is_empty() { None } else { Some(b) }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grows the box so it contains `p`.
    #[inline]
    pub fn include(self, p: Vec3) -> Aabb {
        Aabb::new(self.min.min(p), self.max.max(p))
    }

    #[inline]
    pub fn union(self, other: Aabb) -> Aabb {
        Aabb::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Expands every face outward by `margin`.
    #[inline]
    pub fn grown(self, margin: f32) -> Aabb {
        Aabb::new(self.min - Vec3::splat(margin), self.max + Vec3::splat(margin))
    }

    #[inline]
    pub fn center(self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(self) -> Vec3 {
        self.max - self.min
    }

    /// Closed containment: [min, max].
    #[inline]
    pub fn contains(self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.y >= self.min.y
            && p.z >= self.min.z
            && p.x <= self.max.x
            && p.y <= self.max.y
            && p.z <= self.max.z
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Aabb::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32, z: f32) -> Vec3 { Vec3::new(x, y, z) }

    // ── from_points ───────────────────────────────────────────────────────

    #[test]
    fn from_points_empty_is_none() {
        assert!(Aabb::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn from_points_single_is_degenerate() {
        let b = Aabb::from_points([v(1.0, 2.0, 3.0)]).unwrap();
        assert_eq!(b.min, b.max);
        assert!(!b.is_empty());
    }

    #[test]
    fn from_points_spans_extremes() {
        let b = Aabb::from_points([v(1.0, -1.0, 0.0), v(-2.0, 4.0, 0.5), v(0.0, 0.0, -1.0)])
            .unwrap();
        assert_eq!(b.min, v(-2.0, -1.0, -1.0));
        assert_eq!(b.max, v(1.0, 4.0, 0.5));
    }

    // ── contains ──────────────────────────────────────────────────────────

    #[test]
    fn contains_is_inclusive_on_both_faces() {
        let b = Aabb::new(v(0.0, 0.0, 0.0), v(1.0, 1.0, 1.0));
        assert!(b.contains(v(0.0, 0.0, 0.0)));
        assert!(b.contains(v(1.0, 1.0, 1.0)));
        assert!(!b.contains(v(1.0, 1.0, 1.01)));
    }

    #[test]
    fn empty_contains_nothing() {
        assert!(Aabb::EMPTY.is_empty());
        assert!(!Aabb::EMPTY.contains(Vec3::zero()));
    }

    // ── grown / union ─────────────────────────────────────────────────────

    #[test]
    fn grown_expands_all_faces() {
        let b = Aabb::from_point(Vec3::zero()).grown(0.5);
        assert_eq!(b.size(), Vec3::splat(1.0));
        assert_eq!(b.center(), Vec3::zero());
    }

    #[test]
    fn union_with_empty_is_identity() {
        let b = Aabb::new(v(0.0, 0.0, 0.0), v(2.0, 2.0, 0.0));
        assert_eq!(b.union(Aabb::EMPTY), b);
    }
}
