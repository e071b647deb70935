//! Coverage tracking.
//!
//! A [`RegionIndex`] records the material laid down by the path currently
//! being built, as evenly spaced samples along its segments. When a path is
//! committed its samples become a [`CoveragePatch`] in a [`CoverageStore`],
//! which later paths query to avoid crossing finished material.
//!
//! Queries are linear scans. A single path holds at most
//! `length / sample_step` samples and the store tests each patch's bounds
//! before scanning it, which is plenty at craft scale. Very long sessions
//! would want a grid here.

use goldthread_engine::coords::{Aabb, Vec3};

use crate::config::CoverageConfig;

/// Continuity tolerance when a segment starts where the previous one ended.
const JOIN_EPSILON: f32 = 1e-5;
/// Absorbs rounding so a sample due exactly at a segment end is not lost.
const STEP_EPSILON: f32 = 1e-6;

/// Append-only sample set for the active path.
#[derive(Debug, Clone)]
pub struct RegionIndex {
    radius: f32,
    step: f32,
    samples: Vec<Vec3>,
    /// Path length travelled since the last sample position.
    carry: f32,
    last_end: Option<Vec3>,
}

impl RegionIndex {
    pub fn new(config: CoverageConfig) -> Self {
        Self {
            radius: config.sample_radius,
            step: config.sample_step.min(config.sample_radius * 0.5),
            samples: Vec::new(),
            carry: 0.0,
            last_end: None,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Spacing actually used between samples.
    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn samples(&self) -> &[Vec3] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples the segment `start..end`; returns how many samples were stored.
    ///
    /// Spacing is measured along the path, continuing across consecutive
    /// segments, so the result does not depend on how a polyline is split.
    /// Candidates closer than `radius / 3` to a stored sample are skipped.
    /// A segment that does not continue the previous one stores its start.
    pub fn insert_segment(&mut self, start: Vec3, end: Vec3) -> usize {
        let before = self.samples.len();

        let continues = self
            .last_end
            .is_some_and(|prev| prev.distance(start) <= JOIN_EPSILON);
        if !continues {
            self.try_push(start);
            self.carry = 0.0;
        }

        let len = start.distance(end);
        if len > 0.0 {
            let dir = (end - start) / len;
            let mut d = self.step - self.carry;
            let mut last_placed = None;
            while d <= len + STEP_EPSILON {
                self.try_push(start + dir * d);
                last_placed = Some(d);
                d += self.step;
            }
            self.carry = match last_placed {
                Some(at) => len - at,
                None => self.carry + len,
            };
        }

        self.last_end = Some(end);
        self.samples.len() - before
    }

    /// True if any sample lies within `radius` of `p`.
    pub fn overlaps(&self, p: Vec3) -> bool {
        let r2 = self.radius * self.radius;
        self.samples.iter().any(|s| s.distance_squared(p) <= r2)
    }

    /// Axis-aligned bounds of all samples; `None` while empty.
    pub fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(self.samples.iter().copied())
    }

    /// Moves the samples out into a patch, leaving the index empty.
    pub fn take_patch(&mut self) -> Option<CoveragePatch> {
        let bounds = self.bounding_box()?;
        let samples = std::mem::take(&mut self.samples);
        self.clear();
        Some(CoveragePatch { bounds, samples })
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.carry = 0.0;
        self.last_end = None;
    }

    fn try_push(&mut self, p: Vec3) -> bool {
        let min = self.radius / 3.0;
        let min2 = min * min;
        if self.samples.iter().any(|s| s.distance_squared(p) < min2) {
            return false;
        }
        self.samples.push(p);
        true
    }
}

/// Coverage of one committed path.
#[derive(Debug, Clone, PartialEq)]
pub struct CoveragePatch {
    pub bounds: Aabb,
    pub samples: Vec<Vec3>,
}

impl CoveragePatch {
    pub fn overlaps(&self, p: Vec3, radius: f32) -> bool {
        if !self.bounds.grown(radius).contains(p) {
            return false;
        }
        let r2 = radius * radius;
        self.samples.iter().any(|s| s.distance_squared(p) <= r2)
    }
}

/// Persistent coverage shared across paths.
pub trait CoverageStore {
    /// True if `p` lies on material committed by an earlier path.
    fn overlaps(&self, p: Vec3) -> bool;

    fn commit(&mut self, patch: CoveragePatch);
}

/// In-memory [`CoverageStore`].
#[derive(Debug, Clone)]
pub struct CommittedCoverage {
    radius: f32,
    patches: Vec<CoveragePatch>,
}

impl CommittedCoverage {
    pub fn new(config: CoverageConfig) -> Self {
        Self { radius: config.sample_radius, patches: Vec::new() }
    }

    pub fn patches(&self) -> &[CoveragePatch] {
        &self.patches
    }

    pub fn total_samples(&self) -> usize {
        self.patches.iter().map(|p| p.samples.len()).sum()
    }

    pub fn clear(&mut self) {
        self.patches.clear();
    }
}

impl CoverageStore for CommittedCoverage {
    fn overlaps(&self, p: Vec3) -> bool {
        self.patches.iter().any(|patch| patch.overlaps(p, self.radius))
    }

    fn commit(&mut self, patch: CoveragePatch) {
        log::debug!(
            "coverage: committed patch #{} with {} samples",
            self.patches.len(),
            patch.samples.len()
        );
        self.patches.push(patch);
    }
}
