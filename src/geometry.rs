//! Geometric primitives shared by the samplers
//!
//! Axis-aligned boxes, triangles and the Poisson disk radius estimate.

use glam::DVec3;
use std::f64::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Packing density of a maximal Poisson disk set relative to a perfect hexagonal packing
pub const POISSON_DENSITY_FACTOR: f64 = 0.7;

/// Axis-aligned bounding box
///
/// A box with `min > max` on any axis is "null" and contains nothing. Boxes are
/// closed: points on the faces are inside.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: DVec3,
    pub max: DVec3,
}

impl BoundingBox {
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// A null box that grows to fit the first point added to it
    pub fn empty() -> Self {
        Self {
            min: DVec3::splat(f64::INFINITY),
            max: DVec3::splat(f64::NEG_INFINITY),
        }
    }

    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a DVec3>,
    {
        let mut bbox = Self::empty();
        for p in points {
            bbox.add_point(*p);
        }
        bbox
    }

    /// Box around a single point expanded by `radius` on every axis
    pub fn around(center: DVec3, radius: f64) -> Self {
        Self {
            min: center - DVec3::splat(radius),
            max: center + DVec3::splat(radius),
        }
    }

    pub fn add_point(&mut self, point: DVec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn is_null(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    /// Inflate the box by `margin` on every side
    pub fn offset(&self, margin: f64) -> Self {
        Self {
            min: self.min - DVec3::splat(margin),
            max: self.max + DVec3::splat(margin),
        }
    }

    pub fn size(&self) -> DVec3 {
        if self.is_null() {
            DVec3::ZERO
        } else {
            self.max - self.min
        }
    }

    pub fn diagonal(&self) -> f64 {
        self.size().length()
    }

    /// True if the two closed boxes overlap (touching counts)
    pub fn collide(&self, other: &BoundingBox) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    pub fn contains(&self, point: DVec3) -> bool {
        self.min.cmple(point).all() && point.cmple(self.max).all()
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

/// A triangle in 3D space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub a: DVec3,
    pub b: DVec3,
    pub c: DVec3,
}

impl Triangle {
    pub fn new(a: DVec3, b: DVec3, c: DVec3) -> Self {
        Self { a, b, c }
    }

    pub fn area(&self) -> f64 {
        0.5 * (self.b - self.a).cross(self.c - self.a).length()
    }

    pub fn centroid(&self) -> DVec3 {
        (self.a + self.b + self.c) / 3.0
    }

    /// Point at barycentric coordinates `[u, v, w]` relative to `a`, `b`, `c`
    pub fn point_at(&self, bary: [f64; 3]) -> DVec3 {
        self.a * bary[0] + self.b * bary[1] + self.c * bary[2]
    }
}

/// Estimate the disk radius that yields roughly `count` samples over `area`
///
/// Returns infinity when `count` is zero.
pub fn poisson_disk_radius(area: f64, count: usize) -> f64 {
    (area / (POISSON_DENSITY_FACTOR * PI * count as f64)).sqrt()
}

/// Inverse of [`poisson_disk_radius`]: expected sample count for a disk radius
pub fn expected_sample_count(area: f64, radius: f64) -> f64 {
    area / (POISSON_DENSITY_FACTOR * PI * radius * radius)
}
