//! Point cloud output

use glam::DVec3;

use crate::geometry::BoundingBox;

/// Destination for sampled points
///
/// The samplers only append; callers decide whether to clear between runs.
pub trait PointSink {
    fn clear(&mut self);
    fn push(&mut self, point: DVec3);
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PointSink for Vec<DVec3> {
    fn clear(&mut self) {
        Vec::clear(self)
    }

    fn push(&mut self, point: DVec3) {
        Vec::push(self, point)
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }
}

/// An ordered set of sampled surface points
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    points: Vec<DVec3>,
}

impl PointCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DVec3> {
        self.points.iter()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
    }

    pub fn into_points(self) -> Vec<DVec3> {
        self.points
    }
}

impl PointSink for PointCloud {
    fn clear(&mut self) {
        self.points.clear();
    }

    fn push(&mut self, point: DVec3) {
        self.points.push(point);
    }

    fn len(&self) -> usize {
        self.points.len()
    }
}

impl From<Vec<DVec3>> for PointCloud {
    fn from(points: Vec<DVec3>) -> Self {
        Self { points }
    }
}

impl<'a> IntoIterator for &'a PointCloud {
    type Item = &'a DVec3;
    type IntoIter = std::slice::Iter<'a, DVec3>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
