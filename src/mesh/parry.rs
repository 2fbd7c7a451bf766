//! Interop with parry3d tessellations
//!
//! parry3d produces `(vertices, indices)` buffers for its primitive shapes and
//! for convex hulls; these constructors turn them into a [`TriangleMesh`].

use glam::DVec3;
use parry3d::math::Point;
use parry3d::transformation;

use super::TriangleMesh;
use crate::error::Result;

fn to_dvec3(p: &Point<f32>) -> DVec3 {
    DVec3::new(p.x as f64, p.y as f64, p.z as f64)
}

impl TriangleMesh {
    /// Build a mesh from parry3d vertex and index buffers
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_blue_noise::*;
    /// use parry3d::math::Vector;
    /// use parry3d::shape::Cuboid;
    ///
    /// let (vertices, indices) = Cuboid::new(Vector::new(0.5, 0.5, 0.5)).to_trimesh();
    /// let mesh = TriangleMesh::from_parry(&vertices, &indices).unwrap();
    /// assert_eq!(mesh.face_count(), 12);
    /// ```
    pub fn from_parry(vertices: &[Point<f32>], indices: &[[u32; 3]]) -> Result<Self> {
        Self::new(vertices.iter().map(to_dvec3).collect(), indices.to_vec())
    }

    /// Triangulated convex hull of a point set
    ///
    /// Hull vertices may be a reordered subset of the input.
    pub fn convex_hull(points: &[DVec3]) -> Result<Self> {
        let points: Vec<Point<f32>> = points
            .iter()
            .map(|p| Point::new(p.x as f32, p.y as f32, p.z as f32))
            .collect();
        let (vertices, indices) = transformation::convex_hull(&points);
        Self::from_parry(&vertices, &indices)
    }
}
