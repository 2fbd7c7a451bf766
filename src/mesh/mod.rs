//! Triangle mesh access for the samplers
//!
//! The samplers only need to walk faces (with their area) and vertices and to
//! know the overall bounding box. Anything that can provide that implements
//! [`SurfaceMesh`]; [`TriangleMesh`] is the indexed mesh shipped with the crate.

mod parry;

use glam::DVec3;

use crate::error::{Result, SamplingError};
use crate::geometry::{BoundingBox, Triangle};

/// Read-only view of a triangulated surface
///
/// Face and vertex enumeration order must be stable between calls, since the
/// Monte Carlo area table and the vertex seeding both depend on it.
pub trait SurfaceMesh {
    /// Bounding box of all vertices
    fn bounding_box(&self) -> BoundingBox;

    /// Visit every face with its area, in enumeration order
    fn for_each_face(&self, visit: &mut dyn FnMut(&Triangle, f64));

    /// Visit every vertex position, in enumeration order
    fn for_each_vertex(&self, visit: &mut dyn FnMut(DVec3));

    fn face_count(&self) -> usize;

    fn vertex_count(&self) -> usize;

    /// Geometry of a single face, `None` if the id is out of range
    fn triangle(&self, face: usize) -> Option<Triangle>;

    /// Sum of all face areas
    fn total_area(&self) -> f64 {
        let mut area = 0.0;
        self.for_each_face(&mut |_, a| area += a);
        area
    }
}

/// Indexed triangle mesh
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    vertices: Vec<DVec3>,
    faces: Vec<[u32; 3]>,
    bbox: BoundingBox,
}

impl TriangleMesh {
    /// Build a mesh from vertex positions and triangle indices
    ///
    /// # Errors
    ///
    /// Returns `InvalidMesh` if any face refers to a vertex that does not exist.
    pub fn new(vertices: Vec<DVec3>, faces: Vec<[u32; 3]>) -> Result<Self> {
        if let Some((face_id, face)) = faces
            .iter()
            .enumerate()
            .find(|(_, f)| f.iter().any(|&i| i as usize >= vertices.len()))
        {
            return Err(SamplingError::InvalidMesh(format!(
                "face {} references vertex {:?} but the mesh has {} vertices",
                face_id,
                face,
                vertices.len()
            )));
        }

        let bbox = BoundingBox::from_points(&vertices);
        Ok(Self {
            vertices,
            faces,
            bbox,
        })
    }

    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty() && self.vertices.is_empty()
    }

    fn face_triangle(&self, face: &[u32; 3]) -> Triangle {
        Triangle::new(
            self.vertices[face[0] as usize],
            self.vertices[face[1] as usize],
            self.vertices[face[2] as usize],
        )
    }
}

impl SurfaceMesh for TriangleMesh {
    fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    fn for_each_face(&self, visit: &mut dyn FnMut(&Triangle, f64)) {
        for face in &self.faces {
            let tri = self.face_triangle(face);
            visit(&tri, tri.area());
        }
    }

    fn for_each_vertex(&self, visit: &mut dyn FnMut(DVec3)) {
        for v in &self.vertices {
            visit(*v);
        }
    }

    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn triangle(&self, face: usize) -> Option<Triangle> {
        self.faces.get(face).map(|f| self.face_triangle(f))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Unit square in the XY plane split into two triangles
    pub(crate) fn unit_square() -> TriangleMesh {
        TriangleMesh::new(
            vec![
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(1.0, 0.0, 0.0),
                DVec3::new(1.0, 1.0, 0.0),
                DVec3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap()
    }

    /// Square of side `side` subdivided into a regular `n x n` grid of quads
    pub(crate) fn tessellated_square(side: f64, n: u32) -> TriangleMesh {
        let mut vertices = Vec::new();
        for j in 0..=n {
            for i in 0..=n {
                vertices.push(DVec3::new(
                    side * i as f64 / n as f64,
                    side * j as f64 / n as f64,
                    0.0,
                ));
            }
        }
        let mut faces = Vec::new();
        for j in 0..n {
            for i in 0..n {
                let v0 = j * (n + 1) + i;
                let v1 = v0 + 1;
                let v2 = v0 + n + 2;
                let v3 = v0 + n + 1;
                faces.push([v0, v1, v2]);
                faces.push([v0, v2, v3]);
            }
        }
        TriangleMesh::new(vertices, faces).unwrap()
    }

    #[test]
    fn test_unit_square_area() {
        let mesh = unit_square();
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.vertex_count(), 4);
        assert!((mesh.total_area() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bounding_box() {
        let mesh = tessellated_square(3.0, 4);
        let bbox = mesh.bounding_box();
        assert_eq!(bbox.min, DVec3::ZERO);
        assert_eq!(bbox.max, DVec3::new(3.0, 3.0, 0.0));
        assert!((mesh.total_area() - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_face_index() {
        let result = TriangleMesh::new(vec![DVec3::ZERO, DVec3::X], vec![[0, 1, 2]]);
        assert!(matches!(result, Err(SamplingError::InvalidMesh(_))));
    }

    #[test]
    fn test_enumeration_order() {
        let mesh = unit_square();
        let mut visited = Vec::new();
        mesh.for_each_vertex(&mut |v| visited.push(v));
        assert_eq!(visited, mesh.vertices());

        let mut areas = Vec::new();
        mesh.for_each_face(&mut |tri, area| {
            assert!((tri.area() - area).abs() < 1e-12);
            areas.push(area);
        });
        assert_eq!(areas.len(), 2);
    }

    #[test]
    fn test_triangle_lookup() {
        let mesh = unit_square();
        let tri = mesh.triangle(1).unwrap();
        assert_eq!(tri.c, DVec3::new(0.0, 1.0, 0.0));
        assert!(mesh.triangle(2).is_none());
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = TriangleMesh::default();
        assert!(mesh.is_empty());
        assert!(mesh.bounding_box().is_null());
        assert_eq!(mesh.total_area(), 0.0);
    }
}
