//! Area-weighted Monte Carlo sampling of mesh surfaces
//!
//! Produces the dense, unstructured point pool the Poisson disk pruner thins
//! out. Faces are picked with probability proportional to their area through
//! a cumulative-area table, then a uniform barycentric point is drawn inside.

use glam::DVec3;
use log::debug;

use crate::cloud::PointSink;
use crate::error::{Result, SamplingError};
use crate::geometry::Triangle;
use crate::mesh::SurfaceMesh;
use crate::random::RandomSource;

/// Largest dense pool the samplers will generate in one call
pub const MAX_POOL_SIZE: usize = 1 << 28;

/// Dense pool size for `expected` output samples oversampled `rate` times
///
/// `None` if the pool is not finite or would exceed [`MAX_POOL_SIZE`].
pub fn pool_size(expected: f64, rate: usize) -> Option<usize> {
    let pool = expected.ceil() * rate as f64;
    if pool.is_finite() && (0.0..=MAX_POOL_SIZE as f64).contains(&pool) {
        Some(pool as usize)
    } else {
        None
    }
}

fn check_pool_size(count: usize) -> Result<()> {
    if count > MAX_POOL_SIZE {
        return Err(SamplingError::InvalidConfig(format!(
            "{} samples requested, at most {} can be generated at once",
            count, MAX_POOL_SIZE
        )));
    }
    Ok(())
}

/// Cumulative face areas for area-proportional face picking
///
/// `cumulative[0]` is 0 and `cumulative[i + 1]` is the summed area of faces
/// `0..=i`, so the table has one more entry than there are faces.
struct AreaTable {
    cumulative: Vec<f64>,
    triangles: Vec<Triangle>,
}

impl AreaTable {
    fn with_capacity(faces: usize) -> Self {
        let mut cumulative = Vec::with_capacity(faces + 1);
        cumulative.push(0.0);
        Self {
            cumulative,
            triangles: Vec::with_capacity(faces),
        }
    }

    fn from_mesh<M: SurfaceMesh + ?Sized>(mesh: &M) -> Self {
        let mut table = Self::with_capacity(mesh.face_count());
        mesh.for_each_face(&mut |tri, area| table.push(*tri, area));
        table
    }

    fn push(&mut self, triangle: Triangle, area: f64) {
        let total = self.total() + area;
        self.cumulative.push(total);
        self.triangles.push(triangle);
    }

    fn total(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    fn validate(&self) -> Result<()> {
        let total = self.total();
        if !(total > 0.0 && total.is_finite()) {
            return Err(SamplingError::InvariantViolation(format!(
                "total area of {} faces is {}",
                self.triangles.len(),
                total
            )));
        }
        Ok(())
    }

    /// Face whose cumulative interval contains `u`
    ///
    /// Picks the first entry strictly greater than `u`, so faces with zero
    /// area are never selected.
    fn pick(&self, u: f64) -> Result<&Triangle> {
        let entry = self.cumulative.partition_point(|&a| a <= u);
        if entry == 0 || entry >= self.cumulative.len() {
            return Err(SamplingError::InvariantViolation(format!(
                "area table search for {} landed outside [0, {}]",
                u,
                self.total()
            )));
        }
        Ok(&self.triangles[entry - 1])
    }

    fn sample<R, S>(&self, count: usize, rng: &mut R, sink: &mut S) -> Result<()>
    where
        R: RandomSource,
        S: PointSink,
    {
        if count == 0 || self.is_empty() {
            return Ok(());
        }
        self.validate()?;

        let total = self.total();
        for _ in 0..count {
            let tri = self.pick(total * rng.uniform_unit())?;
            sink.push(tri.point_at(rng.uniform_barycentric()));
        }
        Ok(())
    }
}

/// Append `count` area-weighted random surface points to `sink`
///
/// A mesh without faces or a zero count produces nothing.
///
/// # Errors
///
/// Returns `InvalidConfig` if `count` exceeds [`MAX_POOL_SIZE`] and
/// `InvariantViolation` if the mesh has faces but no positive total area.
pub fn sample_area_weighted<M, R, S>(mesh: &M, count: usize, rng: &mut R, sink: &mut S) -> Result<()>
where
    M: SurfaceMesh + ?Sized,
    R: RandomSource,
    S: PointSink,
{
    check_pool_size(count)?;
    let table = AreaTable::from_mesh(mesh);
    debug!(
        "monte carlo: {} samples over {} faces (area {:.6})",
        count,
        table.triangles.len(),
        table.total()
    );
    table.sample(count, rng, sink)
}

/// Area-weighted random surface points collected into a new vector
pub fn generate_area_weighted_samples<M, R>(mesh: &M, count: usize, rng: &mut R) -> Result<Vec<DVec3>>
where
    M: SurfaceMesh + ?Sized,
    R: RandomSource,
{
    check_pool_size(count)?;
    let mut points = Vec::new();
    points.try_reserve(count).map_err(|e| {
        SamplingError::InvalidConfig(format!("cannot allocate {} samples: {}", count, e))
    })?;
    sample_area_weighted(mesh, count, rng, &mut points)?;
    Ok(points)
}

/// Append `count` uniform random points inside a single triangle
pub fn sample_triangle<R, S>(triangle: &Triangle, count: usize, rng: &mut R, sink: &mut S)
where
    R: RandomSource,
    S: PointSink,
{
    for _ in 0..count {
        sink.push(triangle.point_at(rng.uniform_barycentric()));
    }
}

/// Area-weighted random points restricted to a subset of faces
///
/// # Errors
///
/// Returns `InvalidMesh` for an unknown face id and `InvariantViolation` if the
/// selected faces have no positive total area.
pub fn sample_selected_faces<M, R, S>(
    mesh: &M,
    faces: &[usize],
    count: usize,
    rng: &mut R,
    sink: &mut S,
) -> Result<()>
where
    M: SurfaceMesh + ?Sized,
    R: RandomSource,
    S: PointSink,
{
    let mut table = AreaTable::with_capacity(faces.len());
    for &face in faces {
        let tri = mesh.triangle(face).ok_or_else(|| {
            SamplingError::InvalidMesh(format!(
                "face {} does not exist (mesh has {} faces)",
                face,
                mesh.face_count()
            ))
        })?;
        table.push(tri, tri.area());
    }
    table.sample(count, rng, sink)
}

/// Append the centroid of every face
pub fn face_centers<M, S>(mesh: &M, sink: &mut S)
where
    M: SurfaceMesh + ?Sized,
    S: PointSink,
{
    mesh.for_each_face(&mut |tri, _| sink.push(tri.centroid()));
}
