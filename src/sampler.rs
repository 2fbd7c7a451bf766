//! MeshSampler main structure

use glam::DVec3;
use log::{debug, warn};

use crate::cloud::PointCloud;
use crate::config::SamplingConfig;
use crate::error::{Result, SamplingError};
use crate::geometry::expected_sample_count;
use crate::mesh::SurfaceMesh;
use crate::random::{RandomSource, SamplingRng};
use crate::sampling::{self, Calibration};

/// Blue-noise sampler bound to a configuration and its own generator
///
/// The generator is seeded from `config.seed`, so two samplers built from the
/// same configuration produce identical output for the same sequence of
/// calls. Successive calls on one sampler continue the random stream.
///
/// # Examples
///
/// ```
/// use mesh_blue_noise::*;
///
/// let mesh = TriangleMesh::new(
///     vec![
///         DVec3::new(0.0, 0.0, 0.0),
///         DVec3::new(1.0, 0.0, 0.0),
///         DVec3::new(1.0, 1.0, 0.0),
///         DVec3::new(0.0, 1.0, 0.0),
///     ],
///     vec![[0, 1, 2], [0, 2, 3]],
/// )
/// .unwrap();
///
/// let config = SamplingConfigBuilder::new().seed(7).build().unwrap();
/// let mut sampler = MeshSampler::new(config);
///
/// let points = sampler.sample_to_radius(&mesh, 0.1).unwrap();
/// println!("Generated {} samples", points.len());
/// ```
#[derive(Debug, Clone)]
pub struct MeshSampler {
    /// Configuration this sampler was built with
    config: SamplingConfig,

    /// Generator driving every random draw
    rng: SamplingRng,
}

impl MeshSampler {
    /// Create a sampler whose generator is seeded from `config.seed`
    pub fn new(config: SamplingConfig) -> Self {
        Self {
            rng: SamplingRng::seeded(config.seed),
            config,
        }
    }

    /// Create a sampler driven by an existing generator
    ///
    /// `config.seed` is ignored.
    pub fn with_rng(config: SamplingConfig, rng: SamplingRng) -> Self {
        Self { config, rng }
    }

    #[inline]
    pub fn config(&self) -> &SamplingConfig {
        &self.config
    }

    #[inline]
    pub fn rng_mut(&mut self) -> &mut SamplingRng {
        &mut self.rng
    }

    /// Blue-noise samples with no pruned point closer than `radius` to another
    ///
    /// Mesh vertices are always part of the output.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRadius` unless `radius` is positive and finite or when
    /// the radius is so small that the dense pool would exceed
    /// [`sampling::MAX_POOL_SIZE`], and `InvariantViolation` for meshes whose
    /// faces have no area.
    pub fn sample_to_radius<M>(&mut self, mesh: &M, radius: f64) -> Result<PointCloud>
    where
        M: SurfaceMesh + ?Sized,
    {
        sample_to_radius(mesh, radius, &self.config, &mut self.rng)
    }

    /// Blue-noise samples numbering about `target`
    ///
    /// See [`sampling::calibrate_for_count`] for the search and its failure modes.
    pub fn sample_to_count<M>(&mut self, mesh: &M, target: usize) -> Result<Calibration>
    where
        M: SurfaceMesh + ?Sized,
    {
        sample_to_count(mesh, target, &self.config, &mut self.rng)
    }

    /// Area-weighted random samples without any spacing guarantee
    pub fn sample_dense<M>(&mut self, mesh: &M, count: usize) -> Result<PointCloud>
    where
        M: SurfaceMesh + ?Sized,
    {
        sample_dense(mesh, count, &mut self.rng)
    }

    /// Poisson disk subset of a caller-provided pool
    pub fn prune<M>(&mut self, dense: &[DVec3], mesh: &M, radius: f64) -> Result<PointCloud>
    where
        M: SurfaceMesh + ?Sized,
    {
        prune(dense, mesh, radius, &self.config, &mut self.rng)
    }
}

impl Default for MeshSampler {
    fn default() -> Self {
        Self::new(SamplingConfig::default())
    }
}

/// Radius-driven sampling with an explicit generator
///
/// The dense pool holds `ceil(expected_sample_count(area, radius)) *
/// montecarlo_rate` points.
pub fn sample_to_radius<M, R>(
    mesh: &M,
    radius: f64,
    config: &SamplingConfig,
    rng: &mut R,
) -> Result<PointCloud>
where
    M: SurfaceMesh + ?Sized,
    R: RandomSource,
{
    if !(radius > 0.0 && radius.is_finite()) {
        return Err(SamplingError::InvalidRadius(radius));
    }

    let expected = expected_sample_count(mesh.total_area(), radius);
    let pool_size = sampling::pool_size(expected, config.montecarlo_rate).ok_or_else(|| {
        warn!(
            "sample to radius {:e}: ~{:.0} expected samples exceed the pool limit",
            radius, expected
        );
        SamplingError::InvalidRadius(radius)
    })?;
    debug!(
        "sample to radius {:.6}: expecting ~{:.0} samples from a pool of {}",
        radius, expected, pool_size
    );

    let dense = sampling::generate_area_weighted_samples(mesh, pool_size, rng)?;
    prune(&dense, mesh, radius, config, rng)
}

/// Count-driven sampling with an explicit generator
pub fn sample_to_count<M, R>(
    mesh: &M,
    target: usize,
    config: &SamplingConfig,
    rng: &mut R,
) -> Result<Calibration>
where
    M: SurfaceMesh + ?Sized,
    R: RandomSource,
{
    sampling::calibrate_for_count(mesh, target, config, rng)
}

/// Dense area-weighted sampling into a new point cloud
pub fn sample_dense<M, R>(mesh: &M, count: usize, rng: &mut R) -> Result<PointCloud>
where
    M: SurfaceMesh + ?Sized,
    R: RandomSource,
{
    Ok(PointCloud::from(sampling::generate_area_weighted_samples(
        mesh, count, rng,
    )?))
}

/// Poisson disk pruning into a new point cloud
pub fn prune<M, R>(
    dense: &[DVec3],
    mesh: &M,
    radius: f64,
    config: &SamplingConfig,
    rng: &mut R,
) -> Result<PointCloud>
where
    M: SurfaceMesh + ?Sized,
    R: RandomSource,
{
    let mut cloud = PointCloud::new();
    sampling::prune(dense, mesh, radius, &config.prune_options(), rng, &mut cloud)?;
    Ok(cloud)
}
