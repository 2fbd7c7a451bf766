//! Disk radius calibration for a target sample count
//!
//! Larger radii give fewer samples. The calibrator first brackets the target
//! between a small radius (too many samples) and a large one (too few), then
//! bisects until the count falls inside the tolerance band or the iteration
//! budget runs out. Every trial draws a fresh Monte Carlo pool.

use log::{debug, warn};
use std::time::Instant;

use super::montecarlo::{generate_area_weighted_samples, pool_size, MAX_POOL_SIZE};
use super::pruning::prune;
use crate::cloud::PointCloud;
use crate::config::SamplingConfig;
use crate::error::{Result, SamplingError};
use crate::mesh::SurfaceMesh;
use crate::random::RandomSource;

/// Initial radius guess as a fraction of the bounding box diagonal
const INITIAL_RADIUS_FRACTION: f64 = 1.0 / 50.0;

/// Result of a count-targeted sampling run
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    /// Samples produced by the final trial
    pub points: PointCloud,
    /// Disk radius of the final trial
    pub radius: f64,
    /// Bisection steps taken (bracketing trials not included)
    pub iterations: usize,
}

impl Calibration {
    pub fn count(&self) -> usize {
        self.points.len()
    }
}

/// Slack for representation error in `target * (1 +- tolerance)`
const BAND_EPSILON: f64 = 1e-9;

/// Inclusive sample count band accepted as converged
///
/// The integers within `[target * (1 - tolerance), target * (1 + tolerance)]`;
/// always contains `target`.
pub fn tolerance_band(target: usize, tolerance: f64) -> (usize, usize) {
    let t = target as f64;
    let lo = (t * (1.0 - tolerance) - BAND_EPSILON).ceil().max(0.0) as usize;
    let hi = (t * (1.0 + tolerance) + BAND_EPSILON).floor() as usize;
    (lo, hi)
}

/// Closest count to the target seen so far, reported on failure
struct BestTrial {
    radius: f64,
    count: usize,
    target: usize,
}

impl BestTrial {
    fn new(target: usize) -> Self {
        Self {
            radius: 0.0,
            count: 0,
            target,
        }
    }

    fn offer(&mut self, radius: f64, count: usize) {
        if self.radius == 0.0 || count.abs_diff(self.target) < self.count.abs_diff(self.target) {
            self.radius = radius;
            self.count = count;
        }
    }

    fn failure(&self) -> SamplingError {
        SamplingError::CalibrationFailure {
            radius: self.radius,
            count: self.count,
            target: self.target,
        }
    }
}

/// Sample `mesh` with a disk radius tuned so the output has about `target` points
///
/// The dense pool for every trial holds `target * montecarlo_rate` points.
/// When the bisection budget is exhausted the last trial is returned as is.
///
/// # Errors
///
/// Returns `CalibrationFailure` if either bracketing search exceeds
/// `max_bracket_steps`, e.g. when the mesh has more vertices than `target`,
/// or if the mesh has no spatial extent to derive a radius from.
/// Returns `InvalidConfig` if `target * montecarlo_rate` exceeds
/// [`MAX_POOL_SIZE`]. Monte Carlo and pruning errors are propagated.
pub fn calibrate_for_count<M, R>(
    mesh: &M,
    target: usize,
    config: &SamplingConfig,
    rng: &mut R,
) -> Result<Calibration>
where
    M: SurfaceMesh + ?Sized,
    R: RandomSource,
{
    if target == 0 || (mesh.face_count() == 0 && mesh.vertex_count() == 0) {
        return Ok(Calibration {
            points: PointCloud::new(),
            radius: 0.0,
            iterations: 0,
        });
    }

    let pool_size = pool_size(target as f64, config.montecarlo_rate).ok_or_else(|| {
        SamplingError::InvalidConfig(format!(
            "a pool of {} x {} samples exceeds the limit of {}",
            target, config.montecarlo_rate, MAX_POOL_SIZE
        ))
    })?;
    let prune_options = config.prune_options();
    let mut best = BestTrial::new(target);

    let trial = |radius: f64, rng: &mut R| -> Result<PointCloud> {
        let start = Instant::now();
        let dense = generate_area_weighted_samples(mesh, pool_size, rng)?;
        let mut cloud = PointCloud::with_capacity(target);
        prune(&dense, mesh, radius, &prune_options, rng, &mut cloud)?;
        debug!(
            "calibration trial: radius {:.6} -> {} samples (target {}) in {:?}",
            radius,
            cloud.len(),
            target,
            start.elapsed()
        );
        Ok(cloud)
    };

    let initial = mesh.bounding_box().diagonal() * INITIAL_RADIUS_FRACTION;
    if !(initial > 0.0 && initial.is_finite()) {
        warn!("calibration: mesh extent {} gives no usable starting radius", initial);
        return Err(best.failure());
    }

    // Shrink until there are more samples than requested
    let mut min_radius = initial;
    let mut steps = 0;
    loop {
        if steps == config.max_bracket_steps {
            warn!("calibration: no radius below {:.6} exceeds {} samples", min_radius, target);
            return Err(best.failure());
        }
        steps += 1;
        min_radius /= 2.0;
        let count = trial(min_radius, rng)?.len();
        best.offer(min_radius, count);
        if count > target {
            break;
        }
    }

    // Grow until there are fewer samples than requested
    let mut max_radius = initial;
    let mut points;
    steps = 0;
    loop {
        if steps == config.max_bracket_steps {
            warn!("calibration: no radius above {:.6} stays under {} samples", max_radius, target);
            return Err(best.failure());
        }
        steps += 1;
        max_radius *= 2.0;
        points = trial(max_radius, rng)?;
        best.offer(max_radius, points.len());
        if points.len() < target {
            break;
        }
    }

    let (lo, hi) = tolerance_band(target, config.tolerance);
    let mut radius = max_radius;
    let mut iterations = 0;
    while iterations < config.max_iterations && !(lo..=hi).contains(&points.len()) {
        iterations += 1;
        radius = 0.5 * (min_radius + max_radius);
        points = trial(radius, rng)?;

        let count = points.len();
        if count > target {
            min_radius = radius;
        } else if count < target {
            max_radius = radius;
        }
    }

    if (lo..=hi).contains(&points.len()) {
        debug!(
            "calibration converged: radius {:.6}, {} samples after {} iterations",
            radius,
            points.len(),
            iterations
        );
    } else {
        warn!(
            "calibration stopped after {} iterations: {} samples outside [{}, {}]",
            iterations,
            points.len(),
            lo,
            hi
        );
    }

    Ok(Calibration {
        points,
        radius,
        iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SamplingConfigBuilder;
    use crate::mesh::tests::{tessellated_square, unit_square};
    use crate::mesh::TriangleMesh;
    use crate::random::SamplingRng;
    use glam::DVec3;

    fn config(tolerance: f64, max_iterations: usize) -> SamplingConfig {
        SamplingConfigBuilder::new()
            .seed(1)
            .tolerance(tolerance)
            .unwrap()
            .max_iterations(max_iterations)
            .build()
            .unwrap()
    }

    #[test]
    fn test_tolerance_band() {
        assert_eq!(tolerance_band(500, 0.05), (475, 525));
        assert_eq!(tolerance_band(1000, 0.005), (995, 1005));
        assert_eq!(tolerance_band(10, 0.0), (10, 10));
        assert_eq!(tolerance_band(7, 0.05), (7, 7));
        assert_eq!(tolerance_band(100, 0.999), (1, 199));
    }

    #[test]
    fn test_converges_to_target() {
        let mesh = unit_square();
        let mut rng = SamplingRng::seeded(2);
        let result = calibrate_for_count(&mesh, 500, &config(0.05, 30), &mut rng).unwrap();

        assert!(
            (475..=525).contains(&result.count()),
            "got {} samples at radius {}",
            result.count(),
            result.radius
        );
        assert!(result.radius > 0.0);
        assert!(result.iterations <= 30);
    }

    #[test]
    fn test_converged_points_respect_radius() {
        let mesh = tessellated_square(2.0, 2);
        let mut rng = SamplingRng::seeded(3);
        let result = calibrate_for_count(&mesh, 200, &config(0.1, 30), &mut rng).unwrap();

        let points = result.points.points();
        let skip = mesh.vertex_count();
        for i in skip..points.len() {
            for j in 0..points.len() {
                if i != j {
                    assert!(points[i].distance(points[j]) >= result.radius);
                }
            }
        }
    }

    #[test]
    fn test_returns_last_trial_when_budget_exhausted() {
        let mesh = unit_square();
        let mut rng = SamplingRng::seeded(4);
        let result = calibrate_for_count(&mesh, 300, &config(0.0, 0), &mut rng).unwrap();

        // No bisection: the result is the last upper-bracket trial
        assert_eq!(result.iterations, 0);
        assert!(result.count() < 300);
        assert!(result.radius > 0.0);
    }

    #[test]
    fn test_too_many_vertices_is_calibration_failure() {
        let mesh = tessellated_square(1.0, 10);
        let mut rng = SamplingRng::seeded(5);
        let config = SamplingConfigBuilder::new()
            .seed(5)
            .max_bracket_steps(6)
            .unwrap()
            .build()
            .unwrap();

        // 121 vertices are always kept, so 50 samples can never be undercut
        let result = calibrate_for_count(&mesh, 50, &config, &mut rng);
        match result {
            Err(SamplingError::CalibrationFailure { count, target, radius }) => {
                assert_eq!(target, 50);
                assert_eq!(count, 121);
                assert!(radius > 0.0);
            }
            other => panic!("expected calibration failure, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_target_and_empty_mesh() {
        let mut rng = SamplingRng::seeded(6);
        let result = calibrate_for_count(&unit_square(), 0, &config(0.05, 10), &mut rng).unwrap();
        assert_eq!(result.count(), 0);

        let result =
            calibrate_for_count(&TriangleMesh::default(), 100, &config(0.05, 10), &mut rng).unwrap();
        assert_eq!(result.count(), 0);
        assert_eq!(result.radius, 0.0);
    }

    #[test]
    fn test_coincident_vertices_are_calibration_failure() {
        let mesh = TriangleMesh::new(vec![DVec3::ONE; 3], vec![]).unwrap();
        let mut rng = SamplingRng::seeded(9);
        let result = calibrate_for_count(&mesh, 10, &config(0.05, 10), &mut rng);
        assert!(matches!(
            result,
            Err(SamplingError::CalibrationFailure { target: 10, .. })
        ));
    }

    #[test]
    fn test_oversized_target_is_invalid_config() {
        let mut rng = SamplingRng::seeded(10);
        let result = calibrate_for_count(&unit_square(), usize::MAX / 4, &config(0.05, 10), &mut rng);
        assert!(matches!(result, Err(SamplingError::InvalidConfig(_))));

        let result = calibrate_for_count(&unit_square(), MAX_POOL_SIZE, &config(0.05, 10), &mut rng);
        assert!(matches!(result, Err(SamplingError::InvalidConfig(_))));
    }

    #[test]
    fn test_degenerate_mesh_propagates_invariant_violation() {
        let mesh = TriangleMesh::new(
            vec![DVec3::ZERO, DVec3::X, DVec3::new(2.0, 0.0, 0.0)],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let mut rng = SamplingRng::seeded(7);
        let result = calibrate_for_count(&mesh, 100, &config(0.05, 10), &mut rng);
        assert!(matches!(result, Err(SamplingError::InvariantViolation(_))));
    }

    #[test]
    fn test_determinism_under_fixed_seed() {
        let mesh = unit_square();
        let a = calibrate_for_count(&mesh, 100, &config(0.05, 20), &mut SamplingRng::seeded(8)).unwrap();
        let b = calibrate_for_count(&mesh, 100, &config(0.05, 20), &mut SamplingRng::seeded(8)).unwrap();
        assert_eq!(a, b);
    }
}
