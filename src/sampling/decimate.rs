//! Uniform simplification of an existing point cloud
//!
//! Reuses the Poisson disk pruner on a caller-provided cloud with no mesh
//! vertices to seed, so the surviving points are evenly spread.

use glam::DVec3;
use log::debug;

use super::pruning::{prune, CandidateStrategy, PruneOptions};
use crate::cloud::PointSink;
use crate::error::Result;
use crate::geometry::BoundingBox;
use crate::mesh::TriangleMesh;
use crate::random::RandomSource;

/// Bisection steps spent searching the spacing for a target count
const DECIMATION_STEPS: usize = 40;

fn options() -> PruneOptions {
    PruneOptions {
        strategy: CandidateStrategy::FirstAvailable,
        ..Default::default()
    }
}

/// Subset of `points` in which no two points are closer than `min_distance`
///
/// Returns the number of points appended to `sink`.
///
/// # Errors
///
/// Returns `InvalidRadius` unless `min_distance` is positive and finite.
pub fn decimate_uniform<R, S>(
    points: &[DVec3],
    min_distance: f64,
    rng: &mut R,
    sink: &mut S,
) -> Result<usize>
where
    R: RandomSource,
    S: PointSink,
{
    prune(points, &TriangleMesh::default(), min_distance, &options(), rng, sink)
}

/// Evenly spread subset of `points` with about `target` members
///
/// Bisects the spacing between zero and the cloud's bounding box diagonal and
/// returns the subset whose size came closest to `target`. Clouds that
/// already have at most `target` points are returned whole.
pub fn decimate_to_count<R>(points: &[DVec3], target: usize, rng: &mut R) -> Result<Vec<DVec3>>
where
    R: RandomSource,
{
    if target >= points.len() {
        return Ok(points.to_vec());
    }
    if target == 0 {
        return Ok(Vec::new());
    }

    let extent = BoundingBox::from_points(points).diagonal();
    if !(extent > 0.0) {
        return Ok(points[..1].to_vec());
    }

    let mut lo = 0.0;
    let mut hi = extent;
    let mut best: Vec<DVec3> = Vec::new();

    for _ in 0..DECIMATION_STEPS {
        let mid = 0.5 * (lo + hi);
        let mut kept = Vec::with_capacity(target);
        decimate_uniform(points, mid, rng, &mut kept)?;

        let n = kept.len();
        if best.is_empty() || n.abs_diff(target) < best.len().abs_diff(target) {
            best = kept;
        }
        match n {
            n if n > target => lo = mid,
            n if n < target => hi = mid,
            _ => break,
        }
    }

    debug!(
        "decimate: {} points -> {} (target {})",
        points.len(),
        best.len(),
        target
    );
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SamplingError;
    use crate::mesh::tests::unit_square;
    use crate::random::SamplingRng;
    use crate::sampling::montecarlo::generate_area_weighted_samples;

    fn dense(count: usize) -> Vec<DVec3> {
        generate_area_weighted_samples(&unit_square(), count, &mut SamplingRng::seeded(1)).unwrap()
    }

    #[test]
    fn test_decimate_uniform_spacing() {
        let points = dense(3000);
        let mut kept = Vec::new();
        let n = decimate_uniform(&points, 0.05, &mut SamplingRng::seeded(2), &mut kept).unwrap();
        assert_eq!(n, kept.len());
        assert!(n > 50 && n < 3000);
        for i in 0..kept.len() {
            for j in (i + 1)..kept.len() {
                assert!(kept[i].distance(kept[j]) >= 0.05);
            }
        }
        assert!(kept.iter().all(|p| points.contains(p)));
    }

    #[test]
    fn test_decimate_to_count() {
        let points = dense(5000);
        let kept = decimate_to_count(&points, 200, &mut SamplingRng::seeded(3)).unwrap();
        assert!((180..=220).contains(&kept.len()), "got {}", kept.len());
    }

    #[test]
    fn test_decimate_small_targets() {
        let points = dense(100);
        let mut rng = SamplingRng::seeded(4);
        assert_eq!(decimate_to_count(&points, 100, &mut rng).unwrap(), points);
        assert_eq!(decimate_to_count(&points, 500, &mut rng).unwrap(), points);
        assert!(decimate_to_count(&points, 0, &mut rng).unwrap().is_empty());
        assert!((1..=2).contains(&decimate_to_count(&points, 1, &mut rng).unwrap().len()));
    }

    #[test]
    fn test_decimate_coincident_points() {
        let points = vec![DVec3::ONE; 20];
        let kept = decimate_to_count(&points, 5, &mut SamplingRng::seeded(5)).unwrap();
        assert_eq!(kept, vec![DVec3::ONE]);
    }

    #[test]
    fn test_decimate_invalid_distance() {
        let result = decimate_uniform(&dense(10), 0.0, &mut SamplingRng::seeded(6), &mut Vec::<DVec3>::new());
        assert!(matches!(result, Err(SamplingError::InvalidRadius(_))));
    }
}
