//! Poisson disk pruning of a dense surface point pool
//!
//! The dense Monte Carlo pool is binned into a [`SpatialHashGrid`] whose cell
//! size is derived from the disk radius. Mesh vertices are accepted first,
//! then the grid cells are visited in a shuffled order and one candidate per
//! cell is accepted per pass, clearing its disk from the pool, until the pool
//! is empty.

use glam::{DVec3, IVec3};
use log::{debug, trace, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::grid::SpatialHashGrid;
use crate::cloud::PointSink;
use crate::error::{Result, SamplingError};
use crate::geometry::BoundingBox;
use crate::mesh::SurfaceMesh;
use crate::random::RandomSource;

/// Maximum number of times the grid cell size is halved to reduce occupancy
pub const MAX_GRID_REFINEMENTS: usize = 16;

/// Upper bound on cells per grid axis
const MAX_AXIS_CELLS: f64 = (1 << 20) as f64;

/// How the pruner picks the point to accept from a grid cell
///
/// Candidates are scored by how many remaining pool points their disk would
/// remove; fewer is better. Ties go to the first candidate scanned.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateStrategy {
    /// Accept the first point in the cell without scoring
    FirstAvailable,
    /// Score up to `k` points of the cell and keep the best
    BestOf(usize),
    /// Score every point of the cell
    FullMinimum,
}

impl CandidateStrategy {
    fn scan_limit(self) -> usize {
        match self {
            CandidateStrategy::FirstAvailable => 1,
            CandidateStrategy::BestOf(k) => k.max(1),
            CandidateStrategy::FullMinimum => usize::MAX,
        }
    }
}

impl Default for CandidateStrategy {
    fn default() -> Self {
        CandidateStrategy::BestOf(10)
    }
}

/// Tuning knobs for a single pruning pass
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PruneOptions {
    pub strategy: CandidateStrategy,
    /// Rebuild the grid with half the cell size while the mean number of
    /// points per occupied cell exceeds this
    pub max_occupancy: f64,
}

impl Default for PruneOptions {
    fn default() -> Self {
        Self {
            strategy: CandidateStrategy::default(),
            max_occupancy: 100.0,
        }
    }
}

/// Diagnostics from a pruning run
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PruneStats {
    /// Points written to the sink, vertices included
    pub accepted: usize,
    /// Mesh vertices seeded before pruning
    pub vertices: usize,
    /// Passes over the allocated cells
    pub passes: usize,
    /// Final grid resolution (zero when no grid was needed)
    pub resolution: IVec3,
    /// Times the cell size was halved
    pub refinements: usize,
}

/// Poisson disk subset of `dense`, preceded by every mesh vertex
///
/// Returns the number of points appended to `sink`.
///
/// # Errors
///
/// Returns `InvalidRadius` unless `radius` is positive and finite, with a
/// square that does not underflow to zero.
pub fn prune<M, R, S>(
    dense: &[DVec3],
    mesh: &M,
    radius: f64,
    options: &PruneOptions,
    rng: &mut R,
    sink: &mut S,
) -> Result<usize>
where
    M: SurfaceMesh + ?Sized,
    R: RandomSource,
    S: PointSink,
{
    prune_with_stats(dense, mesh, radius, options, rng, sink).map(|stats| stats.accepted)
}

/// Same as [`prune`], also reporting grid and pass statistics
pub fn prune_with_stats<M, R, S>(
    dense: &[DVec3],
    mesh: &M,
    radius: f64,
    options: &PruneOptions,
    rng: &mut R,
    sink: &mut S,
) -> Result<PruneStats>
where
    M: SurfaceMesh + ?Sized,
    R: RandomSource,
    S: PointSink,
{
    // The disk test compares squared distances, so r * r must not underflow
    if !(radius > 0.0 && radius.is_finite() && radius * radius > 0.0) {
        return Err(SamplingError::InvalidRadius(radius));
    }

    let mut stats = PruneStats::default();

    if dense.is_empty() {
        mesh.for_each_vertex(&mut |v| {
            sink.push(v);
            stats.vertices += 1;
        });
        stats.accepted = stats.vertices;
        return Ok(stats);
    }

    let mut bbox = mesh.bounding_box();
    for p in dense {
        bbox.add_point(*p);
    }

    let (mut grid, refinements) = build_grid(dense, &bbox, radius, options.max_occupancy)?;
    stats.resolution = grid.resolution();
    stats.refinements = refinements;

    rng.shuffle(grid.allocated_cells_mut());

    let mut vertex_removed = 0;
    mesh.for_each_vertex(&mut |v| {
        sink.push(v);
        stats.vertices += 1;
        vertex_removed += grid.remove_in_sphere(v, radius);
    });
    grid.update_allocated_cells();
    stats.accepted = stats.vertices;
    trace!(
        "prune: {} vertices seeded, {} pool points cleared",
        stats.vertices,
        vertex_removed
    );

    while !grid.allocated_cells().is_empty() {
        stats.passes += 1;
        let mut removed = 0;
        for i in 0..grid.allocated_cells().len() {
            let key = grid.allocated_cells()[i];
            let Some(best) = best_candidate(&grid, key, radius, options.strategy) else {
                continue;
            };

            let point = dense[best];
            sink.push(point);
            stats.accepted += 1;
            removed += grid.remove_in_sphere(point, radius);
        }
        grid.update_allocated_cells();
        trace!(
            "prune pass {}: {} removed, {} cells left",
            stats.passes,
            removed,
            grid.allocated_cells().len()
        );
    }

    debug!(
        "prune: radius {:.6}, {} pool points -> {} accepted ({} vertices) in {} passes",
        radius,
        dense.len(),
        stats.accepted,
        stats.vertices,
        stats.passes
    );

    Ok(stats)
}

/// Cells per axis for a box of `size` and a target cell edge length
fn grid_resolution(size: DVec3, cell_size: f64) -> IVec3 {
    (size / cell_size)
        .floor()
        .clamp(DVec3::ONE, DVec3::splat(MAX_AXIS_CELLS))
        .as_ivec3()
}

/// Grid over `points` with a cell size small enough to keep occupancy bounded
///
/// Starts from a cell edge of `2r/sqrt(3)` and halves it while the mean number
/// of points per occupied cell exceeds `max_occupancy`.
fn build_grid<'a>(
    points: &'a [DVec3],
    bbox: &BoundingBox,
    radius: f64,
    max_occupancy: f64,
) -> Result<(SpatialHashGrid<'a>, usize)> {
    let mut cell_size = 2.0 * radius / 3.0_f64.sqrt();
    let mut refinements = 0;

    loop {
        let inflated = bbox.offset(cell_size);
        let resolution = grid_resolution(inflated.size(), cell_size);
        let mut grid = SpatialHashGrid::init_empty(points, inflated, resolution)?;
        grid.add_all();
        grid.update_allocated_cells();

        let occupied = grid.allocated_cells().len();
        let occupancy = if occupied == 0 {
            0.0
        } else {
            points.len() as f64 / occupied as f64
        };
        trace!(
            "grid {}x{}x{} (cell {:.6}): {} occupied cells, occupancy {:.1}",
            resolution.x,
            resolution.y,
            resolution.z,
            cell_size,
            occupied,
            occupancy
        );

        if occupancy <= max_occupancy {
            return Ok((grid, refinements));
        }
        if refinements >= MAX_GRID_REFINEMENTS {
            warn!(
                "grid occupancy still {:.1} after {} refinements, continuing with cell size {:.6}",
                occupancy, refinements, cell_size
            );
            return Ok((grid, refinements));
        }

        cell_size /= 2.0;
        refinements += 1;
    }
}

/// Pool index in `key` whose disk would remove the fewest remaining points
///
/// `None` if the cell has been emptied since the last refresh.
fn best_candidate(
    grid: &SpatialHashGrid<'_>,
    key: IVec3,
    radius: f64,
    strategy: CandidateStrategy,
) -> Option<usize> {
    let candidates = grid.cell(key);
    if strategy == CandidateStrategy::FirstAvailable {
        return candidates.first().copied();
    }

    let points = grid.points();
    candidates
        .iter()
        .take(strategy.scan_limit())
        .copied()
        .min_by_key(|&i| grid.count_in_sphere(points[i], radius))
}
