//! Blue-noise sampling pipeline
//!
//! Monte Carlo sampling produces a dense area-weighted pool, the Poisson disk
//! pruner thins it through a spatial hash grid, and the calibrator searches
//! the disk radius that yields a requested sample count.

mod calibration;
mod decimate;
mod grid;
mod montecarlo;
mod pruning;

pub use calibration::{calibrate_for_count, tolerance_band, Calibration};
pub use decimate::{decimate_to_count, decimate_uniform};
pub use grid::{CellRange, SpatialHashGrid};
pub use montecarlo::{
    face_centers, generate_area_weighted_samples, pool_size, sample_area_weighted,
    sample_selected_faces, sample_triangle, MAX_POOL_SIZE,
};
pub use pruning::{
    prune, prune_with_stats, CandidateStrategy, PruneOptions, PruneStats, MAX_GRID_REFINEMENTS,
};
