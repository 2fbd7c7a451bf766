//! Blue-noise point sampling on triangle meshes
//!
//! A standalone library for distributing near-uniform, well-separated points
//! over the surface of any triangulated 3D mesh: a dense area-weighted Monte
//! Carlo pool is pruned with a Poisson disk criterion, optionally with the
//! disk radius calibrated to hit a requested sample count.
//!
//! # Quick Start
//!
//! ```rust
//! use mesh_blue_noise::*;
//!
//! // Any SurfaceMesh works; build a unit square from two triangles
//! let mesh = TriangleMesh::new(
//!     vec![
//!         DVec3::new(0.0, 0.0, 0.0),
//!         DVec3::new(1.0, 0.0, 0.0),
//!         DVec3::new(1.0, 1.0, 0.0),
//!         DVec3::new(0.0, 1.0, 0.0),
//!     ],
//!     vec![[0, 1, 2], [0, 2, 3]],
//! )
//! .unwrap();
//!
//! let config = SamplingConfigBuilder::new()
//!     .seed(42)
//!     .tolerance(0.05).unwrap()
//!     .build().unwrap();
//! let mut sampler = MeshSampler::new(config);
//!
//! // Samples at least 0.05 apart
//! let points = sampler.sample_to_radius(&mesh, 0.05).unwrap();
//! println!("Generated {} samples", points.len());
//!
//! // About 200 samples
//! let result = sampler.sample_to_count(&mesh, 200).unwrap();
//! println!("{} samples at radius {:.4}", result.count(), result.radius);
//! ```
//!
//! # Features
//!
//! - `spatial-index` (default): Enables nearest-sample lookups and spacing statistics using KD-tree
//! - `serde`: Enables serialization support for configuration and bounding boxes

// Modules
pub mod error;
pub mod config;
pub mod geometry;
pub mod mesh;
pub mod cloud;
pub mod random;
pub mod sampling;
pub mod sampler;

#[cfg(feature = "spatial-index")]
pub mod spatial;

// Re-export core types for convenience
pub use error::{SamplingError, Result};
pub use config::{SamplingConfig, SamplingConfigBuilder};
pub use geometry::{BoundingBox, Triangle, poisson_disk_radius, expected_sample_count};
pub use mesh::{SurfaceMesh, TriangleMesh};
pub use cloud::{PointCloud, PointSink};
pub use random::{RandomSource, SamplingRng};
pub use sampling::{Calibration, CandidateStrategy, PruneOptions, PruneStats, SpatialHashGrid};
pub use sampler::MeshSampler;

#[cfg(feature = "spatial-index")]
pub use spatial::SampleIndex;

// Re-export glam::DVec3 for convenience
pub use glam::DVec3;
