//! Error types for mesh sampling

use thiserror::Error;

/// Errors that can occur while building grids, sampling or calibrating
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplingError {
    /// A spatial grid axis was given fewer than one cell
    #[error("invalid grid resolution: {x} x {y} x {z} (every axis must be >= 1)")]
    InvalidResolution { x: i32, y: i32, z: i32 },

    /// Disk radius must be strictly positive and finite
    #[error("invalid disk radius: {0}")]
    InvalidRadius(f64),

    /// Configuration validation failed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Mesh topology refers to data that does not exist
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    /// An internal invariant did not hold, usually a degenerate mesh
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// The radius search could not bracket the requested sample count
    #[error(
        "calibration failed to bracket {target} samples (best radius {radius:.6} gave {count} samples)"
    )]
    CalibrationFailure {
        radius: f64,
        count: usize,
        target: usize,
    },
}

/// Result type alias for sampling operations
pub type Result<T> = std::result::Result<T, SamplingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = SamplingError::InvalidResolution { x: 0, y: 4, z: 4 };
        assert_eq!(
            err.to_string(),
            "invalid grid resolution: 0 x 4 x 4 (every axis must be >= 1)"
        );

        let err = SamplingError::CalibrationFailure {
            radius: 0.25,
            count: 12,
            target: 500,
        };
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("12 samples"));
    }
}
