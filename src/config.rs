//! Sampling configuration and builder
//!
//! This module provides the knobs shared by radius-driven and count-driven
//! sampling: the random seed, the pruning heuristic, the Monte Carlo
//! oversampling rate and the calibration search budget.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, SamplingError};
use crate::sampling::{CandidateStrategy, PruneOptions};

/// Configuration for deterministic blue-noise sampling
///
/// The same configuration applied to the same mesh always produces the same
/// points.
///
/// # Example
///
/// ```rust
/// use mesh_blue_noise::*;
///
/// let config = SamplingConfigBuilder::new()
///     .seed(42)
///     .montecarlo_rate(30)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// // Config is serializable (with "serde" feature)
/// # #[cfg(feature = "serde")]
/// # {
/// let json = serde_json::to_string(&config).unwrap();
/// let restored: SamplingConfig = serde_json::from_str(&json).unwrap();
/// assert_eq!(config, restored);
/// # }
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    /// Seed for the sampler's random generator
    pub seed: u64,

    /// How a pruning pass chooses the point it accepts from each grid cell
    pub candidate_strategy: CandidateStrategy,

    /// Dense pool size as a multiple of the expected output count
    ///
    /// - 1: Fast, visibly clumpy output
    /// - 20: Default, good coverage
    /// - 50+: Diminishing returns
    pub montecarlo_rate: usize,

    /// Relative band around the target count accepted by calibration
    pub tolerance: f64,

    /// Bisection steps allowed once the target is bracketed
    pub max_iterations: usize,

    /// Halvings (or doublings) allowed while bracketing the target radius
    pub max_bracket_steps: usize,

    /// Mean points per occupied grid cell above which the grid is refined
    pub max_occupancy: f64,
}

impl SamplingConfig {
    /// Pruning parameters carried by this configuration
    #[inline]
    pub fn prune_options(&self) -> PruneOptions {
        PruneOptions {
            strategy: self.candidate_strategy,
            max_occupancy: self.max_occupancy,
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        let builder = SamplingConfigBuilder::new();
        SamplingConfig {
            seed: rand::random(),
            candidate_strategy: builder.candidate_strategy,
            montecarlo_rate: builder.montecarlo_rate,
            tolerance: builder.tolerance,
            max_iterations: builder.max_iterations,
            max_bracket_steps: builder.max_bracket_steps,
            max_occupancy: builder.max_occupancy,
        }
    }
}

/// Builder for creating SamplingConfig with validation
///
/// # Example
///
/// ```rust
/// use mesh_blue_noise::*;
///
/// // Use defaults
/// let config = SamplingConfigBuilder::new().build().unwrap();
///
/// // Customize
/// let config = SamplingConfigBuilder::new()
///     .seed(12345)
///     .candidate_strategy(CandidateStrategy::FullMinimum)
///     .unwrap()
///     .tolerance(0.05)
///     .unwrap()
///     .max_iterations(40)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct SamplingConfigBuilder {
    seed: Option<u64>,
    candidate_strategy: CandidateStrategy,
    montecarlo_rate: usize,
    tolerance: f64,
    max_iterations: usize,
    max_bracket_steps: usize,
    max_occupancy: f64,
}

impl SamplingConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - seed: Random (generated from thread_rng)
    /// - candidate_strategy: BestOf(10)
    /// - montecarlo_rate: 20
    /// - tolerance: 0.005 (half a percent)
    /// - max_iterations: 20
    /// - max_bracket_steps: 32
    /// - max_occupancy: 100
    pub fn new() -> Self {
        Self {
            seed: None,
            candidate_strategy: CandidateStrategy::default(),
            montecarlo_rate: 20,
            tolerance: 0.005,
            max_iterations: 20,
            max_bracket_steps: 32,
            max_occupancy: 100.0,
        }
    }

    /// Set the random seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the per-cell candidate heuristic
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for `BestOf(0)`
    pub fn candidate_strategy(mut self, strategy: CandidateStrategy) -> Result<Self> {
        if strategy == CandidateStrategy::BestOf(0) {
            return Err(SamplingError::InvalidConfig(
                "BestOf candidate count must be >= 1".to_string(),
            ));
        }
        self.candidate_strategy = strategy;
        Ok(self)
    }

    /// Set the Monte Carlo oversampling rate
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if rate is 0
    pub fn montecarlo_rate(mut self, rate: usize) -> Result<Self> {
        if rate == 0 {
            return Err(SamplingError::InvalidConfig(
                "Monte Carlo rate must be >= 1 (got 0)".to_string(),
            ));
        }
        self.montecarlo_rate = rate;
        Ok(self)
    }

    /// Set the relative calibration tolerance
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` unless `0 <= tolerance < 1`
    pub fn tolerance(mut self, tolerance: f64) -> Result<Self> {
        if !(0.0..1.0).contains(&tolerance) {
            return Err(SamplingError::InvalidConfig(format!(
                "tolerance must be in [0, 1) (got {})",
                tolerance
            )));
        }
        self.tolerance = tolerance;
        Ok(self)
    }

    /// Set the bisection budget
    ///
    /// Zero skips bisection and returns the first trial that undershoots
    /// the target.
    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Set the bracketing budget
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if steps is 0
    pub fn max_bracket_steps(mut self, steps: usize) -> Result<Self> {
        if steps == 0 {
            return Err(SamplingError::InvalidConfig(
                "bracket steps must be >= 1 (got 0)".to_string(),
            ));
        }
        self.max_bracket_steps = steps;
        Ok(self)
    }

    /// Set the grid occupancy limit
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` unless occupancy is positive
    pub fn max_occupancy(mut self, occupancy: f64) -> Result<Self> {
        if !(occupancy > 0.0) {
            return Err(SamplingError::InvalidConfig(format!(
                "max occupancy must be positive (got {})",
                occupancy
            )));
        }
        self.max_occupancy = occupancy;
        Ok(self)
    }

    /// Build the configuration
    ///
    /// If no seed was provided, generates a random seed using thread_rng.
    pub fn build(self) -> Result<SamplingConfig> {
        let seed = self.seed.unwrap_or_else(rand::random);

        Ok(SamplingConfig {
            seed,
            candidate_strategy: self.candidate_strategy,
            montecarlo_rate: self.montecarlo_rate,
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
            max_bracket_steps: self.max_bracket_steps,
            max_occupancy: self.max_occupancy,
        })
    }
}

impl Default for SamplingConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = SamplingConfigBuilder::new().build().unwrap();
        assert_eq!(config.candidate_strategy, CandidateStrategy::BestOf(10));
        assert_eq!(config.montecarlo_rate, 20);
        assert_eq!(config.tolerance, 0.005);
        assert_eq!(config.max_iterations, 20);
        assert_eq!(config.max_bracket_steps, 32);
        assert_eq!(config.max_occupancy, 100.0);
    }

    #[test]
    fn test_builder_custom() {
        let config = SamplingConfigBuilder::new()
            .seed(42)
            .candidate_strategy(CandidateStrategy::FirstAvailable)
            .unwrap()
            .montecarlo_rate(5)
            .unwrap()
            .tolerance(0.1)
            .unwrap()
            .max_iterations(3)
            .max_bracket_steps(4)
            .unwrap()
            .max_occupancy(8.0)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(config.seed, 42);
        assert_eq!(config.candidate_strategy, CandidateStrategy::FirstAvailable);
        assert_eq!(config.montecarlo_rate, 5);
        assert_eq!(config.tolerance, 0.1);
        assert_eq!(config.max_iterations, 3);
        assert_eq!(config.max_bracket_steps, 4);
        assert_eq!(config.max_occupancy, 8.0);
    }

    #[test]
    fn test_prune_options_follow_config() {
        let config = SamplingConfigBuilder::new()
            .seed(1)
            .candidate_strategy(CandidateStrategy::BestOf(3))
            .unwrap()
            .max_occupancy(12.5)
            .unwrap()
            .build()
            .unwrap();
        let options = config.prune_options();
        assert_eq!(options.strategy, CandidateStrategy::BestOf(3));
        assert_eq!(options.max_occupancy, 12.5);
    }

    #[test]
    fn test_builder_invalid_values() {
        assert!(SamplingConfigBuilder::new().candidate_strategy(CandidateStrategy::BestOf(0)).is_err());
        assert!(SamplingConfigBuilder::new().montecarlo_rate(0).is_err());
        assert!(SamplingConfigBuilder::new().tolerance(-0.1).is_err());
        assert!(SamplingConfigBuilder::new().tolerance(1.0).is_err());
        assert!(SamplingConfigBuilder::new().tolerance(f64::NAN).is_err());
        assert!(SamplingConfigBuilder::new().max_bracket_steps(0).is_err());
        assert!(SamplingConfigBuilder::new().max_occupancy(0.0).is_err());
        assert!(SamplingConfigBuilder::new().max_occupancy(f64::NAN).is_err());
    }

    #[test]
    fn test_zero_tolerance_is_allowed() {
        let config = SamplingConfigBuilder::new().tolerance(0.0).unwrap().build().unwrap();
        assert_eq!(config.tolerance, 0.0);
    }

    #[test]
    fn test_default_matches_builder() {
        let a = SamplingConfig::default();
        let b = SamplingConfigBuilder::new().seed(a.seed).build().unwrap();
        assert_eq!(a, b);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serialization() {
        let config = SamplingConfigBuilder::new()
            .seed(12345)
            .candidate_strategy(CandidateStrategy::BestOf(4))
            .unwrap()
            .build()
            .unwrap();

        let json = serde_json::to_string(&config).unwrap();
        let restored: SamplingConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config, restored);
    }
}
