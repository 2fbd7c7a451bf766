//! Nearest-sample lookups over a finished point set
//!
//! This module is only available with the `spatial-index` feature.

use glam::DVec3;
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;

/// KD-tree over sampled points
///
/// Maps arbitrary positions to their closest sample (e.g. to attach
/// downstream data to samples) and measures sample spacing.
///
/// # Performance
///
/// - Construction: O(n log n)
/// - Query: O(log n)
#[derive(Clone)]
pub struct SampleIndex {
    tree: Option<ImmutableKdTree<f64, usize, 3, 32>>,
    points: Vec<DVec3>,
}

impl SampleIndex {
    /// Build the index from sample positions
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_blue_noise::*;
    ///
    /// let samples = vec![
    ///     DVec3::new(1.0, 0.0, 0.0),
    ///     DVec3::new(0.0, 1.0, 0.0),
    ///     DVec3::new(0.0, 0.0, 1.0),
    /// ];
    ///
    /// let index = SampleIndex::new(&samples);
    /// assert_eq!(index.find_nearest(DVec3::new(1.0, 0.1, 0.0)), Some(0));
    /// ```
    pub fn new(points: &[DVec3]) -> Self {
        let entries: Vec<[f64; 3]> = points.iter().map(|p| p.to_array()).collect();
        let tree = if entries.is_empty() {
            None
        } else {
            Some(ImmutableKdTree::new_from_slice(&entries))
        };

        Self {
            tree,
            points: points.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Index of the sample closest to `position`, `None` for an empty index
    pub fn find_nearest(&self, position: DVec3) -> Option<usize> {
        let tree = self.tree.as_ref()?;
        let result = tree.nearest_one::<SquaredEuclidean>(&position.to_array());
        Some(result.item)
    }

    /// Distance from every sample to its closest other sample
    ///
    /// Coincident samples report 0. A single sample reports infinity.
    pub fn nearest_neighbor_distances(&self) -> Vec<f64> {
        let Some(tree) = self.tree.as_ref() else {
            return Vec::new();
        };
        if self.points.len() == 1 {
            return vec![f64::INFINITY];
        }

        // Seed the search radius with the mean spacing of a square packing
        let extent = crate::geometry::BoundingBox::from_points(&self.points).diagonal();
        let initial = (extent / (self.points.len() as f64).sqrt()).max(f64::MIN_POSITIVE);

        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let query = p.to_array();
                let mut radius = initial;
                loop {
                    let closest = tree
                        .within_unsorted::<SquaredEuclidean>(&query, radius * radius)
                        .into_iter()
                        .filter(|n| n.item != i)
                        .map(|n| n.distance)
                        .fold(f64::INFINITY, f64::min);
                    if closest.is_finite() {
                        break closest.sqrt();
                    }
                    radius *= 2.0;
                }
            })
            .collect()
    }

    /// Smallest distance between two samples, infinity with fewer than two
    pub fn min_spacing(&self) -> f64 {
        self.nearest_neighbor_distances()
            .into_iter()
            .fold(f64::INFINITY, f64::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SamplingConfigBuilder;
    use crate::mesh::tests::unit_square;
    use crate::sampler::MeshSampler;

    #[test]
    fn test_sample_index_basic() {
        let samples = vec![
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(0.0, 0.0, 1.0),
            DVec3::new(-1.0, 0.0, 0.0),
        ];

        let index = SampleIndex::new(&samples);

        assert_eq!(index.find_nearest(DVec3::new(0.9, 0.1, 0.0)), Some(0));
        assert_eq!(index.find_nearest(DVec3::new(0.0, 0.95, 0.0)), Some(1));
        assert_eq!(index.find_nearest(DVec3::new(0.0, 0.1, 0.9)), Some(2));
        assert_eq!(index.find_nearest(DVec3::new(-0.8, 0.0, 0.0)), Some(3));
    }

    #[test]
    fn test_empty_and_single() {
        let index = SampleIndex::new(&[]);
        assert!(index.is_empty());
        assert_eq!(index.find_nearest(DVec3::ZERO), None);
        assert!(index.nearest_neighbor_distances().is_empty());
        assert_eq!(index.min_spacing(), f64::INFINITY);

        let index = SampleIndex::new(&[DVec3::ONE]);
        assert_eq!(index.find_nearest(DVec3::ZERO), Some(0));
        assert_eq!(index.nearest_neighbor_distances(), vec![f64::INFINITY]);
    }

    #[test]
    fn test_nearest_neighbor_distances() {
        let samples = vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(5.0, 0.0, 0.0),
            // far away outlier forces the search radius to grow
            DVec3::new(100.0, 0.0, 0.0),
        ];
        let distances = SampleIndex::new(&samples).nearest_neighbor_distances();
        let expected = [1.0, 1.0, 4.0, 95.0];
        for (d, e) in distances.iter().zip(expected) {
            assert!((d - e).abs() < 1e-9, "{} vs {}", d, e);
        }
    }

    #[test]
    fn test_coincident_samples() {
        let samples = vec![DVec3::ONE, DVec3::ONE, DVec3::ZERO];
        let index = SampleIndex::new(&samples);
        assert_eq!(index.min_spacing(), 0.0);
    }

    #[test]
    fn test_min_spacing_of_pruned_samples() {
        let mesh = unit_square();
        let config = SamplingConfigBuilder::new().seed(13).build().unwrap();
        let cloud = MeshSampler::new(config).sample_to_radius(&mesh, 0.1).unwrap();

        // The four corners are 1 apart; pruned samples keep at least 0.1
        let index = SampleIndex::new(cloud.points());
        assert!(index.min_spacing() >= 0.1);
    }
}
