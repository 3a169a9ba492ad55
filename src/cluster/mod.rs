//! Deterministic two-cluster partitioning

pub mod canonical;
mod kmeans;

use thiserror::Error;

use crate::config::{Config, DEFAULT_SEED, N_CLUSTERS};
use crate::figure::Figure;
use crate::model::{CentroidPair, Dataset};

pub use canonical::{canonicalize, Canonical, ClusterLabel};
pub use kmeans::{KMeans, KMeansFit};

/// Errors raised while fitting clusters
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("n_samples={n_samples} should be >= n_clusters={n_clusters}")]
    TooFewSamples { n_samples: usize, n_clusters: usize },

    #[error("non-finite value at line {line}")]
    NonFinite { line: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Options for a clustering run
#[derive(Debug, Clone)]
pub struct ClusterOptions {
    pub seed: u64,
    pub max_iterations: usize,
    pub tolerance: f64,
    /// Build a scatter-plot figure of the result
    pub return_figure: bool,
    /// Figure width and height in pixels
    pub figure_size: u32,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            max_iterations: 300,
            tolerance: 1e-4,
            return_figure: false,
            figure_size: 700,
        }
    }
}

impl From<&Config> for ClusterOptions {
    fn from(config: &Config) -> Self {
        Self {
            seed: config.seed,
            max_iterations: config.max_iterations,
            tolerance: config.tolerance,
            return_figure: config.needs_figure(),
            figure_size: config.figure_size,
        }
    }
}

/// Result of partitioning a dataset into two clusters
#[derive(Debug, Clone)]
pub struct ClusterResult {
    /// Centroids ordered by x coordinate
    pub sorted: CentroidPair,
    /// Centroids in the order the algorithm produced them
    pub unsorted: CentroidPair,
    /// Whether the two orders differ
    pub swapped: bool,
    /// Raw algorithm cluster id per point
    pub labels: Vec<usize>,
    pub inertia: f64,
    pub n_iter: usize,
    pub converged: bool,
    /// Scatter plot, present when requested
    pub figure: Option<Figure>,
}

impl ClusterResult {
    /// Canonical label for every point, in input order
    pub fn canonical_labels(&self) -> Vec<ClusterLabel> {
        let canonical = self.canonical();
        self.labels.iter().map(|&raw| canonical.label_for(raw)).collect()
    }

    /// Number of points carrying each canonical label
    pub fn cluster_sizes(&self) -> [usize; 2] {
        let mut sizes = [0usize; 2];
        for label in self.canonical_labels() {
            sizes[label.index()] += 1;
        }
        sizes
    }

    fn canonical(&self) -> Canonical {
        Canonical {
            sorted: self.sorted,
            unsorted: self.unsorted,
            swapped: self.swapped,
        }
    }
}

/// Partition a dataset into two clusters
///
/// Runs a single seeded k-means++ initialisation, so the same input and
/// options always give the same centroids.
pub fn cluster(dataset: &Dataset, options: &ClusterOptions) -> Result<ClusterResult, ClusterError> {
    let fit = KMeans::new(N_CLUSTERS)
        .max_iterations(options.max_iterations)
        .tolerance(options.tolerance)
        .seed(options.seed)
        .fit(dataset)?;

    let canonical = canonicalize(CentroidPair::new(fit.centroids[0], fit.centroids[1]));

    tracing::info!(
        first = %canonical.sorted.first,
        second = %canonical.sorted.second,
        swapped = canonical.swapped,
        inertia = fit.inertia,
        n_iter = fit.n_iter,
        "clustered dataset"
    );

    let mut result = ClusterResult {
        sorted: canonical.sorted,
        unsorted: canonical.unsorted,
        swapped: canonical.swapped,
        labels: fit.labels,
        inertia: fit.inertia,
        n_iter: fit.n_iter,
        converged: fit.converged,
        figure: None,
    };

    if options.return_figure {
        result.figure = Some(Figure::scatter(dataset, &result, options.figure_size));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Point;

    fn two_groups() -> Dataset {
        Dataset::from_points(vec![
            Point::new(10.0, 0.0),
            Point::new(11.0, 1.0),
            Point::new(10.5, 0.5),
            Point::new(-10.0, 3.0),
            Point::new(-11.0, 2.0),
        ])
    }

    #[test]
    fn test_sorted_by_x() {
        let result = cluster(&two_groups(), &ClusterOptions::default()).unwrap();

        assert!(result.sorted.first.x < result.sorted.second.x);
        assert_eq!(result.sorted.first, Point::new(-10.5, 2.5));
        assert_eq!(result.sorted.second, Point::new(10.5, 0.5));
        assert!(result.figure.is_none());
    }

    #[test]
    fn test_unsorted_matches_swap_flag() {
        let result = cluster(&two_groups(), &ClusterOptions::default()).unwrap();

        if result.swapped {
            assert_eq!(result.unsorted, result.sorted.swapped());
        } else {
            assert_eq!(result.unsorted, result.sorted);
        }
    }

    #[test]
    fn test_canonical_labels() {
        let result = cluster(&two_groups(), &ClusterOptions::default()).unwrap();

        let labels = result.canonical_labels();
        assert_eq!(
            labels,
            vec![
                ClusterLabel::Second,
                ClusterLabel::Second,
                ClusterLabel::Second,
                ClusterLabel::First,
                ClusterLabel::First,
            ]
        );
        assert_eq!(result.cluster_sizes(), [2, 3]);
    }

    #[test]
    fn test_deterministic_across_runs() {
        let dataset = two_groups();
        let a = cluster(&dataset, &ClusterOptions::default()).unwrap();
        let b = cluster(&dataset, &ClusterOptions::default()).unwrap();
        assert_eq!(a.unsorted, b.unsorted);
        assert_eq!(a.labels, b.labels);
    }

    #[test]
    fn test_figure_when_requested() {
        let options = ClusterOptions {
            return_figure: true,
            ..Default::default()
        };
        let result = cluster(&two_groups(), &options).unwrap();
        assert!(result.figure.is_some());
    }

    #[test]
    fn test_single_point_is_error() {
        let dataset = Dataset::from_points(vec![Point::new(0.0, 0.0)]);
        let err = cluster(&dataset, &ClusterOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "n_samples=1 should be >= n_clusters=2");
    }
}
