//! Lloyd's k-means with greedy k-means++ seeding
//!
//! Seeding draws the first centre uniformly, then for every further centre
//! samples `2 + floor(ln k)` candidates with probability proportional to
//! their squared distance from the nearest chosen centre and keeps the one
//! that lowers the total potential the most.
//!
//! Convergence is declared when assignments stop changing, or when the total
//! squared centre shift drops below `tolerance` scaled by the mean per-column
//! variance of the data.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::model::{Dataset, Point};

use super::ClusterError;

/// K-means hyperparameters
#[derive(Debug, Clone)]
pub struct KMeans {
    n_clusters: usize,
    max_iterations: usize,
    tolerance: f64,
    seed: u64,
}

/// A fitted k-means model
#[derive(Debug, Clone)]
pub struct KMeansFit {
    /// Cluster centres, indexed by cluster id
    pub centroids: Vec<Point>,
    /// Cluster id of each point, parallel to the input
    pub labels: Vec<usize>,
    /// Sum of squared distances to the assigned centre
    pub inertia: f64,
    /// Lloyd iterations performed
    pub n_iter: usize,
    /// Whether a convergence criterion was met before `max_iterations`
    pub converged: bool,
}

impl KMeans {
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            max_iterations: 300,
            tolerance: 1e-4,
            seed: 0,
        }
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn validate(&self, dataset: &Dataset) -> Result<(), ClusterError> {
        if self.n_clusters == 0 {
            return Err(ClusterError::InvalidParameter(
                "number of clusters must be positive".into(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(ClusterError::InvalidParameter(
                "max iterations must be positive".into(),
            ));
        }
        if self.tolerance.is_nan() || self.tolerance < 0.0 {
            return Err(ClusterError::InvalidParameter(format!(
                "tolerance must be non-negative, got {}",
                self.tolerance
            )));
        }
        if dataset.len() < self.n_clusters {
            return Err(ClusterError::TooFewSamples {
                n_samples: dataset.len(),
                n_clusters: self.n_clusters,
            });
        }
        if let Some(idx) = dataset.points.iter().position(|p| !p.is_finite()) {
            return Err(ClusterError::NonFinite {
                line: dataset.source_line(idx).unwrap_or(idx + 1),
            });
        }
        Ok(())
    }

    /// Fit the model to a dataset
    pub fn fit(&self, dataset: &Dataset) -> Result<KMeansFit, ClusterError> {
        self.validate(dataset)?;

        let points = &dataset.points;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let tol = self.tolerance * dataset.feature_variance_mean();

        let mut centroids = init_plusplus(points, self.n_clusters, &mut rng);
        let mut labels: Vec<usize> = Vec::new();
        let mut converged = false;
        let mut n_iter = 0;

        for iter in 0..self.max_iterations {
            n_iter = iter + 1;

            let (mut new_labels, distances) = assign(points, &centroids);
            let mut new_centroids = update_centroids(points, &new_labels, self.n_clusters);
            relocate_empty(points, &distances, &mut new_labels, &mut new_centroids, &centroids);

            let shift: f64 = centroids
                .iter()
                .zip(&new_centroids)
                .map(|(old, new)| old.distance_sq(new))
                .sum();

            tracing::debug!(iteration = n_iter, center_shift = shift, "lloyd step");

            let labels_stable = new_labels == labels;
            centroids = new_centroids;
            labels = new_labels;

            if labels_stable || shift <= tol {
                converged = true;
                break;
            }
        }

        if !converged {
            tracing::warn!(
                max_iterations = self.max_iterations,
                "k-means did not converge"
            );
        }

        // Final assignment so labels match the returned centres
        let (labels, distances) = assign(points, &centroids);
        let inertia = distances.iter().sum();

        Ok(KMeansFit {
            centroids,
            labels,
            inertia,
            n_iter,
            converged,
        })
    }
}

/// Nearest centre for each point, with the squared distance to it
fn assign(points: &[Point], centroids: &[Point]) -> (Vec<usize>, Vec<f64>) {
    points
        .par_iter()
        .map(|p| nearest(p, centroids))
        .unzip()
}

fn nearest(p: &Point, centroids: &[Point]) -> (usize, f64) {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = p.distance_sq(c);
        if d < best_dist {
            best = i;
            best_dist = d;
        }
    }
    (best, best_dist)
}

/// Mean of the points assigned to each cluster; empty clusters yield `None`
fn cluster_means(points: &[Point], labels: &[usize], k: usize) -> Vec<Option<Point>> {
    let mut sums = vec![(0.0, 0.0); k];
    let mut counts = vec![0usize; k];
    for (p, &label) in points.iter().zip(labels) {
        sums[label].0 += p.x;
        sums[label].1 += p.y;
        counts[label] += 1;
    }

    sums.into_iter()
        .zip(counts)
        .map(|((sx, sy), n)| {
            if n == 0 {
                None
            } else {
                Some(Point::new(sx / n as f64, sy / n as f64))
            }
        })
        .collect()
}

fn update_centroids(points: &[Point], labels: &[usize], k: usize) -> Vec<Point> {
    cluster_means(points, labels, k)
        .into_iter()
        .map(|mean| mean.unwrap_or(Point::new(f64::NAN, f64::NAN)))
        .collect()
}

/// Move each empty cluster onto the point farthest from its current centre
fn relocate_empty(
    points: &[Point],
    distances: &[f64],
    labels: &mut [usize],
    centroids: &mut [Point],
    previous: &[Point],
) {
    let empty: Vec<usize> = centroids
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_finite())
        .map(|(i, _)| i)
        .collect();
    if empty.is_empty() {
        return;
    }

    tracing::warn!(clusters = ?empty, "relocating empty clusters");

    let mut far: Vec<usize> = (0..points.len()).collect();
    far.sort_by(|&a, &b| distances[b].total_cmp(&distances[a]).then(a.cmp(&b)));

    let mut far = far.into_iter();
    for cluster in empty {
        match far.next() {
            Some(idx) => labels[idx] = cluster,
            None => centroids[cluster] = previous[cluster],
        }
    }

    for (i, mean) in cluster_means(points, labels, centroids.len())
        .into_iter()
        .enumerate()
    {
        centroids[i] = mean.unwrap_or(previous[i]);
    }
}

/// Greedy k-means++ seeding
fn init_plusplus<R: Rng>(points: &[Point], k: usize, rng: &mut R) -> Vec<Point> {
    let n = points.len();
    let n_local_trials = 2 + (k as f64).ln().floor() as usize;

    let mut centroids = Vec::with_capacity(k);
    let first = points[rng.gen_range(0..n)];
    centroids.push(first);

    let mut closest: Vec<f64> = points.iter().map(|p| p.distance_sq(&first)).collect();
    let mut potential: f64 = closest.iter().sum();

    for _ in 1..k {
        if potential <= 0.0 {
            // Every point coincides with a chosen centre
            centroids.push(points[rng.gen_range(0..n)]);
            continue;
        }

        let cumulative: Vec<f64> = closest
            .iter()
            .scan(0.0, |acc, d| {
                *acc += d;
                Some(*acc)
            })
            .collect();

        let mut best: Option<(usize, Vec<f64>, f64)> = None;
        for _ in 0..n_local_trials {
            let target = rng.gen::<f64>() * potential;
            let candidate = cumulative
                .partition_point(|&c| c < target)
                .min(n - 1);

            let candidate_point = points[candidate];
            let dist: Vec<f64> = points
                .iter()
                .zip(&closest)
                .map(|(p, &c)| c.min(p.distance_sq(&candidate_point)))
                .collect();
            let candidate_potential: f64 = dist.iter().sum();

            let better = match &best {
                Some((_, _, pot)) => candidate_potential < *pot,
                None => true,
            };
            if better {
                best = Some((candidate, dist, candidate_potential));
            }
        }

        if let Some((idx, dist, pot)) = best {
            centroids.push(points[idx]);
            closest = dist;
            potential = pot;
        }
    }

    centroids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> Dataset {
        let mut points = Vec::new();
        for i in 0..20 {
            let jitter = (i as f64) * 0.01;
            points.push(Point::new(-5.0 + jitter, 1.0 - jitter));
            points.push(Point::new(5.0 - jitter, -1.0 + jitter));
        }
        Dataset::from_points(points)
    }

    #[test]
    fn test_separates_blobs() {
        let fit = KMeans::new(2).seed(3).fit(&blobs()).unwrap();

        assert_eq!(fit.centroids.len(), 2);
        assert!(fit.converged);

        let mut xs: Vec<f64> = fit.centroids.iter().map(|c| c.x).collect();
        xs.sort_by(f64::total_cmp);
        assert!((xs[0] + 4.905).abs() < 1e-9, "{:?}", xs);
        assert!((xs[1] - 4.905).abs() < 1e-9, "{:?}", xs);

        // Alternating input order means labels alternate too
        for pair in fit.labels.chunks(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn test_stops_at_max_iterations() {
        // Seeds are data points and the first means never are, so the centres move
        let fit = KMeans::new(2)
            .seed(3)
            .max_iterations(1)
            .tolerance(0.0)
            .fit(&blobs())
            .unwrap();

        assert_eq!(fit.n_iter, 1);
        assert!(!fit.converged);
        assert_eq!(fit.labels.len(), 40);
    }

    #[test]
    fn test_tolerance_stop_precedes_label_stability() {
        let dataset = blobs();

        // Labels cannot be stable after the first step, only the shift check can stop it
        let loose = KMeans::new(2).seed(3).tolerance(1e6).fit(&dataset).unwrap();
        assert!(loose.converged);
        assert_eq!(loose.n_iter, 1);

        let strict = KMeans::new(2).seed(3).tolerance(0.0).fit(&dataset).unwrap();
        assert!(strict.converged);
        assert!(strict.n_iter >= 2, "n_iter = {}", strict.n_iter);
    }

    #[test]
    fn test_same_seed_is_bit_identical() {
        let dataset = blobs();
        let a = KMeans::new(2).seed(3).fit(&dataset).unwrap();
        let b = KMeans::new(2).seed(3).fit(&dataset).unwrap();

        assert_eq!(a.labels, b.labels);
        for (ca, cb) in a.centroids.iter().zip(&b.centroids) {
            assert_eq!(ca.x.to_bits(), cb.x.to_bits());
            assert_eq!(ca.y.to_bits(), cb.y.to_bits());
        }
        assert_eq!(a.inertia.to_bits(), b.inertia.to_bits());
    }

    #[test]
    fn test_too_few_samples() {
        let dataset = Dataset::from_points(vec![Point::new(1.0, 1.0)]);
        let err = KMeans::new(2).fit(&dataset).unwrap_err();
        assert!(matches!(
            err,
            ClusterError::TooFewSamples {
                n_samples: 1,
                n_clusters: 2
            }
        ));
    }

    #[test]
    fn test_non_finite_reports_line() {
        let dataset = Dataset::from_points(vec![
            Point::new(1.0, 1.0),
            Point::new(f64::NAN, 2.0),
            Point::new(3.0, 3.0),
        ]);
        let err = KMeans::new(2).fit(&dataset).unwrap_err();
        assert!(matches!(err, ClusterError::NonFinite { line: 2 }));
    }

    #[test]
    fn test_invalid_parameters() {
        let dataset = blobs();
        assert!(KMeans::new(0).fit(&dataset).is_err());
        assert!(KMeans::new(2).max_iterations(0).fit(&dataset).is_err());
        assert!(KMeans::new(2).tolerance(-1.0).fit(&dataset).is_err());
        assert!(KMeans::new(2).tolerance(f64::NAN).fit(&dataset).is_err());
    }

    #[test]
    fn test_identical_points() {
        let dataset = Dataset::from_points(vec![Point::new(2.0, 2.0); 5]);
        let fit = KMeans::new(2).seed(3).fit(&dataset).unwrap();

        assert_eq!(fit.labels.len(), 5);
        assert_eq!(fit.inertia, 0.0);
        for c in &fit.centroids {
            assert!(c.is_finite());
            assert_eq!(*c, Point::new(2.0, 2.0));
        }
    }

    #[test]
    fn test_two_points_each_own_cluster() {
        let dataset = Dataset::from_points(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
        let fit = KMeans::new(2).seed(3).fit(&dataset).unwrap();

        assert_ne!(fit.labels[0], fit.labels[1]);
        assert_eq!(fit.inertia, 0.0);
    }

    #[test]
    fn test_plusplus_picks_distinct_points() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(100.0, 100.0),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let centroids = init_plusplus(&points, 2, &mut rng);
        assert_eq!(centroids.len(), 2);
        assert_ne!(centroids[0], centroids[1]);
    }

    #[test]
    fn test_relocate_empty_cluster() {
        let points = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(9.0, 0.0)];
        let previous = vec![Point::new(0.0, 0.0), Point::new(50.0, 50.0)];
        let (mut labels, distances) = assign(&points, &previous);
        let mut centroids = update_centroids(&points, &labels, 2);
        assert!(!centroids[1].is_finite());

        relocate_empty(&points, &distances, &mut labels, &mut centroids, &previous);

        assert_eq!(labels, vec![0, 0, 1]);
        assert_eq!(centroids[0], Point::new(0.5, 0.0));
        assert_eq!(centroids[1], Point::new(9.0, 0.0));
    }
}
