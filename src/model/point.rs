//! Points and centroid pairs

use serde::{Deserialize, Serialize};

/// A single 2D observation or centroid
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point
    pub fn distance_sq(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Check that both coordinates are finite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The two centroids of a two-cluster partition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CentroidPair {
    pub first: Point,
    pub second: Point,
}

impl CentroidPair {
    pub fn new(first: Point, second: Point) -> Self {
        Self { first, second }
    }

    /// The pair with first and second exchanged
    pub fn swapped(&self) -> Self {
        Self {
            first: self.second,
            second: self.first,
        }
    }

    /// Centroids as a slice-friendly array, indexed by cluster id
    pub fn as_array(&self) -> [Point; 2] {
        [self.first, self.second]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_sq() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance_sq(&b), 25.0);
        assert_eq!(b.distance_sq(&a), 25.0);
    }

    #[test]
    fn test_is_finite() {
        assert!(Point::new(1.0, -2.0).is_finite());
        assert!(!Point::new(f64::NAN, 0.0).is_finite());
        assert!(!Point::new(0.0, f64::INFINITY).is_finite());
    }

    #[test]
    fn test_swapped() {
        let pair = CentroidPair::new(Point::new(1.0, 2.0), Point::new(3.0, 4.0));
        let swapped = pair.swapped();
        assert_eq!(swapped.first, Point::new(3.0, 4.0));
        assert_eq!(swapped.second, Point::new(1.0, 2.0));
        assert_eq!(swapped.swapped(), pair);
    }
}
