//! Canonical centroid ordering
//!
//! Two-cluster k-means has no preferred label order, so the centroid with the
//! strictly smaller x coordinate is always reported first. Point labels are
//! remapped to match.

use serde::{Deserialize, Serialize};

use crate::model::CentroidPair;

/// Cluster label after canonical ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClusterLabel {
    /// Cluster of the centroid with the smaller x
    #[serde(rename = "0")]
    First,
    /// Cluster of the other centroid
    #[serde(rename = "1")]
    Second,
}

impl ClusterLabel {
    pub fn index(&self) -> usize {
        match self {
            ClusterLabel::First => 0,
            ClusterLabel::Second => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterLabel::First => "0",
            ClusterLabel::Second => "1",
        }
    }
}

impl std::fmt::Display for ClusterLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Centroids in both algorithm order and canonical order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canonical {
    /// Sorted by x coordinate
    pub sorted: CentroidPair,
    /// As produced by the algorithm
    pub unsorted: CentroidPair,
    /// Whether sorting exchanged the centroids
    pub swapped: bool,
}

impl Canonical {
    /// Map a raw algorithm cluster id to its canonical label
    pub fn label_for(&self, raw: usize) -> ClusterLabel {
        match (raw == 0, self.swapped) {
            (true, false) | (false, true) => ClusterLabel::First,
            (true, true) | (false, false) => ClusterLabel::Second,
        }
    }
}

/// Order a centroid pair so the first has the strictly smaller x
///
/// Equal x coordinates swap the pair.
pub fn canonicalize(unsorted: CentroidPair) -> Canonical {
    let swapped = unsorted.first.x >= unsorted.second.x;
    let sorted = if swapped { unsorted.swapped() } else { unsorted };

    Canonical {
        sorted,
        unsorted,
        swapped,
    }
}
