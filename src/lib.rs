//! clusterer - Deterministic two-cluster k-means for 2D tabular data
//!
//! Reads the x/y columns of a CSV, Excel, Parquet or JSON file, partitions the
//! points into two clusters with seeded k-means++, and reports the centroids
//! both in algorithm order and sorted by x so that "cluster 0" always means the
//! left-hand cluster. A scatter plot of the result can be rendered as SVG.

pub mod cluster;
pub mod config;
pub mod figure;
pub mod model;
pub mod output;
pub mod parser;

pub use cluster::{cluster, ClusterError, ClusterOptions, ClusterResult};
pub use config::Config;
pub use figure::Figure;
pub use model::{Dataset, Point};
