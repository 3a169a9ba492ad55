//! Data model for 2D clustering input and output

mod dataset;
mod point;

pub use dataset::{Bounds, Dataset};
pub use point::{CentroidPair, Point};
