//! Scatter-plot figure of a clustering result
//!
//! The model mirrors a plotly figure: an ordered list of marker traces plus
//! layout settings. It serializes to JSON as-is and renders to SVG through
//! [`Figure::to_svg`].

mod svg;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::cluster::{ClusterLabel, ClusterResult};
use crate::model::{Dataset, Point};

/// Colours assigned to clusters "0" and "1"
pub const CLUSTER_COLORS: [&str; 2] = ["#636EFA", "#EF553B"];

const POINT_SIZE: f64 = 6.0;
const CENTROID_SIZE: f64 = 15.0;

/// Marker shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerSymbol {
    Circle,
    X,
}

/// Marker fill colour, shared or per point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarkerColor {
    Single(String),
    PerPoint(Vec<String>),
}

impl MarkerColor {
    /// Colour of the point at `index`
    pub fn at(&self, index: usize) -> &str {
        match self {
            MarkerColor::Single(c) => c,
            MarkerColor::PerPoint(colors) => {
                colors.get(index).map(String::as_str).unwrap_or("black")
            }
        }
    }
}

/// Marker outline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerLine {
    pub color: String,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub color: MarkerColor,
    pub size: f64,
    pub symbol: MarkerSymbol,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<MarkerLine>,
}

/// One series of markers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub name: String,
    pub mode: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub marker: Marker,
}

impl Trace {
    fn markers(name: impl Into<String>, points: &[Point], marker: Marker) -> Self {
        Self {
            name: name.into(),
            mode: "markers".to_string(),
            x: points.iter().map(|p| p.x).collect(),
            y: points.iter().map(|p| p.y).collect(),
            marker,
        }
    }

    /// Iterate over the trace's points
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.x.iter().zip(&self.y).map(|(&x, &y)| Point::new(x, y))
    }
}

/// A scatter-plot figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub width: u32,
    pub height: u32,
    pub show_legend: bool,
    pub x_title: String,
    pub y_title: String,
    pub traces: Vec<Trace>,
}

impl Figure {
    /// Build the cluster scatter plot
    ///
    /// Points are grouped by canonical label, cluster "0" first, and the two
    /// sorted centroids are overlaid as `x` markers.
    pub fn scatter(dataset: &Dataset, result: &ClusterResult, size: u32) -> Self {
        let labels = result.canonical_labels();

        let mut order: Vec<usize> = (0..dataset.len()).collect();
        order.sort_by_key(|&i| labels[i]);

        let mut groups: IndexMap<ClusterLabel, Vec<Point>> = IndexMap::new();
        for i in order {
            groups.entry(labels[i]).or_default().push(dataset.points[i]);
        }

        let mut traces: Vec<Trace> = groups
            .iter()
            .map(|(label, points)| {
                Trace::markers(
                    label.as_str(),
                    points,
                    Marker {
                        color: MarkerColor::Single(CLUSTER_COLORS[label.index()].to_string()),
                        size: POINT_SIZE,
                        symbol: MarkerSymbol::Circle,
                        line: None,
                    },
                )
            })
            .collect();

        traces.push(Trace::markers(
            "centroids",
            &result.sorted.as_array(),
            Marker {
                color: MarkerColor::PerPoint(
                    CLUSTER_COLORS.iter().map(|c| c.to_string()).collect(),
                ),
                size: CENTROID_SIZE,
                symbol: MarkerSymbol::X,
                line: Some(MarkerLine {
                    color: "Black".to_string(),
                    width: 1.0,
                }),
            },
        ));

        Self {
            width: size,
            height: size,
            show_legend: false,
            x_title: dataset.x_column.clone(),
            y_title: dataset.y_column.clone(),
            traces,
        }
    }

    /// All points across traces
    pub fn all_points(&self) -> impl Iterator<Item = Point> + '_ {
        self.traces.iter().flat_map(|t| t.points())
    }
}
