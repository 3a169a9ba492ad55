//! JSON output format

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use crate::cluster::ClusterLabel;
use crate::figure::Figure;

use super::{OutputFormatter, Report};

/// JSON output formatter
pub struct JsonOutput {
    pretty: bool,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

/// Flat result object; `x1..y2` are sorted by x, `x1u..y2u` are unsorted
#[derive(Serialize)]
struct JsonClusterOutput<'a> {
    input_file: String,
    x_column: &'a str,
    y_column: &'a str,
    n_points: usize,
    seed: u64,

    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,

    x1u: f64,
    y1u: f64,
    x2u: f64,
    y2u: f64,

    swapped: bool,
    cluster_sizes: [usize; 2],
    inertia: f64,
    n_iter: usize,
    converged: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    labels: Option<Vec<ClusterLabel>>,

    figure: Option<&'a Figure>,
}

impl OutputFormatter for JsonOutput {
    fn render(&self, report: &Report<'_>, writer: &mut dyn Write) -> Result<()> {
        let result = report.result;

        let output = JsonClusterOutput {
            input_file: report.input_path.display().to_string(),
            x_column: &report.dataset.x_column,
            y_column: &report.dataset.y_column,
            n_points: report.dataset.len(),
            seed: report.seed,
            x1: result.sorted.first.x,
            y1: result.sorted.first.y,
            x2: result.sorted.second.x,
            y2: result.sorted.second.y,
            x1u: result.unsorted.first.x,
            y1u: result.unsorted.first.y,
            x2u: result.unsorted.second.x,
            y2u: result.unsorted.second.y,
            swapped: result.swapped,
            cluster_sizes: result.cluster_sizes(),
            inertia: result.inertia,
            n_iter: result.n_iter,
            converged: result.converged,
            labels: report.show_labels.then(|| result.canonical_labels()),
            figure: result.figure.as_ref(),
        };

        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, &output)?;
        } else {
            serde_json::to_writer(&mut *writer, &output)?;
        }
        writeln!(writer)?;

        Ok(())
    }
}
