//! Output formatting for cluster results

mod html;
mod json;
mod svg;
mod terminal;

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::cluster::ClusterResult;
use crate::config::OutputFormat;
use crate::figure::Figure;
use crate::model::Dataset;

pub use html::HtmlOutput;
pub use json::JsonOutput;
pub use svg::SvgOutput;
pub use terminal::TerminalOutput;

/// Everything a formatter needs to describe one clustering run
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    /// File the dataset was read from
    pub input_path: &'a Path,
    pub dataset: &'a Dataset,
    pub result: &'a ClusterResult,
    /// Seed the run used
    pub seed: u64,
    /// Include per-point labels
    pub show_labels: bool,
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Render a cluster report to a writer
    fn render(&self, report: &Report<'_>, writer: &mut dyn Write) -> Result<()>;
}

/// Factory for creating output formatters
pub struct OutputFactory;

impl OutputFactory {
    /// Create an output formatter based on format type
    pub fn create(format: OutputFormat) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Terminal => Box::new(TerminalOutput::new()),
            OutputFormat::Json => Box::new(JsonOutput::new()),
            OutputFormat::Html => Box::new(HtmlOutput::new()),
            OutputFormat::Svg => Box::new(SvgOutput::new()),
        }
    }
}

/// Render a cluster report to stdout
pub fn render_to_stdout(report: &Report<'_>, format: OutputFormat) -> Result<()> {
    let formatter = OutputFactory::create(format);
    let mut stdout = std::io::stdout().lock();
    formatter.render(report, &mut stdout)?;
    stdout.flush()?;
    Ok(())
}

/// Write a figure to an SVG file
pub fn write_figure(figure: &Figure, path: &Path) -> Result<()> {
    let svg = figure.to_svg()?;
    std::fs::write(path, svg)
        .with_context(|| format!("Failed to write figure: {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote figure");
    Ok(())
}

/// Fail with a consistent message when a figure-only format lacks one
fn require_figure<'a>(report: &'a Report<'_>) -> Result<&'a Figure> {
    report
        .result
        .figure
        .as_ref()
        .context("No figure was built for this run")
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::cluster::{cluster, ClusterOptions, ClusterResult};
    use crate::model::{Dataset, Point};

    pub fn dataset() -> Dataset {
        Dataset::from_points(vec![
            Point::new(4.0, 1.0),
            Point::new(-2.0, 0.0),
            Point::new(5.0, 1.0),
            Point::new(-3.0, 0.0),
        ])
    }

    pub fn result(dataset: &Dataset, return_figure: bool) -> ClusterResult {
        let options = ClusterOptions {
            return_figure,
            ..Default::default()
        };
        cluster(dataset, &options).unwrap()
    }
}
