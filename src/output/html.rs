//! HTML report output

use std::io::Write;

use anyhow::Result;

use crate::cluster::ClusterLabel;
use crate::figure::CLUSTER_COLORS;

use super::{require_figure, OutputFormatter, Report};

/// Self-contained HTML report with an inline SVG figure
pub struct HtmlOutput;

impl HtmlOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HtmlOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for HtmlOutput {
    fn render(&self, report: &Report<'_>, writer: &mut dyn Write) -> Result<()> {
        let figure = require_figure(report)?;
        let result = report.result;
        let input = html_escape(report.input_path.display().to_string());

        writeln!(writer, "<!DOCTYPE html>")?;
        writeln!(writer, "<html lang=\"en\">")?;
        writeln!(writer, "<head>")?;
        writeln!(writer, "  <meta charset=\"UTF-8\">")?;
        writeln!(writer, "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">")?;
        writeln!(writer, "  <title>clusterer: {}</title>", input)?;
        writeln!(writer, "  <style>")?;
        writeln!(writer, "{}", CSS_STYLES)?;
        writeln!(writer, "  </style>")?;
        writeln!(writer, "</head>")?;
        writeln!(writer, "<body>")?;

        writeln!(writer, "  <div class=\"header\">")?;
        writeln!(writer, "    <h1>clusterer</h1>")?;
        writeln!(
            writer,
            "    <p class=\"files\">{} &middot; {} points &middot; {} / {}</p>",
            input,
            report.dataset.len(),
            html_escape(&report.dataset.x_column),
            html_escape(&report.dataset.y_column)
        )?;
        writeln!(writer, "  </div>")?;

        // Per-cluster summary
        let sizes = result.cluster_sizes();
        writeln!(writer, "  <div class=\"summary\">")?;
        for (label, centroid) in [
            (ClusterLabel::First, result.sorted.first),
            (ClusterLabel::Second, result.sorted.second),
        ] {
            writeln!(
                writer,
                "    <div class=\"stat\"><span class=\"num\" style=\"color: {}\">({:.4}, {:.4})</span><span class=\"label\">cluster {} &middot; {} points</span></div>",
                CLUSTER_COLORS[label.index()],
                centroid.x,
                centroid.y,
                label,
                sizes[label.index()]
            )?;
        }
        writeln!(
            writer,
            "    <div class=\"stat\"><span class=\"num\">{:.4}</span><span class=\"label\">inertia &middot; {} iteration(s){}</span></div>",
            result.inertia,
            result.n_iter,
            if result.converged { "" } else { " &middot; not converged" }
        )?;
        writeln!(writer, "  </div>")?;

        // Centroid table
        writeln!(writer, "  <div class=\"section\">")?;
        writeln!(writer, "    <h2>Centroids</h2>")?;
        writeln!(writer, "    <table>")?;
        writeln!(writer, "      <tr><th></th><th>x</th><th>y</th><th>x (unsorted)</th><th>y (unsorted)</th></tr>")?;
        for (name, sorted, unsorted) in [
            ("centroid 1", result.sorted.first, result.unsorted.first),
            ("centroid 2", result.sorted.second, result.unsorted.second),
        ] {
            writeln!(
                writer,
                "      <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                name, sorted.x, sorted.y, unsorted.x, unsorted.y
            )?;
        }
        writeln!(writer, "    </table>")?;
        writeln!(writer, "  </div>")?;

        // Figure
        writeln!(writer, "  <div class=\"section figure\">")?;
        writeln!(writer, "    <h2>Clusters</h2>")?;
        write!(writer, "{}", figure.to_svg()?)?;
        writeln!(writer, "  </div>")?;

        writeln!(writer, "  <div class=\"footer\">")?;
        writeln!(writer, "    <p>Generated by clusterer (seed {})</p>", report.seed)?;
        writeln!(writer, "  </div>")?;

        writeln!(writer, "</body>")?;
        writeln!(writer, "</html>")?;

        Ok(())
    }
}

fn html_escape(s: impl AsRef<str>) -> String {
    s.as_ref()
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const CSS_STYLES: &str = r#"
    :root {
      --bg: #ffffff;
      --fg: #2a3f5f;
      --accent: #636efa;
      --border: #dfe3eb;
    }

    * { box-sizing: border-box; margin: 0; padding: 0; }

    body {
      font-family: 'Open Sans', Arial, sans-serif;
      background: var(--bg);
      color: var(--fg);
      padding: 2rem;
      line-height: 1.6;
    }

    .header {
      border-bottom: 2px solid var(--border);
      padding-bottom: 1rem;
      margin-bottom: 2rem;
    }

    .header h1 {
      color: var(--accent);
      font-size: 2rem;
      font-weight: 600;
    }

    .header .files {
      opacity: 0.8;
      margin-top: 0.5rem;
    }

    .summary {
      display: flex;
      gap: 2rem;
      margin-bottom: 2rem;
    }

    .stat {
      display: flex;
      flex-direction: column;
      padding: 1rem;
      border-radius: 8px;
      background: #e5ecf6;
    }

    .stat .num {
      font-size: 1.25rem;
      font-weight: 600;
    }

    .section {
      margin-bottom: 2rem;
    }

    .section h2 {
      color: var(--accent);
      font-size: 1.25rem;
      margin-bottom: 1rem;
      padding-bottom: 0.5rem;
      border-bottom: 1px solid var(--border);
    }

    table {
      border-collapse: collapse;
      margin-bottom: 1rem;
    }

    th, td {
      text-align: right;
      padding: 0.5rem 0.75rem;
      border: 1px solid var(--border);
      font-variant-numeric: tabular-nums;
    }

    th {
      background: #e5ecf6;
      font-weight: 600;
    }

    .footer {
      margin-top: 3rem;
      padding-top: 1rem;
      border-top: 1px solid var(--border);
      opacity: 0.6;
      font-size: 0.875rem;
    }
"#;
