//! Colored terminal output

use std::io::{IsTerminal, Write};

use anyhow::Result;
use tabled::builder::Builder;
use tabled::settings::Style;
use termcolor::{Ansi, Color, ColorChoice, ColorSpec, NoColor, WriteColor};

use crate::cluster::ClusterLabel;
use crate::model::{CentroidPair, Point};

use super::{OutputFormatter, Report};

/// Terminal output with colors
pub struct TerminalOutput {
    color_choice: ColorChoice,
}

impl TerminalOutput {
    pub fn new() -> Self {
        Self {
            color_choice: ColorChoice::Auto,
        }
    }

    pub fn with_color_choice(color_choice: ColorChoice) -> Self {
        Self { color_choice }
    }

    fn use_color(&self) -> bool {
        match self.color_choice {
            ColorChoice::Always | ColorChoice::AlwaysAnsi => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
            }
        }
    }

    fn write_report<W: WriteColor>(&self, report: &Report<'_>, out: &mut W) -> Result<()> {
        self.write_header(report, out)?;
        self.write_centroids(report, out)?;
        self.write_summary(report, out)?;
        if report.show_labels {
            self.write_labels(report, out)?;
        }
        Ok(())
    }

    fn write_header<W: WriteColor>(&self, report: &Report<'_>, out: &mut W) -> Result<()> {
        writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(
            out,
            " clusterer: {} ({} points, {} / {})",
            report.input_path.display(),
            report.dataset.len(),
            report.dataset.x_column,
            report.dataset.y_column
        )?;
        writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(out)?;
        Ok(())
    }

    fn write_centroids<W: WriteColor>(&self, report: &Report<'_>, out: &mut W) -> Result<()> {
        let result = report.result;
        let sizes = result.cluster_sizes();

        writeln!(out, "Centroids (sorted by x):")?;
        for (label, centroid) in [
            (ClusterLabel::First, result.sorted.first),
            (ClusterLabel::Second, result.sorted.second),
        ] {
            write!(out, "  ")?;
            write_label(out, label)?;
            writeln!(
                out,
                " x = {}, y = {}  ({} points)",
                format_coord(centroid.x),
                format_coord(centroid.y),
                sizes[label.index()]
            )?;
        }
        writeln!(out)?;

        writeln!(out, "{}", centroid_table(&result.sorted, &result.unsorted))?;
        writeln!(out)?;
        Ok(())
    }

    fn write_summary<W: WriteColor>(&self, report: &Report<'_>, out: &mut W) -> Result<()> {
        let result = report.result;
        writeln!(
            out,
            "Summary: seed {}, {} iteration(s), {}, inertia {}, centroids {}",
            report.seed,
            result.n_iter,
            if result.converged { "converged" } else { "did not converge" },
            format_coord(result.inertia),
            if result.swapped { "swapped" } else { "in algorithm order" }
        )?;
        Ok(())
    }

    fn write_labels<W: WriteColor>(&self, report: &Report<'_>, out: &mut W) -> Result<()> {
        let dataset = report.dataset;
        let labels = report.result.canonical_labels();

        let mut builder = Builder::default();
        builder.push_record([
            "line".to_string(),
            dataset.x_column.clone(),
            dataset.y_column.clone(),
            "cluster".to_string(),
        ]);
        for (i, (p, label)) in dataset.points.iter().zip(&labels).enumerate() {
            builder.push_record([
                dataset.source_line(i).unwrap_or(i + 1).to_string(),
                format_coord(p.x),
                format_coord(p.y),
                label.to_string(),
            ]);
        }

        let mut table = builder.build();
        table.with(Style::rounded());

        writeln!(out)?;
        writeln!(out, "Labels:")?;
        writeln!(out, "{}", table)?;
        Ok(())
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TerminalOutput {
    fn render(&self, report: &Report<'_>, writer: &mut dyn Write) -> Result<()> {
        if self.use_color() {
            self.write_report(report, &mut Ansi::new(writer))
        } else {
            self.write_report(report, &mut NoColor::new(writer))
        }
    }
}

fn label_color(label: ClusterLabel) -> Color {
    match label {
        ClusterLabel::First => Color::Blue,
        ClusterLabel::Second => Color::Red,
    }
}

fn write_label<W: WriteColor>(out: &mut W, label: ClusterLabel) -> Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(label_color(label))).set_bold(true))?;
    write!(out, "cluster {}", label)?;
    out.reset()?;
    Ok(())
}

/// Side-by-side table of sorted and unsorted centroids
fn centroid_table(sorted: &CentroidPair, unsorted: &CentroidPair) -> String {
    let mut builder = Builder::default();
    builder.push_record(["", "x", "y", "x (unsorted)", "y (unsorted)"].map(String::from));

    let rows: [(&str, Point, Point); 2] = [
        ("1", sorted.first, unsorted.first),
        ("2", sorted.second, unsorted.second),
    ];
    for (name, s, u) in rows {
        builder.push_record([
            format!("centroid {}", name),
            format_coord(s.x),
            format_coord(s.y),
            format_coord(u.x),
            format_coord(u.y),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

fn format_coord(v: f64) -> String {
    let formatted = format!("{:.6}", v);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
