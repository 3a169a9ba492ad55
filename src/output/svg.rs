//! Standalone SVG figure output

use std::io::Write;

use anyhow::Result;

use super::{require_figure, OutputFormatter, Report};

/// Writes only the scatter-plot figure
pub struct SvgOutput;

impl SvgOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SvgOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for SvgOutput {
    fn render(&self, report: &Report<'_>, writer: &mut dyn Write) -> Result<()> {
        let figure = require_figure(report)?;
        writer.write_all(figure.to_svg()?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::output::test_support;

    #[test]
    fn test_renders_figure() {
        let dataset = test_support::dataset();
        let result = test_support::result(&dataset, true);
        let report = Report {
            input_path: Path::new("points.csv"),
            dataset: &dataset,
            result: &result,
            seed: 3,
            show_labels: false,
        };

        let mut buf = Vec::new();
        SvgOutput::new().render(&report, &mut buf).unwrap();
        let svg = String::from_utf8(buf).unwrap();
        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("<circle").count(), 4);
    }

    #[test]
    fn test_missing_figure_is_error() {
        let dataset = test_support::dataset();
        let result = test_support::result(&dataset, false);
        let report = Report {
            input_path: Path::new("points.csv"),
            dataset: &dataset,
            result: &result,
            seed: 3,
            show_labels: false,
        };

        let mut buf = Vec::new();
        assert!(SvgOutput::new().render(&report, &mut buf).is_err());
    }
}
