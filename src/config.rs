//! Configuration handling for clusterer

use std::path::PathBuf;

/// Number of clusters the tool always partitions into
pub const N_CLUSTERS: usize = 2;

/// Seed used when none is given, for reproducible runs
pub const DEFAULT_SEED: u64 = 3;

/// Output format for cluster results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
    Html,
    Svg,
}

impl OutputFormat {
    /// Whether this format cannot be rendered without a figure
    pub fn requires_figure(&self) -> bool {
        matches!(self, OutputFormat::Html | OutputFormat::Svg)
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "terminal" => Ok(OutputFormat::Terminal),
            "json" => Ok(OutputFormat::Json),
            "html" => Ok(OutputFormat::Html),
            "svg" => Ok(OutputFormat::Svg),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Configuration for a clustering run
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the input data file
    pub input_file: PathBuf,
    /// Column holding x coordinates
    pub x_column: String,
    /// Column holding y coordinates
    pub y_column: String,
    /// For Excel files: which sheet to read
    pub sheet_name: Option<String>,
    /// Output format
    pub output_format: OutputFormat,
    /// Seed for k-means++ initialisation
    pub seed: u64,
    /// Maximum Lloyd iterations
    pub max_iterations: usize,
    /// Relative convergence tolerance
    pub tolerance: f64,
    /// Build the scatter-plot figure
    pub return_figure: bool,
    /// Also write the figure as SVG to this path
    pub figure_path: Option<PathBuf>,
    /// Figure width and height in pixels
    pub figure_size: u32,
    /// Include per-point cluster labels in the output
    pub show_labels: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_file: PathBuf::new(),
            x_column: "x".to_string(),
            y_column: "y".to_string(),
            sheet_name: None,
            output_format: OutputFormat::default(),
            seed: DEFAULT_SEED,
            max_iterations: 300,
            tolerance: 1e-4,
            return_figure: false,
            figure_path: None,
            figure_size: 700,
            show_labels: false,
        }
    }
}

impl Config {
    /// Create a new Config for an input file
    pub fn new(input_file: PathBuf) -> Self {
        Self {
            input_file,
            ..Default::default()
        }
    }

    /// Set the x and y column names
    pub fn with_columns(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_column = x.into();
        self.y_column = y.into();
        self
    }

    /// Set Excel sheet name
    pub fn with_sheet_name(mut self, name: String) -> Self {
        self.sheet_name = Some(name);
        self
    }

    /// Set output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the iteration cap
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the convergence tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Request the scatter-plot figure
    pub fn with_figure(mut self, return_figure: bool) -> Self {
        self.return_figure = return_figure;
        self
    }

    /// Write the figure as SVG to a file
    pub fn with_figure_path(mut self, path: PathBuf) -> Self {
        self.figure_path = Some(path);
        self
    }

    /// Set figure size in pixels
    pub fn with_figure_size(mut self, size: u32) -> Self {
        self.figure_size = size;
        self
    }

    /// Include per-point labels
    pub fn with_labels(mut self, show: bool) -> Self {
        self.show_labels = show;
        self
    }

    /// Whether the run has to build a figure
    pub fn needs_figure(&self) -> bool {
        self.return_figure || self.figure_path.is_some() || self.output_format.requires_figure()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("SVG".parse::<OutputFormat>(), Ok(OutputFormat::Svg));
        assert!("plotly".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.seed, 3);
        assert_eq!(config.x_column, "x");
        assert_eq!(config.y_column, "y");
        assert_eq!(config.figure_size, 700);
        assert!(!config.needs_figure());
    }

    #[test]
    fn test_needs_figure() {
        let config = Config::default().with_output_format(OutputFormat::Html);
        assert!(config.needs_figure());

        let config = Config::default().with_figure_path(PathBuf::from("plot.svg"));
        assert!(config.needs_figure());

        let config = Config::default().with_figure(true);
        assert!(config.needs_figure());
    }
}
