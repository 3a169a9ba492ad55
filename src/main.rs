//! clusterer - Deterministic two-cluster k-means for 2D tabular data

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

use clusterer::cluster::{cluster, ClusterOptions};
use clusterer::config::{Config, OutputFormat, DEFAULT_SEED};
use clusterer::output::{render_to_stdout, write_figure, Report};
use clusterer::parser::ParserFactory;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Terminal,
    Json,
    Html,
    Svg,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Terminal => OutputFormat::Terminal,
            CliOutputFormat::Json => OutputFormat::Json,
            CliOutputFormat::Html => OutputFormat::Html,
            CliOutputFormat::Svg => OutputFormat::Svg,
        }
    }
}

/// Deterministic two-cluster k-means for 2D tabular data (CSV, Excel, Parquet, JSON)
#[derive(Parser, Debug)]
#[command(name = "clusterer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Data file to cluster
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: CliOutputFormat,

    /// Column holding x coordinates
    #[arg(long, default_value = "x")]
    x_column: String,

    /// Column holding y coordinates
    #[arg(long, default_value = "y")]
    y_column: String,

    /// For Excel files: which sheet to read
    #[arg(long)]
    sheet: Option<String>,

    /// Seed for k-means++ initialisation
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Maximum number of k-means iterations
    #[arg(long, default_value_t = 300)]
    max_iter: usize,

    /// Relative convergence tolerance
    #[arg(long, default_value_t = 1e-4)]
    tol: f64,

    /// Include the scatter-plot figure in the output
    #[arg(long)]
    figure: bool,

    /// Also write the figure as SVG to this file
    #[arg(long, value_name = "PATH")]
    figure_out: Option<PathBuf>,

    /// Figure width and height in pixels
    #[arg(long, default_value_t = 700)]
    size: u32,

    /// Show the cluster label of every point
    #[arg(long)]
    labels: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::new(cli.input)
        .with_columns(cli.x_column, cli.y_column)
        .with_output_format(cli.format.into())
        .with_seed(cli.seed)
        .with_max_iterations(cli.max_iter)
        .with_tolerance(cli.tol)
        .with_figure(cli.figure)
        .with_figure_size(cli.size)
        .with_labels(cli.labels);
    if let Some(sheet) = cli.sheet {
        config = config.with_sheet_name(sheet);
    }
    if let Some(path) = cli.figure_out {
        config = config.with_figure_path(path);
    }

    let factory = ParserFactory::new();
    let dataset = factory
        .parse(&config.input_file, &config)
        .with_context(|| format!("Failed to parse input file: {}", config.input_file.display()))?;

    let result = cluster(&dataset, &ClusterOptions::from(&config)).context("Clustering failed")?;

    if let (Some(path), Some(figure)) = (&config.figure_path, &result.figure) {
        write_figure(figure, path)?;
    }

    // Only embed the figure in JSON when it was explicitly asked for
    let mut result = result;
    if config.output_format == OutputFormat::Json && !config.return_figure {
        result.figure = None;
    }

    let report = Report {
        input_path: &config.input_file,
        dataset: &dataset,
        result: &result,
        seed: config.seed,
        show_labels: config.show_labels,
    };
    render_to_stdout(&report, config.output_format)
}
