//! CSV file parser

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::model::{Dataset, Point};

use super::{parse_number, resolve_columns, Parser};

/// Parser for CSV and TSV files
pub struct CsvParser;

impl Parser for CsvParser {
    fn parse(&self, path: &Path, config: &Config) -> Result<Dataset> {
        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        let reader = BufReader::new(file);

        let delimiter = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
            _ => b',',
        };

        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .context("Failed to read CSV headers")?
            .clone();
        let (x_idx, y_idx) = resolve_columns(headers.iter(), config)?;

        let mut dataset = Dataset::new(config.x_column.clone(), config.y_column.clone());

        for (line_num, result) in csv_reader.records().enumerate() {
            let source_line = line_num + 2; // +2 for 1-indexing and header
            let record =
                result.with_context(|| format!("Failed to read CSV row {}", source_line))?;

            let x = read_field(&record, x_idx, &config.x_column, source_line)?;
            let y = read_field(&record, y_idx, &config.y_column, source_line)?;
            dataset.push(Point::new(x, y), source_line);
        }

        Ok(dataset)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "csv" | "tsv" | "txt")
    }
}

fn read_field(record: &csv::StringRecord, idx: usize, column: &str, line: usize) -> Result<f64> {
    let raw = record.get(idx).unwrap_or("");
    parse_number(raw).with_context(|| {
        format!(
            "Non-numeric value {:?} in column '{}' at line {}",
            raw, column, line
        )
    })
}
