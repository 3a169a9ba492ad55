//! Parser layer for reading 2D datasets from tabular files

mod csv;
mod excel;
mod json;
mod parquet;

use std::path::Path;

use anyhow::{bail, Result};

use crate::config::Config;
use crate::model::Dataset;

pub use self::csv::CsvParser;
pub use self::excel::ExcelParser;
pub use self::json::JsonParser;
pub use self::parquet::ParquetParser;

/// Trait for reading a dataset from a file
pub trait Parser: Send + Sync {
    /// Parse a file and return the selected x/y columns as a Dataset
    fn parse(&self, path: &Path, config: &Config) -> Result<Dataset>;

    /// Check if this parser can handle the given file extension
    fn supports_extension(&self, ext: &str) -> bool;
}

/// Factory for creating parsers based on file extension
pub struct ParserFactory {
    parsers: Vec<Box<dyn Parser>>,
}

impl Default for ParserFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserFactory {
    /// Create a new parser factory with all supported parsers
    pub fn new() -> Self {
        Self {
            parsers: vec![
                Box::new(CsvParser),
                Box::new(ExcelParser),
                Box::new(ParquetParser),
                Box::new(JsonParser),
            ],
        }
    }

    /// Get a parser for the given file path
    pub fn get_parser(&self, path: &Path) -> Result<&dyn Parser> {
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.to_lowercase(),
            None => detect_format(path).unwrap_or("csv").to_string(),
        };

        for parser in &self.parsers {
            if parser.supports_extension(&ext) {
                return Ok(parser.as_ref());
            }
        }

        bail!("Unsupported file format: {}", ext)
    }

    /// Parse a file using the appropriate parser
    pub fn parse(&self, path: &Path, config: &Config) -> Result<Dataset> {
        let parser = self.get_parser(path)?;
        let dataset = parser.parse(path, config)?;
        tracing::info!(
            path = %path.display(),
            points = dataset.len(),
            x = %dataset.x_column,
            y = %dataset.y_column,
            "loaded dataset"
        );
        Ok(dataset)
    }
}

/// Detect file format from content (for files without extension)
pub fn detect_format(path: &Path) -> Option<&'static str> {
    use std::fs::File;
    use std::io::{BufRead, BufReader};

    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let mut buffer = [0u8; 8];
    let bytes_read = std::io::Read::read(&mut reader, &mut buffer).ok()?;

    if bytes_read < 4 {
        return None;
    }

    if &buffer[0..4] == b"PAR1" {
        return Some("parquet");
    }

    // xlsx is a ZIP container
    if &buffer[0..4] == b"PK\x03\x04" {
        return Some("xlsx");
    }

    if &buffer[0..4] == b"\xD0\xCF\x11\xE0" {
        return Some("xls");
    }

    reader.seek_relative(-(bytes_read as i64)).ok()?;
    let mut line = String::new();
    reader.read_line(&mut line).ok()?;
    let trimmed = line.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        return Some("json");
    }

    Some("csv")
}

/// Parse a textual cell as a coordinate
pub(crate) fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Resolve the x and y column positions within a header row
pub(crate) fn resolve_columns<'a, I>(headers: I, config: &Config) -> Result<(usize, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let headers: Vec<&str> = headers.into_iter().map(str::trim).collect();
    let find = |name: &str| -> Result<usize> {
        match headers.iter().position(|h| *h == name) {
            Some(idx) => Ok(idx),
            None => bail!(
                "Column '{}' not found (available: {})",
                name,
                headers.join(", ")
            ),
        }
    };

    Ok((find(&config.x_column)?, find(&config.y_column)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number(" -3.5 "), Some(-3.5));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("abc"), None);
    }

    #[test]
    fn test_resolve_columns() {
        let config = Config::default();
        let (x, y) = resolve_columns(["id", "y", "x"], &config).unwrap();
        assert_eq!((x, y), (2, 1));

        let config = Config::default().with_columns("lon", "lat");
        let err = resolve_columns(["x", "y"], &config).unwrap_err();
        assert!(err.to_string().contains("Column 'lon' not found"));
    }

    #[test]
    fn test_factory_dispatch() {
        let factory = ParserFactory::new();
        assert!(factory.get_parser(&PathBuf::from("data.csv")).is_ok());
        assert!(factory.get_parser(&PathBuf::from("data.TSV")).is_ok());
        assert!(factory.get_parser(&PathBuf::from("data.json")).is_ok());
        assert!(factory.get_parser(&PathBuf::from("data.xlsx")).is_ok());
        assert!(factory.get_parser(&PathBuf::from("data.parquet")).is_ok());
        assert!(factory.get_parser(&PathBuf::from("data.docx")).is_err());
    }

    #[test]
    fn test_detect_format() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("points");
        let mut file = std::fs::File::create(&json_path).unwrap();
        writeln!(file, "[{{\"x\": 1, \"y\": 2}}]").unwrap();
        assert_eq!(detect_format(&json_path), Some("json"));

        let csv_path = dir.path().join("table");
        let mut file = std::fs::File::create(&csv_path).unwrap();
        writeln!(file, "x,y\n1,2").unwrap();
        assert_eq!(detect_format(&csv_path), Some("csv"));
    }
}
