//! Excel file parser (xlsx, xls, ods)

use std::path::Path;

use anyhow::{bail, Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};

use crate::config::Config;
use crate::model::{Dataset, Point};

use super::{parse_number, resolve_columns, Parser};

/// Parser for Excel files
pub struct ExcelParser;

impl Parser for ExcelParser {
    fn parse(&self, path: &Path, config: &Config) -> Result<Dataset> {
        let mut workbook = open_workbook_auto(path)
            .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

        let sheet_name = if let Some(ref name) = config.sheet_name {
            name.clone()
        } else {
            let sheets = workbook.sheet_names();
            if sheets.is_empty() {
                bail!("No sheets found in workbook");
            }
            sheets[0].clone()
        };

        let range: Range<Data> = workbook
            .worksheet_range(&sheet_name)
            .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

        parse_range(&range, config)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "xlsx" | "xls" | "ods" | "xlsm")
    }
}

fn parse_range(range: &Range<Data>, config: &Config) -> Result<Dataset> {
    let mut rows = range.rows();

    // First row is header
    let header_row = rows.next().context("Empty sheet")?;
    let headers: Vec<String> = header_row.iter().map(cell_to_string).collect();
    let (x_idx, y_idx) = resolve_columns(headers.iter().map(String::as_str), config)?;

    let mut dataset = Dataset::new(config.x_column.clone(), config.y_column.clone());

    for (line_num, row) in rows.enumerate() {
        let source_line = line_num + 2; // +2 for 1-indexing and header
        let x = cell_number(row.get(x_idx), &config.x_column, source_line)?;
        let y = cell_number(row.get(y_idx), &config.y_column, source_line)?;
        dataset.push(Point::new(x, y), source_line);
    }

    Ok(dataset)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format!("{}", dt),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#{:?}", e),
    }
}

fn cell_number(cell: Option<&Data>, column: &str, line: usize) -> Result<f64> {
    let number = match cell {
        Some(Data::Float(f)) if f.is_finite() => Some(*f),
        Some(Data::Int(i)) => Some(*i as f64),
        Some(Data::String(s)) => parse_number(s),
        _ => None,
    };

    number.with_context(|| {
        format!(
            "Missing or non-numeric value in column '{}' at row {}",
            column, line
        )
    })
}
