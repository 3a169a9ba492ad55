//! JSON parser for record arrays and column objects

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};

use crate::config::Config;
use crate::model::{Dataset, Point};

use super::{parse_number, Parser};

/// Parser for JSON files
///
/// Accepts either an array of records (`[{"x": 1, "y": 2}, ...]`) or an
/// object of columns, where each column is an array or an index-keyed
/// object (`{"x": {"0": 1, ...}, "y": {...}}`).
pub struct JsonParser;

impl Parser for JsonParser {
    fn parse(&self, path: &Path, config: &Config) -> Result<Dataset> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open JSON file: {}", path.display()))?;
        let reader = BufReader::new(file);

        let value: Value =
            serde_json::from_reader(reader).context("Failed to parse JSON file")?;

        match value {
            Value::Array(records) => parse_records(&records, config),
            Value::Object(columns) => parse_columns(&columns, config),
            _ => bail!("JSON must be an array of records or an object of columns"),
        }
    }

    fn supports_extension(&self, ext: &str) -> bool {
        ext.eq_ignore_ascii_case("json")
    }
}

fn parse_records(records: &[Value], config: &Config) -> Result<Dataset> {
    let mut dataset = Dataset::new(config.x_column.clone(), config.y_column.clone());

    for (idx, item) in records.iter().enumerate() {
        let record_num = idx + 1;
        let obj = match item {
            Value::Object(obj) => obj,
            _ => bail!("Record {} is not an object", record_num),
        };

        let x = json_number(obj.get(&config.x_column), &config.x_column, record_num)?;
        let y = json_number(obj.get(&config.y_column), &config.y_column, record_num)?;
        dataset.push(Point::new(x, y), record_num);
    }

    Ok(dataset)
}

fn parse_columns(columns: &Map<String, Value>, config: &Config) -> Result<Dataset> {
    let xs = column_values(columns, &config.x_column)?;
    let ys = column_values(columns, &config.y_column)?;

    if xs.len() != ys.len() {
        bail!(
            "Columns '{}' and '{}' have different lengths ({} vs {})",
            config.x_column,
            config.y_column,
            xs.len(),
            ys.len()
        );
    }

    let mut dataset = Dataset::new(config.x_column.clone(), config.y_column.clone());
    for (idx, (x, y)) in xs.iter().zip(&ys).enumerate() {
        let record_num = idx + 1;
        let x = json_number(Some(x), &config.x_column, record_num)?;
        let y = json_number(Some(y), &config.y_column, record_num)?;
        dataset.push(Point::new(x, y), record_num);
    }

    Ok(dataset)
}

fn column_values<'a>(columns: &'a Map<String, Value>, name: &str) -> Result<Vec<&'a Value>> {
    match columns.get(name) {
        Some(Value::Array(values)) => Ok(values.iter().collect()),
        Some(Value::Object(indexed)) => {
            // Keys are row indices; order them numerically, not lexically
            let mut entries: Vec<(&String, &Value)> = indexed.iter().collect();
            entries.sort_by_key(|(key, _)| key.parse::<u64>().unwrap_or(u64::MAX));
            Ok(entries.into_iter().map(|(_, v)| v).collect())
        }
        Some(_) => bail!("Column '{}' must be an array or an object", name),
        None => bail!(
            "Column '{}' not found (available: {})",
            name,
            columns.keys().cloned().collect::<Vec<_>>().join(", ")
        ),
    }
}

fn json_number(value: Option<&Value>, column: &str, record: usize) -> Result<f64> {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()),
        Some(Value::String(s)) => parse_number(s),
        _ => None,
    };

    number.with_context(|| {
        format!(
            "Missing or non-numeric value in column '{}' at record {}",
            column, record
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_records() {
        let records = json!([{"x": 1, "y": 2.5}, {"x": "3", "y": -4, "extra": true}]);
        let dataset = parse_records(records.as_array().unwrap(), &Config::default()).unwrap();
        assert_eq!(dataset.points, vec![Point::new(1.0, 2.5), Point::new(3.0, -4.0)]);
    }

    #[test]
    fn test_parse_column_arrays() {
        let columns = json!({"x": [1, 2, 3], "y": [4, 5, 6]});
        let dataset = parse_columns(columns.as_object().unwrap(), &Config::default()).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.points[2], Point::new(3.0, 6.0));
    }

    #[test]
    fn test_parse_indexed_columns() {
        let mut xs = serde_json::Map::new();
        let mut ys = serde_json::Map::new();
        for i in 0..12 {
            xs.insert(i.to_string(), json!(i));
            ys.insert(i.to_string(), json!(i * 10));
        }
        let columns = json!({"x": xs, "y": ys});
        let dataset = parse_columns(columns.as_object().unwrap(), &Config::default()).unwrap();
        assert_eq!(dataset.len(), 12);
        assert_eq!(dataset.points[2], Point::new(2.0, 20.0));
        assert_eq!(dataset.points[11], Point::new(11.0, 110.0));
    }

    #[test]
    fn test_errors() {
        let records = json!([{"x": 1, "y": null}]);
        let err = parse_records(records.as_array().unwrap(), &Config::default()).unwrap_err();
        assert!(err.to_string().contains("record 1"));

        let columns = json!({"x": [1, 2], "y": [1]});
        assert!(parse_columns(columns.as_object().unwrap(), &Config::default()).is_err());

        let columns = json!({"a": [1], "b": [2]});
        let err = parse_columns(columns.as_object().unwrap(), &Config::default()).unwrap_err();
        assert!(err.to_string().contains("Column 'x' not found"));
    }
}
