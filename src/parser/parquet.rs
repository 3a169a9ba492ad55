//! Parquet file parser

use std::fs::File;
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, Float64Array};
use arrow::compute::cast;
use arrow::datatypes::DataType as ArrowType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::config::Config;
use crate::model::{Dataset, Point};

use super::{resolve_columns, Parser};

/// Parser for Parquet files
pub struct ParquetParser;

impl Parser for ParquetParser {
    fn parse(&self, path: &Path, config: &Config) -> Result<Dataset> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open Parquet file: {}", path.display()))?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file)
            .context("Failed to create Parquet reader")?;

        let schema = builder.schema().clone();
        let (x_idx, y_idx) = resolve_columns(
            schema.fields().iter().map(|f| f.name().as_str()),
            config,
        )?;

        let reader = builder.build().context("Failed to build Parquet reader")?;

        let mut dataset = Dataset::new(config.x_column.clone(), config.y_column.clone());
        let mut row_num = 0usize;

        for batch_result in reader {
            let batch = batch_result.context("Failed to read Parquet batch")?;
            read_batch(&batch, x_idx, y_idx, config, &mut row_num, &mut dataset)?;
        }

        Ok(dataset)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "parquet" | "pq")
    }
}

fn read_batch(
    batch: &RecordBatch,
    x_idx: usize,
    y_idx: usize,
    config: &Config,
    row_num: &mut usize,
    dataset: &mut Dataset,
) -> Result<()> {
    let xs = as_float64(batch.column(x_idx), &config.x_column)?;
    let ys = as_float64(batch.column(y_idx), &config.y_column)?;

    for i in 0..batch.num_rows() {
        *row_num += 1;
        let x = float_at(&xs, i, &config.x_column, *row_num)?;
        let y = float_at(&ys, i, &config.y_column, *row_num)?;
        dataset.push(Point::new(x, y), *row_num);
    }

    Ok(())
}

/// Cast a numeric column to Float64
fn as_float64(array: &ArrayRef, column: &str) -> Result<Float64Array> {
    let data_type = array.data_type();
    if !data_type.is_numeric() {
        bail!("Column '{}' has non-numeric type {}", column, data_type);
    }

    let casted = cast(array.as_ref(), &ArrowType::Float64)
        .with_context(|| format!("Failed to cast column '{}' to float", column))?;

    casted
        .as_any()
        .downcast_ref::<Float64Array>()
        .cloned()
        .with_context(|| format!("Column '{}' did not cast to Float64", column))
}

fn float_at(array: &Float64Array, i: usize, column: &str, row: usize) -> Result<f64> {
    if array.is_null(i) {
        bail!("Missing value in column '{}' at row {}", column, row);
    }
    let value = array.value(i);
    if !value.is_finite() {
        bail!("Non-finite value in column '{}' at row {}", column, row);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use arrow::array::{Int32Array, StringArray};
    use arrow::datatypes::{Field, Schema};

    fn batch(xs: ArrayRef, ys: ArrayRef) -> RecordBatch {
        let schema = Schema::new(vec![
            Field::new("x", xs.data_type().clone(), true),
            Field::new("y", ys.data_type().clone(), true),
        ]);
        RecordBatch::try_new(Arc::new(schema), vec![xs, ys]).unwrap()
    }

    #[test]
    fn test_read_batch_casts_integers() {
        let batch = batch(
            Arc::new(Int32Array::from(vec![1, 2])),
            Arc::new(Float64Array::from(vec![0.5, -1.5])),
        );

        let mut dataset = Dataset::new("x", "y");
        let mut row_num = 0;
        read_batch(&batch, 0, 1, &Config::default(), &mut row_num, &mut dataset).unwrap();

        assert_eq!(row_num, 2);
        assert_eq!(dataset.points, vec![Point::new(1.0, 0.5), Point::new(2.0, -1.5)]);
    }

    #[test]
    fn test_null_and_string_columns_rejected() {
        let with_null = batch(
            Arc::new(Float64Array::from(vec![Some(1.0), None])),
            Arc::new(Float64Array::from(vec![1.0, 2.0])),
        );
        let mut dataset = Dataset::new("x", "y");
        let mut row_num = 0;
        let err = read_batch(&with_null, 0, 1, &Config::default(), &mut row_num, &mut dataset)
            .unwrap_err();
        assert!(err.to_string().contains("row 2"));

        let strings = batch(
            Arc::new(StringArray::from(vec!["a"])),
            Arc::new(Float64Array::from(vec![1.0])),
        );
        let mut dataset = Dataset::new("x", "y");
        let mut row_num = 0;
        let config = Config::default();
        assert!(read_batch(&strings, 0, 1, &config, &mut row_num, &mut dataset).is_err());
    }
}
