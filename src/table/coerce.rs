//! Column coercion
//!
//! Counts arrive from several upstream producers, so numeric columns are
//! accepted as integers, floats, or numeric text. Missing, negative and
//! non-finite counts become 0 and are tallied in a [`CoercionReport`];
//! text that does not parse as a number is a schema violation.

use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use ndarray::Array1;

use super::frame::Frame;
use crate::error::SchemaError;

/// Tally of values replaced by 0 during count coercion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoercionReport {
    /// Null or blank cells
    pub missing: usize,
    /// Values below zero
    pub negative: usize,
    /// NaN or ±∞ after parsing
    pub non_finite: usize,
}

impl CoercionReport {
    pub fn total(&self) -> usize {
        self.missing + self.negative + self.non_finite
    }

    pub fn merge(&mut self, other: CoercionReport) {
        self.missing += other.missing;
        self.negative += other.negative;
        self.non_finite += other.non_finite;
    }
}

/// Any column rendered as text; nulls stay `None`
pub fn text(frame: &Frame, name: &str) -> Result<Vec<Option<String>>, SchemaError> {
    let strings = cast(lookup(frame, name)?, &DataType::Utf8)?;
    Ok(strings
        .as_string::<i32>()
        .iter()
        .map(|s| s.map(str::to_string))
        .collect())
}

/// Identifier column as owned strings; missing values become ""
pub fn ids(frame: &Frame, name: &str) -> Result<Vec<String>, SchemaError> {
    Ok(text(frame, name)?.into_iter().map(Option::unwrap_or_default).collect())
}

/// Count column as non-negative, finite f64
pub fn counts(frame: &Frame, name: &str) -> Result<(Array1<f64>, CoercionReport), SchemaError> {
    let raw = numeric(frame, name)?;
    let mut report = CoercionReport::default();

    let values: Array1<f64> = raw
        .into_iter()
        .map(|value| match value {
            None => {
                report.missing += 1;
                0.0
            }
            Some(x) if !x.is_finite() => {
                report.non_finite += 1;
                0.0
            }
            Some(x) if x < 0.0 => {
                report.negative += 1;
                0.0
            }
            Some(x) => x,
        })
        .collect();

    Ok((values, report))
}

/// Real-valued column with missing and non-finite values mapped to 0
pub fn probabilities(frame: &Frame, name: &str) -> Result<Array1<f64>, SchemaError> {
    let raw = numeric(frame, name)?;
    Ok(raw
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()).unwrap_or(0.0))
        .collect())
}

/// Read a column as optional f64, failing on non-numeric text
///
/// Numeric columns go through Arrow's cast kernel; text is trimmed and
/// parsed cell by cell so a failure can name its row.
fn numeric(frame: &Frame, name: &str) -> Result<Vec<Option<f64>>, SchemaError> {
    let column = lookup(frame, name)?;
    match column.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => {
            let strings = cast(column, &DataType::Utf8)?;
            strings
                .as_string::<i32>()
                .iter()
                .enumerate()
                .map(|(row, cell)| {
                    let Some(text) = cell.map(str::trim).filter(|t| !t.is_empty()) else {
                        return Ok(None);
                    };
                    text.parse::<f64>()
                        .map(Some)
                        .map_err(|_| SchemaError::NonNumeric {
                            column: name.to_string(),
                            row,
                            value: text.to_string(),
                        })
                })
                .collect()
        }
        _ => {
            let floats = cast(column, &DataType::Float64)?;
            Ok(floats.as_primitive::<Float64Type>().iter().collect())
        }
    }
}

fn lookup<'a>(frame: &'a Frame, name: &str) -> Result<&'a dyn Array, SchemaError> {
    frame
        .column(name)
        .map(|c| &**c)
        .ok_or_else(|| SchemaError::MissingColumns {
            columns: vec![name.to_string()],
        })
}
