//! Frame: a named-column view over an Arrow record batch
//!
//! Storage is a single [`RecordBatch`], so the schema (names, types,
//! nullability) travels with the data even when there are no rows.
//! Columns are immutable `ArrayRef`s; adding or replacing one rebuilds the
//! batch around the shared buffers without copying them.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray, UInt64Array};
use arrow::compute::{filter_record_batch, take_record_batch};
use arrow::datatypes::{Field, FieldRef, Schema, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};

use crate::error::SchemaError;

/// Utf8 column from string-like values
pub fn text_array<I, S>(values: I) -> ArrayRef
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Arc::new(StringArray::from_iter_values(values))
}

/// Int64 column without nulls
pub fn int_array<I: IntoIterator<Item = i64>>(values: I) -> ArrayRef {
    Arc::new(Int64Array::from_iter_values(values))
}

/// Float64 column without nulls
pub fn float_array<I: IntoIterator<Item = f64>>(values: I) -> ArrayRef {
    Arc::new(Float64Array::from_iter_values(values))
}

/// Columnar table with named, equally sized columns in insertion order
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    batch: RecordBatch,
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl Frame {
    /// No columns, no rows
    pub fn new() -> Self {
        Self {
            batch: RecordBatch::new_empty(Arc::new(Schema::empty())),
        }
    }

    pub fn from_batch(batch: RecordBatch) -> Self {
        Self { batch }
    }

    /// Build a frame from `(name, column)` pairs
    pub fn from_columns<S, I>(columns: I) -> Result<Self, SchemaError>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, ArrayRef)>,
    {
        let mut frame = Self::new();
        for (name, column) in columns {
            frame.push_column(name, column)?;
        }
        Ok(frame)
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn into_batch(self) -> RecordBatch {
        self.batch
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn n_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn n_columns(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.batch
            .schema_ref()
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&ArrayRef> {
        self.position(name).map(|i| self.batch.column(i))
    }

    /// Iterate `(name, column)` in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArrayRef)> {
        self.batch
            .schema_ref()
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .zip(self.batch.columns().iter())
    }

    /// Append a column, or replace an existing column of the same name
    ///
    /// The first column fixes the row count; later columns must match it.
    pub fn push_column(&mut self, name: impl Into<String>, column: ArrayRef) -> Result<(), SchemaError> {
        let name = name.into();
        let n_rows = if self.n_columns() == 0 {
            column.len()
        } else if column.len() != self.n_rows() {
            return Err(SchemaError::LengthMismatch {
                column: name,
                expected: self.n_rows(),
                actual: column.len(),
            });
        } else {
            self.n_rows()
        };

        let field: FieldRef = Arc::new(Field::new(name.as_str(), column.data_type().clone(), true));
        let mut fields: Vec<FieldRef> = self.batch.schema_ref().fields().iter().cloned().collect();
        let mut columns: Vec<ArrayRef> = self.batch.columns().to_vec();
        match self.position(&name) {
            Some(i) => {
                fields[i] = field;
                columns[i] = column;
            }
            None => {
                fields.push(field);
                columns.push(column);
            }
        }

        let options = RecordBatchOptions::new().with_row_count(Some(n_rows));
        self.batch = RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), columns, &options)?;
        Ok(())
    }

    /// Fail with every absent column if any of `names` is missing
    pub fn require(&self, names: &[&str]) -> Result<(), SchemaError> {
        let missing: Vec<String> = names
            .iter()
            .filter(|n| !self.has_column(n))
            .map(|n| n.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::MissingColumns { columns: missing })
        }
    }

    /// New frame holding only the given rows, in the given order
    pub fn take_rows(&self, rows: &[usize]) -> Result<Frame, SchemaError> {
        let indices = UInt64Array::from_iter_values(rows.iter().map(|&r| r as u64));
        Ok(Frame::from_batch(take_record_batch(&self.batch, &indices)?))
    }

    /// New frame holding the rows where `mask` is true
    pub fn filter_rows(&self, mask: &BooleanArray) -> Result<Frame, SchemaError> {
        Ok(Frame::from_batch(filter_record_batch(&self.batch, mask)?))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.batch.schema_ref().index_of(name).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::AsArray;
    use arrow::datatypes::{DataType, Float64Type};

    #[test]
    fn test_push_and_replace() {
        let mut frame = Frame::new();
        frame.push_column("a", int_array([1, 2, 3])).unwrap();
        frame.push_column("b", float_array([0.5, 1.5, 2.5])).unwrap();
        assert_eq!(frame.n_rows(), 3);
        assert_eq!(frame.n_columns(), 2);

        frame.push_column("a", text_array(["x", "y", "z"])).unwrap();
        assert_eq!(frame.n_columns(), 2);
        assert_eq!(frame.column_names(), vec!["a", "b"]);
        assert_eq!(frame.column("a").unwrap().data_type(), &DataType::Utf8);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let mut frame = Frame::new();
        frame.push_column("a", int_array([1, 2])).unwrap();
        let err = frame.push_column("b", float_array([1.0])).unwrap_err();
        assert_eq!(
            err,
            SchemaError::LengthMismatch { column: "b".into(), expected: 2, actual: 1 }
        );
    }

    #[test]
    fn test_require_reports_all_missing() {
        let frame = Frame::from_columns([("a", int_array([1]))]).unwrap();
        let err = frame.require(&["a", "b", "c"]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingColumns { columns: vec!["b".into(), "c".into()] }
        );
    }

    #[test]
    fn test_take_rows() {
        let frame = Frame::from_columns([
            ("id", text_array(["a", "b", "c"])),
            ("v", float_array([1.0, 2.0, 3.0])),
        ])
        .unwrap();
        let sub = frame.take_rows(&[2, 0]).unwrap();
        assert_eq!(sub.n_rows(), 2);
        assert_eq!(sub.column("id").unwrap().as_string::<i32>().value(0), "c");
        assert_eq!(sub.column("v").unwrap().as_primitive::<Float64Type>().value(1), 1.0);
    }

    #[test]
    fn test_filter_to_zero_rows_keeps_schema() {
        let frame = Frame::from_columns([
            ("id", text_array(["a", "b"])),
            ("n", int_array([1, 2])),
        ])
        .unwrap();
        let empty = frame.filter_rows(&BooleanArray::from(vec![false, false])).unwrap();
        assert_eq!(empty.n_rows(), 0);
        assert_eq!(empty.column_names(), vec!["id", "n"]);
        assert_eq!(empty.column("n").unwrap().data_type(), &DataType::Int64);
    }
}
