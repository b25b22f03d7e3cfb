//! Group-by over composite keys
//!
//! Key columns are encoded with Arrow's row format, which gives every
//! multi-column key a single comparable, hashable byte string whatever the
//! column types. Groups are numbered in order of first appearance, so every
//! reduction built on [`GroupIndex`] is deterministic for a given row order.

use std::collections::HashMap;
use std::hash::Hash;

use arrow::array::ArrayRef;
use arrow::row::{RowConverter, SortField};
use ndarray::Array1;

use super::frame::Frame;
use crate::error::SchemaError;

/// Assignment of rows to groups
#[derive(Debug, Clone)]
pub struct GroupIndex {
    /// Group number of every row
    assignment: Vec<usize>,
    /// First row of every group
    first_rows: Vec<usize>,
}

impl GroupIndex {
    /// Number rows by key; equal keys share a group
    pub fn build<K, I>(keys: I) -> Self
    where
        K: Hash + Eq,
        I: IntoIterator<Item = K>,
    {
        let mut lookup: HashMap<K, usize> = HashMap::new();
        let mut assignment = Vec::new();
        let mut first_rows = Vec::new();

        for (row, key) in keys.into_iter().enumerate() {
            let next = first_rows.len();
            let group = *lookup.entry(key).or_insert_with(|| {
                first_rows.push(row);
                next
            });
            assignment.push(group);
        }

        Self { assignment, first_rows }
    }

    /// Group the rows of `frame` by the named key columns
    pub fn by_columns(frame: &Frame, names: &[&str]) -> Result<Self, SchemaError> {
        frame.require(names)?;
        let columns: Vec<ArrayRef> = names
            .iter()
            .filter_map(|name| frame.column(name).cloned())
            .collect();

        let converter = RowConverter::new(
            columns
                .iter()
                .map(|c| SortField::new(c.data_type().clone()))
                .collect(),
        )?;
        let rows = converter.convert_columns(&columns)?;
        Ok(Self::build(rows.iter()))
    }

    pub fn n_groups(&self) -> usize {
        self.first_rows.len()
    }

    pub fn n_rows(&self) -> usize {
        self.assignment.len()
    }

    /// Group number of `row`
    pub fn group_of(&self, row: usize) -> usize {
        self.assignment[row]
    }

    /// First row of every group, in group order
    pub fn first_rows(&self) -> &[usize] {
        &self.first_rows
    }

    /// Per-group sums, accumulated in row order
    pub fn sum(&self, values: &Array1<f64>) -> Vec<f64> {
        let mut sums = vec![0.0; self.n_groups()];
        for (&group, &value) in self.assignment.iter().zip(values.iter()) {
            sums[group] += value;
        }
        sums
    }

    /// Write a per-group value back onto every row of the group
    pub fn broadcast(&self, per_group: &[f64]) -> Array1<f64> {
        self.assignment.iter().map(|&g| per_group[g]).collect()
    }

    /// Group sum broadcast to every member row
    ///
    /// Equivalent to a grouped `transform("sum")`: the output has one
    /// value per input row and all rows of a group carry the same value.
    pub fn sum_broadcast(&self, values: &Array1<f64>) -> Array1<f64> {
        self.broadcast(&self.sum(values))
    }
}
