//! Totals derivation and invariant checks

use arrow::array::{ArrayRef, BooleanArray};
use ndarray::Array1;
use tracing::{info, warn};

use crate::divergence::safe;
use crate::error::SchemaError;
use crate::table::columns::*;
use crate::table::{coerce, float_array, int_array, Frame, GroupIndex};

/// Append block, county and metro totals (and the matching shares) to a
/// raw-count frame
///
/// Rows with an empty `metro_id` are dropped; `block_count` is rewritten
/// with its coerced values so the totals agree with it exactly.
pub fn derive_totals(input: &Frame) -> Result<Frame, SchemaError> {
    input.require(&RAW_COUNT_COLUMNS)?;

    let in_metro: BooleanArray = coerce::text(input, METRO_ID)?
        .iter()
        .map(|m| Some(m.as_deref().is_some_and(|m| !m.trim().is_empty())))
        .collect();
    let dropped = in_metro.false_count();
    if dropped > 0 {
        warn!(dropped, "dropped rows outside any metro area");
    }

    let mut frame = input.filter_rows(&in_metro)?;

    let (b, report) = coerce::counts(&frame, BLOCK_COUNT)?;
    if report.total() > 0 {
        warn!(?report, "coerced invalid block counts to 0");
    }

    let totals = |keys: &[&str]| -> Result<Array1<f64>, SchemaError> {
        Ok(GroupIndex::by_columns(&frame, keys)?.sum_broadcast(&b))
    };
    let block_group_total = totals(&[BLOCK_ID, CATEGORY_GROUP])?;
    let county_bin_total = totals(&[COUNTY_ID, CATEGORY_GROUP, BIN_ID])?;
    let county_group_total = totals(&[COUNTY_ID, CATEGORY_GROUP])?;
    let metro_bin_total = totals(&[METRO_ID, CATEGORY_GROUP, BIN_ID])?;
    let metro_group_total = totals(&[METRO_ID, CATEGORY_GROUP])?;

    let block_pct = safe::ratio(&b, &block_group_total);
    let county_pct = safe::ratio(&county_bin_total, &county_group_total);
    let metro_pct = safe::ratio(&metro_bin_total, &metro_group_total);

    let integral = b.iter().all(|x| x.fract() == 0.0);
    let as_count = |values: Array1<f64>| -> ArrayRef {
        if integral {
            int_array(values.iter().map(|&x| x as i64))
        } else {
            float_array(values)
        }
    };

    frame.push_column(BLOCK_COUNT, as_count(b))?;
    frame.push_column(BLOCK_GROUP_TOTAL, as_count(block_group_total))?;
    frame.push_column(COUNTY_BIN_TOTAL, as_count(county_bin_total))?;
    frame.push_column(COUNTY_GROUP_TOTAL, as_count(county_group_total))?;
    frame.push_column(METRO_BIN_TOTAL, as_count(metro_bin_total))?;
    frame.push_column(METRO_GROUP_TOTAL, as_count(metro_group_total))?;
    frame.push_column(BLOCK_PCT, float_array(block_pct))?;
    frame.push_column(COUNTY_PCT, float_array(county_pct))?;
    frame.push_column(METRO_PCT, float_array(metro_pct))?;

    info!(rows = frame.n_rows(), dropped, "derived block, county and metro totals");
    Ok(frame)
}

/// Rows whose stored totals disagree with sums recomputed from `block_count`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvariantReport {
    pub rows_checked: usize,
    pub block_group_total_mismatches: usize,
    pub metro_bin_total_mismatches: usize,
    pub metro_group_total_mismatches: usize,
    /// Rows with `metro_bin_total` > `metro_group_total`
    pub bin_exceeds_group: usize,
}

impl InvariantReport {
    pub fn is_consistent(&self) -> bool {
        self.block_group_total_mismatches
            + self.metro_bin_total_mismatches
            + self.metro_group_total_mismatches
            + self.bin_exceeds_group
            == 0
    }
}

/// Check the total invariants of a joined frame (diagnostic only)
pub fn check_invariants(input: &Frame) -> Result<InvariantReport, SchemaError> {
    input.require(&DIVERGENCE_INPUT)?;

    let (b, _) = coerce::counts(input, BLOCK_COUNT)?;
    let (bt, _) = coerce::counts(input, BLOCK_GROUP_TOTAL)?;
    let (ct, _) = coerce::counts(input, METRO_BIN_TOTAL)?;
    let (gt, _) = coerce::counts(input, METRO_GROUP_TOTAL)?;

    let by_block = GroupIndex::by_columns(input, &[BLOCK_ID, CATEGORY_GROUP])?;
    let by_metro_bin = GroupIndex::by_columns(input, &[METRO_ID, CATEGORY_GROUP, BIN_ID])?;
    let by_metro = GroupIndex::by_columns(input, &[METRO_ID, CATEGORY_GROUP])?;

    let report = InvariantReport {
        rows_checked: input.n_rows(),
        block_group_total_mismatches: mismatches(&bt, &by_block.sum_broadcast(&b)),
        metro_bin_total_mismatches: mismatches(&ct, &by_metro_bin.sum_broadcast(&b)),
        metro_group_total_mismatches: mismatches(&gt, &by_metro.sum_broadcast(&b)),
        bin_exceeds_group: ct.iter().zip(gt.iter()).filter(|(c, g)| c > g).count(),
    };
    if !report.is_consistent() {
        warn!(?report, "stored totals disagree with block counts");
    }
    Ok(report)
}

fn mismatches(stored: &Array1<f64>, recomputed: &Array1<f64>) -> usize {
    stored
        .iter()
        .zip(recomputed.iter())
        .filter(|(s, r)| (*s - *r).abs() > 1e-9 * s.abs().max(1.0))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::text_array;
    use arrow::array::{AsArray, StringArray};
    use arrow::datatypes::{DataType, Float64Type, Int64Type};
    use std::sync::Arc;

    fn raw() -> Frame {
        let metro: StringArray = vec![
            Some("m"), Some("m"), Some("m"), Some("m"), Some("m"), Some("m"), None, Some(""),
        ]
        .into_iter()
        .collect();
        Frame::from_columns([
            (BLOCK_ID, text_array(["A", "A", "B", "B", "C", "C", "Z", "Z"])),
            (COUNTY_ID, text_array(["c1", "c1", "c1", "c1", "c2", "c2", "c9", "c9"])),
            (METRO_ID, Arc::new(metro) as ArrayRef),
            (CATEGORY_GROUP, text_array(["Income"; 8])),
            (BIN_ID, text_array(["lo", "hi", "lo", "hi", "lo", "hi", "lo", "hi"])),
            (BLOCK_COUNT, int_array([10, 90, 50, 50, 0, 0, 7, 7])),
        ])
        .unwrap()
    }

    fn ints(frame: &Frame, name: &str) -> Vec<i64> {
        frame.column(name).unwrap().as_primitive::<Int64Type>().values().to_vec()
    }

    fn floats(frame: &Frame, name: &str) -> Vec<f64> {
        frame.column(name).unwrap().as_primitive::<Float64Type>().values().to_vec()
    }

    #[test]
    fn test_totals_at_three_levels() {
        let out = derive_totals(&raw()).unwrap();
        assert_eq!(out.n_rows(), 6);

        assert_eq!(ints(&out, BLOCK_GROUP_TOTAL), vec![100, 100, 100, 100, 0, 0]);
        assert_eq!(ints(&out, COUNTY_BIN_TOTAL), vec![60, 140, 60, 140, 0, 0]);
        assert_eq!(ints(&out, COUNTY_GROUP_TOTAL), vec![200, 200, 200, 200, 0, 0]);
        assert_eq!(ints(&out, METRO_BIN_TOTAL), vec![60, 140, 60, 140, 60, 140]);
        assert_eq!(ints(&out, METRO_GROUP_TOTAL), vec![200; 6]);

        let metro_pct = floats(&out, METRO_PCT);
        assert!((metro_pct[0] - 0.3).abs() < 1e-12);
        assert!((metro_pct[1] - 0.7).abs() < 1e-12);
        assert_eq!(floats(&out, BLOCK_PCT)[4], 0.0);
    }

    #[test]
    fn test_derived_frame_satisfies_invariants() {
        let out = derive_totals(&raw()).unwrap();
        let report = check_invariants(&out).unwrap();
        assert!(report.is_consistent());
        assert_eq!(report.rows_checked, 6);
    }

    #[test]
    fn test_invariant_violation_detected() {
        let mut out = derive_totals(&raw()).unwrap();
        out.push_column(METRO_GROUP_TOTAL, int_array([200, 200, 200, 200, 200, 100]))
            .unwrap();
        let report = check_invariants(&out).unwrap();
        assert_eq!(report.metro_group_total_mismatches, 1);
        assert_eq!(report.bin_exceeds_group, 1);
        assert!(!report.is_consistent());
    }

    #[test]
    fn test_fractional_counts_stay_float() {
        let mut input = raw();
        input
            .push_column(BLOCK_COUNT, float_array([0.5, 1.5, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0]))
            .unwrap();
        let out = derive_totals(&input).unwrap();
        assert_eq!(out.column(BLOCK_GROUP_TOTAL).unwrap().data_type(), &DataType::Float64);
    }

    #[test]
    fn test_no_metro_rows_gives_empty_frame_with_every_column() {
        let input = raw().take_rows(&[6, 7]).unwrap();
        let out = derive_totals(&input).unwrap();
        assert_eq!(out.n_rows(), 0);
        out.require(&DIVERGENCE_INPUT).unwrap();
        assert_eq!(out.column(METRO_PCT).unwrap().data_type(), &DataType::Float64);
    }

    #[test]
    fn test_missing_raw_column() {
        let frame = Frame::from_columns([(BLOCK_ID, text_array(["A"]))]).unwrap();
        assert!(matches!(derive_totals(&frame), Err(SchemaError::MissingColumns { .. })));
    }
}
