//! Divergence Calculator: per-row probability terms and broadcast DKL sums

use ndarray::Array1;
use tracing::{debug, info, warn};

use super::safe;
use crate::error::SchemaError;
use crate::table::columns::*;
use crate::table::{coerce, float_array, CoercionReport, Frame, GroupIndex};

/// Degenerate-group tallies from one divergence run
///
/// Zero denominators are resolved to 0 rather than raised; these counts
/// make them visible to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DivergenceDiagnostics {
    /// Rows processed
    pub rows: usize,
    /// Distinct (category_group, block_id) groups
    pub block_groups: usize,
    /// Distinct (category_group, metro_id, bin_id) groups
    pub bin_groups: usize,
    /// Rows with `metro_group_total` = 0
    pub zero_metro_group_total: usize,
    /// Rows with `metro_bin_total` = 0
    pub zero_metro_bin_total: usize,
    /// Rows with `block_group_total` = 0
    pub zero_block_group_total: usize,
    /// Rows whose block log-ratio was masked to 0
    pub masked_block_logs: usize,
    /// Rows whose bin log-ratio was masked to 0
    pub masked_bin_logs: usize,
    /// Count cells coerced to 0 (missing, negative or non-finite)
    pub coerced: CoercionReport,
}

impl DivergenceDiagnostics {
    /// Any zero denominator seen?
    pub fn has_degenerate_rows(&self) -> bool {
        self.zero_metro_group_total + self.zero_metro_bin_total + self.zero_block_group_total > 0
    }
}

/// Per-row probability terms for one frame
#[derive(Debug, Clone)]
pub struct DivergenceTerms {
    /// P(block | metro) = bt / gt
    pub p_block_share: Array1<f64>,
    /// P(block | bin) = b / ct
    pub p_block_given_bin: Array1<f64>,
    /// P(bin | metro) = ct / gt
    pub p_bin_metro: Array1<f64>,
    /// P(bin | block) = b / bt
    pub p_bin_given_block: Array1<f64>,
    /// log₂ of P(bin | block) / P(bin | metro)
    pub log_block: Array1<f64>,
    /// log₂ of P(block | bin) / P(block | metro)
    pub log_bin: Array1<f64>,
    pub contribution_to_block_dkl: Array1<f64>,
    pub contribution_to_bin_dkl: Array1<f64>,
}

impl DivergenceTerms {
    /// Compute all eight per-row terms from the four count columns
    ///
    /// Inputs must already be non-negative and finite.
    pub fn from_counts(
        block_count: &Array1<f64>,
        block_group_total: &Array1<f64>,
        metro_bin_total: &Array1<f64>,
        metro_group_total: &Array1<f64>,
    ) -> Self {
        let p_block_share = safe::ratio(block_group_total, metro_group_total);
        let p_block_given_bin = safe::ratio(block_count, metro_bin_total);
        let p_bin_metro = safe::ratio(metro_bin_total, metro_group_total);
        let p_bin_given_block = safe::ratio(block_count, block_group_total);

        let ratio_block = safe::ratio(&p_bin_given_block, &p_bin_metro);
        let ratio_bin = safe::ratio(&p_block_given_bin, &p_block_share);

        let log_block = safe::log2(&ratio_block);
        let log_bin = safe::log2(&ratio_bin);

        let contribution_to_block_dkl = &p_bin_given_block * &log_block;
        let contribution_to_bin_dkl = &p_block_given_bin * &log_bin;

        Self {
            p_block_share,
            p_block_given_bin,
            p_bin_metro,
            p_bin_given_block,
            log_block,
            log_bin,
            contribution_to_block_dkl,
            contribution_to_bin_dkl,
        }
    }
}

/// Computes one-way DKL terms for every (block, bin) row
///
/// Stateless; a single instance can be reused across frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct DivergenceCalculator;

impl DivergenceCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Augment `input` with the probability terms, log-ratios, per-row
    /// contributions and the broadcast `dkl_block` / `dkl_bin` sums
    pub fn compute(&self, input: &Frame) -> Result<Frame, SchemaError> {
        self.compute_with_diagnostics(input).map(|(frame, _)| frame)
    }

    /// As [`compute`](Self::compute), also returning degenerate-group tallies
    pub fn compute_with_diagnostics(
        &self,
        input: &Frame,
    ) -> Result<(Frame, DivergenceDiagnostics), SchemaError> {
        input.require(&DIVERGENCE_INPUT)?;

        let mut coerced = CoercionReport::default();
        let mut count = |name: &str| -> Result<Array1<f64>, SchemaError> {
            let (values, report) = coerce::counts(input, name)?;
            if report.total() > 0 {
                warn!(column = name, ?report, "coerced invalid counts to 0");
            }
            coerced.merge(report);
            Ok(values)
        };
        let b = count(BLOCK_COUNT)?;
        let bt = count(BLOCK_GROUP_TOTAL)?;
        let ct = count(METRO_BIN_TOTAL)?;
        let gt = count(METRO_GROUP_TOTAL)?;

        let terms = DivergenceTerms::from_counts(&b, &bt, &ct, &gt);

        let by_block = GroupIndex::by_columns(input, &[CATEGORY_GROUP, BLOCK_ID])?;
        let by_bin = GroupIndex::by_columns(input, &[CATEGORY_GROUP, METRO_ID, BIN_ID])?;

        let dkl_block = by_block.sum_broadcast(&terms.contribution_to_block_dkl);
        let dkl_bin = by_bin.sum_broadcast(&terms.contribution_to_bin_dkl);

        let diagnostics = DivergenceDiagnostics {
            rows: input.n_rows(),
            block_groups: by_block.n_groups(),
            bin_groups: by_bin.n_groups(),
            zero_metro_group_total: count_zero(&gt),
            zero_metro_bin_total: count_zero(&ct),
            zero_block_group_total: count_zero(&bt),
            masked_block_logs: count_masked(&terms.p_bin_given_block, &terms.p_bin_metro),
            masked_bin_logs: count_masked(&terms.p_block_given_bin, &terms.p_block_share),
            coerced,
        };
        if diagnostics.has_degenerate_rows() {
            debug!(?diagnostics, "zero denominators resolved to 0");
        }

        let mut output = input.clone();
        let DivergenceTerms {
            p_block_share,
            p_block_given_bin,
            p_bin_metro,
            p_bin_given_block,
            log_block,
            log_bin,
            contribution_to_block_dkl,
            contribution_to_bin_dkl,
        } = terms;
        for (name, values) in [
            (P_BLOCK_SHARE, p_block_share),
            (P_BLOCK_GIVEN_BIN, p_block_given_bin),
            (P_BIN_METRO, p_bin_metro),
            (P_BIN_GIVEN_BLOCK, p_bin_given_block),
            (LOG_BLOCK, log_block),
            (LOG_BIN, log_bin),
            (CONTRIBUTION_TO_BLOCK_DKL, contribution_to_block_dkl),
            (CONTRIBUTION_TO_BIN_DKL, contribution_to_bin_dkl),
            (DKL_BLOCK, dkl_block),
            (DKL_BIN, dkl_bin),
        ] {
            output.push_column(name, float_array(values.iter().copied()))?;
        }

        info!(
            rows = diagnostics.rows,
            blocks = diagnostics.block_groups,
            bins = diagnostics.bin_groups,
            "computed divergence terms"
        );

        Ok((output, diagnostics))
    }
}

fn count_zero(values: &Array1<f64>) -> usize {
    values.iter().filter(|&&v| v == 0.0).count()
}

/// Rows where the log-ratio argument is not strictly positive
fn count_masked(num: &Array1<f64>, den: &Array1<f64>) -> usize {
    num.iter()
        .zip(den.iter())
        .filter(|(&n, &d)| safe::masked_ratio(n, d) <= 0.0)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{int_array, text_array};
    use arrow::array::{ArrayRef, AsArray, Int64Array, StringArray};
    use arrow::datatypes::Float64Type;
    use std::sync::Arc;

    /// Two blocks, two bins, one metro
    ///
    /// Block A: 10 / 90, Block B: 50 / 50; metro marginal 30% / 70%.
    fn income_scenario() -> Frame {
        Frame::from_columns([
            (BLOCK_ID, text_array(["A", "A", "B", "B"])),
            (COUNTY_ID, text_array(["c1", "c1", "c1", "c1"])),
            (METRO_ID, text_array(["m1", "m1", "m1", "m1"])),
            (CATEGORY_GROUP, text_array(["Income"; 4])),
            (BIN_ID, text_array(["bin1", "bin2", "bin1", "bin2"])),
            (BLOCK_COUNT, int_array([10, 90, 50, 50])),
            (BLOCK_GROUP_TOTAL, int_array([100, 100, 100, 100])),
            (METRO_BIN_TOTAL, int_array([60, 140, 60, 140])),
            (METRO_GROUP_TOTAL, int_array([200, 200, 200, 200])),
        ])
        .unwrap()
    }

    fn float(frame: &Frame, name: &str) -> Vec<f64> {
        frame
            .column(name)
            .unwrap()
            .as_primitive::<Float64Type>()
            .values()
            .to_vec()
    }

    #[test]
    fn test_concrete_income_scenario() {
        let input = income_scenario();
        let out = DivergenceCalculator::new().compute(&input).unwrap();

        assert_eq!(out.n_rows(), input.n_rows());
        assert_eq!(out.n_columns(), input.n_columns() + DIVERGENCE_OUTPUT.len());

        let share = float(&out, P_BLOCK_SHARE);
        assert!(share.iter().all(|&p| (p - 0.5).abs() < 1e-12));

        let p_bin_metro = float(&out, P_BIN_METRO);
        assert!((p_bin_metro[0] - 0.3).abs() < 1e-12);
        assert!((p_bin_metro[1] - 0.7).abs() < 1e-12);

        // D(A) = 0.1·log₂(0.1/0.3) + 0.9·log₂(0.9/0.7)
        let expected_a = 0.1 * (0.1f64 / 0.3).log2() + 0.9 * (0.9f64 / 0.7).log2();
        // D(B) = 0.5·log₂(0.5/0.3) + 0.5·log₂(0.5/0.7)
        let expected_b = 0.5 * (0.5f64 / 0.3).log2() + 0.5 * (0.5f64 / 0.7).log2();

        let dkl_block = float(&out, DKL_BLOCK);
        assert!((dkl_block[0] - expected_a).abs() < 1e-12);
        assert!((dkl_block[2] - expected_b).abs() < 1e-12);
        assert!(dkl_block[0] > dkl_block[2]);
    }

    #[test]
    fn test_broadcast_is_bit_identical() {
        let out = DivergenceCalculator::new().compute(&income_scenario()).unwrap();
        let dkl_block = float(&out, DKL_BLOCK);
        let dkl_bin = float(&out, DKL_BIN);

        assert_eq!(dkl_block[0].to_bits(), dkl_block[1].to_bits());
        assert_eq!(dkl_block[2].to_bits(), dkl_block[3].to_bits());
        assert_eq!(dkl_bin[0].to_bits(), dkl_bin[2].to_bits());
        assert_eq!(dkl_bin[1].to_bits(), dkl_bin[3].to_bits());
    }

    #[test]
    fn test_bin_divergence_matches_closed_form() {
        let out = DivergenceCalculator::new().compute(&income_scenario()).unwrap();
        let dkl_bin = float(&out, DKL_BIN);

        // bin1: P(A|bin1) = 1/6, P(B|bin1) = 5/6 against 1/2, 1/2
        let expected = (1.0 / 6.0) * ((1.0f64 / 6.0) / 0.5).log2()
            + (5.0 / 6.0) * ((5.0f64 / 6.0) / 0.5).log2();
        assert!((dkl_bin[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_zero_totals_resolve_to_zero() {
        let input = Frame::from_columns([
            (BLOCK_ID, text_array(["A", "A", "B"])),
            (COUNTY_ID, text_array(["c", "c", "c"])),
            (METRO_ID, text_array(["m", "m", "m"])),
            (CATEGORY_GROUP, text_array(["Race"; 3])),
            (BIN_ID, text_array(["x", "y", "x"])),
            (BLOCK_COUNT, int_array([0, 0, 0])),
            (BLOCK_GROUP_TOTAL, int_array([0, 0, 0])),
            (METRO_BIN_TOTAL, int_array([0, 0, 0])),
            (METRO_GROUP_TOTAL, int_array([0, 0, 0])),
        ])
        .unwrap();

        let (out, diagnostics) = DivergenceCalculator::new()
            .compute_with_diagnostics(&input)
            .unwrap();

        for name in DIVERGENCE_OUTPUT {
            assert!(float(&out, name).iter().all(|&v| v == 0.0), "{name} not zero");
        }
        assert_eq!(diagnostics.zero_metro_group_total, 3);
        assert_eq!(diagnostics.zero_metro_bin_total, 3);
        assert_eq!(diagnostics.zero_block_group_total, 3);
        assert_eq!(diagnostics.masked_block_logs, 3);
        assert!(diagnostics.has_degenerate_rows());
    }

    /// Metro m1: block A populated, block B empty, bin z empty metro-wide.
    /// Metro m2: no population at all.
    fn sparse_scenario() -> Frame {
        Frame::from_columns([
            (BLOCK_ID, text_array(["A", "A", "A", "B", "B", "B", "C", "C"])),
            (COUNTY_ID, text_array(["c1"; 8])),
            (METRO_ID, text_array(["m1", "m1", "m1", "m1", "m1", "m1", "m2", "m2"])),
            (CATEGORY_GROUP, text_array(["Race"; 8])),
            (BIN_ID, text_array(["x", "y", "z", "x", "y", "z", "x", "y"])),
            (BLOCK_COUNT, int_array([30, 70, 0, 0, 0, 0, 0, 0])),
            (BLOCK_GROUP_TOTAL, int_array([100, 100, 100, 0, 0, 0, 0, 0])),
            (METRO_BIN_TOTAL, int_array([30, 70, 0, 30, 70, 0, 0, 0])),
            (METRO_GROUP_TOTAL, int_array([100, 100, 100, 100, 100, 100, 0, 0])),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_block_and_empty_bin_inside_populated_metro() {
        let out = DivergenceCalculator::new().compute(&sparse_scenario()).unwrap();
        let p_block_share = float(&out, P_BLOCK_SHARE);
        let p_block_given_bin = float(&out, P_BLOCK_GIVEN_BIN);
        let p_bin_metro = float(&out, P_BIN_METRO);
        let p_bin_given_block = float(&out, P_BIN_GIVEN_BLOCK);
        let log_block = float(&out, LOG_BLOCK);
        let log_bin = float(&out, LOG_BIN);
        let dkl_block = float(&out, DKL_BLOCK);
        let dkl_bin = float(&out, DKL_BIN);

        // empty block B (bt = 0): every term divided by bt or scaled by b is 0
        for row in 3..6 {
            assert_eq!(p_block_share[row], 0.0);
            assert_eq!(p_block_given_bin[row], 0.0);
            assert_eq!(p_bin_given_block[row], 0.0);
            assert_eq!(log_block[row], 0.0);
            assert_eq!(log_bin[row], 0.0);
            assert_eq!(dkl_block[row], 0.0);
        }
        // its bins still carry the metro marginal
        assert!((p_bin_metro[3] - 0.3).abs() < 1e-12);
        assert!((p_bin_metro[4] - 0.7).abs() < 1e-12);

        // empty bin z (ct = 0)
        for row in [2, 5] {
            assert_eq!(p_block_given_bin[row], 0.0);
            assert_eq!(p_bin_metro[row], 0.0);
            assert_eq!(p_bin_given_block[row], 0.0);
            assert_eq!(log_block[row], 0.0);
            assert_eq!(log_bin[row], 0.0);
            assert_eq!(dkl_bin[row], 0.0);
        }
        assert_eq!(p_block_share[2], 1.0);

        // unpopulated metro m2 (gt = 0): every output is exactly 0
        for name in DIVERGENCE_OUTPUT {
            let values = float(&out, name);
            assert_eq!(&values[6..], &[0.0, 0.0], "{name}");
        }
    }

    #[test]
    fn test_negative_and_missing_counts_coerced() {
        let mut input = income_scenario();
        input
            .push_column(
                BLOCK_COUNT,
                Arc::new(Int64Array::from(vec![Some(-5), None, Some(50), Some(50)])) as ArrayRef,
            )
            .unwrap();

        let (out, diagnostics) = DivergenceCalculator::new()
            .compute_with_diagnostics(&input)
            .unwrap();

        assert_eq!(diagnostics.coerced.negative, 1);
        assert_eq!(diagnostics.coerced.missing, 1);
        assert_eq!(float(&out, P_BIN_GIVEN_BLOCK)[0], 0.0);
        // the stored input column is passed through untouched
        assert_eq!(out.column(BLOCK_COUNT), input.column(BLOCK_COUNT));
    }

    #[test]
    fn test_missing_metro_group_total_is_schema_error() {
        let full = income_scenario();
        let mut input = Frame::new();
        for (name, column) in full.iter().filter(|(n, _)| *n != METRO_GROUP_TOTAL) {
            input.push_column(name, Arc::clone(column)).unwrap();
        }

        let err = DivergenceCalculator::new().compute(&input).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingColumns { columns: vec![METRO_GROUP_TOTAL.to_string()] }
        );
    }

    #[test]
    fn test_non_numeric_count_is_schema_error() {
        let mut input = income_scenario();
        input
            .push_column(
                METRO_BIN_TOTAL,
                Arc::new(StringArray::from(vec![Some("60"), Some("lots"), None, None])) as ArrayRef,
            )
            .unwrap();
        assert!(matches!(
            DivergenceCalculator::new().compute(&input),
            Err(SchemaError::NonNumeric { row: 1, .. })
        ));
    }

    #[test]
    fn test_categories_are_independent() {
        let income = income_scenario();
        // Same blocks under a second category with identical counts
        let doubled: Vec<usize> = (0..4).chain(0..4).collect();
        let mut both = income.take_rows(&doubled).unwrap();
        both.push_column(
            CATEGORY_GROUP,
            text_array(["Income", "Income", "Income", "Income", "Race", "Race", "Race", "Race"]),
        )
        .unwrap();

        let single = float(&DivergenceCalculator::new().compute(&income).unwrap(), DKL_BLOCK);
        let combined = float(&DivergenceCalculator::new().compute(&both).unwrap(), DKL_BLOCK);
        assert_eq!(&combined[..4], &single[..]);
        assert_eq!(&combined[4..], &single[..]);
    }

    #[test]
    fn test_recompute_replaces_stale_columns() {
        let calc = DivergenceCalculator::new();
        let once = calc.compute(&income_scenario()).unwrap();
        let twice = calc.compute(&once).unwrap();
        assert_eq!(once, twice);
    }
}
