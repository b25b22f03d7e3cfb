//! Mutual-Information Summarizer: population-weighted mean block divergence
//! per (metro, category)

use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use tracing::{debug, info, warn};

use crate::config::SummaryConfig;
use crate::error::SchemaError;
use crate::table::columns::*;
use crate::table::{coerce, float_array, text_array, Frame, GroupIndex};

/// Summary for one (metro, category) pair
#[derive(Debug, Clone, PartialEq)]
pub struct MiRecord {
    pub metro_id: String,
    pub category_group: String,
    /// Values of the configured pass-through columns, in configured order
    pub passthrough: Vec<Option<String>>,
    /// Σ p(i)·D_block(i) / Σ p(i); 0 when Σ p(i) = 0
    pub mi: f64,
    /// Distinct blocks contributing
    pub n_blocks: usize,
    /// Σ p(i) over contributing blocks (1 for a fully populated metro)
    pub total_weight: f64,
}

/// Output of [`MutualInformationSummarizer::summarize`]
#[derive(Debug, Clone, PartialEq)]
pub struct MiSummary {
    /// Names of the pass-through columns carried on every record
    pub passthrough_columns: Vec<String>,
    /// One record per (metro, category), in order of first appearance
    pub records: Vec<MiRecord>,
    /// Groups whose total weight was 0 (mi reported as 0)
    pub degenerate_groups: usize,
    /// Groups whose blocks disagree on some pass-through value
    pub passthrough_conflicts: usize,
}

impl MiSummary {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up the record for a metro and category
    pub fn get(&self, metro_id: &str, category_group: &str) -> Option<&MiRecord> {
        self.records
            .iter()
            .find(|r| r.metro_id == metro_id && r.category_group == category_group)
    }

    /// Columnar form: `metro_id, category_group, <pass-through…>, mi`
    pub fn to_frame(&self) -> Result<Frame, SchemaError> {
        let mut frame = Frame::new();
        frame.push_column(METRO_ID, text_array(self.records.iter().map(|r| &r.metro_id)))?;
        frame.push_column(
            CATEGORY_GROUP,
            text_array(self.records.iter().map(|r| &r.category_group)),
        )?;
        for (k, name) in self.passthrough_columns.iter().enumerate() {
            let values: StringArray = self
                .records
                .iter()
                .map(|r| r.passthrough[k].as_deref())
                .collect();
            frame.push_column(name.as_str(), Arc::new(values) as ArrayRef)?;
        }
        frame.push_column(MI, float_array(self.records.iter().map(|r| r.mi)))?;
        Ok(frame)
    }
}

/// Collapses a divergence-augmented frame to one row per (metro, category)
///
/// `dkl_block` and `p_block_share` repeat on every bin row of a block, so
/// rows are first reduced to one per (block_id, category_group) by keeping
/// the first occurrence. Summing instead would count each block once per bin.
///
/// Pass-through columns are metro attributes (title, state codes) and are
/// assumed constant within a metro. Each record takes its values from the
/// group's first block; groups where a later block disagrees are counted in
/// [`MiSummary::passthrough_conflicts`] and reported at `warn`.
#[derive(Debug, Clone, Default)]
pub struct MutualInformationSummarizer {
    passthrough: Vec<String>,
}

impl MutualInformationSummarizer {
    pub fn new(config: SummaryConfig) -> Self {
        let mut passthrough: Vec<String> = Vec::new();
        for name in config.passthrough_columns {
            let is_key = name == METRO_ID || name == CATEGORY_GROUP || name == MI;
            if !is_key && !passthrough.contains(&name) {
                passthrough.push(name);
            }
        }
        Self { passthrough }
    }

    pub fn passthrough_columns(&self) -> &[String] {
        &self.passthrough
    }

    pub fn summarize(&self, input: &Frame) -> Result<MiSummary, SchemaError> {
        let mut required: Vec<&str> = SUMMARY_INPUT.to_vec();
        required.extend(self.passthrough.iter().map(String::as_str));
        input.require(&required)?;

        // one row per (block, category)
        let blocks = GroupIndex::by_columns(input, &[BLOCK_ID, CATEGORY_GROUP])?;
        let deduped = input.take_rows(blocks.first_rows())?;

        let metros = GroupIndex::by_columns(&deduped, &[METRO_ID, CATEGORY_GROUP])?;
        let metro_id = coerce::ids(&deduped, METRO_ID)?;
        let category = coerce::ids(&deduped, CATEGORY_GROUP)?;
        let weight = coerce::probabilities(&deduped, P_BLOCK_SHARE)?;
        let dkl_block = coerce::probabilities(&deduped, DKL_BLOCK)?;
        let passthrough = self
            .passthrough
            .iter()
            .map(|name| coerce::text(&deduped, name))
            .collect::<Result<Vec<_>, _>>()?;

        let n = metros.n_groups();
        let mut weighted = vec![0.0; n];
        let mut weights = vec![0.0; n];
        let mut n_blocks = vec![0usize; n];
        let mut conflicted = vec![false; n];
        for row in 0..deduped.n_rows() {
            let g = metros.group_of(row);
            weighted[g] += dkl_block[row] * weight[row];
            weights[g] += weight[row];
            n_blocks[g] += 1;

            let first = metros.first_rows()[g];
            if passthrough.iter().any(|values| values[row] != values[first]) {
                conflicted[g] = true;
            }
        }

        let mut degenerate_groups = 0;
        let records: Vec<MiRecord> = metros
            .first_rows()
            .iter()
            .enumerate()
            .map(|(g, &row)| {
                let mi = if weights[g] > 0.0 {
                    let mi = weighted[g] / weights[g];
                    if mi.is_finite() {
                        mi
                    } else {
                        0.0
                    }
                } else {
                    degenerate_groups += 1;
                    0.0
                };
                MiRecord {
                    metro_id: metro_id[row].clone(),
                    category_group: category[row].clone(),
                    passthrough: passthrough.iter().map(|values| values[row].clone()).collect(),
                    mi,
                    n_blocks: n_blocks[g],
                    total_weight: weights[g],
                }
            })
            .collect();

        let passthrough_conflicts = conflicted.iter().filter(|&&c| c).count();
        if passthrough_conflicts > 0 {
            warn!(
                groups = passthrough_conflicts,
                columns = ?self.passthrough,
                "pass-through values differ within a metro; kept the first block's"
            );
        }
        if degenerate_groups > 0 {
            debug!(degenerate_groups, "zero-weight metro groups reported as mi = 0");
        }
        info!(
            rows = input.n_rows(),
            blocks = deduped.n_rows(),
            groups = records.len(),
            "summarized mutual information"
        );

        Ok(MiSummary {
            passthrough_columns: self.passthrough.clone(),
            records,
            degenerate_groups,
            passthrough_conflicts,
        })
    }
}
