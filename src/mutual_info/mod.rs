//! Mutual Information Module: Metro-Level Segregation Summary
//!
//! For each metro area and category group, the summary is the
//! population-weighted mean of block divergences:
//!
//!   MI = Σᵢ p(i) · D_block(i) / Σᵢ p(i)
//!
//! where p(i) = bt / gt is block i's share of the metro population for the
//! category. When every block in the metro is present, Σᵢ p(i) = 1 and
//! this reduces to Σᵢ p(i) · D_block(i).
//!
//! ## Terminology
//!
//! The segregation literature calls this quantity "mutual information",
//! and the name is kept for continuity. Note that it is computed as a
//! weighted average of one-way divergences D(p(j | i) ‖ p(j)). It equals
//! the information-theoretic I(block; bin) only when the weights are the
//! true block marginals and all blocks are present; no symmetric or
//! bias-corrected estimate is attempted.

mod summarizer;

pub use summarizer::{MiRecord, MiSummary, MutualInformationSummarizer};
