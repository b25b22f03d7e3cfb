//! Divergence Module: One-Way Kullback-Leibler Segregation Terms
//!
//! For a metro area with blocks i and demographic bins j (within one
//! category group), let
//!
//!   b   = count of bin j in block i
//!   bt  = Σⱼ b         (block total)
//!   ct  = Σᵢ b         (metro bin total)
//!   gt  = Σᵢⱼ b        (metro group total)
//!
//! ## Probability Terms
//!
//!   p(i)     = bt / gt     share of the metro living in block i
//!   p(i | j) = b / ct      share of bin j living in block i
//!   p(j)     = ct / gt     metro-wide share of bin j
//!   p(j | i) = b / bt      share of block i falling in bin j
//!
//! ## Divergences (log base 2)
//!
//!   D_block(i) = Σⱼ p(j | i) · log₂( p(j | i) / p(j) )
//!   D_bin(j)   = Σᵢ p(i | j) · log₂( p(i | j) / p(i) )
//!
//! D_block measures how far block i's demographic profile departs from the
//! metro profile; D_bin measures how unevenly bin j is spread across the
//! metro relative to population. Both are ≥ 0 for consistent counts.
//!
//! ## Zero Handling
//!
//! Every ratio with a zero denominator is 0, and log₂ of a non-positive
//! argument is 0, so no term is ever NaN or ±∞. See [`safe`].
//!
//! ## Broadcast Sums
//!
//! D_block is summed over (category_group, block_id) and D_bin over
//! (category_group, metro_id, bin_id), then written back onto every member
//! row: row count is preserved and all rows of a group carry the same
//! value.

pub mod safe;
mod calculator;

pub use calculator::{DivergenceCalculator, DivergenceDiagnostics, DivergenceTerms};
