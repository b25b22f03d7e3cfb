//! Aggregate Module: Nested Geographic Totals
//!
//! Blocks nest in counties, counties in metro areas (CBSAs). From the raw
//! count b(i, j) of bin j in block i this module derives, per category:
//!
//!   block total    Σⱼ b        over bins of the block
//!   county totals  Σᵢ b, Σᵢⱼ b over blocks of the county
//!   metro totals   Σᵢ b, Σᵢⱼ b over blocks of the metro
//!
//! and the matching shares (0 when a total is 0). Blocks outside any metro
//! are dropped.

mod totals;

pub use totals::{check_invariants, derive_totals, InvariantReport};
