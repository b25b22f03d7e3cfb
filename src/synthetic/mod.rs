//! Synthetic Module: Simulated Metros for Testing and Demonstration
//!
//! Produces raw block-group counts with a known segregation level, so the
//! divergence pipeline can be exercised without Census downloads:
//!
//! ```text
//! SyntheticMetro ──► derive_totals ──► DivergenceCalculator ──► MutualInformationSummarizer
//! ```

mod metro;

pub use metro::SyntheticMetro;
