//! # census_dkl
//!
//! One-Way Divergence Measures of Residential Segregation for US Census
//! Block Groups, Summarised per Metro Area
//!
//! ## Framework
//!
//! Block-group counts for a demographic category (race/ethnicity, household
//! income, educational attainment, employment) are compared against the
//! profile of the enclosing metro area (CBSA). The comparison is a
//! Kullback-Leibler divergence in bits:
//!
//!   D_block(i) = Σⱼ p(j | i) · log₂( p(j | i) / p(j) )
//!
//! A block that looks like its metro scores 0; a block concentrated in
//! bins that are rare metro-wide scores high.
//!
//! ### Pipeline
//!
//! 1. **Totals** ([`aggregate`]): block, county and metro totals from raw counts
//! 2. **Divergence** ([`DivergenceCalculator`]): four probability terms,
//!    masked log-ratios, per-row contributions, and the broadcast sums
//!    `dkl_block` / `dkl_bin`
//! 3. **Summary** ([`MutualInformationSummarizer`]): population-weighted mean
//!    of `dkl_block` per (metro, category)
//!
//! Each stage is a pure function from one [`Frame`] to another. Categories
//! never interact: every group key includes `category_group`.
//!
//! ## Numerical Contract
//!
//! Zero counts and zero totals are routine (empty bins, empty blocks).
//! Every ratio with a zero denominator is 0 and every log of a
//! non-positive argument is 0, so no output is ever NaN or ±∞.
//!
//! ## References
//!
//! - Theil & Finizza, "A Note on the Measurement of Racial Integration of
//!   Schools by Means of Informational Concepts" (1971)
//! - Mora & Ruiz-Castillo, "Entropy-Based Segregation Indices",
//!   Sociological Methodology 41 (2011)

pub mod aggregate;
pub mod config;
pub mod divergence;
pub mod error;
pub mod mutual_info;
pub mod synthetic;
pub mod table;

// Re-exports from table
pub use table::{
    Frame,
    GroupIndex,
    read_parquet_path,
    write_parquet_path,
};

// Re-exports from aggregate
pub use aggregate::{check_invariants, derive_totals, InvariantReport};

// Re-exports from divergence
pub use divergence::{
    DivergenceCalculator,
    DivergenceDiagnostics,
    DivergenceTerms,
};

// Re-exports from mutual_info
pub use mutual_info::{
    MiRecord,
    MiSummary,
    MutualInformationSummarizer,
};

// Re-exports from config
pub use config::{
    Category,
    Dataset,
    PipelineConfig,
    SummaryConfig,
    SyntheticConfig,
    Vintage,
    VintageRegistry,
};

pub use error::{ConfigError, DklError, Result, SchemaError};
pub use synthetic::SyntheticMetro;
