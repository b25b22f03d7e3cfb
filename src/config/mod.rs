//! Configuration: static lookup tables and run settings
//!
//! - [`Category`]: the four demographic dimensions and their bin labels
//! - [`VintageRegistry`]: immutable year × dataset table, built once at startup
//! - [`PipelineConfig`]: serde-loadable settings for a run

mod categories;
mod pipeline;
mod vintages;

pub use categories::Category;
pub use pipeline::{PipelineConfig, SummaryConfig, SyntheticConfig};
pub use vintages::{Dataset, Vintage, VintageRegistry};
