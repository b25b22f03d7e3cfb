//! Table Module: Columnar Frames, Schema and Persistence
//!
//! Every stage of the pipeline is a function from one [`Frame`] to another.
//! A frame wraps an Arrow [`RecordBatch`](arrow::record_batch::RecordBatch);
//! the unit row is one (block group, demographic bin) observation:
//!
//! ```text
//! block_id │ county_id │ metro_id │ category_group │ bin_id │ block_count │ totals…
//! ```
//!
//! - [`columns`]: canonical column names and the required sets per stage
//! - [`coerce`]: `ndarray` views over columns with the count-coercion rules
//! - [`io`]: Parquet reader/writer
//! - [`GroupIndex`]: group-by over composite keys with sum/broadcast

pub mod columns;
pub mod coerce;
pub mod io;
mod frame;
mod group;

pub use coerce::CoercionReport;
pub use frame::{float_array, int_array, text_array, Frame};
pub use group::GroupIndex;
pub use io::{read_parquet, read_parquet_path, write_parquet, write_parquet_path};
