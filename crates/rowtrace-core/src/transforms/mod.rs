//! Reference dataset transformations.
//!
//! Each transformation carries its configuration from construction and
//! delegates the reshaping itself to polars:
//!
//! - **growth**: row-wise growth rate with fault isolation
//! - **filter**: predicate filter that records removed rows
//! - **aggregate**: group-by with per-column reductions and source tracking
//! - **explode**: list explode with parent tracking
//! - **validate**: row validation that fails the whole step

pub mod aggregate;
pub mod explode;
pub mod filter;
pub mod growth;
pub mod validate;

pub use aggregate::{Aggregate, CONTRIBUTION_COUNTS_COLUMN, SOURCE_ROW_IDS_COLUMN};
pub use explode::{ExplodeColumn, PARENT_ROW_ID_COLUMN};
pub use filter::FilterRows;
pub use growth::{GrowthRate, growth_rate};
pub use validate::ValidateRows;
