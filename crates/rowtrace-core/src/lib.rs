//! Row lineage and metadata tracking for sequential polars pipelines.
//!
//! This crate provides:
//!
//! - **identity**: `row_id` assignment before the first step
//! - **ledger**: lineage, error, transformation, and removal ledgers
//! - **transformation**: the dataset-level and row-level function contracts
//! - **instrument**: fault-tolerant row wrappers and tracked step wrappers
//! - **pipeline**: the sequential runner and its run states
//! - **transforms**: reference transformations (growth, filter, aggregate, explode)
//! - **frame**: conversions between frames and rows

pub mod error;
pub mod frame;
pub mod identity;
pub mod instrument;
pub mod ledger;
pub mod pipeline;
pub mod transformation;
pub mod transforms;

pub use error::{CoreError, Result, RowError};
pub use identity::{IdentityOptions, assign_row_ids, assign_row_ids_with, mint_ids, row_ids};
pub use instrument::{FaultTolerant, Tracked};
pub use ledger::MetadataLedger;
pub use pipeline::{Pipeline, PipelineBuilder, RunState};
pub use transformation::{DatasetTransformation, FnTransformation, RowFunction, StepContext};
