//! Shared types for rowtrace.
//!
//! - **ids**: row identifiers and error subjects
//! - **value**: typed cell values and the [`Row`] record
//! - **records**: error, transformation, and removal ledger records
//! - **validation**: the structured [`ValidationError`]
//! - **reduction**: aggregation reduction kinds

pub mod error;
pub mod ids;
pub mod records;
pub mod reduction;
pub mod validation;
pub mod value;

pub use error::{ModelError, Result};
pub use ids::{GLOBAL_SUBJECT, ROW_ID_COLUMN, RowId, Subject};
pub use records::{Details, ErrorRecord, RemovedRow, TransformationRecord};
pub use reduction::Reduction;
pub use validation::ValidationError;
pub use value::{FieldError, Row, Value};
