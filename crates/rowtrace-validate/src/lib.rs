//! Schema and rule validation for rowtrace rows.
//!
//! A [`Validator`] checks field presence and types, then evaluates each
//! [`Rule`], and fails with a [`rowtrace_model::ValidationError`] carrying
//! every problem found.

pub mod rules;
pub mod schema;
pub mod validator;

pub use rules::{CompareOp, Rule};
pub use schema::FieldType;
pub use validator::Validator;
