use std::collections::BTreeMap;

use rowtrace_model::{Row, RowId, ValidationError};
use tracing::debug;

use crate::rules::Rule;
use crate::schema::FieldType;

/// Schema and rule validator for a single row.
///
/// All problems are collected before failing so one validation pass reports
/// every broken field and rule at once.
#[derive(Debug, Default)]
pub struct Validator {
    schema: Vec<(String, FieldType)>,
    rules: Vec<Rule>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `name` to be present with type `field_type`.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.schema.push((name.into(), field_type));
        self
    }

    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn schema(&self) -> &[(String, FieldType)] {
        &self.schema
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Validate a row against the schema, then every rule.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] keyed by field name (schema problems)
    /// or rule description (rule problems).
    pub fn validate(&self, row: &Row) -> Result<(), ValidationError> {
        let mut errors = BTreeMap::new();

        for (name, expected) in &self.schema {
            let Some(value) = row.get(name) else {
                errors.insert(name.clone(), format!("Missing key: {name}"));
                continue;
            };
            if !expected.accepts(value) {
                errors.insert(
                    name.clone(),
                    format!("Expected {expected}, got {}", value.type_name()),
                );
            }
        }

        for rule in &self.rules {
            match rule.evaluate(row) {
                Ok(true) => {}
                Ok(false) => {
                    errors.insert(
                        rule.description().to_string(),
                        format!("Validation failed: {}", rule.description()),
                    );
                }
                Err(error) => {
                    errors.insert(
                        rule.description().to_string(),
                        format!("Rule evaluation error: {error}"),
                    );
                }
            }
        }

        if errors.is_empty() {
            return Ok(());
        }
        debug!(
            row_id = row.row_id().map_or("-", RowId::as_str),
            error_count = errors.len(),
            "row failed validation"
        );
        Err(ValidationError::new(errors))
    }
}
