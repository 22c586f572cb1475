//! Row-level validation rules.

use std::fmt;

use serde::{Deserialize, Serialize};

use rowtrace_model::Row;

type Check = dyn Fn(&Row) -> anyhow::Result<bool> + Send + Sync;

/// Comparison operator for threshold rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
        }
    }

    pub fn holds(&self, left: f64, right: f64) -> bool {
        match self {
            CompareOp::Gt => left > right,
            CompareOp::Ge => left >= right,
            CompareOp::Lt => left < right,
            CompareOp::Le => left <= right,
            CompareOp::Eq => left == right,
            CompareOp::Ne => left != right,
        }
    }
}

/// A named predicate over a row.
///
/// A rule that returns `Ok(false)` failed; a rule that returns `Err` could
/// not be evaluated. Both are reported against the rule's description.
pub struct Rule {
    description: String,
    check: Box<Check>,
}

impl Rule {
    pub fn new<F>(description: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Row) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            check: Box::new(check),
        }
    }

    /// `row[field] <op> threshold`, evaluated numerically.
    pub fn compare(
        description: impl Into<String>,
        field: impl Into<String>,
        op: CompareOp,
        threshold: f64,
    ) -> Self {
        let field = field.into();
        Self::new(description, move |row| {
            let value = row.require_f64(&field)?;
            Ok(op.holds(value, threshold))
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn evaluate(&self, row: &Row) -> anyhow::Result<bool> {
        (self.check)(row)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
