//! JSON pipeline configuration.
//!
//! ```json
//! {
//!   "id_column": "order_id",
//!   "steps": [
//!     { "kind": "growth_rate", "target": "growth_rate" },
//!     { "kind": "filter", "column": "growth_rate", "op": "gt", "value": 0.15 },
//!     { "kind": "aggregate", "group_by": ["region"], "aggregations": { "amount": "sum" } },
//!     { "kind": "explode", "column": "tags", "separator": ";" }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use polars::prelude::{Expr, col, lit};
use serde::{Deserialize, Serialize};

use rowtrace_core::transforms::{Aggregate, ExplodeColumn, FilterRows, GrowthRate, ValidateRows};
use rowtrace_core::{IdentityOptions, MetadataLedger, Pipeline, PipelineBuilder};
use rowtrace_model::Reduction;
use rowtrace_validate::{CompareOp, FieldType, Rule, Validator};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Column to reuse as row identifiers when it is a unique key.
    #[serde(default)]
    pub id_column: Option<String>,
    pub steps: Vec<StepConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepConfig {
    GrowthRate {
        target: String,
        #[serde(default = "default_start_column")]
        start: String,
        #[serde(default = "default_end_column")]
        end: String,
        #[serde(default)]
        fallback: Option<f64>,
    },
    Filter(FilterConfig),
    Aggregate {
        group_by: Vec<String>,
        #[serde(default)]
        aggregations: BTreeMap<String, Reduction>,
    },
    Explode {
        column: String,
        #[serde(default)]
        separator: Option<String>,
    },
    Validate {
        #[serde(default)]
        fields: BTreeMap<String, FieldType>,
        #[serde(default)]
        rules: Vec<RuleConfig>,
    },
}

fn default_start_column() -> String {
    "start_value".to_string()
}

fn default_end_column() -> String {
    "end_value".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
    NotNull,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Gt => ">",
            FilterOp::Ge => ">=",
            FilterOp::Lt => "<",
            FilterOp::Le => "<=",
            FilterOp::Eq => "==",
            FilterOp::Ne => "!=",
            FilterOp::NotNull => "is not null",
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub column: String,
    pub op: FilterOp,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    /// Step name; defaults to `filter_<column>`.
    #[serde(default)]
    pub name: Option<String>,
    /// Removal reason; defaults to the condition itself.
    #[serde(default)]
    pub reason: Option<String>,
}

impl FilterConfig {
    pub fn step_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("filter_{}", self.column))
    }

    /// Human-readable form of the kept-rows condition, e.g. `amount > 0`.
    pub fn condition(&self) -> String {
        match &self.value {
            Some(value) if self.op != FilterOp::NotNull => {
                format!("{} {} {value}", self.column, self.op)
            }
            _ => format!("{} {}", self.column, self.op),
        }
    }

    pub fn predicate(&self) -> Result<Expr> {
        let column = col(self.column.as_str());
        let value = || -> Result<Expr> {
            let Some(value) = &self.value else {
                bail!(
                    "filter on `{}` with op `{}` requires a value",
                    self.column,
                    self.op
                );
            };
            literal(value).with_context(|| format!("filter on `{}`", self.column))
        };
        Ok(match self.op {
            FilterOp::NotNull => column.is_not_null(),
            FilterOp::Gt => column.gt(value()?),
            FilterOp::Ge => column.gt_eq(value()?),
            FilterOp::Lt => column.lt(value()?),
            FilterOp::Le => column.lt_eq(value()?),
            FilterOp::Eq => column.eq(value()?),
            FilterOp::Ne => column.neq(value()?),
        })
    }
}

fn literal(value: &serde_json::Value) -> Result<Expr> {
    use serde_json::Value as Json;

    Ok(match value {
        Json::Bool(flag) => lit(*flag),
        Json::Number(number) => match (number.as_i64(), number.as_f64()) {
            (Some(int), _) => lit(int),
            (None, Some(float)) => lit(float),
            (None, None) => bail!("unsupported number {number}"),
        },
        Json::String(text) => lit(text.as_str()),
        other => bail!("unsupported filter value {other}"),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Rule description; defaults to the comparison itself.
    #[serde(default)]
    pub description: Option<String>,
    pub field: String,
    pub op: CompareOp,
    pub value: f64,
}

impl RuleConfig {
    pub fn to_rule(&self) -> Rule {
        let description = self.description.clone().unwrap_or_else(|| {
            format!("{} {} {}", self.field, self.op.symbol(), self.value)
        });
        Rule::compare(description, self.field.clone(), self.op, self.value)
    }
}

impl StepConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            StepConfig::GrowthRate { .. } => "growth_rate",
            StepConfig::Filter(_) => "filter",
            StepConfig::Aggregate { .. } => "aggregate",
            StepConfig::Explode { .. } => "explode",
            StepConfig::Validate { .. } => "validate",
        }
    }

    /// Every step kind with a one-line description.
    pub fn kinds() -> [(&'static str, &'static str); 5] {
        [
            (
                "growth_rate",
                "(end - start) / start per row; failing rows get a fallback and an error record",
            ),
            (
                "filter",
                "keep rows matching a comparison; dropped rows go to the removal log",
            ),
            (
                "aggregate",
                "group and reduce; each group gets a new row id plus source_row_ids",
            ),
            (
                "explode",
                "one row per list element; each gets a new row id plus parent_row_id",
            ),
            (
                "validate",
                "check field types and threshold rules; any failure fails the run",
            ),
        ]
    }

    fn add_to(&self, builder: PipelineBuilder) -> Result<PipelineBuilder> {
        Ok(match self {
            StepConfig::GrowthRate {
                target,
                start,
                end,
                fallback,
            } => {
                let mut step = GrowthRate::new(target.as_str()).with_columns(start, end);
                if let Some(fallback) = fallback {
                    step = step.with_fallback(*fallback);
                }
                builder.tracked(step)
            }
            StepConfig::Filter(filter) => {
                let reason = filter.reason.clone().unwrap_or_else(|| filter.condition());
                builder.tracked(
                    FilterRows::new(filter.step_name(), filter.predicate()?).with_reason(reason),
                )
            }
            StepConfig::Aggregate {
                group_by,
                aggregations,
            } => {
                if group_by.is_empty() {
                    bail!("aggregate step needs at least one `group_by` column");
                }
                builder.tracked(
                    Aggregate::new(group_by.iter().cloned())
                        .with_aggregations(aggregations.clone()),
                )
            }
            StepConfig::Explode { column, separator } => {
                let mut step = ExplodeColumn::new(column.as_str());
                if let Some(separator) = separator {
                    step = step.with_separator(separator.as_str());
                }
                builder.tracked(step)
            }
            StepConfig::Validate { fields, rules } => {
                let mut validator = Validator::new();
                for (name, field_type) in fields {
                    validator = validator.field(name.as_str(), *field_type);
                }
                for rule in rules {
                    validator = validator.rule(rule.to_rule());
                }
                builder.tracked(ValidateRows::new(validator))
            }
        })
    }
}

impl PipelineConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parse pipeline config")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read pipeline config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Build a pipeline writing into `ledger`; every step is tracked.
    pub fn build(&self, ledger: MetadataLedger) -> Result<Pipeline> {
        let mut builder = Pipeline::builder(ledger);
        if let Some(column) = &self.id_column {
            builder = builder.identity(IdentityOptions::new().with_reuse_column(column.as_str()));
        }
        for (index, step) in self.steps.iter().enumerate() {
            builder = step
                .add_to(builder)
                .with_context(|| format!("step {index} ({})", step.kind()))?;
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_without_value_is_rejected() {
        let filter = FilterConfig {
            column: "amount".to_string(),
            op: FilterOp::Gt,
            value: None,
            name: None,
            reason: None,
        };
        let error = filter.predicate().unwrap_err();
        assert_eq!(
            error.to_string(),
            "filter on `amount` with op `>` requires a value"
        );
    }

    #[test]
    fn test_not_null_ignores_value() {
        let filter = FilterConfig {
            column: "amount".to_string(),
            op: FilterOp::NotNull,
            value: Some(serde_json::json!(3)),
            name: Some("has_amount".to_string()),
            reason: None,
        };
        assert!(filter.predicate().is_ok());
        assert_eq!(filter.condition(), "amount is not null");
        assert_eq!(filter.step_name(), "has_amount");
    }
}
