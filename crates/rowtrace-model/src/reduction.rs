//! Aggregation reduction kinds understood by the aggregate transformation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ModelError;

/// Per-column reduction applied within each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    Sum,
    Mean,
    Median,
    Min,
    Max,
    Count,
    First,
    Last,
    NUnique,
    /// Collect the group's values into a list.
    List,
}

impl Reduction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reduction::Sum => "sum",
            Reduction::Mean => "mean",
            Reduction::Median => "median",
            Reduction::Min => "min",
            Reduction::Max => "max",
            Reduction::Count => "count",
            Reduction::First => "first",
            Reduction::Last => "last",
            Reduction::NUnique => "n_unique",
            Reduction::List => "list",
        }
    }

    pub fn all() -> &'static [Reduction] {
        &[
            Reduction::Sum,
            Reduction::Mean,
            Reduction::Median,
            Reduction::Min,
            Reduction::Max,
            Reduction::Count,
            Reduction::First,
            Reduction::Last,
            Reduction::NUnique,
            Reduction::List,
        ]
    }
}

impl fmt::Display for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Reduction {
    type Err = ModelError;

    /// Case-insensitive; accepts `nunique` and `collect` as aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();

        match normalized.as_str() {
            "sum" => Ok(Reduction::Sum),
            "mean" | "avg" => Ok(Reduction::Mean),
            "median" => Ok(Reduction::Median),
            "min" => Ok(Reduction::Min),
            "max" => Ok(Reduction::Max),
            "count" => Ok(Reduction::Count),
            "first" => Ok(Reduction::First),
            "last" => Ok(Reduction::Last),
            "n_unique" | "nunique" => Ok(Reduction::NUnique),
            "list" | "collect" => Ok(Reduction::List),
            _ => Err(ModelError::UnknownReduction(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduction_from_str() {
        assert_eq!("SUM".parse::<Reduction>().unwrap(), Reduction::Sum);
        assert_eq!("nunique".parse::<Reduction>().unwrap(), Reduction::NUnique);
        assert_eq!(" list ".parse::<Reduction>().unwrap(), Reduction::List);
        assert!("variance".parse::<Reduction>().is_err());
    }

    #[test]
    fn test_reduction_names_round_trip() {
        for reduction in Reduction::all() {
            assert_eq!(reduction.as_str().parse::<Reduction>().unwrap(), *reduction);
        }
    }
}
