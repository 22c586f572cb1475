#![deny(unsafe_code)]

use std::fmt;

use crate::ModelError;

/// Name of the identifier column injected into every tracked dataset.
pub const ROW_ID_COLUMN: &str = "row_id";

/// Sentinel rendered for errors that belong to a whole transformation.
pub const GLOBAL_SUBJECT: &str = "global";

/// An opaque, run-unique row identifier.
///
/// Minted identifiers are hyphenated lowercase UUID v4 strings. Identifiers
/// reused from an existing column keep that column's text verbatim.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    /// Mint a fresh identifier.
    pub fn mint() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Wrap an existing identifier.
    ///
    /// Blank values and the global sentinel are rejected so an error record
    /// for a row can never read like a step-level one.
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == GLOBAL_SUBJECT {
            return Err(ModelError::InvalidRowId(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RowId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// What an error record is attributed to: one row, or the whole step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subject {
    Row(RowId),
    Global,
}

impl Subject {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Row(id) => id.as_str(),
            Self::Global => GLOBAL_SUBJECT,
        }
    }

    pub fn row_id(&self) -> Option<&RowId> {
        match self {
            Self::Row(id) => Some(id),
            Self::Global => None,
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global)
    }
}

impl From<RowId> for Subject {
    fn from(id: RowId) -> Self {
        Self::Row(id)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for Subject {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
