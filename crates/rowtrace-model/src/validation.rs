use std::collections::BTreeMap;
use std::fmt;

/// A structured validation failure: field (or rule description) to message.
///
/// Row-level fault isolation never swallows this error; it always surfaces
/// as a step-global failure.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize)]
pub struct ValidationError {
    pub errors: BTreeMap<String, String>,
}

impl ValidationError {
    pub fn new(errors: BTreeMap<String, String>) -> Self {
        Self { errors }
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.into(), message.into());
        Self { errors }
    }

    /// Prefix every key with `"<context> -> "`.
    #[must_use]
    pub fn with_context(self, context: &str) -> Self {
        let errors = self
            .errors
            .into_iter()
            .map(|(key, message)| (format!("{context} -> {key}"), message))
            .collect();
        Self { errors }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed: {:?}", self.errors)
    }
}

impl std::error::Error for ValidationError {}
