use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid row id: {0:?}")]
    InvalidRowId(String),
    #[error("unknown reduction: {0}")]
    UnknownReduction(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
