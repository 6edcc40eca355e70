use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("record id must not be empty")]
    InvalidRecordId(String),
    #[error("unknown view: {0}")]
    UnknownView(String),
    #[error("invalid filter '{0}': expected FIELD=VALUE")]
    InvalidFilter(String),
    #[error("{view} has no field '{field}'")]
    UnknownField { view: String, field: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
