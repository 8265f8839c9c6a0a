//! Error types for lab access provisioning.

use thiserror::Error;

/// Top-level error type for all provisioning operations.
#[derive(Debug, Error)]
pub enum LabAccessError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("event error: {0}")]
    Event(String),

    #[error("roster error: {0}")]
    Roster(String),

    #[error("invalid row: {0}")]
    InvalidRow(String),

    #[error("object storage error: {0}")]
    Storage(String),

    #[error("identity directory error: {0}")]
    Directory(String),

    #[error("account assignment error: {0}")]
    Assignment(String),

    #[error("status store error: {0}")]
    StatusStore(String),

    #[error("email error: {0}")]
    Email(String),

    #[error("parameter store error: {0}")]
    Parameter(String),

    #[error("template error: {0}")]
    Template(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A convenience Result alias that defaults to [`LabAccessError`].
pub type Result<T> = std::result::Result<T, LabAccessError>;
