//! Error types for entity-query

use std::fmt;
use thiserror::Error;

/// Repository error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid argument passed to a builder or constructor
    Precondition,
    /// Query name not registered in the catalog
    QueryNotFound,
    /// Single-result query matched more than one row
    NonUniqueResult,
    /// Parameter could not be bound to the statement
    Parameter,
    /// Database errors (SQLite)
    Database,
    /// Row mapping / JSON errors
    Serialization,
    /// Catalog configuration errors
    Config,
    /// I/O errors
    IO,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Precondition => "precondition",
            ErrorKind::QueryNotFound => "query_not_found",
            ErrorKind::NonUniqueResult => "non_unique_result",
            ErrorKind::Parameter => "parameter",
            ErrorKind::Database => "database",
            ErrorKind::Serialization => "serialization",
            ErrorKind::Config => "config",
            ErrorKind::IO => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Repository error type
#[derive(Debug, Error)]
#[error("[{kind}] {message}")]
pub struct RepositoryError {
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    pub kind: ErrorKind,
    pub message: String,
}

impl RepositoryError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // Convenience constructors
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Precondition, message)
    }

    pub fn query_not_found(query_name: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::QueryNotFound,
            format!("Named query not found: {}", query_name.into()),
        )
    }

    pub fn non_unique_result(query_name: impl Into<String>, rows: usize) -> Self {
        Self::new(
            ErrorKind::NonUniqueResult,
            format!(
                "Query '{}' matched at least {} rows, expected at most one",
                query_name.into(),
                rows
            ),
        )
    }

    pub fn parameter(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parameter, message)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }
}

// SQLite error conversions
#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        RepositoryError::database(format!("SQLite error: {}", err)).with_source(err)
    }
}

// JSON error conversions
impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::serialization(format!("JSON error: {}", err)).with_source(err)
    }
}

impl From<serde_yaml::Error> for RepositoryError {
    fn from(err: serde_yaml::Error) -> Self {
        RepositoryError::config(format!("YAML error: {}", err)).with_source(err)
    }
}

impl From<std::io::Error> for RepositoryError {
    fn from(err: std::io::Error) -> Self {
        RepositoryError::new(ErrorKind::IO, format!("IO error: {}", err)).with_source(err)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, RepositoryError>;
