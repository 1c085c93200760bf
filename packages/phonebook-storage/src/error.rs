//! Error types for phonebook-storage

use std::fmt;
use thiserror::Error;

/// Storage error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A contact field rejected its input
    Validation,
    /// CRUD call while the store is closed
    NotOpen,
    /// SQLite prepare/bind/execute failure
    Engine,
    /// Insert with a phone number that is already stored
    DuplicateKey,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotOpen => "not_open",
            ErrorKind::Engine => "engine",
            ErrorKind::DuplicateKey => "duplicate_key",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Storage error type
#[derive(Debug, Error)]
#[error("[{kind}] {message}")]
pub struct StorageError {
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    pub kind: ErrorKind,
    pub message: String,
}

impl StorageError {
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
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::Validation,
            format!("invalid {}: {}", field, message.into()),
        )
    }

    pub fn not_open(operation: &str) -> Self {
        Self::new(
            ErrorKind::NotOpen,
            format!("database not open, cannot {}", operation),
        )
    }

    pub fn engine(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Engine, message)
    }

    pub fn duplicate_phone(phone: &str) -> Self {
        Self::new(
            ErrorKind::DuplicateKey,
            format!("contact with phone number '{}' already exists", phone),
        )
    }

    /// True for the expected, user-facing rejections (bad input, duplicate phone)
    pub fn is_rejection(&self) -> bool {
        matches!(self.kind, ErrorKind::Validation | ErrorKind::DuplicateKey)
    }
}

// SQLite error conversions
#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::engine(format!("SQLite error: {}", err)).with_source(err)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, StorageError>;
