//! Error types for doomreader operations.

use thiserror::Error;

/// Errors surfaced by ingestion and the library.
///
/// Per-unit load failures and cover lookups never show up here: they are
/// absorbed where they happen and reported through logs or
/// [`ParsedBook::failures`](crate::ingest::ParsedBook::failures).
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported file format: {0} (use .epub or .docx)")]
    UnsupportedFormat(String),

    #[error("Failed to load document: {0}")]
    Load(String),

    #[error("Book not found: {0}")]
    BookNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Store lock poisoned")]
    Lock,
}

impl Error {
    /// True for failures of the storage layer rather than of the input.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            Error::Io(_) | Error::Sqlite(_) | Error::Json(_) | Error::Lock
        )
    }
}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Error::Lock
    }
}

pub type Result<T> = std::result::Result<T, Error>;
