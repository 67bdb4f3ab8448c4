//! Error types for database operations.

use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Native DB error.
    #[error("Database error: {0}")]
    Database(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A stored catalog entry failed validation.
    #[error("Invalid catalog: {0}")]
    Catalog(#[from] crumbs_core::Error),

    /// The stored revision differs from the one the write was based on.
    #[error("Version conflict on {key}: expected {expected}, found {found}")]
    VersionConflict {
        key: String,
        expected: u64,
        found: u64,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether retrying the whole read-modify-write may succeed
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::VersionConflict { .. })
    }
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, Error>;
