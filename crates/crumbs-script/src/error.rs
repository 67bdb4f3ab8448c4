//! Error types for crumbs-script

use thiserror::Error;

/// Script loading error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("Invalid catalog: {0}")]
    Catalog(#[from] crumbs_core::Error),

    #[error("Empty catalog: {0}")]
    Empty(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
