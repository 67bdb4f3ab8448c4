//! Error types for crumbs-service

use crumbs_core::{PlayerId, UpgradeId};
use thiserror::Error;

/// The closed set of failures an operation can report.
///
/// Storage-specific errors never leak past this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The requested upgrade is not in the catalog; nothing changed
    #[error("Upgrade not found: {0}")]
    UnknownUpgrade(UpgradeId),

    /// The store could not be read or written
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Concurrent writers kept invalidating this operation
    #[error("Conflicting update for {player} after {attempts} attempts")]
    Conflict { player: PlayerId, attempts: u32 },
}

impl From<crumbs_db::Error> for ServiceError {
    fn from(err: crumbs_db::Error) -> Self {
        ServiceError::StorageUnavailable(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ServiceError>;
