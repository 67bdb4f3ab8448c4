//! Error types for crumbs-core

use crate::identity::UpgradeId;
use thiserror::Error;

/// Catalog construction error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid upgrade definition {id}: {reason}")]
    InvalidDefinition { id: UpgradeId, reason: String },

    #[error("Duplicate upgrade definition: {0}")]
    DuplicateUpgrade(UpgradeId),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Why a purchase did not go through.
///
/// Neither variant changes the snapshot it was computed from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PurchaseError {
    #[error("Upgrade not found: {0}")]
    UnknownUpgrade(UpgradeId),

    #[error("Not enough cookies. Need {required}, have {available}")]
    InsufficientFunds {
        upgrade_id: UpgradeId,
        required: u64,
        available: u64,
    },
}
