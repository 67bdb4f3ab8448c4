//! Startup errors

use crate::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] crumbs_db::Error),

    #[error("Catalog error: {0}")]
    Catalog(#[from] crumbs_script::Error),

    #[error("Service error: {0}")]
    Service(#[from] crumbs_service::ServiceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ServerError>;
