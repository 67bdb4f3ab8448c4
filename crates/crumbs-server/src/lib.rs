//! Crumbs Server - HTTP front end for the idle-clicker backend
//!
//! Wires a [`ServerConfig`] to a native_db [`Store`], seeds the upgrade
//! catalog and serves the game API over hyper.

pub mod config;
mod error;
pub mod response;
pub mod routes;

pub use config::{ConfigError, ServerConfig};
pub use error::{Result, ServerError};
pub use routes::{handle, AppState};

use crumbs_core::{Catalog, SystemClock};
use crumbs_db::Store;
use crumbs_service::GameService;
use std::fs;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. RUST_LOG wins over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Open storage, seed the catalog if needed and build the game service
pub fn open_service(config: &ServerConfig) -> Result<GameService<Store, SystemClock>> {
    let store = match &config.database {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            info!(path = %path.display(), "opening database");
            Store::open(path)?
        }
        None => {
            warn!("no database configured, player data will not survive a restart");
            Store::in_memory()?
        }
    };

    let defaults = match &config.catalog {
        Some(path) => {
            let catalog = crumbs_script::load_catalog(path)?;
            info!(path = %path.display(), upgrades = catalog.len(), "loaded catalog");
            catalog
        }
        None => Catalog::starter(),
    };

    Ok(GameService::bootstrap(
        store,
        SystemClock,
        &defaults,
        config.service_config(),
    )?)
}
