//! Crumbs DB - Database layer using native_db
//!
//! Provides persistent storage for:
//! - Player snapshots, keyed by player ID, with a storage revision
//! - The upgrade catalog, keyed by upgrade ID, seeded once when empty

mod error;
mod models;
mod queries;
mod store;

pub use error::{Error, Result};
pub use queries::{PlayerTotals, Ranking};
pub use store::Store;
