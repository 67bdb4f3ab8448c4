//! Crumbs Script - RON loader for the upgrade catalog
//!
//! Loads upgrade definitions from RON files so operators can change the
//! seeded catalog without rebuilding:
//!
//! ```ron
//! (
//!     upgrades: [
//!         (id: "cursor", name: "Cursor", base_cost: 15, generation_boost: 1),
//!     ]
//! )
//! ```

mod error;
mod loader;

pub use error::{Error, Result};
pub use loader::{load_catalog, CatalogFile, Loader};
