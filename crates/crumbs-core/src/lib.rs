//! Crumbs Core - Accrual and upgrade economy engine
//!
//! This crate holds the pure parts of the idle-clicker backend:
//! - Player snapshots and owned-upgrade counts (`PlayerSnapshot`, `OwnedUpgrades`)
//! - The upgrade catalog and its starter set (`Catalog`, `UpgradeDef`)
//! - Lazy, checkpoint-based passive accrual (`accrual::reconcile`)
//! - Geometric upgrade costs and stat aggregation (`economy`)
//! - Manual actions (`click::apply_click`)
//!
//! Nothing here touches storage or wall-clock time directly. Every operation
//! takes `now` as an argument, so the same inputs always give the same
//! snapshot. Use a [`Clock`] to obtain `now` at the edges.

pub mod accrual;
mod catalog;
pub mod click;
pub mod economy;
mod error;
mod identity;
mod snapshot;
pub mod time;

pub use accrual::{reconcile, Accrual};
pub use catalog::{Catalog, UpgradeDef};
pub use click::{apply_click, Click};
pub use economy::{aggregate, next_cost, purchase, Purchase, Stats};
pub use error::{Error, PurchaseError, Result};
pub use identity::{PlayerId, UpgradeId};
pub use snapshot::{OwnedUpgrades, PlayerSnapshot};
pub use time::{Checkpoint, Clock, ManualClock, SystemClock};
