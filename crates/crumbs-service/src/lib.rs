//! Crumbs Service - reconcile-then-persist orchestration
//!
//! Every player-facing operation follows the same cycle:
//! 1. load the snapshot (creating new players on first sight)
//! 2. reconcile passive accrual up to now
//! 3. apply the requested mutation, if any
//! 4. re-derive generation rate and manual yield from the catalog
//! 5. persist with a fresh checkpoint
//!
//! There is no background scheduler. Reads persist too, so an idle player's
//! checkpoint keeps moving forward and no accrued time is lost.
//!
//! Same-player races are settled by the configured [`WritePolicy`].

mod config;
mod error;
mod service;
mod store;
mod views;

pub use config::{ServiceConfig, WritePolicy};
pub use error::{Result, ServiceError};
pub use service::GameService;
pub use store::GameStore;
pub use views::{
    ClickReceipt, GameState, GlobalStats, Leaderboard, LeaderboardEntry, PurchaseOutcome,
    PurchaseReceipt, PurchaseRejection, SaveReceipt, SnapshotView, SyncReceipt, UpgradeOffer,
};
