//! Storage seam used by the service

use crumbs_core::{Catalog, PlayerId, PlayerSnapshot};
use crumbs_db::{PlayerTotals, Ranking, Store};
use std::sync::Arc;

/// What the service needs from persistence
pub trait GameStore: Send + Sync {
    fn load_player(&self, player_id: &PlayerId) -> crumbs_db::Result<Option<PlayerSnapshot>>;

    /// Unconditional write; returns the new revision
    fn save_player(&self, snapshot: &PlayerSnapshot) -> crumbs_db::Result<u64>;

    /// Write only if the stored revision equals `snapshot.version`
    fn save_player_versioned(&self, snapshot: &PlayerSnapshot) -> crumbs_db::Result<u64>;

    fn load_catalog(&self) -> crumbs_db::Result<Catalog>;

    fn seed_catalog_if_empty(&self, catalog: &Catalog) -> crumbs_db::Result<bool>;

    fn player_totals(&self) -> crumbs_db::Result<PlayerTotals>;

    fn top_players(&self, limit: usize) -> crumbs_db::Result<Ranking>;
}

impl GameStore for Store {
    fn load_player(&self, player_id: &PlayerId) -> crumbs_db::Result<Option<PlayerSnapshot>> {
        Store::load_player(self, player_id.as_str())
    }

    fn save_player(&self, snapshot: &PlayerSnapshot) -> crumbs_db::Result<u64> {
        Store::save_player(self, snapshot)
    }

    fn save_player_versioned(&self, snapshot: &PlayerSnapshot) -> crumbs_db::Result<u64> {
        Store::save_player_versioned(self, snapshot)
    }

    fn load_catalog(&self) -> crumbs_db::Result<Catalog> {
        Store::load_catalog(self)
    }

    fn seed_catalog_if_empty(&self, catalog: &Catalog) -> crumbs_db::Result<bool> {
        Store::seed_catalog_if_empty(self, catalog)
    }

    fn player_totals(&self) -> crumbs_db::Result<PlayerTotals> {
        Store::player_totals(self)
    }

    fn top_players(&self, limit: usize) -> crumbs_db::Result<Ranking> {
        Store::top_players(self, limit)
    }
}

impl<S: GameStore + ?Sized> GameStore for Arc<S> {
    fn load_player(&self, player_id: &PlayerId) -> crumbs_db::Result<Option<PlayerSnapshot>> {
        (**self).load_player(player_id)
    }

    fn save_player(&self, snapshot: &PlayerSnapshot) -> crumbs_db::Result<u64> {
        (**self).save_player(snapshot)
    }

    fn save_player_versioned(&self, snapshot: &PlayerSnapshot) -> crumbs_db::Result<u64> {
        (**self).save_player_versioned(snapshot)
    }

    fn load_catalog(&self) -> crumbs_db::Result<Catalog> {
        (**self).load_catalog()
    }

    fn seed_catalog_if_empty(&self, catalog: &Catalog) -> crumbs_db::Result<bool> {
        (**self).seed_catalog_if_empty(catalog)
    }

    fn player_totals(&self) -> crumbs_db::Result<PlayerTotals> {
        (**self).player_totals()
    }

    fn top_players(&self, limit: usize) -> crumbs_db::Result<Ranking> {
        (**self).top_players(limit)
    }
}
