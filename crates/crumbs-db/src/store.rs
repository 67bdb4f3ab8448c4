//! Database store wrapper.

use crate::error::{Error, Result};
use crate::models::*;
use crumbs_core::{Catalog, PlayerSnapshot};
use native_db::*;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info};

// Static models for the database
static MODELS: LazyLock<Models> = LazyLock::new(|| {
    let mut models = Models::new();
    models
        .define::<StoredPlayer>()
        .expect("StoredPlayer model definition");
    models
        .define::<StoredUpgrade>()
        .expect("StoredUpgrade model definition");
    models
});

/// Database store for player snapshots and the upgrade catalog.
pub struct Store {
    pub(crate) db: Database<'static>,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Builder::new()
            .create(&MODELS, path.as_ref())
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(Self { db })
    }

    /// Create an in-memory database.
    pub fn in_memory() -> Result<Self> {
        let db = Builder::new()
            .create_in_memory(&MODELS)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(Self { db })
    }

    /// Load a player snapshot by ID.
    pub fn load_player(&self, player_id: &str) -> Result<Option<PlayerSnapshot>> {
        let r = self.db.r_transaction()?;
        let stored: Option<StoredPlayer> = r.get().primary(player_id.to_string())?;
        stored.map(|s| s.to_snapshot()).transpose()
    }

    /// Save a player snapshot unconditionally.
    ///
    /// Whatever is stored is overwritten. The revision still advances past
    /// both the stored one and the snapshot's, so versioned writers based on
    /// the overwritten row will notice. Returns the new revision.
    pub fn save_player(&self, snapshot: &PlayerSnapshot) -> Result<u64> {
        let rw = self.db.rw_transaction()?;
        let current: Option<StoredPlayer> =
            rw.get().primary(snapshot.player_id.as_str().to_string())?;
        let found = current.map(|c| c.version).unwrap_or(0);
        let version = found.max(snapshot.version) + 1;

        rw.upsert(StoredPlayer::from_snapshot(snapshot, version)?)?;
        rw.commit()?;
        debug!(player = %snapshot.player_id, version, "saved player");
        Ok(version)
    }

    /// Save a player snapshot only if the stored revision still equals
    /// `snapshot.version`.
    ///
    /// A snapshot with version 0 may only create a row, never replace one.
    /// Returns the new revision, or [`Error::VersionConflict`].
    pub fn save_player_versioned(&self, snapshot: &PlayerSnapshot) -> Result<u64> {
        let key = snapshot.player_id.as_str().to_string();
        let rw = self.db.rw_transaction()?;
        let current: Option<StoredPlayer> = rw.get().primary(key.clone())?;
        let found = current.map(|c| c.version).unwrap_or(0);

        if found != snapshot.version {
            return Err(Error::VersionConflict {
                key,
                expected: snapshot.version,
                found,
            });
        }

        let version = found + 1;
        rw.upsert(StoredPlayer::from_snapshot(snapshot, version)?)?;
        rw.commit()?;
        debug!(player = %snapshot.player_id, version, "saved player (versioned)");
        Ok(version)
    }

    /// Load the upgrade catalog in seeded order.
    pub fn load_catalog(&self) -> Result<Catalog> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().primary::<StoredUpgrade>()?;
        let iter = scan.all()?;
        let upgrades: std::result::Result<Vec<StoredUpgrade>, _> = iter.collect();
        let mut upgrades = upgrades.map_err(|e| Error::Database(e.to_string()))?;
        upgrades.sort_by_key(|u| u.position);
        Catalog::from_defs(upgrades.iter().map(|u| u.to_def())).map_err(Error::from)
    }

    /// Seed the catalog if no upgrade is stored yet.
    ///
    /// Returns whether seeding happened.
    pub fn seed_catalog_if_empty(&self, catalog: &Catalog) -> Result<bool> {
        let empty = {
            let r = self.db.r_transaction()?;
            let scan = r.scan().primary::<StoredUpgrade>()?;
            let mut iter = scan.all()?;
            iter.next().is_none()
        };
        if !empty {
            debug!("upgrade catalog already present");
            return Ok(false);
        }

        let rw = self.db.rw_transaction()?;
        for (position, def) in catalog.iter().enumerate() {
            rw.insert(StoredUpgrade::from_def(def, position as u32))?;
        }
        rw.commit()?;
        info!(upgrades = catalog.len(), "seeded upgrade catalog");
        Ok(true)
    }
}

impl From<native_db::db_type::Error> for Error {
    fn from(err: native_db::db_type::Error) -> Self {
        Error::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crumbs_core::time::from_epoch_seconds;
    use crumbs_core::{Checkpoint, UpgradeDef};

    fn alice() -> PlayerSnapshot {
        let mut s = PlayerSnapshot::fresh("alice", from_epoch_seconds(1_700_000_000.0));
        s.resource_total = 42;
        s.generation_rate = 3;
        s.owned_upgrades.set("cursor", 3);
        s.total_actions = 9;
        s
    }

    #[test]
    fn test_player_round_trip() {
        let store = Store::in_memory().unwrap();
        assert!(store.load_player("alice").unwrap().is_none());

        let version = store.save_player(&alice()).unwrap();
        assert_eq!(version, 1);

        let loaded = store.load_player("alice").unwrap().unwrap();
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.owned_upgrades.count("cursor"), 3);
        assert_eq!(PlayerSnapshot { version: 0, ..loaded }, alice());
    }

    #[test]
    fn test_text_checkpoint_survives_storage() {
        let store = Store::in_memory().unwrap();
        let mut s = alice();
        s.last_reconciled_at = Some(Checkpoint::Text("garbage".into()));
        store.save_player(&s).unwrap();

        let loaded = store.load_player("alice").unwrap().unwrap();
        assert!(loaded.last_reconciled_at.unwrap().is_malformed());
    }

    #[test]
    fn test_versioned_save() {
        let store = Store::in_memory().unwrap();
        let v1 = store.save_player_versioned(&alice()).unwrap();
        assert_eq!(v1, 1);

        let mut loaded = store.load_player("alice").unwrap().unwrap();
        loaded.resource_total += 1;
        assert_eq!(store.save_player_versioned(&loaded).unwrap(), 2);

        // `loaded` still says version 1
        let err = store.save_player_versioned(&loaded).unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.load_player("alice").unwrap().unwrap().resource_total, 43);
    }

    #[test]
    fn test_unpersisted_snapshot_cannot_replace_row() {
        let store = Store::in_memory().unwrap();
        store.save_player(&alice()).unwrap();

        let blank = PlayerSnapshot::new("alice");
        let err = store.save_player_versioned(&blank).unwrap_err();
        match err {
            Error::VersionConflict {
                expected, found, ..
            } => {
                assert_eq!(expected, 0);
                assert_eq!(found, 1);
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(store.load_player("alice").unwrap().unwrap().resource_total, 42);
    }

    #[test]
    fn test_blind_save_advances_version() {
        let store = Store::in_memory().unwrap();
        store.save_player(&alice()).unwrap();
        store.save_player(&alice()).unwrap();

        // A stale versioned writer notices the blind overwrite
        let mut stale = alice();
        stale.version = 1;
        assert!(store.save_player_versioned(&stale).unwrap_err().is_conflict());
    }

    #[test]
    fn test_seed_catalog_once() {
        let store = Store::in_memory().unwrap();
        assert!(store.seed_catalog_if_empty(&Catalog::starter()).unwrap());

        let other = Catalog::from_defs([UpgradeDef::new("only", "Only", 10)]).unwrap();
        assert!(!store.seed_catalog_if_empty(&other).unwrap());

        let loaded = store.load_catalog().unwrap();
        assert_eq!(loaded, Catalog::starter());
    }
}
