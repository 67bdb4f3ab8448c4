//! Player snapshot model for database storage.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use crumbs_core::{Checkpoint, OwnedUpgrades, PlayerId, PlayerSnapshot};
use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};

/// Stored player snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 1, version = 1)]
#[native_db]
pub struct StoredPlayer {
    /// Primary key - player ID.
    #[primary_key]
    pub player_id: String,
    /// Balance as of the checkpoint.
    pub resource_total: u64,
    /// Generation rate per second.
    pub generation_rate: u64,
    /// Manual yield per action.
    pub manual_yield: u64,
    /// Serialized owned-upgrade counts.
    pub owned_upgrades: Vec<u8>,
    /// Manual action counter.
    pub total_actions: u64,
    /// Reconciliation checkpoint.
    pub last_reconciled_at: Option<Checkpoint>,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    pub updated_at: Option<DateTime<Utc>>,
    /// Storage revision, starting at 1.
    pub version: u64,
}

impl StoredPlayer {
    /// Create from a snapshot, stamping the given revision.
    pub fn from_snapshot(snapshot: &PlayerSnapshot, version: u64) -> Result<Self> {
        let owned_upgrades = bincode::serialize(&snapshot.owned_upgrades)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        Ok(Self {
            player_id: snapshot.player_id.as_str().to_string(),
            resource_total: snapshot.resource_total,
            generation_rate: snapshot.generation_rate,
            manual_yield: snapshot.manual_yield,
            owned_upgrades,
            total_actions: snapshot.total_actions,
            last_reconciled_at: snapshot.last_reconciled_at.clone(),
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
            version,
        })
    }

    /// Convert to a snapshot.
    pub fn to_snapshot(&self) -> Result<PlayerSnapshot> {
        let owned_upgrades: OwnedUpgrades = if self.owned_upgrades.is_empty() {
            OwnedUpgrades::new()
        } else {
            bincode::deserialize(&self.owned_upgrades)
                .map_err(|e| Error::Serialization(e.to_string()))?
        };
        Ok(PlayerSnapshot {
            player_id: PlayerId::new(self.player_id.clone()),
            resource_total: self.resource_total,
            generation_rate: self.generation_rate,
            manual_yield: self.manual_yield.max(1),
            owned_upgrades,
            total_actions: self.total_actions,
            last_reconciled_at: self.last_reconciled_at.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            version: self.version,
        })
    }
}
