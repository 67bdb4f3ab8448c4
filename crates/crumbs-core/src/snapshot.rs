//! Player snapshots

use crate::economy::Stats;
use crate::identity::{PlayerId, UpgradeId};
use crate::time::Checkpoint;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Owned count per upgrade.
///
/// Absent upgrades count as zero. Equality ignores insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnedUpgrades(IndexMap<UpgradeId, u64>);

impl OwnedUpgrades {
    /// Create an empty set of owned upgrades
    pub fn new() -> Self {
        Self::default()
    }

    /// How many units of `id` are owned
    pub fn count(&self, id: &str) -> u64 {
        self.0.get(id).copied().unwrap_or(0)
    }

    /// Set the owned count of `id`
    pub fn set(&mut self, id: impl Into<UpgradeId>, count: u64) {
        self.0.insert(id.into(), count);
    }

    /// Add one unit of `id` and return the new count
    pub fn increment(&mut self, id: &UpgradeId) -> u64 {
        let count = self.0.entry(id.clone()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Iterate over `(upgrade, count)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&UpgradeId, u64)> {
        self.0.iter().map(|(id, count)| (id, *count))
    }

    /// Number of distinct upgrades with an entry
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no upgrade has an entry
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<UpgradeId>> FromIterator<(K, u64)> for OwnedUpgrades {
    fn from_iter<I: IntoIterator<Item = (K, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(id, count)| (id.into(), count)).collect())
    }
}

/// The persisted state of one player at a point in reconciliation time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Owner of this snapshot
    pub player_id: PlayerId,
    /// Balance as of `last_reconciled_at`, not necessarily as of now
    pub resource_total: u64,
    /// Resources generated per elapsed second
    pub generation_rate: u64,
    /// Resources granted per manual action
    pub manual_yield: u64,
    /// Owned count per upgrade
    pub owned_upgrades: OwnedUpgrades,
    /// Number of manual actions ever taken
    pub total_actions: u64,
    /// Instant up to which passive generation is already counted
    pub last_reconciled_at: Option<Checkpoint>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Storage revision; 0 until first persisted
    #[serde(default)]
    pub version: u64,
}

impl PlayerSnapshot {
    /// A blank snapshot with no checkpoint
    pub fn new(player_id: impl Into<PlayerId>) -> Self {
        Self {
            player_id: player_id.into(),
            resource_total: 0,
            generation_rate: 0,
            manual_yield: 1,
            owned_upgrades: OwnedUpgrades::new(),
            total_actions: 0,
            last_reconciled_at: None,
            created_at: None,
            updated_at: None,
            version: 0,
        }
    }

    /// A brand-new player whose accrual baseline is `now`
    pub fn fresh(player_id: impl Into<PlayerId>, now: DateTime<Utc>) -> Self {
        Self {
            last_reconciled_at: Some(Checkpoint::at(now)),
            created_at: Some(now),
            updated_at: Some(now),
            ..Self::new(player_id)
        }
    }

    /// Whether this snapshot has been written to storage at least once
    pub fn is_persisted(&self) -> bool {
        self.version > 0
    }

    /// Overwrite the derived rate and yield
    pub fn apply_stats(&mut self, stats: Stats) {
        self.generation_rate = stats.generation_rate;
        self.manual_yield = stats.manual_yield;
    }

    /// Reconciliation instant in epoch seconds, if readable
    pub fn checkpoint_seconds(&self) -> Option<f64> {
        self.last_reconciled_at.as_ref().and_then(Checkpoint::seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::from_epoch_seconds;

    #[test]
    fn test_owned_upgrades_default_zero() {
        let mut owned = OwnedUpgrades::new();
        assert_eq!(owned.count("cursor"), 0);

        assert_eq!(owned.increment(&UpgradeId::new("cursor")), 1);
        assert_eq!(owned.increment(&UpgradeId::new("cursor")), 2);
        assert_eq!(owned.count("cursor"), 2);
        assert_eq!(owned.len(), 1);
    }

    #[test]
    fn test_owned_upgrades_order_irrelevant() {
        let a: OwnedUpgrades = [("cursor", 1), ("grandma", 2)].into_iter().collect();
        let b: OwnedUpgrades = [("grandma", 2), ("cursor", 1)].into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fresh_snapshot() {
        let now = from_epoch_seconds(1_700_000_000.0);
        let snapshot = PlayerSnapshot::fresh("alice", now);

        assert_eq!(snapshot.manual_yield, 1);
        assert_eq!(snapshot.checkpoint_seconds(), Some(1_700_000_000.0));
        assert_eq!(snapshot.created_at, Some(now));
        assert!(!snapshot.is_persisted());
    }

    #[test]
    fn test_snapshot_ron() {
        let ron_str = r#"
        (
            player_id: "alice",
            resource_total: 20,
            generation_rate: 0,
            manual_yield: 1,
            owned_upgrades: { "cursor": 2 },
            total_actions: 7,
            last_reconciled_at: Some(Seconds(1700000000.0)),
            created_at: None,
            updated_at: None,
        )
        "#;

        let snapshot: PlayerSnapshot = ron::from_str(ron_str).unwrap();
        assert_eq!(snapshot.player_id.as_str(), "alice");
        assert_eq!(snapshot.owned_upgrades.count("cursor"), 2);
        assert_eq!(snapshot.version, 0);
    }
}
