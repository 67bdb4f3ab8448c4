//! Serializable results of service operations

use chrono::{DateTime, Utc};
use crumbs_core::economy::next_cost;
use crumbs_core::{Catalog, PlayerSnapshot, UpgradeDef, UpgradeId};
use indexmap::IndexMap;
use serde::Serialize;

/// Client-facing view of a player snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotView {
    pub player_id: String,
    pub resource_total: u64,
    pub generation_rate: u64,
    pub manual_yield: u64,
    pub owned_upgrades: IndexMap<String, u64>,
    pub total_actions: u64,
    /// Epoch seconds
    pub last_reconciled_at: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&PlayerSnapshot> for SnapshotView {
    fn from(snapshot: &PlayerSnapshot) -> Self {
        Self {
            player_id: snapshot.player_id.as_str().to_string(),
            resource_total: snapshot.resource_total,
            generation_rate: snapshot.generation_rate,
            manual_yield: snapshot.manual_yield,
            owned_upgrades: snapshot
                .owned_upgrades
                .iter()
                .map(|(id, count)| (id.as_str().to_string(), count))
                .collect(),
            total_actions: snapshot.total_actions,
            last_reconciled_at: snapshot.checkpoint_seconds(),
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
        }
    }
}

/// An upgrade as offered to one player
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpgradeOffer {
    pub id: String,
    pub name: String,
    pub description: String,
    pub base_cost: u64,
    /// Price of the next unit for this player
    pub current_cost: u64,
    pub generation_boost: u64,
    pub yield_boost: u64,
    pub cost_multiplier: f64,
    pub owned: u64,
}

impl UpgradeOffer {
    pub fn new(def: &UpgradeDef, owned: u64) -> Self {
        Self {
            id: def.id.as_str().to_string(),
            name: def.name.clone(),
            description: def.description.clone(),
            base_cost: def.base_cost,
            current_cost: next_cost(def, owned),
            generation_boost: def.generation_boost,
            yield_boost: def.yield_boost,
            cost_multiplier: def.cost_multiplier,
            owned,
        }
    }
}

/// Full state of a player with the catalog priced for them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameState {
    pub game_data: SnapshotView,
    pub upgrades: Vec<UpgradeOffer>,
    pub message: String,
}

impl GameState {
    pub(crate) fn new(snapshot: &PlayerSnapshot, catalog: &Catalog) -> Self {
        Self {
            game_data: snapshot.into(),
            upgrades: catalog
                .iter()
                .map(|def| UpgradeOffer::new(def, snapshot.owned_upgrades.count(def.id.as_str())))
                .collect(),
            message: "Game data retrieved successfully".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClickReceipt {
    pub success: bool,
    /// Resources granted by this action
    pub earned: u64,
    pub resource_total: u64,
    pub generation_rate: u64,
    pub manual_yield: u64,
    pub total_actions: u64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseReceipt {
    pub success: bool,
    pub upgrade_id: UpgradeId,
    pub upgrade_name: String,
    pub cost: u64,
    pub owned: u64,
    pub resource_total: u64,
    pub generation_rate: u64,
    pub manual_yield: u64,
    pub message: String,
}

/// A purchase that could not be afforded; nothing was persisted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseRejection {
    pub success: bool,
    pub upgrade_id: UpgradeId,
    pub required: u64,
    pub available: u64,
    pub message: String,
}

/// Either outcome of a purchase attempt on a known upgrade
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PurchaseOutcome {
    Purchased(PurchaseReceipt),
    Rejected(PurchaseRejection),
}

impl PurchaseOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PurchaseOutcome::Purchased(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReceipt {
    pub success: bool,
    pub resource_total: u64,
    /// Resources added by passive generation during this sync
    pub generated: u64,
    pub generation_rate: u64,
    /// Epoch seconds
    pub last_reconciled_at: Option<f64>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveReceipt {
    pub success: bool,
    pub saved_at: DateTime<Utc>,
    pub message: String,
}

/// Aggregates across every stored player
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalStats {
    pub total_players: u64,
    pub total_resources: u64,
    pub total_actions: u64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub player_id: String,
    pub resource_total: u64,
    pub generation_rate: u64,
    pub total_actions: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
    pub total_players: u64,
    pub message: String,
}
