//! Upgrade catalog model for database storage.

use crumbs_core::{UpgradeDef, UpgradeId};
use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};

/// Stored upgrade definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 10, version = 1)]
#[native_db]
pub struct StoredUpgrade {
    /// Primary key - upgrade ID.
    #[primary_key]
    pub id: String,
    /// Position in the catalog as seeded.
    pub position: u32,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Cost of the first unit.
    pub base_cost: u64,
    /// Generation rate per unit.
    pub generation_boost: u64,
    /// Manual yield per unit.
    pub yield_boost: u64,
    /// Geometric cost growth factor.
    pub cost_multiplier: f64,
}

impl StoredUpgrade {
    /// Create from an upgrade definition.
    pub fn from_def(def: &UpgradeDef, position: u32) -> Self {
        Self {
            id: def.id.as_str().to_string(),
            position,
            name: def.name.clone(),
            description: def.description.clone(),
            base_cost: def.base_cost,
            generation_boost: def.generation_boost,
            yield_boost: def.yield_boost,
            cost_multiplier: def.cost_multiplier,
        }
    }

    /// Convert to an upgrade definition.
    pub fn to_def(&self) -> UpgradeDef {
        UpgradeDef {
            id: UpgradeId::new(self.id.clone()),
            name: self.name.clone(),
            description: self.description.clone(),
            base_cost: self.base_cost,
            generation_boost: self.generation_boost,
            yield_boost: self.yield_boost,
            cost_multiplier: self.cost_multiplier,
        }
    }
}
