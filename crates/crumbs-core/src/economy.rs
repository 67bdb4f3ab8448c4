//! Upgrade economy: cost curve, stat aggregation and purchases

use crate::accrual;
use crate::catalog::{Catalog, UpgradeDef};
use crate::error::PurchaseError;
use crate::identity::UpgradeId;
use crate::snapshot::{OwnedUpgrades, PlayerSnapshot};
use chrono::{DateTime, Utc};

/// Rate and yield derived from owned upgrades
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub generation_rate: u64,
    pub manual_yield: u64,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            generation_rate: 0,
            manual_yield: 1,
        }
    }
}

/// Cost of the next unit when `owned` units are already held.
///
/// `floor(base_cost * cost_multiplier ^ owned)`, saturating at `u64::MAX`.
pub fn next_cost(def: &UpgradeDef, owned: u64) -> u64 {
    let cost = (def.base_cost as f64 * def.cost_multiplier.powf(owned as f64)).floor();
    if cost.is_nan() {
        u64::MAX
    } else {
        cost as u64
    }
}

/// Sum the boosts of every owned upgrade.
///
/// Upgrades missing from the catalog (retired types) contribute nothing.
pub fn aggregate(owned: &OwnedUpgrades, catalog: &Catalog) -> Stats {
    owned
        .iter()
        .filter_map(|(id, count)| catalog.get(id.as_str()).map(|def| (def, count)))
        .fold(Stats::default(), |stats, (def, count)| Stats {
            generation_rate: stats
                .generation_rate
                .saturating_add(def.generation_boost.saturating_mul(count)),
            manual_yield: stats
                .manual_yield
                .saturating_add(def.yield_boost.saturating_mul(count)),
        })
}

/// A completed purchase
#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
    /// Snapshot after reconciliation, payment and stat recomputation
    pub snapshot: PlayerSnapshot,
    pub upgrade_id: UpgradeId,
    /// Resources paid
    pub cost: u64,
    /// Units owned after the purchase
    pub owned: u64,
}

/// Buy one unit of `upgrade_id` at `now`.
///
/// The balance is reconciled first so passive generation counts towards the
/// price. On error the input snapshot is left as it was; persisting the
/// result is up to the caller.
pub fn purchase(
    snapshot: &PlayerSnapshot,
    catalog: &Catalog,
    upgrade_id: &str,
    now: DateTime<Utc>,
) -> Result<Purchase, PurchaseError> {
    let def = catalog
        .get(upgrade_id)
        .ok_or_else(|| PurchaseError::UnknownUpgrade(UpgradeId::new(upgrade_id)))?;

    let mut next = accrual::reconcile(snapshot, now);
    let cost = next_cost(def, next.owned_upgrades.count(upgrade_id));

    if next.resource_total < cost {
        return Err(PurchaseError::InsufficientFunds {
            upgrade_id: def.id.clone(),
            required: cost,
            available: next.resource_total,
        });
    }

    next.resource_total -= cost;
    let owned = next.owned_upgrades.increment(&def.id);
    next.apply_stats(aggregate(&next.owned_upgrades, catalog));
    next.updated_at = Some(now);

    Ok(Purchase {
        snapshot: next,
        upgrade_id: def.id.clone(),
        cost,
        owned,
    })
}
