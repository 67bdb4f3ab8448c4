//! Player-facing game operations

use crate::config::{ServiceConfig, WritePolicy};
use crate::error::{Result, ServiceError};
use crate::store::GameStore;
use crate::views::{
    ClickReceipt, GameState, GlobalStats, Leaderboard, LeaderboardEntry, PurchaseOutcome,
    PurchaseReceipt, PurchaseRejection, SaveReceipt, SyncReceipt,
};
use chrono::{DateTime, Utc};
use crumbs_core::economy::{self, aggregate};
use crumbs_core::{
    accrual, apply_click, Catalog, Clock, PlayerId, PlayerSnapshot, PurchaseError, UpgradeId,
};
use tracing::{debug, error, info, warn};

/// What an operation wants done with the snapshot it produced
enum Step<T> {
    Persist(PlayerSnapshot, T),
    Discard(T),
}

/// Whether an operation may answer without its save landing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    /// Reconcile only; may be served from a fallback snapshot
    Read,
    /// Changes the player or reports a save
    Write,
}

/// A loaded snapshot, or a default standing in for an unreadable one
struct Loaded {
    snapshot: PlayerSnapshot,
    fallback: bool,
}

/// Game operations over a store, a clock and a fixed catalog
pub struct GameService<S, C> {
    store: S,
    clock: C,
    catalog: Catalog,
    config: ServiceConfig,
}

impl<S: GameStore, C: Clock> GameService<S, C> {
    pub fn new(store: S, clock: C, catalog: Catalog, config: ServiceConfig) -> Self {
        Self {
            store,
            clock,
            catalog,
            config,
        }
    }

    /// Seed `defaults` into a store with no catalog, then serve the stored one.
    pub fn bootstrap(
        store: S,
        clock: C,
        defaults: &Catalog,
        config: ServiceConfig,
    ) -> Result<Self> {
        store.seed_catalog_if_empty(defaults)?;
        let catalog = store.load_catalog()?;
        info!(
            upgrades = catalog.len(),
            policy = ?config.write_policy,
            "game service ready"
        );
        Ok(Self::new(store, clock, catalog, config))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Reconcile and return the player's state with per-player prices.
    ///
    /// New players are created here.
    pub fn get_state(&self, player_id: &str) -> Result<GameState> {
        let catalog = &self.catalog;
        self.transact(player_id, Access::Read, |mut snapshot, now| {
            accrual::accrue(&mut snapshot, now);
            snapshot.apply_stats(aggregate(&snapshot.owned_upgrades, catalog));
            let state = GameState::new(&snapshot, catalog);
            Ok(Step::Persist(snapshot, state))
        })
    }

    /// One manual action
    pub fn click(&self, player_id: &str) -> Result<ClickReceipt> {
        let catalog = &self.catalog;
        let receipt = self.transact(player_id, Access::Write, |snapshot, now| {
            let click = apply_click(&snapshot, catalog, now);
            let receipt = ClickReceipt {
                success: true,
                earned: click.earned,
                resource_total: click.snapshot.resource_total,
                generation_rate: click.snapshot.generation_rate,
                manual_yield: click.snapshot.manual_yield,
                total_actions: click.snapshot.total_actions,
                message: "Click processed successfully".to_string(),
            };
            Ok(Step::Persist(click.snapshot, receipt))
        })?;

        debug!(
            player = %player_id,
            earned = receipt.earned,
            total = receipt.resource_total,
            "click"
        );
        Ok(receipt)
    }

    /// Buy one unit of an upgrade.
    ///
    /// An unaffordable purchase is a [`PurchaseOutcome::Rejected`] and
    /// persists nothing. An unknown upgrade is an error and touches nothing.
    pub fn purchase_upgrade(&self, player_id: &str, upgrade_id: &str) -> Result<PurchaseOutcome> {
        let def = self
            .catalog
            .get(upgrade_id)
            .ok_or_else(|| ServiceError::UnknownUpgrade(UpgradeId::new(upgrade_id)))?;
        let catalog = &self.catalog;

        let outcome = self.transact(player_id, Access::Write, |snapshot, now| {
            match economy::purchase(&snapshot, catalog, upgrade_id, now) {
                Ok(bought) => {
                    let receipt = PurchaseReceipt {
                        success: true,
                        upgrade_id: bought.upgrade_id,
                        upgrade_name: def.name.clone(),
                        cost: bought.cost,
                        owned: bought.owned,
                        resource_total: bought.snapshot.resource_total,
                        generation_rate: bought.snapshot.generation_rate,
                        manual_yield: bought.snapshot.manual_yield,
                        message: format!("Successfully purchased {}", def.name),
                    };
                    Ok(Step::Persist(
                        bought.snapshot,
                        PurchaseOutcome::Purchased(receipt),
                    ))
                }
                Err(err) => {
                    let message = err.to_string();
                    match err {
                        PurchaseError::InsufficientFunds {
                            upgrade_id,
                            required,
                            available,
                        } => Ok(Step::Discard(PurchaseOutcome::Rejected(PurchaseRejection {
                            success: false,
                            upgrade_id,
                            required,
                            available,
                            message,
                        }))),
                        PurchaseError::UnknownUpgrade(id) => Err(ServiceError::UnknownUpgrade(id)),
                    }
                }
            }
        })?;

        match &outcome {
            PurchaseOutcome::Purchased(receipt) => info!(
                player = %player_id,
                upgrade = %receipt.upgrade_id,
                cost = receipt.cost,
                owned = receipt.owned,
                "upgrade purchased"
            ),
            PurchaseOutcome::Rejected(rejection) => debug!(
                player = %player_id,
                upgrade = %rejection.upgrade_id,
                required = rejection.required,
                available = rejection.available,
                "purchase rejected"
            ),
        }
        Ok(outcome)
    }

    /// Reconcile and persist without any other change
    pub fn sync(&self, player_id: &str) -> Result<SyncReceipt> {
        let catalog = &self.catalog;
        self.transact(player_id, Access::Read, |mut snapshot, now| {
            let accrued = accrual::accrue(&mut snapshot, now);
            snapshot.apply_stats(aggregate(&snapshot.owned_upgrades, catalog));
            let receipt = SyncReceipt {
                success: true,
                resource_total: snapshot.resource_total,
                generated: accrued.generated,
                generation_rate: snapshot.generation_rate,
                last_reconciled_at: snapshot.checkpoint_seconds(),
                message: "Game synced successfully".to_string(),
            };
            Ok(Step::Persist(snapshot, receipt))
        })
    }

    /// Reconcile and persist, reporting when
    pub fn save(&self, player_id: &str) -> Result<SaveReceipt> {
        let catalog = &self.catalog;
        self.transact(player_id, Access::Write, |mut snapshot, now| {
            accrual::accrue(&mut snapshot, now);
            snapshot.apply_stats(aggregate(&snapshot.owned_upgrades, catalog));
            let receipt = SaveReceipt {
                success: true,
                saved_at: now,
                message: "Game auto-saved successfully".to_string(),
            };
            Ok(Step::Persist(snapshot, receipt))
        })
    }

    /// Totals over stored balances, which may lag unreconciled accrual
    pub fn global_stats(&self) -> Result<GlobalStats> {
        let totals = self.store.player_totals().map_err(|e| {
            error!(error = %e, "failed to compute global stats");
            ServiceError::from(e)
        })?;
        Ok(GlobalStats {
            total_players: totals.players,
            total_resources: totals.resources,
            total_actions: totals.actions,
            message: "Global stats retrieved successfully".to_string(),
        })
    }

    /// Top players by stored balance
    pub fn leaderboard(&self, limit: Option<usize>) -> Result<Leaderboard> {
        let limit = limit.unwrap_or(self.config.leaderboard_limit);
        let ranking = self.store.top_players(limit).map_err(|e| {
            error!(error = %e, "failed to rank players");
            ServiceError::from(e)
        })?;

        let entries = ranking
            .players
            .iter()
            .enumerate()
            .map(|(i, p)| LeaderboardEntry {
                rank: i + 1,
                player_id: p.player_id.as_str().to_string(),
                resource_total: p.resource_total,
                generation_rate: p.generation_rate,
                total_actions: p.total_actions,
            })
            .collect();
        Ok(Leaderboard {
            entries,
            total_players: ranking.total_players,
            message: "Leaderboard retrieved successfully".to_string(),
        })
    }

    /// Run load, `op` and persist, retrying per the write policy.
    ///
    /// When the player could not be read, [`Access::Read`] operations answer
    /// from the fallback snapshot without saving it. A [`Access::Write`]
    /// operation still tries to save; a rejected versioned save then means
    /// the stored row is unreachable, not contended, and is not retried.
    fn transact<T, F>(&self, player_id: &str, access: Access, mut op: F) -> Result<T>
    where
        F: FnMut(PlayerSnapshot, DateTime<Utc>) -> Result<Step<T>>,
    {
        let player_id = PlayerId::new(player_id);
        let attempts = self.config.write_policy.attempts();

        for attempt in 1..=attempts {
            let now = self.clock.now();
            let Loaded {
                mut snapshot,
                fallback,
            } = match self.load_or_create(&player_id, now) {
                Ok(loaded) => loaded,
                Err(e) if e.is_conflict() => {
                    debug!(player = %player_id, attempt, "player created concurrently, retrying");
                    continue;
                }
                Err(e) => {
                    error!(player = %player_id, error = %e, "failed to create player");
                    return Err(e.into());
                }
            };
            snapshot.updated_at = Some(now);

            let (next, out) = match op(snapshot, now)? {
                Step::Discard(out) => return Ok(out),
                Step::Persist(_, out) if fallback && access == Access::Read => {
                    debug!(player = %player_id, "serving fallback snapshot without saving");
                    return Ok(out);
                }
                Step::Persist(next, out) => (next, out),
            };

            match self.write(&next) {
                Ok(_) => return Ok(out),
                Err(e) if e.is_conflict() && fallback => {
                    error!(
                        player = %player_id,
                        error = %e,
                        "stored player is unreadable, refusing to overwrite it"
                    );
                    return Err(ServiceError::StorageUnavailable(
                        "player could not be loaded".to_string(),
                    ));
                }
                Err(e) if e.is_conflict() => {
                    debug!(player = %player_id, attempt, "write conflict, retrying");
                }
                Err(e) => {
                    error!(player = %player_id, error = %e, "failed to save player");
                    return Err(e.into());
                }
            }
        }

        warn!(player = %player_id, attempts, "giving up after repeated write conflicts");
        Err(ServiceError::Conflict {
            player: player_id,
            attempts,
        })
    }

    fn write(&self, snapshot: &PlayerSnapshot) -> crumbs_db::Result<u64> {
        match self.config.write_policy {
            WritePolicy::LastWriterWins => self.store.save_player(snapshot),
            WritePolicy::Versioned { .. } => self.store.save_player_versioned(snapshot),
        }
    }

    /// Load a snapshot, persisting a fresh one for unseen players.
    ///
    /// A failed read degrades to an unpersisted default snapshot flagged as
    /// a fallback. Under [`WritePolicy::Versioned`] that snapshot can create a
    /// row but never overwrite one.
    fn load_or_create(
        &self,
        player_id: &PlayerId,
        now: DateTime<Utc>,
    ) -> crumbs_db::Result<Loaded> {
        match self.store.load_player(player_id) {
            Ok(Some(snapshot)) => Ok(Loaded {
                snapshot,
                fallback: false,
            }),
            Ok(None) => {
                let mut snapshot = PlayerSnapshot::fresh(player_id.clone(), now);
                snapshot.version = self.write(&snapshot)?;
                info!(player = %player_id, "created new player");
                Ok(Loaded {
                    snapshot,
                    fallback: false,
                })
            }
            Err(e) => {
                warn!(
                    player = %player_id,
                    error = %e,
                    "failed to load player, continuing with defaults"
                );
                Ok(Loaded {
                    snapshot: PlayerSnapshot::fresh(player_id.clone(), now),
                    fallback: true,
                })
            }
        }
    }
}
