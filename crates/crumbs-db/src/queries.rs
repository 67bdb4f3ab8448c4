//! Common query patterns for the database.
//!
//! Both queries scan every player row, which is fine at small scale.

use crate::error::{Error, Result};
use crate::models::*;
use crate::store::Store;
use crumbs_core::PlayerSnapshot;

/// Sums across every stored player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerTotals {
    pub players: u64,
    pub resources: u64,
    pub actions: u64,
}

/// The top players by stored balance.
#[derive(Debug, Clone, Default)]
pub struct Ranking {
    /// Highest balance first; ties keep scan order.
    pub players: Vec<PlayerSnapshot>,
    /// Number of players scanned.
    pub total_players: u64,
}

impl Store {
    /// Load all player snapshots in scan order.
    pub fn all_players(&self) -> Result<Vec<PlayerSnapshot>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().primary::<StoredPlayer>()?;
        let iter = scan.all()?;
        let players: std::result::Result<Vec<StoredPlayer>, _> = iter.collect();
        let players = players.map_err(|e| Error::Database(e.to_string()))?;
        players.iter().map(StoredPlayer::to_snapshot).collect()
    }

    /// Sum stored balances and action counts.
    ///
    /// Balances are as of each player's last reconciliation.
    pub fn player_totals(&self) -> Result<PlayerTotals> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().primary::<StoredPlayer>()?;
        let mut totals = PlayerTotals::default();
        for player in scan.all()? {
            let player = player.map_err(|e| Error::Database(e.to_string()))?;
            totals.players += 1;
            totals.resources = totals.resources.saturating_add(player.resource_total);
            totals.actions = totals.actions.saturating_add(player.total_actions);
        }
        Ok(totals)
    }

    /// Rank players by stored balance, keeping at most `limit`.
    pub fn top_players(&self, limit: usize) -> Result<Ranking> {
        let mut players = self.all_players()?;
        let total_players = players.len() as u64;
        // Stable sort: equal balances stay in scan order
        players.sort_by(|a, b| b.resource_total.cmp(&a.resource_total));
        players.truncate(limit);
        Ok(Ranking {
            players,
            total_players,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crumbs_core::time::from_epoch_seconds;

    fn seed(store: &Store, players: &[(&str, u64, u64)]) {
        for (id, total, actions) in players {
            let mut s = PlayerSnapshot::fresh(*id, from_epoch_seconds(1_700_000_000.0));
            s.resource_total = *total;
            s.total_actions = *actions;
            store.save_player(&s).unwrap();
        }
    }

    #[test]
    fn test_player_totals() {
        let store = Store::in_memory().unwrap();
        assert_eq!(store.player_totals().unwrap(), PlayerTotals::default());

        seed(&store, &[("a", 10, 1), ("b", 20, 2), ("c", 30, 3)]);
        assert_eq!(
            store.player_totals().unwrap(),
            PlayerTotals {
                players: 3,
                resources: 60,
                actions: 6
            }
        );
    }

    #[test]
    fn test_top_players() {
        let store = Store::in_memory().unwrap();
        seed(&store, &[("a", 5, 0), ("b", 50, 0), ("c", 20, 0), ("d", 50, 0)]);

        let ranking = store.top_players(3).unwrap();
        assert_eq!(ranking.total_players, 4);
        let ids: Vec<&str> = ranking.players.iter().map(|p| p.player_id.as_str()).collect();
        // Primary-key scan order puts "b" before "d"
        assert_eq!(ids, vec!["b", "d", "c"]);
    }

    #[test]
    fn test_top_players_limit_zero() {
        let store = Store::in_memory().unwrap();
        seed(&store, &[("a", 5, 0)]);
        let ranking = store.top_players(0).unwrap();
        assert!(ranking.players.is_empty());
        assert_eq!(ranking.total_players, 1);
    }
}
