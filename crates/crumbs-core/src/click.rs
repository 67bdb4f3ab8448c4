//! Manual actions

use crate::accrual;
use crate::catalog::Catalog;
use crate::economy::aggregate;
use crate::snapshot::PlayerSnapshot;
use chrono::{DateTime, Utc};

/// Result of one manual action
#[derive(Debug, Clone, PartialEq)]
pub struct Click {
    pub snapshot: PlayerSnapshot,
    /// Resources granted by this action
    pub earned: u64,
}

/// Apply one manual action at `now`.
///
/// Yield is always recomputed from the catalog, whatever the client claims
/// its click power is.
pub fn apply_click(snapshot: &PlayerSnapshot, catalog: &Catalog, now: DateTime<Utc>) -> Click {
    let mut next = accrual::reconcile(snapshot, now);
    next.apply_stats(aggregate(&next.owned_upgrades, catalog));

    let earned = next.manual_yield;
    next.resource_total = next.resource_total.saturating_add(earned);
    next.total_actions = next.total_actions.saturating_add(1);
    next.updated_at = Some(now);

    Click {
        snapshot: next,
        earned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::from_epoch_seconds;

    const T0: f64 = 1_700_000_000.0;

    #[test]
    fn test_click_base_yield() {
        let s = PlayerSnapshot::fresh("alice", from_epoch_seconds(T0));
        let click = apply_click(&s, &Catalog::starter(), from_epoch_seconds(T0));

        assert_eq!(click.earned, 1);
        assert_eq!(click.snapshot.resource_total, 1);
        assert_eq!(click.snapshot.total_actions, 1);
    }

    #[test]
    fn test_click_with_super_clicks() {
        let mut s = PlayerSnapshot::fresh("alice", from_epoch_seconds(T0));
        s.owned_upgrades.set("super_clicks", 2);
        // Stale stored yield is ignored
        s.manual_yield = 1;

        let click = apply_click(&s, &Catalog::starter(), from_epoch_seconds(T0));
        assert_eq!(click.snapshot.manual_yield, 11);
        assert_eq!(click.earned, 11);
        assert_eq!(click.snapshot.resource_total, 11);
    }

    #[test]
    fn test_click_includes_accrual() {
        let mut s = PlayerSnapshot::fresh("alice", from_epoch_seconds(T0));
        s.owned_upgrades.set("cursor", 2);
        s.generation_rate = 2;

        let click = apply_click(&s, &Catalog::starter(), from_epoch_seconds(T0 + 3.0));
        assert_eq!(click.snapshot.resource_total, 6 + 1);
        assert_eq!(click.snapshot.generation_rate, 2);
    }
}
