//! Lazy passive accrual
//!
//! Passive generation is never computed by a background task. Instead each
//! snapshot carries a checkpoint, and whenever the snapshot is touched the
//! time elapsed since that checkpoint is converted into resources:
//!
//! ```text
//! elapsed   = max(0, now - last_reconciled_at)
//! generated = floor(elapsed * generation_rate)
//! ```
//!
//! The checkpoint then moves to `now`. It never moves backward: if `now` is
//! earlier than the stored checkpoint (clock skew), nothing accrues and the
//! checkpoint stays where it was, so the skewed interval is not counted twice.

use crate::snapshot::PlayerSnapshot;
use crate::time::{epoch_seconds, Checkpoint};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// What a reconciliation added
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Accrual {
    /// Seconds counted towards generation
    pub elapsed: f64,
    /// Resources added
    pub generated: u64,
}

/// Resources generated by `rate` over `elapsed` seconds, floored
pub fn generated(rate: u64, elapsed: f64) -> u64 {
    if rate == 0 || elapsed.is_nan() || elapsed <= 0.0 {
        return 0;
    }
    let amount = (elapsed * rate as f64).floor();
    if amount.is_finite() {
        // `as` saturates at u64::MAX
        amount as u64
    } else {
        u64::MAX
    }
}

/// Bring `snapshot` current as of `now`.
///
/// Returns a new snapshot whose `resource_total` includes passive generation
/// up to `now` and whose checkpoint is stamped. An absent or malformed
/// checkpoint accrues nothing and is replaced by `now`.
pub fn reconcile(snapshot: &PlayerSnapshot, now: DateTime<Utc>) -> PlayerSnapshot {
    let mut next = snapshot.clone();
    accrue(&mut next, now);
    next
}

/// In-place form of [`reconcile`] that also reports what was added
pub fn accrue(snapshot: &mut PlayerSnapshot, now: DateTime<Utc>) -> Accrual {
    let now_secs = epoch_seconds(now);

    let (elapsed, checkpoint) = match snapshot.last_reconciled_at.as_ref() {
        None => (0.0, now_secs),
        Some(stored) => match stored.seconds() {
            Some(last) => ((now_secs - last).max(0.0), last.max(now_secs)),
            None => {
                warn!(
                    player = %snapshot.player_id,
                    checkpoint = %stored,
                    "malformed reconciliation checkpoint, restarting accrual from now"
                );
                (0.0, now_secs)
            }
        },
    };

    let generated = generated(snapshot.generation_rate, elapsed);
    snapshot.resource_total = snapshot.resource_total.saturating_add(generated);
    snapshot.last_reconciled_at = Some(Checkpoint::Seconds(checkpoint));

    if generated > 0 {
        debug!(
            player = %snapshot.player_id,
            elapsed_secs = elapsed,
            rate = snapshot.generation_rate,
            generated,
            total = snapshot.resource_total,
            "accrued passive generation"
        );
    }

    Accrual { elapsed, generated }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::from_epoch_seconds;

    const T0: f64 = 1_700_000_000.0;

    fn snapshot(total: u64, rate: u64, last: Option<f64>) -> PlayerSnapshot {
        let mut s = PlayerSnapshot::new("alice");
        s.resource_total = total;
        s.generation_rate = rate;
        s.last_reconciled_at = last.map(Checkpoint::Seconds);
        s
    }

    #[test]
    fn test_accrues_elapsed_times_rate() {
        let now = from_epoch_seconds(T0);
        let s = snapshot(100, 10, Some(T0 - 5.0));

        let next = reconcile(&s, now);
        assert_eq!(next.resource_total, 150);
        assert_eq!(next.checkpoint_seconds(), Some(T0));
    }

    #[test]
    fn test_fractional_elapsed_is_floored() {
        let s = snapshot(0, 3, Some(T0));
        let next = reconcile(&s, from_epoch_seconds(T0 + 1.5));
        assert_eq!(next.resource_total, 4);
    }

    #[test]
    fn test_zero_rate_still_stamps() {
        let s = snapshot(7, 0, Some(T0 - 100.0));
        let next = reconcile(&s, from_epoch_seconds(T0));
        assert_eq!(next.resource_total, 7);
        assert_eq!(next.checkpoint_seconds(), Some(T0));
    }

    #[test]
    fn test_absent_checkpoint_sets_baseline() {
        let s = snapshot(7, 50, None);
        let next = reconcile(&s, from_epoch_seconds(T0));
        assert_eq!(next.resource_total, 7);
        assert_eq!(next.checkpoint_seconds(), Some(T0));
    }

    #[test]
    fn test_malformed_checkpoint_treated_as_now() {
        let mut s = snapshot(7, 50, None);
        s.last_reconciled_at = Some(Checkpoint::Text("not-a-number".into()));

        let next = reconcile(&s, from_epoch_seconds(T0));
        assert_eq!(next.resource_total, 7);
        assert_eq!(next.checkpoint_seconds(), Some(T0));
    }

    #[test]
    fn test_text_checkpoint_is_honoured() {
        let mut s = snapshot(0, 2, None);
        s.last_reconciled_at = Some(Checkpoint::Text(format!("{}", T0 - 10.0)));

        let next = reconcile(&s, from_epoch_seconds(T0));
        assert_eq!(next.resource_total, 20);
    }

    #[test]
    fn test_clock_skew_never_decreases_or_rewinds() {
        let s = snapshot(40, 10, Some(T0));
        let next = reconcile(&s, from_epoch_seconds(T0 - 30.0));

        assert_eq!(next.resource_total, 40);
        assert_eq!(next.checkpoint_seconds(), Some(T0));

        // The skewed interval is not counted when time catches up
        let later = reconcile(&next, from_epoch_seconds(T0 + 1.0));
        assert_eq!(later.resource_total, 50);
    }

    #[test]
    fn test_deterministic() {
        let s = snapshot(3, 7, Some(T0 - 12.25));
        let now = from_epoch_seconds(T0);
        assert_eq!(reconcile(&s, now), reconcile(&s, now));
    }

    #[test]
    fn test_composable_without_double_counting() {
        let s = snapshot(0, 9, Some(T0));
        for (t1, t2) in [(1.0, 2.0), (0.0, 60.0), (17.0, 17.0), (30.0, 3600.0)] {
            let stepwise = reconcile(
                &reconcile(&s, from_epoch_seconds(T0 + t1)),
                from_epoch_seconds(T0 + t2),
            );
            let direct = reconcile(&s, from_epoch_seconds(T0 + t2));
            assert_eq!(stepwise, direct, "t1={} t2={}", t1, t2);
        }
    }

    #[test]
    fn test_fractional_composition_within_rounding() {
        let s = snapshot(0, 3, Some(T0));
        let stepwise = reconcile(
            &reconcile(&s, from_epoch_seconds(T0 + 0.5)),
            from_epoch_seconds(T0 + 1.0),
        );
        let direct = reconcile(&s, from_epoch_seconds(T0 + 1.0));
        assert!(direct.resource_total - stepwise.resource_total <= 1);
    }

    #[test]
    fn test_generated_saturates() {
        assert_eq!(generated(u64::MAX, 1e30), u64::MAX);
        assert_eq!(generated(5, f64::NAN), 0);
        assert_eq!(generated(5, -1.0), 0);
    }

    #[test]
    fn test_accrue_reports() {
        let mut s = snapshot(0, 4, Some(T0 - 2.0));
        let report = accrue(&mut s, from_epoch_seconds(T0));
        assert_eq!(report, Accrual { elapsed: 2.0, generated: 8 });
    }
}
