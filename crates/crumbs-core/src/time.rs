//! Wall-clock time for lazy accrual
//!
//! Provides the time sources and the stored reconciliation checkpoint:
//! - `Clock` - Source of "now" injected into the service
//! - `SystemClock` - Real UTC time
//! - `ManualClock` - Hand-driven time for tests and replays
//! - `Checkpoint` - Persisted instant up to which accrual is settled

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

/// Source of the current instant
pub trait Clock: Send + Sync {
    /// The current instant in UTC
    fn now(&self) -> DateTime<Utc>;
}

/// Real time, read from the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Create a clock frozen at the given seconds since the Unix epoch
    pub fn at_epoch_seconds(seconds: f64) -> Self {
        Self::new(from_epoch_seconds(seconds))
    }

    /// Move the clock by a (possibly negative) number of seconds
    pub fn advance(&self, seconds: f64) {
        let delta = Duration::microseconds((seconds * 1_000_000.0).round() as i64);
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += delta;
    }

    /// Jump to an absolute instant
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Seconds since the Unix epoch with microsecond precision
pub fn epoch_seconds(instant: DateTime<Utc>) -> f64 {
    instant.timestamp() as f64 + instant.timestamp_subsec_micros() as f64 / 1_000_000.0
}

/// Inverse of [`epoch_seconds`]; out-of-range values map to the epoch itself
pub fn from_epoch_seconds(seconds: f64) -> DateTime<Utc> {
    if !seconds.is_finite() {
        return DateTime::<Utc>::default();
    }
    DateTime::from_timestamp_micros((seconds * 1_000_000.0).round() as i64).unwrap_or_default()
}

/// The stored reconciliation instant of a snapshot.
///
/// Older rows may carry the instant as text. Text that does not parse, and
/// non-finite numbers, make the checkpoint malformed: [`Checkpoint::seconds`]
/// returns `None` and accrual treats it as "no time has passed".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Checkpoint {
    /// Seconds since the Unix epoch
    Seconds(f64),
    /// Seconds since the Unix epoch, stored as text
    Text(String),
}

impl Checkpoint {
    /// Checkpoint at the given instant
    pub fn at(instant: DateTime<Utc>) -> Self {
        Checkpoint::Seconds(epoch_seconds(instant))
    }

    /// Seconds since the epoch, or `None` if malformed
    pub fn seconds(&self) -> Option<f64> {
        let value = match self {
            Checkpoint::Seconds(s) => *s,
            Checkpoint::Text(t) => t.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    /// Whether the stored value cannot be read as a number of seconds
    pub fn is_malformed(&self) -> bool {
        self.seconds().is_none()
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Checkpoint::Seconds(s) => write!(f, "{:.3}", s),
            Checkpoint::Text(t) => write!(f, "{:?}", t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::at_epoch_seconds(1_700_000_000.0);
        assert_eq!(epoch_seconds(clock.now()), 1_700_000_000.0);

        clock.advance(5.0);
        assert_eq!(epoch_seconds(clock.now()), 1_700_000_005.0);

        clock.advance(-10.0);
        assert_eq!(epoch_seconds(clock.now()), 1_699_999_995.0);
    }

    #[test]
    fn test_epoch_seconds_keeps_fraction() {
        let instant = from_epoch_seconds(1_700_000_000.25);
        assert_eq!(epoch_seconds(instant), 1_700_000_000.25);
    }

    #[test]
    fn test_checkpoint_seconds() {
        assert_eq!(Checkpoint::Seconds(12.5).seconds(), Some(12.5));
        assert_eq!(Checkpoint::Text(" 42.0 ".into()).seconds(), Some(42.0));
        assert!(Checkpoint::Text("yesterday".into()).is_malformed());
        assert!(Checkpoint::Seconds(f64::NAN).is_malformed());
        assert!(Checkpoint::Seconds(f64::INFINITY).is_malformed());
    }

    #[test]
    fn test_checkpoint_ron() {
        let checkpoint: Checkpoint = ron::from_str("Text(\"1700000000\")").unwrap();
        assert_eq!(checkpoint.seconds(), Some(1_700_000_000.0));
    }
}
