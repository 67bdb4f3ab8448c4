//! Service configuration

use serde::{Deserialize, Serialize};

/// How same-player writes are reconciled with each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WritePolicy {
    /// Blind overwrite; a concurrent operation's effect may be lost
    LastWriterWins,
    /// Conditional write on the snapshot revision. A conflicting operation
    /// is re-run from a fresh load up to `max_retries` more times.
    Versioned { max_retries: u32 },
}

impl WritePolicy {
    /// Total attempts an operation gets
    pub fn attempts(&self) -> u32 {
        match self {
            WritePolicy::LastWriterWins => 1,
            WritePolicy::Versioned { max_retries } => max_retries.saturating_add(1),
        }
    }
}

impl Default for WritePolicy {
    fn default() -> Self {
        WritePolicy::Versioned { max_retries: 3 }
    }
}

/// Configuration for [`GameService`](crate::GameService)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub write_policy: WritePolicy,
    /// Leaderboard size when the caller gives none
    #[serde(default = "default_leaderboard_limit")]
    pub leaderboard_limit: usize,
}

fn default_leaderboard_limit() -> usize {
    10
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            write_policy: WritePolicy::default(),
            leaderboard_limit: default_leaderboard_limit(),
        }
    }
}

impl ServiceConfig {
    pub fn with_write_policy(mut self, policy: WritePolicy) -> Self {
        self.write_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempts() {
        assert_eq!(WritePolicy::LastWriterWins.attempts(), 1);
        assert_eq!(WritePolicy::Versioned { max_retries: 3 }.attempts(), 4);
        assert_eq!(
            WritePolicy::Versioned {
                max_retries: u32::MAX
            }
            .attempts(),
            u32::MAX
        );
    }

    #[test]
    fn test_config_ron_defaults() {
        let config: ServiceConfig = ron::from_str("()").unwrap();
        assert_eq!(config, ServiceConfig::default());

        let config: ServiceConfig =
            ron::from_str("(write_policy: LastWriterWins, leaderboard_limit: 25)").unwrap();
        assert_eq!(config.write_policy, WritePolicy::LastWriterWins);
        assert_eq!(config.leaderboard_limit, 25);
    }
}
