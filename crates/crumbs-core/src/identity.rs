//! Identity types for players and upgrades

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Externally supplied player identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Create a new player ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PlayerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identifier of an upgrade catalog entry (e.g. `cursor`, `grandma`)
///
/// Borrows as `str` so catalog and owned-count maps can be queried with
/// plain string slices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpgradeId(pub String);

impl UpgradeId {
    /// Create a new upgrade ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for UpgradeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UpgradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UpgradeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for UpgradeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_player_id() {
        let id = PlayerId::new("alice");
        assert_eq!(id.as_str(), "alice");
        assert_eq!(format!("{}", id), "alice");
    }

    #[test]
    fn test_upgrade_id_borrows_as_str() {
        let mut counts: HashMap<UpgradeId, u64> = HashMap::new();
        counts.insert(UpgradeId::new("cursor"), 3);
        assert_eq!(counts.get("cursor"), Some(&3));
        assert_eq!(counts.get("grandma"), None);
    }
}
