//! Upgrade catalog

use crate::error::{Error, Result};
use crate::identity::UpgradeId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A purchasable upgrade type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeDef {
    /// Unique identifier for this upgrade
    pub id: UpgradeId,
    /// Display name
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Cost of the first unit
    pub base_cost: u64,
    /// Generation rate added per owned unit
    #[serde(default)]
    pub generation_boost: u64,
    /// Manual yield added per owned unit
    #[serde(default)]
    pub yield_boost: u64,
    /// Per-unit geometric cost growth factor
    #[serde(default = "default_cost_multiplier")]
    pub cost_multiplier: f64,
}

fn default_cost_multiplier() -> f64 {
    1.15
}

impl UpgradeDef {
    /// Create a new upgrade definition with no boosts
    pub fn new(id: impl Into<UpgradeId>, name: impl Into<String>, base_cost: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            base_cost,
            generation_boost: 0,
            yield_boost: 0,
            cost_multiplier: default_cost_multiplier(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_generation_boost(mut self, boost: u64) -> Self {
        self.generation_boost = boost;
        self
    }

    pub fn with_yield_boost(mut self, boost: u64) -> Self {
        self.yield_boost = boost;
        self
    }

    pub fn with_cost_multiplier(mut self, multiplier: f64) -> Self {
        self.cost_multiplier = multiplier;
        self
    }

    /// Check that the cost curve is well formed.
    ///
    /// `base_cost * (cost_multiplier - 1) >= 1` keeps every step of the
    /// floored curve at least one resource above the previous one.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| Error::InvalidDefinition {
            id: self.id.clone(),
            reason: reason.to_string(),
        };

        if self.base_cost == 0 {
            return Err(invalid("base_cost must be at least 1"));
        }
        if !self.cost_multiplier.is_finite() || self.cost_multiplier <= 1.0 {
            return Err(invalid("cost_multiplier must be a finite number above 1.0"));
        }
        if (self.base_cost as f64) * (self.cost_multiplier - 1.0) < 1.0 {
            return Err(invalid(
                "base_cost * (cost_multiplier - 1) must be at least 1",
            ));
        }
        Ok(())
    }
}

/// The shared, read-only set of upgrade definitions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    defs: IndexMap<UpgradeId, UpgradeDef>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog, validating each definition and rejecting duplicates
    pub fn from_defs(defs: impl IntoIterator<Item = UpgradeDef>) -> Result<Self> {
        let mut catalog = Self::new();
        for def in defs {
            catalog.insert(def)?;
        }
        Ok(catalog)
    }

    /// Add a definition
    pub fn insert(&mut self, def: UpgradeDef) -> Result<()> {
        def.validate()?;
        if self.defs.contains_key(&def.id) {
            return Err(Error::DuplicateUpgrade(def.id));
        }
        self.defs.insert(def.id.clone(), def);
        Ok(())
    }

    /// Get a definition by ID
    pub fn get(&self, id: &str) -> Option<&UpgradeDef> {
        self.defs.get(id)
    }

    /// Iterate over definitions in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &UpgradeDef> {
        self.defs.values()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// The seven upgrades a fresh installation starts with
    pub fn starter() -> Self {
        let defs = [
            UpgradeDef::new("cursor", "Cursor", 15)
                .with_description("Clicks cookies for you automatically")
                .with_generation_boost(1),
            UpgradeDef::new("grandma", "Grandma", 100)
                .with_description("A nice grandma to bake more cookies")
                .with_generation_boost(5),
            UpgradeDef::new("farm", "Cookie Farm", 1_100)
                .with_description("Grows cookie plants!")
                .with_generation_boost(47),
            UpgradeDef::new("mine", "Cookie Mine", 12_000)
                .with_description("Mines cookie ore from deep underground")
                .with_generation_boost(260),
            UpgradeDef::new("factory", "Cookie Factory", 130_000)
                .with_description("Mass-produces cookies")
                .with_generation_boost(1_400),
            UpgradeDef::new("click_power", "Better Clicks", 50)
                .with_description("Each click gives more cookies")
                .with_yield_boost(1),
            UpgradeDef::new("super_clicks", "Super Clicks", 500)
                .with_description("Greatly enhances clicking power")
                .with_yield_boost(5),
        ];

        Self {
            defs: defs.into_iter().map(|d| (d.id.clone(), d)).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a UpgradeDef;
    type IntoIter = indexmap::map::Values<'a, UpgradeId, UpgradeDef>;

    fn into_iter(self) -> Self::IntoIter {
        self.defs.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_catalog() {
        let catalog = Catalog::starter();
        assert_eq!(catalog.len(), 7);

        let cursor = catalog.get("cursor").unwrap();
        assert_eq!(cursor.base_cost, 15);
        assert_eq!(cursor.generation_boost, 1);
        assert_eq!(cursor.cost_multiplier, 1.15);

        assert_eq!(catalog.get("super_clicks").unwrap().yield_boost, 5);
        assert!(catalog.iter().all(|d| d.validate().is_ok()));
    }

    #[test]
    fn test_duplicate_rejected() {
        let result = Catalog::from_defs([
            UpgradeDef::new("cursor", "Cursor", 15),
            UpgradeDef::new("cursor", "Another Cursor", 20),
        ]);
        assert_eq!(
            result.unwrap_err(),
            Error::DuplicateUpgrade(UpgradeId::new("cursor"))
        );
    }

    #[test]
    fn test_validate() {
        assert!(UpgradeDef::new("free", "Free", 0).validate().is_err());
        assert!(UpgradeDef::new("flat", "Flat", 10)
            .with_cost_multiplier(1.0)
            .validate()
            .is_err());
        // 2 * 0.1 < 1 would let two consecutive floored costs collide
        assert!(UpgradeDef::new("slow", "Slow", 2)
            .with_cost_multiplier(1.1)
            .validate()
            .is_err());
        assert!(UpgradeDef::new("ok", "Ok", 10)
            .with_cost_multiplier(1.1)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_upgrade_def_ron() {
        let ron_str = r#"
        (
            id: "grandma",
            name: "Grandma",
            base_cost: 100,
            generation_boost: 5,
        )
        "#;

        let def: UpgradeDef = ron::from_str(ron_str).unwrap();
        assert_eq!(def.id.as_str(), "grandma");
        assert_eq!(def.yield_boost, 0);
        assert_eq!(def.cost_multiplier, 1.15);
    }
}
