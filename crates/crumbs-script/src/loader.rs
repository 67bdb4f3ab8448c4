//! RON catalog loader

use crate::error::{Error, Result};
use crumbs_core::{Catalog, UpgradeDef};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// On-disk shape of a catalog file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    pub upgrades: Vec<UpgradeDef>,
}

/// Loader for RON catalog files.
///
/// Several files may be loaded into one catalog; ids must be unique across
/// all of them.
#[derive(Debug, Default)]
pub struct Loader {
    catalog: Catalog,
}

impl Loader {
    /// Create a new loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Load upgrades from a RON string
    pub fn load_str(&mut self, content: &str) -> Result<()> {
        let file: CatalogFile = ron::from_str(content)?;
        for def in file.upgrades {
            self.catalog.insert(def)?;
        }
        Ok(())
    }

    /// Load a single RON file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let content = fs::read_to_string(path.as_ref())?;
        self.load_str(&content)
    }

    /// Load all RON files from a directory, in file name order
    pub fn load_directory(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if !path.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Not a directory: {:?}", path),
            )));
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(path)? {
            let file_path = entry?.path();
            if file_path.extension().map(|e| e == "ron").unwrap_or(false) {
                files.push(file_path);
            }
        }
        files.sort();

        for file in files {
            self.load_file(&file)?;
        }
        Ok(())
    }

    /// Finish loading and return the catalog
    pub fn finish(self) -> Result<Catalog> {
        if self.catalog.is_empty() {
            return Err(Error::Empty("no upgrades defined".to_string()));
        }
        Ok(self.catalog)
    }

    /// Get the current catalog (for inspection during loading)
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

/// Load a catalog from a file or a directory of files
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog> {
    let path = path.as_ref();
    let mut loader = Loader::new();
    if path.is_dir() {
        loader.load_directory(path)?;
    } else {
        loader.load_file(path)?;
    }
    loader.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_upgrades() {
        let content = r#"
        (
            upgrades: [
                (
                    id: "cursor",
                    name: "Cursor",
                    base_cost: 15,
                    generation_boost: 1,
                ),
                (
                    id: "click_power",
                    name: "Better Clicks",
                    description: "Each click gives more cookies",
                    base_cost: 50,
                    yield_boost: 1,
                    cost_multiplier: 1.2,
                ),
            ]
        )
        "#;

        let mut loader = Loader::new();
        loader.load_str(content).unwrap();

        let catalog = loader.finish().unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("cursor").unwrap().cost_multiplier, 1.15);
        assert_eq!(catalog.get("click_power").unwrap().cost_multiplier, 1.2);
    }

    #[test]
    fn test_duplicate_across_loads() {
        let content = r#"(upgrades: [(id: "cursor", name: "Cursor", base_cost: 15)])"#;

        let mut loader = Loader::new();
        loader.load_str(content).unwrap();
        let err = loader.load_str(content).unwrap_err();
        assert!(matches!(
            err,
            Error::Catalog(crumbs_core::Error::DuplicateUpgrade(_))
        ));
    }

    #[test]
    fn test_invalid_curve_rejected() {
        let content = r#"(upgrades: [(id: "flat", name: "Flat", base_cost: 15, cost_multiplier: 1.0)])"#;
        let mut loader = Loader::new();
        assert!(matches!(
            loader.load_str(content).unwrap_err(),
            Error::Catalog(crumbs_core::Error::InvalidDefinition { .. })
        ));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let mut loader = Loader::new();
        loader.load_str("(upgrades: [])").unwrap();
        assert!(matches!(loader.finish().unwrap_err(), Error::Empty(_)));
    }

    #[test]
    fn test_bundled_catalog_matches_starter() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../content/upgrades.ron");
        let catalog = load_catalog(path).unwrap();
        assert_eq!(catalog, Catalog::starter());
    }
}
