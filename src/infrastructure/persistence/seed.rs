//! Catalog seeding
//!
//! The rules catalog ships as a JSON document. On startup every record is
//! upserted, so edits to the file reach an existing database on restart.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::application::ports::outbound::CatalogRepositoryPort;
use crate::domain::entities::{Ancestry, CharacterClass, Community, Item, Subclass};

const CORE_CATALOG: &str = include_str!("../../../catalog/core.json");

#[derive(Debug, Default, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub classes: Vec<CharacterClass>,
    #[serde(default)]
    pub subclasses: Vec<Subclass>,
    #[serde(default)]
    pub ancestries: Vec<Ancestry>,
    #[serde(default)]
    pub communities: Vec<Community>,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl CatalogSeed {
    /// The catalog bundled with the binary
    pub fn core() -> Result<Self> {
        serde_json::from_str(CORE_CATALOG).context("Bundled catalog is not valid JSON")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse catalog {}", path.display()))
    }

    /// Read `path` if given, otherwise fall back to the bundled catalog
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(Path::new(path)),
            None => Self::core(),
        }
    }

    fn len(&self) -> usize {
        self.classes.len()
            + self.subclasses.len()
            + self.ancestries.len()
            + self.communities.len()
            + self.items.len()
    }
}

/// Upsert every record of `seed` into the catalog
pub async fn seed_catalog(catalog: &dyn CatalogRepositoryPort, seed: &CatalogSeed) -> Result<()> {
    for class in &seed.classes {
        catalog
            .upsert_class(class)
            .await
            .with_context(|| format!("Failed to seed class {}", class.name))?;
    }
    for subclass in &seed.subclasses {
        catalog
            .upsert_subclass(subclass)
            .await
            .with_context(|| format!("Failed to seed subclass {}", subclass.name))?;
    }
    for ancestry in &seed.ancestries {
        catalog
            .upsert_ancestry(ancestry)
            .await
            .with_context(|| format!("Failed to seed ancestry {}", ancestry.name))?;
    }
    for community in &seed.communities {
        catalog
            .upsert_community(community)
            .await
            .with_context(|| format!("Failed to seed community {}", community.name))?;
    }
    for item in &seed.items {
        catalog
            .upsert_item(item)
            .await
            .with_context(|| format!("Failed to seed item {}", item.name))?;
    }

    tracing::info!("Seeded {} catalog records", seed.len());
    Ok(())
}
