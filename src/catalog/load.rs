//! Loading the catalog from a JSON or YAML document

use super::links::LinkResolver;
use super::types::{Catalog, CatalogError, CatalogResult, ClimbRecord, HoldId, NodeFeatures};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// On-disk shape of the catalog
#[derive(Debug, Deserialize)]
struct CatalogDocument {
    climbs: Vec<ClimbRecord>,
    #[serde(default)]
    features: HashMap<HoldId, NodeFeatures>,
    #[serde(default)]
    links: LinkResolver,
}

impl CatalogDocument {
    fn into_catalog(self) -> CatalogResult<Catalog> {
        Catalog::new(self.climbs, self.features, self.links)
    }
}

impl Catalog {
    /// Load a catalog file, choosing the parser by extension
    /// (`.json`, `.yaml` or `.yml`).
    pub fn load(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let catalog = match extension.as_str() {
            "json" => Self::from_json_str(&text)?,
            "yaml" | "yml" => Self::from_yaml_str(&text)?,
            other => return Err(CatalogError::UnsupportedFormat(other.to_string())),
        };

        tracing::info!(
            path = %path.display(),
            climbs = catalog.len(),
            links = catalog.links().len(),
            "loaded reference catalog"
        );
        Ok(catalog)
    }

    pub fn from_json_str(text: &str) -> CatalogResult<Self> {
        serde_json::from_str::<CatalogDocument>(text)?.into_catalog()
    }

    pub fn from_yaml_str(text: &str) -> CatalogResult<Self> {
        serde_yaml::from_str::<CatalogDocument>(text)?.into_catalog()
    }
}
