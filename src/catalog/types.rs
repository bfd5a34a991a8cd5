//! Catalog data types and lookups

use super::links::LinkResolver;
use super::literal::list_or_literal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Identifier of a physical hold on the wall
pub type HoldId = i64;

/// Static attributes merged into a hold node
pub type NodeFeatures = serde_json::Map<String, serde_json::Value>;

/// Errors raised while loading or querying the catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Climb position {position} is out of range (catalog holds {len} climbs)")]
    OutOfRange { position: i64, len: usize },

    #[error("Malformed climb at position {position}: {reason}")]
    Malformed { position: usize, reason: String },

    #[error("Hold {hold_id} has no entry in the feature table")]
    UnknownHold { hold_id: HoldId },

    #[error("Unsupported catalog format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Ordinal position of a climb inside the catalog.
///
/// Only [`Catalog::position`] and the cursor create these, so holding one
/// means the bounds check already happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ClimbPosition(usize);

impl ClimbPosition {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Zero-based index into the climb list
    pub fn index(self) -> usize {
        self.0
    }

    /// Value stored in the `graph_index` column
    pub fn as_i64(self) -> i64 {
        self.0 as i64
    }
}

impl std::fmt::Display for ClimbPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One climb. `hold_ids`, `coordinates` and `hold_types` are parallel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimbRecord {
    /// The climb's own stable id (not used for addressing)
    #[serde(default)]
    pub uuid: String,
    /// Display name, denormalized onto every saved edge
    pub name: String,
    #[serde(alias = "nodes", deserialize_with = "list_or_literal")]
    pub hold_ids: Vec<HoldId>,
    #[serde(deserialize_with = "list_or_literal")]
    pub coordinates: Vec<(f64, f64)>,
    #[serde(alias = "hold_type", deserialize_with = "list_or_literal")]
    pub hold_types: Vec<String>,
}

impl ClimbRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: String::new(),
            name: name.into(),
            hold_ids: Vec::new(),
            coordinates: Vec::new(),
            hold_types: Vec::new(),
        }
    }

    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = uuid.into();
        self
    }

    /// Append a hold, keeping the three sequences aligned
    pub fn with_hold(mut self, id: HoldId, coordinates: (f64, f64), hold_type: impl Into<String>) -> Self {
        self.hold_ids.push(id);
        self.coordinates.push(coordinates);
        self.hold_types.push(hold_type.into());
        self
    }

    fn check_parallel(&self, position: usize) -> CatalogResult<()> {
        let ids = self.hold_ids.len();
        if self.coordinates.len() != ids || self.hold_types.len() != ids {
            return Err(CatalogError::Malformed {
                position,
                reason: format!(
                    "{} hold ids, {} coordinates, {} hold types",
                    ids,
                    self.coordinates.len(),
                    self.hold_types.len()
                ),
            });
        }
        Ok(())
    }
}

/// The loaded reference data
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    climbs: Vec<ClimbRecord>,
    features: HashMap<HoldId, NodeFeatures>,
    links: LinkResolver,
}

impl Catalog {
    /// Build a catalog, rejecting climbs whose hold sequences disagree in length
    pub fn new(
        climbs: Vec<ClimbRecord>,
        features: HashMap<HoldId, NodeFeatures>,
        links: LinkResolver,
    ) -> CatalogResult<Self> {
        for (position, climb) in climbs.iter().enumerate() {
            climb.check_parallel(position)?;
        }
        Ok(Self {
            climbs,
            features,
            links,
        })
    }

    /// Number of climbs
    pub fn len(&self) -> usize {
        self.climbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.climbs.is_empty()
    }

    /// Validate a raw position against the catalog bounds
    pub fn position(&self, raw: i64) -> CatalogResult<ClimbPosition> {
        usize::try_from(raw)
            .ok()
            .filter(|&index| index < self.climbs.len())
            .map(ClimbPosition::new)
            .ok_or(CatalogError::OutOfRange {
                position: raw,
                len: self.climbs.len(),
            })
    }

    /// The climb at `position`. `None` only for a position minted by another catalog.
    pub fn climb(&self, position: ClimbPosition) -> Option<&ClimbRecord> {
        self.climbs.get(position.index())
    }

    /// Display name of the climb at `position`
    pub fn climb_name(&self, position: ClimbPosition) -> Option<&str> {
        self.climb(position).map(|c| c.name.as_str())
    }

    /// Feature attributes for a hold
    pub fn features(&self, hold_id: HoldId) -> Option<&NodeFeatures> {
        self.features.get(&hold_id)
    }

    /// External link table
    pub fn links(&self) -> &LinkResolver {
        &self.links
    }
}
