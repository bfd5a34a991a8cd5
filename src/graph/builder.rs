//! Node-only graph construction for one climb

use crate::catalog::{Catalog, CatalogError, CatalogResult, ClimbPosition, HoldId, NodeFeatures};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// A hold on the wall with its merged attributes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldNode {
    pub id: HoldId,
    /// `coordinates`, `hold_variant` and every feature-table attribute
    pub data: NodeFeatures,
}

impl HoldNode {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let pair = self.data.get("coordinates")?.as_array()?;
        match pair.as_slice() {
            [x, y] => Some((x.as_f64()?, y.as_f64()?)),
            _ => None,
        }
    }

    pub fn hold_variant(&self) -> Option<&str> {
        self.data.get("hold_variant")?.as_str()
    }
}

/// The nodes of one climb. Edges are never part of this; they come from the
/// edge store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedGraph {
    pub position: ClimbPosition,
    pub nodes: Vec<HoldNode>,
}

impl AnnotatedGraph {
    pub fn node(&self, id: HoldId) -> Option<&HoldNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: HoldId) -> bool {
        self.node(id).is_some()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Joins a climb's hold list against the feature table
pub struct GraphBuilder<'a> {
    catalog: &'a Catalog,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Build from an unchecked position; negative or past-the-end fails with
    /// `OutOfRange`.
    pub fn build_at(&self, raw: i64) -> CatalogResult<AnnotatedGraph> {
        let position = self.catalog.position(raw)?;
        self.build(position)
    }

    /// Build the node set for `position`.
    ///
    /// A hold repeated within one climb yields a single node: it keeps the
    /// place of its first occurrence and the attributes of its last. Any hold
    /// without a feature entry fails the whole build.
    pub fn build(&self, position: ClimbPosition) -> CatalogResult<AnnotatedGraph> {
        let climb = self
            .catalog
            .climb(position)
            .ok_or(CatalogError::OutOfRange {
                position: position.as_i64(),
                len: self.catalog.len(),
            })?;

        let mut nodes: Vec<HoldNode> = Vec::with_capacity(climb.hold_ids.len());
        let mut slots: HashMap<HoldId, usize> = HashMap::new();

        let holds = climb
            .hold_ids
            .iter()
            .zip(&climb.coordinates)
            .zip(&climb.hold_types);

        for ((&hold_id, &(x, y)), hold_type) in holds {
            let features = self
                .catalog
                .features(hold_id)
                .ok_or(CatalogError::UnknownHold { hold_id })?;

            let mut data = features.clone();
            data.insert("coordinates".into(), serde_json::json!([x, y]));
            data.insert("hold_variant".into(), Value::String(hold_type.clone()));

            let node = HoldNode { id: hold_id, data };
            match slots.get(&hold_id) {
                Some(&slot) => nodes[slot] = node,
                None => {
                    slots.insert(hold_id, nodes.len());
                    nodes.push(node);
                }
            }
        }

        tracing::debug!(%position, nodes = nodes.len(), "built hold graph");
        Ok(AnnotatedGraph { position, nodes })
    }
}
