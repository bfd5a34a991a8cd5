//! Reference catalog: the read-only climb list, hold feature table and
//! external link table.
//!
//! Everything here is loaded once at startup and never written. The rest of
//! the crate addresses climbs by [`ClimbPosition`], which only the catalog
//! can mint, so a position is always known to be in range for the catalog
//! that produced it.

mod links;
mod literal;
mod load;
mod types;

pub use links::{parse_link_list, LinkEntry, LinkResolver};
pub use types::{
    Catalog, CatalogError, CatalogResult, ClimbPosition, ClimbRecord, HoldId, NodeFeatures,
};
