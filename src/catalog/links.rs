//! Climb name to external reference links

use super::literal::parse_literal_list;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Links for one climb, stored either as a list or as a serialized list string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkEntry {
    List(Vec<String>),
    Serialized(String),
}

impl LinkEntry {
    fn to_links(&self) -> Vec<String> {
        match self {
            LinkEntry::List(items) => items
                .iter()
                .map(|s| trim_link(s))
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            LinkEntry::Serialized(raw) => parse_link_list(raw),
        }
    }
}

/// Split a serialized list such as `['https://a', 'https://b']` into links.
///
/// Quoted elements are taken whole, so a comma inside a link stays put.
/// Unquoted lists fall back to splitting on commas. Whitespace and quotes
/// are trimmed and empty pieces dropped.
pub fn parse_link_list(raw: &str) -> Vec<String> {
    let pieces = match parse_literal_list::<String>(raw) {
        Ok(items) => items,
        Err(_) => {
            let inner = raw.trim();
            let inner = inner.strip_prefix('[').unwrap_or(inner);
            let inner = inner.strip_suffix(']').unwrap_or(inner);
            inner.split(',').map(str::to_string).collect()
        }
    };

    pieces
        .iter()
        .map(|s| trim_link(s))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn trim_link(s: &str) -> &str {
    s.trim().trim_matches(|c| c == '\'' || c == '"').trim()
}

/// Lookup table from climb display name to links.
///
/// A miss is a defined empty result, never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkResolver {
    entries: HashMap<String, LinkEntry>,
}

impl LinkResolver {
    pub fn new(entries: HashMap<String, LinkEntry>) -> Self {
        Self { entries }
    }

    pub fn with_entry(mut self, name: impl Into<String>, entry: LinkEntry) -> Self {
        self.entries.insert(name.into(), entry);
        self
    }

    pub fn resolve(&self, name: &str) -> Vec<String> {
        self.entries
            .get(name)
            .map(LinkEntry::to_links)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
