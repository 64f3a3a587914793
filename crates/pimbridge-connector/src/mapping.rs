//! Field mapping types.
//!
//! Defines how PIM codes (attributes, categories, locales) map to codes of the
//! remote platform.

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A single source → target mapping.
///
/// An empty `target` means the source is not explicitly mapped and the
/// source code is used as-is on the remote side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Code on the PIM side.
    pub source: String,

    /// Code on the remote side.
    #[serde(default)]
    pub target: String,

    /// Whether the configuration UI may remove this entry.
    #[serde(default = "default_true")]
    pub deletable: bool,
}

fn default_true() -> bool {
    true
}

impl MappingEntry {
    /// Create a deletable mapping entry.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            deletable: true,
        }
    }

    /// Set the deletable flag.
    #[must_use]
    pub fn with_deletable(mut self, deletable: bool) -> Self {
        self.deletable = deletable;
        self
    }

    /// Check if the target is explicitly set.
    pub fn is_mapped(&self) -> bool {
        !self.target.is_empty()
    }

    /// Target code, falling back to the source code when unmapped.
    pub fn resolved_target(&self) -> &str {
        if self.is_mapped() {
            &self.target
        } else {
            &self.source
        }
    }
}

/// Ordered collection of mapping entries, unique by source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingCollection {
    entries: Vec<MappingEntry>,
}

impl MappingCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; an entry with the same source is replaced in place.
    pub fn add(&mut self, entry: MappingEntry) {
        match self.entries.iter_mut().find(|e| e.source == entry.source) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Builder-style [`add`](Self::add).
    #[must_use]
    pub fn with(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.add(MappingEntry::new(source, target));
        self
    }

    /// Get the entry for a source code.
    pub fn get(&self, source: &str) -> Option<&MappingEntry> {
        self.entries.iter().find(|e| e.source == source)
    }

    /// Explicit target for a source code (`None` when absent or unmapped).
    pub fn target(&self, source: &str) -> Option<&str> {
        self.get(source)
            .filter(|e| e.is_mapped())
            .map(|e| e.target.as_str())
    }

    /// Target for a source code, defaulting to the source code itself.
    pub fn target_or_source<'a>(&'a self, source: &'a str) -> &'a str {
        self.target(source).unwrap_or(source)
    }

    /// Source code mapped to the given target, if any.
    pub fn source_for(&self, target: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.is_mapped() && e.target == target)
            .map(|e| e.source.as_str())
    }

    /// Merge another collection in; its entries win on conflicts.
    pub fn merge(&mut self, other: MappingCollection) {
        for entry in other.entries {
            self.add(entry);
        }
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, MappingEntry> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode as the JSON wire representation.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl FromIterator<MappingEntry> for MappingCollection {
    fn from_iter<I: IntoIterator<Item = MappingEntry>>(iter: I) -> Self {
        let mut collection = Self::new();
        for entry in iter {
            collection.add(entry);
        }
        collection
    }
}

impl IntoIterator for MappingCollection {
    type Item = MappingEntry;
    type IntoIter = std::vec::IntoIter<MappingEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a MappingCollection {
    type Item = &'a MappingEntry;
    type IntoIter = std::slice::Iter<'a, MappingEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// Wire format: `{ "<source>": { "source": ..., "target": ..., "deletable": ... } }`
// in insertion order.
impl Serialize for MappingCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.source, entry)?;
        }
        map.end()
    }
}

// Accepts the keyed wire format as well as a plain list of entries.
impl<'de> Deserialize<'de> for MappingCollection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CollectionVisitor;

        impl<'de> Visitor<'de> for CollectionVisitor {
            type Value = MappingCollection;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a list of mapping entries or a map of entries keyed by source")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut collection = MappingCollection::new();
                while let Some(entry) = seq.next_element::<MappingEntry>()? {
                    collection.add(entry);
                }
                Ok(collection)
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut collection = MappingCollection::new();
                while let Some((key, entry)) = map.next_entry::<String, MappingEntry>()? {
                    if entry.source != key {
                        return Err(de::Error::custom(format!(
                            "mapping key '{key}' does not match entry source '{}'",
                            entry.source
                        )));
                    }
                    collection.add(entry);
                }
                Ok(collection)
            }
        }

        deserializer.deserialize_any(CollectionVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_replaces_same_source_in_place() {
        let mut mapping = MappingCollection::new()
            .with("name", "title")
            .with("description", "");
        mapping.add(MappingEntry::new("name", "product_name"));

        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.iter().next().unwrap().target, "product_name");
    }

    #[test]
    fn test_empty_target_falls_back_to_source() {
        let mapping = MappingCollection::new().with("description", "");

        assert_eq!(mapping.target("description"), None);
        assert_eq!(mapping.target_or_source("description"), "description");
        assert_eq!(mapping.target_or_source("unknown"), "unknown");
        assert!(!mapping.get("description").unwrap().is_mapped());
    }

    #[test]
    fn test_serialize_keyed_by_source_in_order() {
        let mapping = MappingCollection::new()
            .with("zeta", "z")
            .with("alpha", "a");

        let json = mapping.to_json().unwrap();
        assert!(json.starts_with(r#"{"zeta":{"source":"zeta","target":"z","deletable":true}"#));
        assert!(json.find("zeta").unwrap() < json.find("alpha").unwrap());
    }

    #[test]
    fn test_json_roundtrip_preserves_order() {
        let mapping = MappingCollection::new()
            .with("master", "3")
            .with("clothes", "")
            .with("accessories", "12");

        let parsed: MappingCollection = serde_json::from_str(&mapping.to_json().unwrap()).unwrap();
        assert_eq!(parsed, mapping);
    }

    #[test]
    fn test_deserialize_list_of_entries() {
        let json = r#"[{"source": "name", "target": "title"}, {"source": "sku"}]"#;
        let mapping: MappingCollection = serde_json::from_str(json).unwrap();

        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.target("name"), Some("title"));
        assert!(mapping.get("sku").unwrap().deletable);
    }

    #[test]
    fn test_deserialize_rejects_mismatched_key() {
        let json = r#"{"name": {"source": "other", "target": "title"}}"#;
        assert!(serde_json::from_str::<MappingCollection>(json).is_err());
    }

    #[test]
    fn test_source_for_target() {
        let mapping = MappingCollection::new().with("fr_FR", "fr_store");
        assert_eq!(mapping.source_for("fr_store"), Some("fr_FR"));
        assert_eq!(mapping.source_for("de_store"), None);
    }

    #[test]
    fn test_merge_other_wins() {
        let mut base = MappingCollection::new().with("name", "name").with("sku", "sku");
        base.merge(MappingCollection::new().with("name", "title"));

        assert_eq!(base.len(), 2);
        assert_eq!(base.target("name"), Some("title"));
    }
}
