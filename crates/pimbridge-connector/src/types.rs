//! Remote catalog type definitions
//!
//! Store views, category status and attribute descriptions as reported by the
//! remote e-commerce platform.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::ids::RemoteCategoryId;

/// Code of the store view every remote platform exposes by default.
pub const DEFAULT_STORE_VIEW: &str = "default";

/// A store view of the remote platform.
///
/// `locale` is not reported by the platform; it is resolved from the
/// store-view mapping when the export context is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreView {
    /// Remote store view id.
    pub store_id: i64,
    /// Store view code (e.g. "default", "fr_store").
    pub code: String,
    /// Website code the store view belongs to.
    #[serde(default)]
    pub website: Option<String>,
    /// PIM locale this store view is fed from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl StoreView {
    /// Create a store view without resolved locale.
    pub fn new(store_id: i64, code: impl Into<String>) -> Self {
        Self {
            store_id,
            code: code.into(),
            website: None,
            locale: None,
        }
    }

    /// Set the resolved locale.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Check if this is the given store view code.
    pub fn is(&self, code: &str) -> bool {
        self.code == code
    }
}

/// A category as currently known by the remote platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCategory {
    /// Remote category id.
    pub id: RemoteCategoryId,
    /// Remote parent id (`None` for the remote tree roots).
    pub parent_id: Option<RemoteCategoryId>,
    /// Name in the default store view.
    #[serde(default)]
    pub name: String,
    /// Position among siblings.
    #[serde(default)]
    pub position: i32,
}

/// Snapshot of the remote category tree, fetched once per batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryStatusSnapshot {
    categories: HashMap<RemoteCategoryId, RemoteCategory>,
}

impl CategoryStatusSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from a list of remote categories.
    pub fn from_categories(categories: impl IntoIterator<Item = RemoteCategory>) -> Self {
        Self {
            categories: categories.into_iter().map(|c| (c.id, c)).collect(),
        }
    }

    /// Add or replace a category.
    pub fn insert(&mut self, category: RemoteCategory) {
        self.categories.insert(category.id, category);
    }

    /// Get a category by id.
    pub fn get(&self, id: RemoteCategoryId) -> Option<&RemoteCategory> {
        self.categories.get(&id)
    }

    /// Check if the remote platform knows this category.
    pub fn contains(&self, id: RemoteCategoryId) -> bool {
        self.categories.contains_key(&id)
    }

    /// Number of categories in the snapshot.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Check if the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Scope at which a remote attribute value is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeScope {
    /// One value for the whole platform.
    Global,
    /// One value per website.
    Website,
    /// One value per store view.
    #[default]
    Store,
}

impl AttributeScope {
    /// Get the string representation used by the web-service.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeScope::Global => "global",
            AttributeScope::Website => "website",
            AttributeScope::Store => "store",
        }
    }

    /// Check if values of this scope can differ per store view.
    #[must_use]
    pub fn is_per_store_view(&self) -> bool {
        matches!(self, AttributeScope::Store)
    }
}

impl fmt::Display for AttributeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AttributeScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "global" => Ok(AttributeScope::Global),
            "website" => Ok(AttributeScope::Website),
            "store" => Ok(AttributeScope::Store),
            _ => Err(format!("Unknown attribute scope: {s}")),
        }
    }
}

/// An attribute of the remote platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAttribute {
    /// Attribute code.
    pub code: String,
    /// Storage scope.
    #[serde(default)]
    pub scope: AttributeScope,
    /// Frontend input type (e.g. "text", "select", "price").
    #[serde(default)]
    pub frontend_input: String,
}

impl RemoteAttribute {
    /// Create a remote attribute description.
    pub fn new(code: impl Into<String>, scope: AttributeScope) -> Self {
        Self {
            code: code.into(),
            scope,
            frontend_input: "text".to_string(),
        }
    }
}

/// Remote attributes indexed by code, fetched once per batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttributeCache {
    attributes: BTreeMap<String, RemoteAttribute>,
}

impl AttributeCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cache from a list of remote attributes.
    pub fn from_attributes(attributes: impl IntoIterator<Item = RemoteAttribute>) -> Self {
        Self {
            attributes: attributes
                .into_iter()
                .map(|a| (a.code.clone(), a))
                .collect(),
        }
    }

    /// Get an attribute by code.
    pub fn get(&self, code: &str) -> Option<&RemoteAttribute> {
        self.attributes.get(code)
    }

    /// Check if the remote platform has this attribute.
    pub fn contains(&self, code: &str) -> bool {
        self.attributes.contains_key(code)
    }

    /// Iterate over attribute codes.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    /// Number of cached attributes.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
