//! Operation payloads sent to the remote catalog.
//!
//! Every web-service write takes one of these types. They are produced by
//! the normalizers and consumed by the writers.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::ids::RemoteCategoryId;
use crate::types::AttributeScope;

/// Category fields sent on create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryData {
    /// Label in the target store view.
    pub name: String,
    /// Whether the category is active.
    pub is_active: bool,
    /// Whether the category appears in the navigation menu.
    pub include_in_menu: bool,
    /// Whether products of sub-categories are shown in this category.
    pub is_anchor: bool,
    /// Sort position among siblings.
    pub position: i32,
    /// URL key, only sent when URL key generation is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_key: Option<String>,
}

impl CategoryData {
    /// Active, menu-visible category data.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_active: true,
            include_in_menu: true,
            is_anchor: false,
            position: 0,
            url_key: None,
        }
    }
}

/// Create a category under a remote parent, or under a category created
/// earlier in the same batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCreate {
    /// PIM category code (recorded in the mapping once the id is known).
    pub pim_code: String,
    /// Parent category.
    pub parent: CategoryRef,
    /// Store view the data is written to.
    pub store_view: String,
    /// Category fields.
    pub data: CategoryData,
}

/// Update an existing remote category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryUpdate {
    /// PIM category code.
    pub pim_code: String,
    /// Remote category.
    pub id: RemoteCategoryId,
    /// Store view the data is written to.
    pub store_view: String,
    /// Category fields.
    pub data: CategoryData,
}

/// Move an existing remote category under a new parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMove {
    /// PIM category code.
    pub pim_code: String,
    /// Remote category.
    pub id: RemoteCategoryId,
    /// New parent category.
    pub parent: CategoryRef,
}

/// Reference to a remote category that may not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CategoryRef {
    /// Category already known remotely.
    Remote { id: RemoteCategoryId },
    /// Category created in the same batch; resolved by PIM code at write time.
    Pending { pim_code: String },
}

impl CategoryRef {
    /// Remote id, when the category is already known remotely.
    pub fn remote_id(&self) -> Option<RemoteCategoryId> {
        match self {
            CategoryRef::Remote { id } => Some(*id),
            CategoryRef::Pending { .. } => None,
        }
    }
}

impl fmt::Display for CategoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryRef::Remote { id } => write!(f, "remote:{id}"),
            CategoryRef::Pending { pim_code } => write!(f, "pending:{pim_code}"),
        }
    }
}

/// Store-view specific label of a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryVariation {
    /// Category the variation applies to.
    pub category: CategoryRef,
    /// Store view code.
    pub store_view: String,
    /// Localized label.
    pub name: String,
    /// Localized URL key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_key: Option<String>,
}

/// One product web-service call (default values or one store view).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCall {
    /// Product SKU on the remote side.
    pub sku: String,
    /// Remote product type (e.g. "simple", "configurable").
    pub product_type: String,
    /// Remote attribute set, only sent on creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_set_id: Option<i64>,
    /// Attribute values keyed by remote attribute code.
    pub values: BTreeMap<String, Value>,
    /// Store view for translated values (`None` for the default call).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_view: Option<String>,
    /// Insert intent; present (and `true`) only on creation calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert: Option<bool>,
}

impl ProductCall {
    /// Check if this call creates the product.
    pub fn is_insert(&self) -> bool {
        self.insert == Some(true)
    }
}

/// A label bound to a remote store view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreLabel {
    /// Remote store view id (0 is the admin/default scope).
    pub store_id: i64,
    /// Label text.
    pub value: String,
}

/// Attribute set (PIM family) payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSetPayload {
    /// Attribute set name.
    pub name: String,
    /// Attribute set the new one is cloned from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skeleton_set_id: Option<i64>,
}

/// Attribute option payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionPayload {
    /// Remote attribute code the option belongs to.
    pub attribute_code: String,
    /// PIM option code.
    pub option_code: String,
    /// Labels per store view.
    pub labels: Vec<StoreLabel>,
    /// Sort order.
    pub order: i32,
}

/// Attribute definition payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributePayload {
    /// Remote attribute code.
    pub code: String,
    /// Remote frontend input type.
    pub frontend_input: String,
    /// Storage scope.
    pub scope: AttributeScope,
    /// Whether values must be unique.
    pub is_unique: bool,
    /// Whether a value is required.
    pub is_required: bool,
    /// Labels per store view.
    pub labels: Vec<StoreLabel>,
}
