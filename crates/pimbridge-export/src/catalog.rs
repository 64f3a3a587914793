//! PIM catalog model.
//!
//! The entities handed to processors by the PIM readers. Only the fields the
//! export needs are modelled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Labels keyed by locale code.
pub type Labels = BTreeMap<String, String>;

/// Label in `locale`, falling back to `[code]` like the PIM UI does.
fn label_or_code(labels: &Labels, locale: &str, code: &str) -> String {
    labels
        .get(locale)
        .filter(|l| !l.trim().is_empty())
        .cloned()
        .unwrap_or_else(|| format!("[{code}]"))
}

/// A node of the PIM category forest.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryNode {
    /// PIM category id.
    pub id: i64,
    /// Category code.
    pub code: String,
    /// Labels per locale.
    pub labels: Labels,
    /// Parent category (`None` for tree roots).
    pub parent: Option<Arc<CategoryNode>>,
    /// Id of the tree root (the node's own id for roots).
    pub root: i64,
    /// Position among siblings.
    pub position: i32,
}

impl CategoryNode {
    /// Create a tree root.
    pub fn root(id: i64, code: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
            labels: Labels::new(),
            parent: None,
            root: id,
            position: 0,
        }
    }

    /// Create a child of `parent`.
    pub fn child(parent: &CategoryNode, id: i64, code: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
            labels: Labels::new(),
            parent: Some(Arc::new(parent.clone())),
            root: parent.root,
            position: 0,
        }
    }

    /// Add a label.
    #[must_use]
    pub fn with_label(mut self, locale: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(locale.into(), label.into());
        self
    }

    /// Set the sibling position.
    #[must_use]
    pub fn with_position(mut self, position: i32) -> Self {
        self.position = position;
        self
    }

    /// Check if this is a tree root.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Parent node, if any.
    pub fn parent(&self) -> Option<&CategoryNode> {
        self.parent.as_deref()
    }

    /// Check if the parent is a tree root.
    pub fn is_root_child(&self) -> bool {
        self.parent().is_some_and(CategoryNode::is_root)
    }

    /// Label in `locale`, or `[code]`.
    pub fn label(&self, locale: &str) -> String {
        label_or_code(&self.labels, locale, &self.code)
    }

    /// Explicit label in `locale`, if set.
    pub fn translation(&self, locale: &str) -> Option<&str> {
        self.labels
            .get(locale)
            .map(String::as_str)
            .filter(|l| !l.trim().is_empty())
    }
}

/// A product value for one attribute, locale and scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductValue {
    /// Attribute code.
    pub attribute: String,
    /// Locale for localizable attributes.
    #[serde(default)]
    pub locale: Option<String>,
    /// Channel for scopable attributes.
    #[serde(default)]
    pub scope: Option<String>,
    /// Raw value.
    pub data: Value,
}

impl ProductValue {
    /// Value that is neither localizable nor scopable.
    pub fn global(attribute: impl Into<String>, data: impl Into<Value>) -> Self {
        Self {
            attribute: attribute.into(),
            locale: None,
            scope: None,
            data: data.into(),
        }
    }

    /// Localizable value.
    pub fn localized(
        attribute: impl Into<String>,
        locale: impl Into<String>,
        data: impl Into<Value>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            locale: Some(locale.into()),
            scope: None,
            data: data.into(),
        }
    }

    /// Restrict to a channel.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Check if the value applies to the given channel.
    pub fn is_in_scope(&self, channel: &str) -> bool {
        self.scope.as_deref().map_or(true, |s| s == channel)
    }
}

/// A PIM product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Identifier (SKU).
    pub sku: String,
    /// Family code.
    #[serde(default)]
    pub family: Option<String>,
    /// Whether the product is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Attribute values.
    #[serde(default)]
    pub values: Vec<ProductValue>,
    /// Category codes the product is classified in.
    #[serde(default)]
    pub categories: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Product {
    /// Create an enabled product without values.
    pub fn new(sku: impl Into<String>, updated_at: DateTime<Utc>) -> Self {
        Self {
            sku: sku.into(),
            family: None,
            enabled: true,
            updated_at,
            values: Vec::new(),
            categories: Vec::new(),
        }
    }

    /// Add a value.
    #[must_use]
    pub fn with_value(mut self, value: ProductValue) -> Self {
        self.values.push(value);
        self
    }

    /// Set the family.
    #[must_use]
    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }
}

/// Type of a PIM attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeType {
    #[serde(rename = "pim_catalog_identifier")]
    Identifier,
    #[serde(rename = "pim_catalog_text")]
    Text,
    #[serde(rename = "pim_catalog_textarea")]
    Textarea,
    #[serde(rename = "pim_catalog_number")]
    Number,
    #[serde(rename = "pim_catalog_boolean")]
    Boolean,
    #[serde(rename = "pim_catalog_date")]
    Date,
    #[serde(rename = "pim_catalog_simpleselect")]
    SimpleSelect,
    #[serde(rename = "pim_catalog_multiselect")]
    MultiSelect,
    #[serde(rename = "pim_catalog_price_collection")]
    PriceCollection,
    #[serde(rename = "pim_catalog_metric")]
    Metric,
    #[serde(rename = "pim_catalog_image")]
    Image,
    #[serde(rename = "pim_catalog_file")]
    File,
}

impl AttributeType {
    /// Get the PIM type code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::Identifier => "pim_catalog_identifier",
            AttributeType::Text => "pim_catalog_text",
            AttributeType::Textarea => "pim_catalog_textarea",
            AttributeType::Number => "pim_catalog_number",
            AttributeType::Boolean => "pim_catalog_boolean",
            AttributeType::Date => "pim_catalog_date",
            AttributeType::SimpleSelect => "pim_catalog_simpleselect",
            AttributeType::MultiSelect => "pim_catalog_multiselect",
            AttributeType::PriceCollection => "pim_catalog_price_collection",
            AttributeType::Metric => "pim_catalog_metric",
            AttributeType::Image => "pim_catalog_image",
            AttributeType::File => "pim_catalog_file",
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AttributeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pim_catalog_identifier" => Ok(AttributeType::Identifier),
            "pim_catalog_text" => Ok(AttributeType::Text),
            "pim_catalog_textarea" => Ok(AttributeType::Textarea),
            "pim_catalog_number" => Ok(AttributeType::Number),
            "pim_catalog_boolean" => Ok(AttributeType::Boolean),
            "pim_catalog_date" => Ok(AttributeType::Date),
            "pim_catalog_simpleselect" => Ok(AttributeType::SimpleSelect),
            "pim_catalog_multiselect" => Ok(AttributeType::MultiSelect),
            "pim_catalog_price_collection" => Ok(AttributeType::PriceCollection),
            "pim_catalog_metric" => Ok(AttributeType::Metric),
            "pim_catalog_image" => Ok(AttributeType::Image),
            "pim_catalog_file" => Ok(AttributeType::File),
            _ => Err(format!("Unknown attribute type: {s}")),
        }
    }
}

/// A PIM attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute code.
    pub code: String,
    /// Attribute type.
    pub attribute_type: AttributeType,
    /// Whether values differ per locale.
    #[serde(default)]
    pub localizable: bool,
    /// Whether values differ per channel.
    #[serde(default)]
    pub scopable: bool,
    /// Whether values must be unique.
    #[serde(default)]
    pub unique: bool,
    /// Whether a value is required.
    #[serde(default)]
    pub required: bool,
    /// Labels per locale.
    #[serde(default)]
    pub labels: Labels,
}

impl Attribute {
    /// Create a non-localizable, non-scopable attribute.
    pub fn new(code: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self {
            code: code.into(),
            attribute_type,
            localizable: false,
            scopable: false,
            unique: false,
            required: false,
            labels: Labels::new(),
        }
    }

    /// Mark as localizable.
    #[must_use]
    pub fn localizable(mut self) -> Self {
        self.localizable = true;
        self
    }

    /// Add a label.
    #[must_use]
    pub fn with_label(mut self, locale: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(locale.into(), label.into());
        self
    }

    /// Label in `locale`, or `[code]`.
    pub fn label(&self, locale: &str) -> String {
        label_or_code(&self.labels, locale, &self.code)
    }
}

/// An option of a select attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeOption {
    /// Attribute code the option belongs to.
    pub attribute: String,
    /// Option code.
    pub code: String,
    /// Sort order.
    #[serde(default)]
    pub sort_order: i32,
    /// Labels per locale.
    #[serde(default)]
    pub labels: Labels,
}

impl AttributeOption {
    /// Create an option without labels.
    pub fn new(attribute: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            code: code.into(),
            sort_order: 0,
            labels: Labels::new(),
        }
    }

    /// Add a label.
    #[must_use]
    pub fn with_label(mut self, locale: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(locale.into(), label.into());
        self
    }

    /// Label in `locale`, or `[code]`.
    pub fn label(&self, locale: &str) -> String {
        label_or_code(&self.labels, locale, &self.code)
    }
}

/// A PIM family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Family {
    /// Family code.
    pub code: String,
    /// Attribute codes of the family.
    #[serde(default)]
    pub attributes: Vec<String>,
    /// Labels per locale.
    #[serde(default)]
    pub labels: Labels,
}

impl Family {
    /// Create a family without attributes.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            attributes: Vec::new(),
            labels: Labels::new(),
        }
    }
}

/// Kind of catalog entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Product,
    Category,
    Family,
    Option,
    Attribute,
}

impl EntityKind {
    /// Get the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Product => "product",
            EntityKind::Category => "category",
            EntityKind::Family => "family",
            EntityKind::Option => "option",
            EntityKind::Attribute => "attribute",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Any exportable catalog entity.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEntity {
    Product(Product),
    Category(CategoryNode),
    Family(Family),
    Option(AttributeOption),
    Attribute(Attribute),
}

impl CatalogEntity {
    /// Kind of the wrapped entity.
    pub fn kind(&self) -> EntityKind {
        match self {
            CatalogEntity::Product(_) => EntityKind::Product,
            CatalogEntity::Category(_) => EntityKind::Category,
            CatalogEntity::Family(_) => EntityKind::Family,
            CatalogEntity::Option(_) => EntityKind::Option,
            CatalogEntity::Attribute(_) => EntityKind::Attribute,
        }
    }
}
