//! Export error types.
//!
//! - [`NormalizeError`]: one entity could not be turned into a payload.
//! - [`ItemError`]: a per-item failure reported to operators; never aborts a batch.
//! - [`TrackerError`]: the delta watermark could not be read or written.
//! - [`ExportError`]: the batch itself is unusable.

use serde::Serialize;
use thiserror::Error;

use pimbridge_connector::error::ConnectorError;

use crate::catalog::CategoryNode;

/// Errors raised while normalizing a single entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// The remote category a category hangs under cannot be resolved.
    #[error("category '{code}' cannot be exported: parent category '{parent_code}' is not mapped to a remote category")]
    CategoryNotMapped { code: String, parent_code: String },

    /// A required field is missing.
    #[error("{entity}: required field '{field}' is missing")]
    MissingField { entity: String, field: String },

    /// A field has a value the remote platform cannot accept.
    #[error("{entity}: invalid value for '{field}': {message}")]
    InvalidValue {
        entity: String,
        field: String,
        message: String,
    },

    /// The PIM attribute type has no remote equivalent.
    #[error("attribute '{attribute}' has unsupported type '{attribute_type}'")]
    UnsupportedAttributeType {
        attribute: String,
        attribute_type: String,
    },

    /// A normalizer was handed an entity of another kind.
    #[error("normalizer '{normalizer}' cannot normalize a {entity_kind}")]
    UnsupportedEntity {
        normalizer: String,
        entity_kind: String,
    },

    /// No normalizer registered under this key.
    #[error("Normalizer \"{key}\" unknown")]
    UnknownNormalizer { key: String },
}

impl NormalizeError {
    /// Create a missing field error.
    pub fn missing_field(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            entity: entity.into(),
            field: field.into(),
        }
    }

    /// Create an invalid value error.
    pub fn invalid_value(
        entity: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            entity: entity.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Check if this is the recoverable "category not mapped" condition.
    pub fn is_not_mapped(&self) -> bool {
        matches!(self, NormalizeError::CategoryNotMapped { .. })
    }
}

/// Result type for normalization.
pub type NormalizeResult<T> = Result<T, NormalizeError>;

/// Which item an [`ItemError`] is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "item_type", rename_all = "snake_case")]
pub enum ItemDetails {
    /// A category of the PIM tree.
    Category {
        category_id: i64,
        category_code: String,
        category_label: String,
        root_category_id: i64,
    },
    /// A product.
    Product { sku: String },
}

/// A failed item, reported with enough context to locate the source data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{message}")]
pub struct ItemError {
    /// Human-readable cause.
    pub message: String,
    /// Item the failure is about.
    pub details: ItemDetails,
}

impl ItemError {
    /// Item error for a category, labelled in the given locale.
    pub fn for_category(category: &CategoryNode, locale: &str, cause: &NormalizeError) -> Self {
        Self {
            message: cause.to_string(),
            details: ItemDetails::Category {
                category_id: category.id,
                category_code: category.code.clone(),
                category_label: category.label(locale),
                root_category_id: category.root,
            },
        }
    }

    /// Item error for a product.
    pub fn for_product(sku: impl Into<String>, cause: &NormalizeError) -> Self {
        Self {
            message: cause.to_string(),
            details: ItemDetails::Product { sku: sku.into() },
        }
    }

    /// Category id, when the item is a category.
    pub fn category_id(&self) -> Option<i64> {
        match &self.details {
            ItemDetails::Category { category_id, .. } => Some(*category_id),
            ItemDetails::Product { .. } => None,
        }
    }
}

/// Errors of the delta watermark store.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The entity key is empty after canonicalization.
    #[error("Invalid entity key: '{key}'")]
    InvalidKey { key: String },
}

/// Result type for tracker operations.
pub type TrackerResult<T> = Result<T, TrackerError>;

/// Errors of the simple mapping store.
#[derive(Debug, Error)]
pub enum MappingStoreError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Errors that make a whole batch unusable.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Remote call failed.
    #[error("Connector error: {0}")]
    Connector(#[from] ConnectorError),

    /// Normalization failed outside of per-item isolation.
    #[error("Normalization error: {0}")]
    Normalize(#[from] NormalizeError),

    /// Watermark read or write failed.
    #[error("Delta tracker error: {0}")]
    Tracker(#[from] TrackerError),

    /// Mapping persistence failed.
    #[error("Mapping store error: {0}")]
    MappingStore(#[from] MappingStoreError),

    /// Mapping payload could not be decoded.
    #[error("Invalid mapping: {message}")]
    InvalidMapping { message: String },

    /// Export configuration is incomplete.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl ExportError {
    /// Create an invalid mapping error.
    pub fn invalid_mapping(message: impl Into<String>) -> Self {
        Self::InvalidMapping {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Check if retrying the batch may help.
    pub fn is_retryable(&self) -> bool {
        match self {
            ExportError::Connector(e) => e.is_transient(),
            ExportError::Tracker(TrackerError::Database(_))
            | ExportError::MappingStore(MappingStoreError::Database(_)) => true,
            _ => false,
        }
    }
}

/// Result type for batch-level export operations.
pub type ExportResult<T> = Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_mapped_is_distinguishable() {
        let not_mapped = NormalizeError::CategoryNotMapped {
            code: "shoes".to_string(),
            parent_code: "master".to_string(),
        };
        assert!(not_mapped.is_not_mapped());
        assert!(!NormalizeError::missing_field("category shoes", "code").is_not_mapped());
    }

    #[test]
    fn test_unknown_normalizer_message() {
        let err = NormalizeError::UnknownNormalizer {
            key: "channel".to_string(),
        };
        assert_eq!(err.to_string(), "Normalizer \"channel\" unknown");
    }

    #[test]
    fn test_item_error_for_category() {
        let root = CategoryNode::root(1, "master");
        let shoes = CategoryNode::child(&root, 7, "shoes").with_label("en_US", "Shoes");
        let cause = NormalizeError::missing_field("category shoes", "name");

        let err = ItemError::for_category(&shoes, "en_US", &cause);
        assert_eq!(err.category_id(), Some(7));
        assert_eq!(
            err.details,
            ItemDetails::Category {
                category_id: 7,
                category_code: "shoes".to_string(),
                category_label: "Shoes".to_string(),
                root_category_id: 1,
            }
        );
        assert_eq!(err.to_string(), cause.to_string());
    }

    #[test]
    fn test_item_error_serialization() {
        let err = ItemError::for_product("shoe-1", &NormalizeError::missing_field("product", "sku"));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["details"]["item_type"], "product");
        assert_eq!(json["details"]["sku"], "shoe-1");
    }

    #[test]
    fn test_retryable_classification() {
        let transient: ExportError = ConnectorError::network("reset").into();
        assert!(transient.is_retryable());
        assert!(!ExportError::invalid_mapping("not json").is_retryable());
    }
}
