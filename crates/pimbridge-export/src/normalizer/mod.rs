//! Entity normalizers.
//!
//! A normalizer converts one PIM entity into the payload the remote
//! web-service expects. Normalization is pure: it reads the entity and the
//! per-batch [`GlobalContext`] and performs no I/O.
//!
//! | Key | Entity | Output |
//! |-----|--------|--------|
//! | `product_create` | [`Product`](crate::catalog::Product) | [`NormalizedProduct`] with insert flag |
//! | `product_update` | [`Product`](crate::catalog::Product) | [`NormalizedProduct`] |
//! | `category` | [`CategoryNode`](crate::catalog::CategoryNode) | [`NormalizedOperationSet`] |
//! | `family` | [`Family`](crate::catalog::Family) | [`AttributeSetPayload`] |
//! | `option` | [`AttributeOption`](crate::catalog::AttributeOption) | [`OptionPayload`] |
//! | `attribute` | [`Attribute`](crate::catalog::Attribute) | [`AttributePayload`] |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use pimbridge_connector::operation::{
    AttributePayload, AttributeSetPayload, OptionPayload, StoreLabel,
};

use crate::catalog::CatalogEntity;
use crate::error::{NormalizeError, NormalizeResult};
use crate::operations::NormalizedOperationSet;

pub mod attribute;
pub mod category;
pub mod context;
pub mod family;
pub mod option;
pub mod product;
pub mod registry;

pub use attribute::AttributeNormalizer;
pub use category::CategoryNormalizer;
pub use context::{CategoryFlags, GlobalContext};
pub use family::FamilyNormalizer;
pub use option::OptionNormalizer;
pub use product::{NormalizedProduct, ProductCreateNormalizer, ProductUpdateNormalizer};
pub use registry::NormalizerRegistry;

/// Store id of the admin scope, which receives the code as its label.
pub const ADMIN_STORE_ID: i64 = 0;

/// Key under which a normalizer is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizerKey {
    ProductCreate,
    ProductUpdate,
    Category,
    Family,
    Option,
    Attribute,
}

impl NormalizerKey {
    /// Every key.
    pub const ALL: [NormalizerKey; 6] = [
        NormalizerKey::ProductCreate,
        NormalizerKey::ProductUpdate,
        NormalizerKey::Category,
        NormalizerKey::Family,
        NormalizerKey::Option,
        NormalizerKey::Attribute,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            NormalizerKey::ProductCreate => "product_create",
            NormalizerKey::ProductUpdate => "product_update",
            NormalizerKey::Category => "category",
            NormalizerKey::Family => "family",
            NormalizerKey::Option => "option",
            NormalizerKey::Attribute => "attribute",
        }
    }
}

impl fmt::Display for NormalizerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NormalizerKey {
    type Err = NormalizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NormalizerKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| NormalizeError::UnknownNormalizer { key: s.to_string() })
    }
}

/// Output of a normalizer, one variant per entity kind.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedEntity {
    Product(NormalizedProduct),
    Category(NormalizedOperationSet),
    Family(AttributeSetPayload),
    Option(OptionPayload),
    Attribute(AttributePayload),
}

/// Converts one kind of PIM entity into a remote payload.
pub trait EntityNormalizer: Send + Sync {
    /// Registry key of this normalizer.
    fn key(&self) -> NormalizerKey;

    /// Normalize an entity; entities of another kind are rejected.
    fn normalize(
        &self,
        entity: &CatalogEntity,
        context: &GlobalContext,
    ) -> NormalizeResult<NormalizedEntity>;

    /// Error for an entity this normalizer does not handle.
    fn unsupported(&self, entity: &CatalogEntity) -> NormalizeError {
        NormalizeError::UnsupportedEntity {
            normalizer: self.key().to_string(),
            entity_kind: entity.kind().to_string(),
        }
    }
}

/// Admin label (the code) followed by one label per store view with a
/// locale.
pub(crate) fn store_labels(
    context: &GlobalContext,
    code: &str,
    label: impl Fn(&str) -> String,
) -> Vec<StoreLabel> {
    std::iter::once(StoreLabel {
        store_id: ADMIN_STORE_ID,
        value: code.to_string(),
    })
    .chain(context.store_views.iter().filter_map(|sv| {
        sv.locale.as_deref().map(|locale| StoreLabel {
            store_id: sv.store_id,
            value: label(locale),
        })
    }))
    .collect()
}
