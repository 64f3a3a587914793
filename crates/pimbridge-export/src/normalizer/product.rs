//! Product normalization.
//!
//! A product becomes one default call (global values and values of the
//! default locale) plus one call per translated store view that has
//! localized values. Creation and update differ only in the insert flag and
//! in the attribute set, which is sent on creation only.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use pimbridge_connector::operation::ProductCall;

use super::context::GlobalContext;
use super::{EntityNormalizer, NormalizedEntity, NormalizerKey};
use crate::catalog::{CatalogEntity, Product, ProductValue};
use crate::error::{NormalizeError, NormalizeResult};

/// Remote product type of exported products.
pub const SIMPLE_PRODUCT_TYPE: &str = "simple";

/// Remote attribute code of the enabled flag.
pub const STATUS_ATTRIBUTE: &str = "status";

const STATUS_ENABLED: i64 = 1;
const STATUS_DISABLED: i64 = 2;

/// Calls describing one product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedProduct {
    pub sku: String,
    pub default: ProductCall,
    pub translations: Vec<ProductCall>,
}

impl NormalizedProduct {
    /// Every call, default first.
    pub fn calls(&self) -> impl Iterator<Item = &ProductCall> {
        std::iter::once(&self.default).chain(self.translations.iter())
    }
}

/// Normalizer for products unknown to the remote platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductCreateNormalizer;

/// Normalizer for products already known to the remote platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductUpdateNormalizer;

impl ProductCreateNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize_product(
        &self,
        product: &Product,
        context: &GlobalContext,
    ) -> NormalizeResult<NormalizedProduct> {
        normalize_product(product, context, true)
    }
}

impl ProductUpdateNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize_product(
        &self,
        product: &Product,
        context: &GlobalContext,
    ) -> NormalizeResult<NormalizedProduct> {
        normalize_product(product, context, false)
    }
}

impl EntityNormalizer for ProductCreateNormalizer {
    fn key(&self) -> NormalizerKey {
        NormalizerKey::ProductCreate
    }

    fn normalize(
        &self,
        entity: &CatalogEntity,
        context: &GlobalContext,
    ) -> NormalizeResult<NormalizedEntity> {
        match entity {
            CatalogEntity::Product(product) => self
                .normalize_product(product, context)
                .map(NormalizedEntity::Product),
            other => Err(self.unsupported(other)),
        }
    }
}

impl EntityNormalizer for ProductUpdateNormalizer {
    fn key(&self) -> NormalizerKey {
        NormalizerKey::ProductUpdate
    }

    fn normalize(
        &self,
        entity: &CatalogEntity,
        context: &GlobalContext,
    ) -> NormalizeResult<NormalizedEntity> {
        match entity {
            CatalogEntity::Product(product) => self
                .normalize_product(product, context)
                .map(NormalizedEntity::Product),
            other => Err(self.unsupported(other)),
        }
    }
}

fn normalize_product(
    product: &Product,
    context: &GlobalContext,
    create: bool,
) -> NormalizeResult<NormalizedProduct> {
    let sku = product.sku.trim();
    if sku.is_empty() {
        return Err(NormalizeError::missing_field("product", "sku"));
    }
    let entity = format!("product {sku}");

    let attribute_set_id = if create {
        Some(
            context
                .attribute_set_id
                .ok_or_else(|| NormalizeError::missing_field(&entity, "attribute_set_id"))?,
        )
    } else {
        None
    };

    let mut values = mapped_values(
        product,
        context,
        &entity,
        Some(context.default_locale.as_str()),
    )?;
    if context.attribute_cache.contains(STATUS_ATTRIBUTE) {
        let status = if product.enabled {
            STATUS_ENABLED
        } else {
            STATUS_DISABLED
        };
        values.insert(STATUS_ATTRIBUTE.to_string(), Value::from(status));
    }

    let default = ProductCall {
        sku: sku.to_string(),
        product_type: SIMPLE_PRODUCT_TYPE.to_string(),
        attribute_set_id,
        values,
        store_view: None,
        insert: create.then_some(true),
    };

    let mut translations = Vec::new();
    for (store_view, locale) in context.translated_store_views() {
        if locale == context.default_locale {
            continue;
        }
        let values = localized_values(product, context, &entity, locale)?;
        if values.is_empty() {
            continue;
        }
        translations.push(ProductCall {
            sku: sku.to_string(),
            product_type: SIMPLE_PRODUCT_TYPE.to_string(),
            attribute_set_id: None,
            values,
            store_view: Some(store_view.code.clone()),
            insert: None,
        });
    }

    Ok(NormalizedProduct {
        sku: sku.to_string(),
        default,
        translations,
    })
}

/// Global values plus the values of `locale`, keyed by remote code.
fn mapped_values(
    product: &Product,
    context: &GlobalContext,
    entity: &str,
    locale: Option<&str>,
) -> NormalizeResult<BTreeMap<String, Value>> {
    let mut values = BTreeMap::new();
    for value in product
        .values
        .iter()
        .filter(|v| v.is_in_scope(context.channel.as_str()))
        .filter(|v| v.locale.is_none() || v.locale.as_deref() == locale)
    {
        if let Some((code, data)) = remote_value(value, context, entity)? {
            values.insert(code, data);
        }
    }
    Ok(values)
}

/// Values of `locale` for attributes stored per store view.
fn localized_values(
    product: &Product,
    context: &GlobalContext,
    entity: &str,
    locale: &str,
) -> NormalizeResult<BTreeMap<String, Value>> {
    let mut values = BTreeMap::new();
    for value in product
        .values
        .iter()
        .filter(|v| v.is_in_scope(context.channel.as_str()))
        .filter(|v| v.locale.as_deref() == Some(locale))
    {
        let remote_code = context.attribute_mapping.target_or_source(&value.attribute);
        let per_store_view = context
            .attribute_cache
            .get(remote_code)
            .is_some_and(|a| a.scope.is_per_store_view());
        if !per_store_view {
            continue;
        }
        if let Some((code, data)) = remote_value(value, context, entity)? {
            values.insert(code, data);
        }
    }
    Ok(values)
}

/// Remote code and converted data of a value; `None` when the remote side
/// has no such attribute.
fn remote_value(
    value: &ProductValue,
    context: &GlobalContext,
    entity: &str,
) -> NormalizeResult<Option<(String, Value)>> {
    let remote_code = context.attribute_mapping.target_or_source(&value.attribute);
    let Some(attribute) = context.attribute_cache.get(remote_code) else {
        return Ok(None);
    };

    let data = if attribute.frontend_input == "price" {
        price(&value.data).ok_or_else(|| {
            NormalizeError::invalid_value(
                entity,
                &value.attribute,
                format!("'{}' is not a price", value.data),
            )
        })?
    } else {
        value.data.clone()
    };

    Ok(Some((remote_code.to_string(), data)))
}

/// Numeric price from a number, a numeric string, or a price collection
/// (first `amount`).
fn price(data: &Value) -> Option<Value> {
    match data {
        Value::Number(_) => Some(data.clone()),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        Value::Array(prices) => prices.first().and_then(price),
        Value::Object(fields) => fields.get("amount").and_then(price),
        _ => None,
    }
}
