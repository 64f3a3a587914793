//! Attribute normalization.

use pimbridge_connector::operation::AttributePayload;
use pimbridge_connector::types::AttributeScope;

use super::context::GlobalContext;
use super::{store_labels, EntityNormalizer, NormalizedEntity, NormalizerKey};
use crate::catalog::{Attribute, AttributeType, CatalogEntity};
use crate::error::{NormalizeError, NormalizeResult};

/// Turns a PIM attribute into a remote attribute definition.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeNormalizer;

impl AttributeNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize_attribute(
        &self,
        attribute: &Attribute,
        context: &GlobalContext,
    ) -> NormalizeResult<AttributePayload> {
        let frontend_input = frontend_input(attribute.attribute_type).ok_or_else(|| {
            NormalizeError::UnsupportedAttributeType {
                attribute: attribute.code.clone(),
                attribute_type: attribute.attribute_type.to_string(),
            }
        })?;

        let scope = if attribute.localizable {
            AttributeScope::Store
        } else if attribute.scopable {
            AttributeScope::Website
        } else {
            AttributeScope::Global
        };

        Ok(AttributePayload {
            code: context
                .attribute_mapping
                .target_or_source(&attribute.code)
                .to_string(),
            frontend_input: frontend_input.to_string(),
            scope,
            is_unique: attribute.unique,
            is_required: attribute.required,
            labels: store_labels(context, &attribute.code, |locale| attribute.label(locale)),
        })
    }
}

/// Remote input type of a PIM attribute type.
fn frontend_input(attribute_type: AttributeType) -> Option<&'static str> {
    match attribute_type {
        AttributeType::Identifier
        | AttributeType::Text
        | AttributeType::Number
        | AttributeType::Metric => Some("text"),
        AttributeType::Textarea => Some("textarea"),
        AttributeType::Boolean => Some("boolean"),
        AttributeType::Date => Some("date"),
        AttributeType::SimpleSelect => Some("select"),
        AttributeType::MultiSelect => Some("multiselect"),
        AttributeType::PriceCollection => Some("price"),
        AttributeType::Image | AttributeType::File => None,
    }
}

impl EntityNormalizer for AttributeNormalizer {
    fn key(&self) -> NormalizerKey {
        NormalizerKey::Attribute
    }

    fn normalize(
        &self,
        entity: &CatalogEntity,
        context: &GlobalContext,
    ) -> NormalizeResult<NormalizedEntity> {
        match entity {
            CatalogEntity::Attribute(attribute) => self
                .normalize_attribute(attribute, context)
                .map(NormalizedEntity::Attribute),
            other => Err(self.unsupported(other)),
        }
    }
}
