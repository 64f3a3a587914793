//! Family normalization.

use pimbridge_connector::operation::AttributeSetPayload;

use super::context::GlobalContext;
use super::{EntityNormalizer, NormalizedEntity, NormalizerKey};
use crate::catalog::{CatalogEntity, Family};
use crate::error::{NormalizeError, NormalizeResult};

/// Turns a PIM family into a remote attribute set cloned from the
/// configured skeleton set.
#[derive(Debug, Clone, Copy, Default)]
pub struct FamilyNormalizer;

impl FamilyNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize_family(
        &self,
        family: &Family,
        context: &GlobalContext,
    ) -> NormalizeResult<AttributeSetPayload> {
        if family.code.trim().is_empty() {
            return Err(NormalizeError::missing_field("family", "code"));
        }

        Ok(AttributeSetPayload {
            name: family.code.clone(),
            skeleton_set_id: context.attribute_set_id,
        })
    }
}

impl EntityNormalizer for FamilyNormalizer {
    fn key(&self) -> NormalizerKey {
        NormalizerKey::Family
    }

    fn normalize(
        &self,
        entity: &CatalogEntity,
        context: &GlobalContext,
    ) -> NormalizeResult<NormalizedEntity> {
        match entity {
            CatalogEntity::Family(family) => self
                .normalize_family(family, context)
                .map(NormalizedEntity::Family),
            other => Err(self.unsupported(other)),
        }
    }
}
