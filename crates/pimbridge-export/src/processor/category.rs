//! Category tree processing.

use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use pimbridge_connector::config::{ConfigurationField, ConfigurationFields, ExportConfig};

use super::context::ContextBuilder;
use crate::catalog::{CatalogEntity, CategoryNode};
use crate::error::{ExportResult, ItemError, NormalizeError};
use crate::mapper::{decode_mapping, CredentialGated, MappingMerger};
use crate::normalizer::{
    EntityNormalizer, GlobalContext, NormalizedEntity, NormalizerKey, NormalizerRegistry,
};
use crate::operations::NormalizedOperationSet;

/// Result of processing one batch of categories.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryBatchOutcome {
    pub operations: NormalizedOperationSet,
    pub item_errors: Vec<ItemError>,
}

/// Normalizes batches of PIM categories into grouped remote operations.
///
/// Tree roots are never exported. Categories are expected parent first: a
/// child of a category created earlier in the batch is created (or moved)
/// under that pending parent. A category whose parent is neither mapped nor
/// pending is reported when the parent is a root (the tree itself is not
/// mapped) and skipped quietly otherwise (the parent failed earlier and was
/// reported then).
pub struct CategoryTreeProcessor {
    config: ExportConfig,
    context_builder: ContextBuilder,
    category_mapping: Arc<MappingMerger>,
    registry: NormalizerRegistry,
}

impl CategoryTreeProcessor {
    /// Create a processor; the builder receives the category mapping.
    pub fn new(
        config: ExportConfig,
        context_builder: ContextBuilder,
        category_mapping: Arc<MappingMerger>,
    ) -> Self {
        Self {
            config,
            context_builder: context_builder.with_category_mapping(category_mapping.clone()),
            category_mapping,
            registry: NormalizerRegistry::with_defaults(),
        }
    }

    /// Use another normalizer registry.
    #[must_use]
    pub fn with_registry(mut self, registry: NormalizerRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Export configuration.
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Normalize a batch of categories.
    #[instrument(skip(self, categories), fields(batch_size = categories.len()))]
    pub async fn process(&self, categories: &[CategoryNode]) -> ExportResult<CategoryBatchOutcome> {
        let normalizer = self.registry.get(NormalizerKey::Category)?;
        let mut context = self.context_builder.build(&self.config).await?;

        let mut outcome = CategoryBatchOutcome::default();
        let mut skipped = 0usize;

        for category in categories {
            if category.is_root() {
                continue;
            }

            match normalize(normalizer.as_ref(), category, &context) {
                Ok(operations) => {
                    for create in &operations.creates {
                        context.mark_pending(create.pim_code.as_str());
                    }
                    outcome.operations.append(operations);
                }
                Err(error) if error.is_not_mapped() && !category.is_root_child() => {
                    skipped += 1;
                    debug!(
                        category_code = %category.code,
                        error = %error,
                        "Category skipped, parent has no remote id"
                    );
                }
                Err(error) => {
                    warn!(
                        category_code = %category.code,
                        category_id = category.id,
                        error = %error,
                        "Category rejected"
                    );
                    outcome.item_errors.push(ItemError::for_category(
                        category,
                        &context.default_locale,
                        &error,
                    ));
                }
            }
        }

        info!(
            creates = outcome.operations.creates.len(),
            updates = outcome.operations.updates.len(),
            moves = outcome.operations.moves.len(),
            variations = outcome.operations.variations.len(),
            item_errors = outcome.item_errors.len(),
            skipped,
            "Category batch processed"
        );

        Ok(outcome)
    }

    /// Current category mapping as a JSON document keyed by category code.
    pub async fn category_mapping(&self) -> ExportResult<String> {
        let mapping = self
            .category_mapping
            .mapping(&self.config.connection)
            .await?
            .into_inner_or_default();
        Ok(mapping.to_json()?)
    }

    /// Replace the category mapping from a JSON document.
    ///
    /// `{}` clears the mapping. A payload with no usable entry at all leaves
    /// the stored mapping untouched.
    pub async fn set_category_mapping(&self, json: &str) -> ExportResult<CredentialGated<()>> {
        let Some(mapping) = decode_mapping(json)? else {
            warn!("Category mapping payload has no usable entry, stored mapping kept");
            return Ok(CredentialGated::Allowed(()));
        };
        debug!(entries = mapping.len(), "Category mapping received");
        self.category_mapping
            .set_mapping(&self.config.connection, &mapping)
            .await
    }

    /// Configuration fields of the processor.
    pub async fn configuration_fields(&self) -> ExportResult<ConfigurationFields> {
        let mut fields = ConfigurationFields::new();
        fields.insert(
            "isAnchor".to_string(),
            ConfigurationField::checkbox(
                "pim_connector.export.isAnchor.help",
                "pim_connector.export.isAnchor.label",
            ),
        );
        fields.insert(
            "urlKey".to_string(),
            ConfigurationField::checkbox(
                "pim_connector.export.urlKey.help",
                "pim_connector.export.urlKey.label",
            ),
        );

        let (name, field) = self
            .category_mapping
            .configuration_field(&self.config.connection)
            .await?;
        fields.insert(name, field);

        Ok(fields)
    }
}

fn normalize(
    normalizer: &dyn EntityNormalizer,
    category: &CategoryNode,
    context: &GlobalContext,
) -> Result<NormalizedOperationSet, NormalizeError> {
    match normalizer.normalize(&CatalogEntity::Category(category.clone()), context)? {
        NormalizedEntity::Category(operations) => Ok(operations),
        _ => Err(NormalizeError::UnsupportedEntity {
            normalizer: normalizer.key().to_string(),
            entity_kind: "category".to_string(),
        }),
    }
}
