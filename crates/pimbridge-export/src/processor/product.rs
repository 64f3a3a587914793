//! Product processing.

use tracing::{debug, info, instrument, warn};

use pimbridge_connector::config::ExportConfig;

use super::context::ContextBuilder;
use crate::catalog::{CatalogEntity, Product};
use crate::delta::DeltaExportTracker;
use crate::error::{ExportResult, ItemError, NormalizeError};
use crate::job::JobContext;
use crate::normalizer::{
    EntityNormalizer, GlobalContext, NormalizedEntity, NormalizedProduct, NormalizerKey,
    NormalizerRegistry,
};

/// Result of processing one batch of products.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductBatchOutcome {
    pub products: Vec<NormalizedProduct>,
    pub item_errors: Vec<ItemError>,
    /// Products skipped because they did not change since their last export.
    pub unchanged: usize,
}

/// Normalizes the products of a batch that changed since their last export.
///
/// Products unknown to the remote platform are normalized for creation,
/// the others for update.
pub struct ProductProcessor {
    config: ExportConfig,
    context_builder: ContextBuilder,
    tracker: DeltaExportTracker,
    registry: NormalizerRegistry,
}

impl ProductProcessor {
    pub fn new(
        config: ExportConfig,
        context_builder: ContextBuilder,
        tracker: DeltaExportTracker,
    ) -> Self {
        Self {
            config,
            context_builder,
            tracker,
            registry: NormalizerRegistry::with_defaults(),
        }
    }

    /// Use another normalizer registry.
    #[must_use]
    pub fn with_registry(mut self, registry: NormalizerRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Normalize a batch of products.
    #[instrument(
        skip(self, job, products),
        fields(job_instance_id = %job.job_instance_id, batch_size = products.len())
    )]
    pub async fn process(
        &self,
        job: &JobContext,
        products: Vec<Product>,
    ) -> ExportResult<ProductBatchOutcome> {
        let total = products.len();
        let changed = self.tracker.filter_changed(job, products).await?;

        let mut outcome = ProductBatchOutcome {
            unchanged: total - changed.len(),
            ..ProductBatchOutcome::default()
        };
        if changed.is_empty() {
            debug!("No product changed since the last export");
            return Ok(outcome);
        }

        let create = self.registry.get(NormalizerKey::ProductCreate)?;
        let update = self.registry.get(NormalizerKey::ProductUpdate)?;
        let context = self.context_builder.build(&self.config).await?;
        let remote_skus = self.context_builder.remote().product_skus().await?;

        for product in changed {
            let normalizer = if remote_skus.contains(product.sku.trim()) {
                update.as_ref()
            } else {
                create.as_ref()
            };

            match normalize(normalizer, product, &context) {
                Ok(normalized) => outcome.products.push(normalized),
                Err((sku, error)) => {
                    warn!(sku = %sku, error = %error, "Product rejected");
                    outcome.item_errors.push(ItemError::for_product(sku, &error));
                }
            }
        }

        info!(
            normalized = outcome.products.len(),
            item_errors = outcome.item_errors.len(),
            unchanged = outcome.unchanged,
            "Product batch processed"
        );

        Ok(outcome)
    }
}

fn normalize(
    normalizer: &dyn EntityNormalizer,
    product: Product,
    context: &GlobalContext,
) -> Result<NormalizedProduct, (String, NormalizeError)> {
    let sku = product.sku.clone();
    match normalizer.normalize(&CatalogEntity::Product(product), context) {
        Ok(NormalizedEntity::Product(normalized)) => Ok(normalized),
        Ok(_) => Err((
            sku,
            NormalizeError::UnsupportedEntity {
                normalizer: normalizer.key().to_string(),
                entity_kind: "product".to_string(),
            },
        )),
        Err(error) => Err((sku, error)),
    }
}
