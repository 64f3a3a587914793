//! Assembly of the per-batch normalization context.

use std::sync::Arc;
use tracing::{debug, instrument};

use pimbridge_connector::config::ExportConfig;
use pimbridge_connector::mapping::MappingCollection;
use pimbridge_connector::traits::RemoteCatalogService;

use crate::error::{ExportError, ExportResult};
use crate::job::LocaleProvider;
use crate::mapper::MappingMerger;
use crate::normalizer::{CategoryFlags, GlobalContext};

/// Builds a [`GlobalContext`] with one round of remote calls.
#[derive(Clone)]
pub struct ContextBuilder {
    remote: Arc<dyn RemoteCatalogService>,
    locales: Arc<dyn LocaleProvider>,
    store_view_mapping: Option<Arc<MappingMerger>>,
    category_mapping: Option<Arc<MappingMerger>>,
    attribute_mapping: Option<Arc<MappingMerger>>,
}

impl ContextBuilder {
    /// Create a builder without mappings.
    pub fn new(remote: Arc<dyn RemoteCatalogService>, locales: Arc<dyn LocaleProvider>) -> Self {
        Self {
            remote,
            locales,
            store_view_mapping: None,
            category_mapping: None,
            attribute_mapping: None,
        }
    }

    /// Locale → store view code mapping.
    #[must_use]
    pub fn with_store_view_mapping(mut self, merger: Arc<MappingMerger>) -> Self {
        self.store_view_mapping = Some(merger);
        self
    }

    /// Category code → remote id mapping.
    #[must_use]
    pub fn with_category_mapping(mut self, merger: Arc<MappingMerger>) -> Self {
        self.category_mapping = Some(merger);
        self
    }

    /// Attribute code → remote attribute mapping.
    #[must_use]
    pub fn with_attribute_mapping(mut self, merger: Arc<MappingMerger>) -> Self {
        self.attribute_mapping = Some(merger);
        self
    }

    /// Remote service the context is read from.
    pub fn remote(&self) -> &Arc<dyn RemoteCatalogService> {
        &self.remote
    }

    /// Build the context of one batch.
    #[instrument(skip(self, config), fields(channel = %config.channel))]
    pub async fn build(&self, config: &ExportConfig) -> ExportResult<GlobalContext> {
        let default_locale = self
            .locales
            .default_locale(&config.channel)
            .await?
            .ok_or_else(|| {
                ExportError::configuration(format!(
                    "channel '{}' has no default locale",
                    config.channel
                ))
            })?;

        let store_view_mapping = self.mapping(self.store_view_mapping.as_ref(), config).await?;
        let category_mapping = self.mapping(self.category_mapping.as_ref(), config).await?;
        let attribute_mapping = self.mapping(self.attribute_mapping.as_ref(), config).await?;

        let mut store_views = self.remote.store_views().await?;
        for store_view in &mut store_views {
            if let Some(locale) = store_view_mapping.source_for(&store_view.code) {
                store_view.locale = Some(locale.to_string());
            } else if store_view.is(&config.default_store_view) && store_view.locale.is_none() {
                store_view.locale = Some(default_locale.clone());
            }
        }

        let category_status = self.remote.categories_status().await?;
        let attribute_cache = self.remote.attributes().await?;

        debug!(
            store_views = store_views.len(),
            remote_categories = category_status.len(),
            remote_attributes = attribute_cache.len(),
            "Context built"
        );

        Ok(GlobalContext::new(config.channel.clone(), default_locale)
            .with_default_store_view(config.default_store_view.clone())
            .with_store_views(store_views)
            .with_attribute_cache(attribute_cache)
            .with_attribute_set(config.attribute_set_id)
            .with_category_mapping(category_mapping)
            .with_attribute_mapping(attribute_mapping)
            .with_category_status(category_status)
            .with_flags(CategoryFlags {
                is_anchor: config.is_anchor,
                url_key: config.url_key,
            }))
    }

    async fn mapping(
        &self,
        merger: Option<&Arc<MappingMerger>>,
        config: &ExportConfig,
    ) -> ExportResult<MappingCollection> {
        match merger {
            Some(merger) => Ok(merger
                .mapping(&config.connection)
                .await?
                .into_inner_or_default()),
            None => Ok(MappingCollection::new()),
        }
    }
}

impl std::fmt::Debug for ContextBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextBuilder")
            .field("store_view_mapping", &self.store_view_mapping.is_some())
            .field("category_mapping", &self.category_mapping.is_some())
            .field("attribute_mapping", &self.attribute_mapping.is_some())
            .finish_non_exhaustive()
    }
}
