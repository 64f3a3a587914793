//! Incremental export tracking.
//!
//! A watermark records when an entity was last exported successfully for a
//! (channel, job) pair. Entities modified after their watermark are exported
//! again; the others are skipped.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, instrument};

use pimbridge_connector::ids::{ChannelCode, JobInstanceId};

use crate::catalog::Product;
use crate::error::{TrackerError, TrackerResult};
use crate::job::JobContext;

pub mod store;

pub use store::{ExportWatermark, InMemoryWatermarkStore, PgWatermarkStore, WatermarkStore};

/// Prefix of SKUs generated for configurable products.
pub const DEFAULT_CONFIGURABLE_PREFIX: &str = "conf-";

/// Decides which entities changed since their last export.
#[derive(Clone)]
pub struct DeltaExportTracker {
    store: Arc<dyn WatermarkStore>,
    configurable_prefix: String,
}

impl DeltaExportTracker {
    /// Create a tracker with the default configurable prefix.
    pub fn new(store: Arc<dyn WatermarkStore>) -> Self {
        Self {
            store,
            configurable_prefix: DEFAULT_CONFIGURABLE_PREFIX.to_string(),
        }
    }

    /// Set the prefix stripped from SKUs.
    #[must_use]
    pub fn with_configurable_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.configurable_prefix = prefix.into();
        self
    }

    /// Canonical entity key of a SKU (`conf-ABC`, ` ABC ` and `ABC` share `ABC`).
    ///
    /// Every read and write of a watermark goes through this key.
    pub fn canonical_key<'a>(&self, sku: &'a str) -> &'a str {
        let sku = sku.trim();
        if self.configurable_prefix.is_empty() {
            return sku;
        }
        sku.strip_prefix(self.configurable_prefix.as_str())
            .map_or(sku, str::trim)
    }

    fn key<'a>(&self, sku: &'a str) -> TrackerResult<&'a str> {
        let key = self.canonical_key(sku);
        if key.is_empty() {
            return Err(TrackerError::InvalidKey {
                key: sku.to_string(),
            });
        }
        Ok(key)
    }

    /// Check if an entity modified at `modified_at` must be exported.
    ///
    /// True when nothing was recorded yet or the entity changed strictly
    /// after its watermark.
    #[instrument(skip(self))]
    pub async fn should_export(
        &self,
        channel: &ChannelCode,
        job_instance_id: JobInstanceId,
        sku: &str,
        modified_at: DateTime<Utc>,
    ) -> TrackerResult<bool> {
        let key = self.key(sku)?;
        let watermark = self.store.get(channel, job_instance_id, key).await?;

        Ok(watermark.map_or(true, |w| modified_at > w.last_exported_at))
    }

    /// Record a successful export at `exported_at`.
    ///
    /// The stored watermark never moves backwards.
    #[instrument(skip(self))]
    pub async fn record_exported(
        &self,
        channel: &ChannelCode,
        job_instance_id: JobInstanceId,
        sku: &str,
        exported_at: DateTime<Utc>,
    ) -> TrackerResult<()> {
        let key = self.key(sku)?;
        let stored = self
            .store
            .record(channel, job_instance_id, key, exported_at)
            .await?;
        debug!(entity_key = key, %stored, "Watermark recorded");
        Ok(())
    }

    /// Keep the products that changed since their last export for the job.
    pub async fn filter_changed(
        &self,
        job: &JobContext,
        products: Vec<Product>,
    ) -> TrackerResult<Vec<Product>> {
        let total = products.len();
        let mut changed = Vec::with_capacity(total);

        for product in products {
            if self
                .should_export(&job.channel, job.job_instance_id, &product.sku, product.updated_at)
                .await?
            {
                changed.push(product);
            }
        }

        debug!(total, changed = changed.len(), "Delta filter applied");
        Ok(changed)
    }
}

impl std::fmt::Debug for DeltaExportTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeltaExportTracker")
            .field("configurable_prefix", &self.configurable_prefix)
            .finish_non_exhaustive()
    }
}
