//! Writer advancing delta watermarks.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::ProductWriter;
use crate::delta::DeltaExportTracker;
use crate::error::ExportResult;
use crate::job::JobContext;
use crate::normalizer::NormalizedProduct;

/// Wraps a product writer and records every written SKU as exported.
///
/// The export time is taken before the wrapped write starts, so a product
/// edited while the batch is being written is exported again next run.
/// Nothing is recorded when the wrapped write fails.
pub struct DeltaProductWriter {
    inner: Arc<dyn ProductWriter>,
    tracker: DeltaExportTracker,
}

impl DeltaProductWriter {
    pub fn new(inner: Arc<dyn ProductWriter>, tracker: DeltaExportTracker) -> Self {
        Self { inner, tracker }
    }
}

#[async_trait]
impl ProductWriter for DeltaProductWriter {
    #[instrument(skip(self, job, products), fields(products = products.len()))]
    async fn write(&self, job: &JobContext, products: &[NormalizedProduct]) -> ExportResult<()> {
        let started_at = Utc::now();

        self.inner.write(job, products).await?;

        let keys: BTreeSet<&str> = products
            .iter()
            .map(|p| self.tracker.canonical_key(&p.sku))
            .collect();
        for key in &keys {
            self.tracker
                .record_exported(&job.channel, job.job_instance_id, key, started_at)
                .await?;
        }

        debug!(watermarks = keys.len(), %started_at, "Watermarks advanced");
        Ok(())
    }
}
