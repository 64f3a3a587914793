//! Writers sending normalized batches to the remote platform.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument};

use pimbridge_connector::traits::RemoteCatalogService;

use crate::error::ExportResult;
use crate::job::JobContext;
use crate::normalizer::NormalizedProduct;

pub mod category;
pub mod delta;

pub use category::{CategoryWriteReport, CategoryWriter};
pub use delta::DeltaProductWriter;

/// Writes a batch of normalized products.
///
/// Either every call of the batch succeeded or an error is returned.
#[async_trait]
pub trait ProductWriter: Send + Sync {
    async fn write(&self, job: &JobContext, products: &[NormalizedProduct]) -> ExportResult<()>;
}

/// Sends each product call through the remote web-service.
#[derive(Clone)]
pub struct WebserviceProductWriter {
    remote: Arc<dyn RemoteCatalogService>,
}

impl WebserviceProductWriter {
    pub fn new(remote: Arc<dyn RemoteCatalogService>) -> Self {
        Self { remote }
    }
}

#[async_trait]
impl ProductWriter for WebserviceProductWriter {
    #[instrument(skip(self, job, products), fields(products = products.len()))]
    async fn write(&self, job: &JobContext, products: &[NormalizedProduct]) -> ExportResult<()> {
        let mut calls = 0usize;
        for product in products {
            for call in product.calls() {
                self.remote.send_product(call).await?;
                calls += 1;
            }
        }

        info!(channel = %job.channel, calls, "Products sent");
        Ok(())
    }
}
