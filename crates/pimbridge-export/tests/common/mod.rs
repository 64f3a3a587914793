//! Shared fixtures for export integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, Once};

use pimbridge_connector::config::{ConnectionParameters, ExportConfig};
use pimbridge_connector::error::{ConnectorError, ConnectorResult};
use pimbridge_connector::ids::RemoteCategoryId;
use pimbridge_connector::mapping::MappingCollection;
use pimbridge_connector::operation::{
    CategoryCreate, CategoryMove, CategoryUpdate, CategoryVariation, ProductCall,
};
use pimbridge_connector::traits::{CredentialValidator, RemoteCatalogService};
use pimbridge_connector::types::{AttributeCache, CategoryStatusSnapshot, StoreView};
use pimbridge_export::job::{ChannelLocales, StaticSourceCatalog};
use pimbridge_export::mapper::{
    InMemorySimpleMappingStore, Mapper, MappingMerger, StaticMapper, StoredMapper,
};
use pimbridge_export::processor::ContextBuilder;

pub const CHANNEL: &str = "ecommerce";
pub const DEFAULT_LOCALE: &str = "en_US";

static TRACING: Once = Once::new();

/// Install a fmt subscriber once when `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .with_test_writer()
                .try_init();
        }
    });
}

pub fn connection() -> ConnectionParameters {
    ConnectionParameters::new("https://shop.example.com", "pim", "secret-key")
}

pub fn export_config() -> ExportConfig {
    ExportConfig::new(connection(), CHANNEL).with_attribute_set(4)
}

// =============================================================================
// Manual Mock Implementations
// =============================================================================

/// A call received by [`RecordingCatalogService`].
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    /// Resolved parent id and the operation.
    CreateCategory(RemoteCategoryId, CategoryCreate),
    UpdateCategory(CategoryUpdate),
    MoveCategory(RemoteCategoryId, CategoryMove),
    CategoryVariation(RemoteCategoryId, CategoryVariation),
    Product(ProductCall),
}

/// Remote catalog serving fixed reads and recording every write.
pub struct RecordingCatalogService {
    store_views: Vec<StoreView>,
    status: CategoryStatusSnapshot,
    attributes: AttributeCache,
    skus: HashSet<String>,
    next_category_id: AtomicI64,
    fail_products: AtomicBool,
    calls: Mutex<Vec<RemoteCall>>,
}

impl RecordingCatalogService {
    pub fn new() -> Self {
        Self {
            store_views: vec![
                StoreView::new(1, "default"),
                StoreView::new(2, "fr"),
            ],
            status: CategoryStatusSnapshot::new(),
            attributes: AttributeCache::new(),
            skus: HashSet::new(),
            next_category_id: AtomicI64::new(100),
            fail_products: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_status(mut self, status: CategoryStatusSnapshot) -> Self {
        self.status = status;
        self
    }

    pub fn with_attributes(mut self, attributes: AttributeCache) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_skus<I, S>(mut self, skus: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skus = skus.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_product_error(self) -> Self {
        self.fail_products.store(true, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn product_calls(&self) -> Vec<ProductCall> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RemoteCall::Product(product) => Some(product),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: RemoteCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RemoteCatalogService for RecordingCatalogService {
    async fn store_views(&self) -> ConnectorResult<Vec<StoreView>> {
        Ok(self.store_views.clone())
    }

    async fn categories_status(&self) -> ConnectorResult<CategoryStatusSnapshot> {
        Ok(self.status.clone())
    }

    async fn attributes(&self) -> ConnectorResult<AttributeCache> {
        Ok(self.attributes.clone())
    }

    async fn product_skus(&self) -> ConnectorResult<HashSet<String>> {
        Ok(self.skus.clone())
    }

    async fn create_category(
        &self,
        parent_id: RemoteCategoryId,
        operation: &CategoryCreate,
    ) -> ConnectorResult<RemoteCategoryId> {
        self.record(RemoteCall::CreateCategory(parent_id, operation.clone()));
        Ok(RemoteCategoryId::new(
            self.next_category_id.fetch_add(1, Ordering::SeqCst),
        ))
    }

    async fn update_category(&self, operation: &CategoryUpdate) -> ConnectorResult<()> {
        self.record(RemoteCall::UpdateCategory(operation.clone()));
        Ok(())
    }

    async fn move_category(
        &self,
        parent_id: RemoteCategoryId,
        operation: &CategoryMove,
    ) -> ConnectorResult<()> {
        self.record(RemoteCall::MoveCategory(parent_id, operation.clone()));
        Ok(())
    }

    async fn update_category_variation(
        &self,
        id: RemoteCategoryId,
        variation: &CategoryVariation,
    ) -> ConnectorResult<()> {
        self.record(RemoteCall::CategoryVariation(id, variation.clone()));
        Ok(())
    }

    async fn send_product(&self, call: &ProductCall) -> ConnectorResult<()> {
        if self.fail_products.load(Ordering::SeqCst) {
            return Err(ConnectorError::TargetUnavailable {
                message: "catalog service unavailable".to_string(),
            });
        }
        self.record(RemoteCall::Product(call.clone()));
        Ok(())
    }
}

/// Validator with a fixed answer.
pub struct FixedValidator(pub bool);

#[async_trait]
impl CredentialValidator for FixedValidator {
    async fn is_valid(&self, _connection: &ConnectionParameters) -> bool {
        self.0
    }
}

// =============================================================================
// Builders
// =============================================================================

/// Store-view mapping sending `fr_FR` to the `fr` store view.
pub fn store_view_mapping() -> Arc<MappingMerger> {
    let mapping = MappingCollection::new().with("fr_FR", "fr");
    Arc::new(MappingMerger::new(
        "storeView",
        vec![Arc::new(StaticMapper::new("storeView", mapping)) as Arc<dyn Mapper>],
    ))
}

/// Stored mapping of one kind, gated on `valid_credentials`.
pub fn stored_mapping(kind: &str, valid_credentials: bool) -> Arc<MappingMerger> {
    let stored = StoredMapper::new(
        kind,
        Arc::new(FixedValidator(valid_credentials)),
        Arc::new(InMemorySimpleMappingStore::new()),
        Arc::new(StaticSourceCatalog::new(["master", "shoes", "boots"])),
    );
    Arc::new(MappingMerger::new(
        kind,
        vec![Arc::new(stored) as Arc<dyn Mapper>],
    ))
}

/// Context builder reading from `remote` with the `fr` store view mapped.
pub fn context_builder(remote: Arc<RecordingCatalogService>) -> ContextBuilder {
    ContextBuilder::new(
        remote,
        Arc::new(ChannelLocales::new().with(CHANNEL, DEFAULT_LOCALE)),
    )
    .with_store_view_mapping(store_view_mapping())
}
