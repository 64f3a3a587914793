//! # Catalog Export Engine
//!
//! Turns PIM catalog entities into remote catalog operations and keeps track
//! of what was already exported.
//!
//! ## Pipeline
//!
//! ```text
//! PIM batch ──► processor ──► normalizer ──► writer ──► RemoteCatalogService
//!                  │              │             │
//!             ContextBuilder   mappings    DeltaExportTracker
//! ```
//!
//! - [`processor`] builds one [`GlobalContext`](normalizer::GlobalContext)
//!   per batch and isolates per-item failures.
//! - [`normalizer`] holds the pure, synchronous entity normalizers.
//! - [`mapper`] resolves source → target mappings from stores and static
//!   tables, gated on valid credentials.
//! - [`delta`] stores export watermarks so unchanged products are skipped.
//! - [`writer`] sends operations and advances watermarks after success.

pub mod catalog;
pub mod delta;
pub mod error;
pub mod job;
pub mod mapper;
pub mod normalizer;
pub mod operations;
pub mod processor;
pub mod writer;

use sqlx::PgPool;

use crate::error::ExportResult;

/// Run the pending schema migrations of the watermark and mapping stores.
///
/// # Errors
///
/// Returns `ExportError::Migration` if any migration fails to apply.
pub async fn run_migrations(pool: &PgPool) -> ExportResult<()> {
    tracing::info!("Running export store migrations...");

    sqlx::migrate!("./migrations").run(pool).await?;

    tracing::info!("Export store migrations completed");
    Ok(())
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::catalog::{
        Attribute, AttributeOption, AttributeType, CatalogEntity, CategoryNode, EntityKind,
        Family, Product, ProductValue,
    };
    pub use crate::delta::{
        DeltaExportTracker, ExportWatermark, InMemoryWatermarkStore, PgWatermarkStore,
        WatermarkStore,
    };
    pub use crate::error::{
        ExportError, ExportResult, ItemError, NormalizeError, NormalizeResult, TrackerError,
    };
    pub use crate::job::{ChannelLocales, JobContext, LocaleProvider, SourceCatalog};
    pub use crate::mapper::{
        mapping_from_json, CachingCredentialValidator, CredentialGated, Mapper, MappingMerger,
        SimpleMappingStore, StaticMapper, StoredMapper,
    };
    pub use crate::normalizer::{
        EntityNormalizer, GlobalContext, NormalizedEntity, NormalizedProduct, NormalizerKey,
        NormalizerRegistry,
    };
    pub use crate::operations::NormalizedOperationSet;
    pub use crate::processor::{ContextBuilder, CategoryTreeProcessor, ProductProcessor};
    pub use crate::writer::{
        CategoryWriter, DeltaProductWriter, ProductWriter, WebserviceProductWriter,
    };
}
