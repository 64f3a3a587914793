//! Collaborator traits
//!
//! The web-service transport is not part of this workspace; the export engine
//! talks to the remote platform only through these traits.

use async_trait::async_trait;
use std::collections::HashSet;

use crate::config::ConnectionParameters;
use crate::error::ConnectorResult;
use crate::ids::RemoteCategoryId;
use crate::operation::{CategoryCreate, CategoryMove, CategoryUpdate, CategoryVariation, ProductCall};
use crate::types::{AttributeCache, CategoryStatusSnapshot, StoreView};

/// Checks whether a set of connection parameters can log in.
///
/// Mapping reads and writes are gated on this check so that no mapping
/// traffic is attempted with bad credentials.
#[async_trait]
pub trait CredentialValidator: Send + Sync {
    /// Check the credentials of a connection.
    async fn is_valid(&self, connection: &ConnectionParameters) -> bool;
}

/// Remote catalog web-service.
///
/// Reads are issued once per batch while the export context is assembled;
/// writes are issued by the writers after a batch has been normalized.
#[async_trait]
pub trait RemoteCatalogService: Send + Sync {
    /// List store views.
    async fn store_views(&self) -> ConnectorResult<Vec<StoreView>>;

    /// Snapshot of the remote category tree.
    async fn categories_status(&self) -> ConnectorResult<CategoryStatusSnapshot>;

    /// Remote product attributes.
    async fn attributes(&self) -> ConnectorResult<AttributeCache>;

    /// SKUs already present remotely.
    async fn product_skus(&self) -> ConnectorResult<HashSet<String>>;

    /// Create a category under `parent_id` and return its remote id.
    ///
    /// `parent_id` is the resolved remote id of `operation.parent`.
    async fn create_category(
        &self,
        parent_id: RemoteCategoryId,
        operation: &CategoryCreate,
    ) -> ConnectorResult<RemoteCategoryId>;

    /// Update a category in one store view.
    async fn update_category(&self, operation: &CategoryUpdate) -> ConnectorResult<()>;

    /// Move a category under `parent_id`, the resolved remote id of
    /// `operation.parent`.
    async fn move_category(
        &self,
        parent_id: RemoteCategoryId,
        operation: &CategoryMove,
    ) -> ConnectorResult<()>;

    /// Write a store-view label of an existing category.
    async fn update_category_variation(
        &self,
        id: RemoteCategoryId,
        variation: &CategoryVariation,
    ) -> ConnectorResult<()>;

    /// Create or update one product call.
    async fn send_product(&self, call: &ProductCall) -> ConnectorResult<()>;
}
