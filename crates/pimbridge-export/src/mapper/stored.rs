//! Mapper backed by a persisted mapping store.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

use pimbridge_connector::config::ConnectionParameters;
use pimbridge_connector::mapping::{MappingCollection, MappingEntry};
use pimbridge_connector::traits::CredentialValidator;

use super::store::SimpleMappingStore;
use super::{CredentialGated, Mapper};
use crate::error::ExportResult;
use crate::job::SourceCatalog;

/// Priority of the stored mapper.
pub const STORED_MAPPER_PRIORITY: i32 = 10;

/// Mapper reading and writing user-configured mappings.
///
/// Both reads and writes are gated on the connection's credentials: with
/// invalid credentials nothing is read from or written to the store.
pub struct StoredMapper {
    kind: String,
    validator: Arc<dyn CredentialValidator>,
    store: Arc<dyn SimpleMappingStore>,
    sources: Arc<dyn SourceCatalog>,
}

impl StoredMapper {
    /// Create a stored mapper for one mapping kind (e.g. "attribute").
    pub fn new(
        kind: impl Into<String>,
        validator: Arc<dyn CredentialValidator>,
        store: Arc<dyn SimpleMappingStore>,
        sources: Arc<dyn SourceCatalog>,
    ) -> Self {
        Self {
            kind: kind.into(),
            validator,
            store,
            sources,
        }
    }

    /// Store identifier of a connection's mapping.
    pub fn identifier(&self, connection: &ConnectionParameters) -> String {
        format!("{}:{}", self.kind, connection.identifier())
    }
}

#[async_trait]
impl Mapper for StoredMapper {
    fn name(&self) -> &str {
        &self.kind
    }

    #[instrument(skip(self, connection), fields(kind = %self.kind))]
    async fn mapping(
        &self,
        connection: &ConnectionParameters,
    ) -> ExportResult<CredentialGated<MappingCollection>> {
        if !self.validator.is_valid(connection).await {
            debug!("Credentials invalid, mapping not loaded");
            return Ok(CredentialGated::InvalidCredentials);
        }

        let stored = self.store.get(&self.identifier(connection)).await?;
        let mapping = stored
            .into_iter()
            .map(|entry| MappingEntry::new(entry.source, entry.target).with_deletable(true))
            .collect();

        Ok(CredentialGated::Allowed(mapping))
    }

    #[instrument(skip(self, connection, mapping), fields(kind = %self.kind, entries = mapping.len()))]
    async fn set_mapping(
        &self,
        connection: &ConnectionParameters,
        mapping: &MappingCollection,
    ) -> ExportResult<CredentialGated<()>> {
        if !self.validator.is_valid(connection).await {
            debug!("Credentials invalid, mapping not saved");
            return Ok(CredentialGated::InvalidCredentials);
        }

        self.store
            .replace(&self.identifier(connection), mapping)
            .await?;
        Ok(CredentialGated::Allowed(()))
    }

    async fn all_sources(&self) -> ExportResult<Vec<String>> {
        self.sources.source_codes().await
    }

    fn priority(&self) -> i32 {
        STORED_MAPPER_PRIORITY
    }
}
