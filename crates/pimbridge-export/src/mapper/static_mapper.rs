//! Mapper serving a fixed default mapping.

use async_trait::async_trait;

use pimbridge_connector::config::ConnectionParameters;
use pimbridge_connector::mapping::{MappingCollection, MappingEntry};

use super::{CredentialGated, Mapper};
use crate::error::ExportResult;

/// Priority of static mappers.
pub const STATIC_MAPPER_PRIORITY: i32 = 0;

/// Mapper returning the same collection for every connection.
///
/// Its entries are not deletable from the configuration UI, and it is never
/// gated on credentials. Writes are accepted and ignored.
#[derive(Debug, Clone)]
pub struct StaticMapper {
    name: String,
    mapping: MappingCollection,
    targets: Vec<String>,
}

impl StaticMapper {
    /// Create a static mapper from a default collection.
    pub fn new(name: impl Into<String>, mapping: MappingCollection) -> Self {
        let mapping = mapping
            .into_iter()
            .map(|entry| MappingEntry { deletable: false, ..entry })
            .collect();
        Self {
            name: name.into(),
            mapping,
            targets: Vec::new(),
        }
    }

    /// Declare the target codes this mapper knows about.
    #[must_use]
    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets = targets.into_iter().map(Into::into).collect();
        self
    }
}

#[async_trait]
impl Mapper for StaticMapper {
    fn name(&self) -> &str {
        &self.name
    }

    async fn mapping(
        &self,
        _connection: &ConnectionParameters,
    ) -> ExportResult<CredentialGated<MappingCollection>> {
        Ok(CredentialGated::Allowed(self.mapping.clone()))
    }

    async fn set_mapping(
        &self,
        _connection: &ConnectionParameters,
        _mapping: &MappingCollection,
    ) -> ExportResult<CredentialGated<()>> {
        Ok(CredentialGated::Allowed(()))
    }

    async fn all_sources(&self) -> ExportResult<Vec<String>> {
        Ok(self.mapping.iter().map(|e| e.source.clone()).collect())
    }

    async fn all_targets(&self, _connection: &ConnectionParameters) -> ExportResult<Vec<String>> {
        Ok(self.targets.clone())
    }

    fn priority(&self) -> i32 {
        STATIC_MAPPER_PRIORITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_mapping_is_not_deletable() {
        let mapper = StaticMapper::new(
            "storeview",
            MappingCollection::new().with("en_US", "default"),
        );
        let connection = ConnectionParameters::new("https://shop.example.com", "pim", "bad");

        let mapping = mapper
            .mapping(&connection)
            .await
            .unwrap()
            .into_inner_or_default();
        assert_eq!(mapping.target("en_US"), Some("default"));
        assert!(mapping.iter().all(|e| !e.deletable));
        assert_eq!(mapper.priority(), 0);
        assert_eq!(mapper.all_sources().await.unwrap(), vec!["en_US"]);
    }
}
