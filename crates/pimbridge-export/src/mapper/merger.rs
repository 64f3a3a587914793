//! Priority merge of several mappers.

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, instrument};

use pimbridge_connector::config::{ConfigurationField, ConnectionParameters};
use pimbridge_connector::mapping::MappingCollection;

use super::{CredentialGated, Mapper};
use crate::error::ExportResult;

/// Combines the mappers serving one mapping kind.
///
/// Mappers are kept in ascending priority so that, when collections are
/// merged, a higher-priority mapper overrides entries with the same source.
pub struct MappingMerger {
    name: String,
    mappers: Vec<Arc<dyn Mapper>>,
}

impl MappingMerger {
    /// Create a merger over a set of mappers.
    pub fn new(name: impl Into<String>, mut mappers: Vec<Arc<dyn Mapper>>) -> Self {
        mappers.sort_by_key(|m| m.priority());
        Self {
            name: name.into(),
            mappers,
        }
    }

    /// Name of the merged mapping kind.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Merged mapping for a connection.
    ///
    /// `InvalidCredentials` only when every mapper refused the connection.
    #[instrument(skip(self, connection), fields(merger = %self.name))]
    pub async fn mapping(
        &self,
        connection: &ConnectionParameters,
    ) -> ExportResult<CredentialGated<MappingCollection>> {
        let mut merged = MappingCollection::new();
        let mut allowed = false;

        for mapper in &self.mappers {
            match mapper.mapping(connection).await? {
                CredentialGated::Allowed(mapping) => {
                    allowed = true;
                    merged.merge(mapping);
                }
                CredentialGated::InvalidCredentials => {
                    debug!(mapper = mapper.name(), "Mapper skipped, invalid credentials");
                }
            }
        }

        if allowed {
            Ok(CredentialGated::Allowed(merged))
        } else {
            Ok(CredentialGated::InvalidCredentials)
        }
    }

    /// Forward a mapping to every mapper.
    #[instrument(skip(self, connection, mapping), fields(merger = %self.name))]
    pub async fn set_mapping(
        &self,
        connection: &ConnectionParameters,
        mapping: &MappingCollection,
    ) -> ExportResult<CredentialGated<()>> {
        let mut allowed = false;
        for mapper in &self.mappers {
            allowed |= mapper.set_mapping(connection, mapping).await?.is_allowed();
        }

        if allowed {
            Ok(CredentialGated::Allowed(()))
        } else {
            Ok(CredentialGated::InvalidCredentials)
        }
    }

    /// Union of every mapper's sources.
    pub async fn all_sources(&self) -> ExportResult<Vec<String>> {
        let mut sources = BTreeSet::new();
        for mapper in &self.mappers {
            sources.extend(mapper.all_sources().await?);
        }
        Ok(sources.into_iter().collect())
    }

    /// Union of every mapper's targets.
    pub async fn all_targets(&self, connection: &ConnectionParameters) -> ExportResult<Vec<String>> {
        let mut targets = BTreeSet::new();
        for mapper in &self.mappers {
            targets.extend(mapper.all_targets(connection).await?);
        }
        Ok(targets.into_iter().collect())
    }

    /// Name of the configuration field carrying this mapping.
    pub fn field_name(&self) -> String {
        format!("{}Mapping", self.name)
    }

    /// Configuration field exposing the merged mapping to the UI.
    pub async fn configuration_field(
        &self,
        connection: &ConnectionParameters,
    ) -> ExportResult<(String, ConfigurationField)> {
        let mapping = self.mapping(connection).await?.into_inner_or_default();
        let field_name = self.field_name();

        let field = ConfigurationField::new(
            "text",
            format!("pim_connector.export.{field_name}.help"),
            format!("pim_connector.export.{field_name}.label"),
        )
        .with_option("mapping", serde_json::to_value(&mapping)?)
        .with_option("sources", serde_json::to_value(self.all_sources().await?)?)
        .with_option(
            "targets",
            serde_json::to_value(self.all_targets(connection).await?)?,
        )
        .with_option("name", serde_json::Value::String(self.name.clone()));

        Ok((field_name, field))
    }
}
