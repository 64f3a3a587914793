//! PIM-side collaborators of an export job.

use async_trait::async_trait;
use std::collections::HashMap;

use pimbridge_connector::ids::{ChannelCode, JobInstanceId};

use crate::error::ExportResult;

/// The running job, as seen by the delta tracker and the writers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobContext {
    /// Job instance the watermarks belong to.
    pub job_instance_id: JobInstanceId,
    /// Exported channel.
    pub channel: ChannelCode,
}

impl JobContext {
    /// Create a job context.
    pub fn new(job_instance_id: JobInstanceId, channel: impl Into<ChannelCode>) -> Self {
        Self {
            job_instance_id,
            channel: channel.into(),
        }
    }
}

/// Resolves locales of a channel.
#[async_trait]
pub trait LocaleProvider: Send + Sync {
    /// Default locale of the channel, if the channel exists.
    async fn default_locale(&self, channel: &ChannelCode) -> ExportResult<Option<String>>;
}

/// Enumerates PIM codes that can be used as mapping sources.
#[async_trait]
pub trait SourceCatalog: Send + Sync {
    /// All source codes (e.g. every PIM attribute code).
    async fn source_codes(&self) -> ExportResult<Vec<String>>;
}

/// Fixed channel → default locale table.
#[derive(Debug, Clone, Default)]
pub struct ChannelLocales {
    locales: HashMap<ChannelCode, String>,
}

impl ChannelLocales {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the default locale of a channel.
    #[must_use]
    pub fn with(mut self, channel: impl Into<ChannelCode>, locale: impl Into<String>) -> Self {
        self.locales.insert(channel.into(), locale.into());
        self
    }
}

#[async_trait]
impl LocaleProvider for ChannelLocales {
    async fn default_locale(&self, channel: &ChannelCode) -> ExportResult<Option<String>> {
        Ok(self.locales.get(channel).cloned())
    }
}

/// Fixed list of source codes.
#[derive(Debug, Clone, Default)]
pub struct StaticSourceCatalog {
    codes: Vec<String>,
}

impl StaticSourceCatalog {
    /// Create a catalog from a list of codes.
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl SourceCatalog for StaticSourceCatalog {
    async fn source_codes(&self) -> ExportResult<Vec<String>> {
        Ok(self.codes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_locales() {
        let locales = ChannelLocales::new().with("ecommerce", "en_US");

        assert_eq!(
            locales
                .default_locale(&ChannelCode::from("ecommerce"))
                .await
                .unwrap(),
            Some("en_US".to_string())
        );
        assert_eq!(
            locales
                .default_locale(&ChannelCode::from("print"))
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_static_source_catalog() {
        let catalog = StaticSourceCatalog::new(["sku", "name"]);
        assert_eq!(catalog.source_codes().await.unwrap(), vec!["sku", "name"]);
    }
}
