//! Connector configuration types
//!
//! Connection parameters for the remote web-service, the export settings
//! shared by processors, and the field descriptions exposed to the
//! configuration UI.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::error::{ConnectorError, ConnectorResult};
use crate::ids::{ChannelCode, ConnectionId};
use crate::types::DEFAULT_STORE_VIEW;

const REDACTED: &str = "***";

/// Parameters identifying a remote web-service connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParameters {
    /// Base URL of the remote platform (e.g. `https://shop.example.com`).
    pub url: String,

    /// Path of the web-service endpoint, appended to `url`.
    #[serde(default = "default_service_path")]
    pub service_path: String,

    /// Web-service user name.
    pub username: String,

    /// Web-service API key.
    pub api_key: String,
}

fn default_service_path() -> String {
    "/api/soap/?wsdl".to_string()
}

impl ConnectionParameters {
    /// Create connection parameters with the default service path.
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            service_path: default_service_path(),
            username: username.into(),
            api_key: api_key.into(),
        }
    }

    /// Set the service path.
    #[must_use]
    pub fn with_service_path(mut self, path: impl Into<String>) -> Self {
        self.service_path = path.into();
        self
    }

    /// Full endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.url.trim_end_matches('/'), self.service_path)
    }

    /// Stable identity of this connection.
    ///
    /// SHA-256 over every parameter, so changing the API key yields a new
    /// identity (and therefore a separate mapping namespace).
    pub fn identifier(&self) -> ConnectionId {
        let mut hasher = Sha256::new();
        hasher.update(self.endpoint().as_bytes());
        hasher.update(b"\n");
        hasher.update(self.username.as_bytes());
        hasher.update(b"\n");
        hasher.update(self.api_key.as_bytes());
        ConnectionId::new(hex::encode(hasher.finalize()))
    }

    /// Validate the parameters.
    pub fn validate(&self) -> ConnectorResult<()> {
        if self.url.trim().is_empty() {
            return Err(ConnectorError::invalid_configuration("url is required"));
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ConnectorError::invalid_configuration(format!(
                "url must use http or https: {}",
                self.url
            )));
        }
        if self.username.trim().is_empty() {
            return Err(ConnectorError::invalid_configuration(
                "username is required",
            ));
        }
        if self.api_key.is_empty() {
            return Err(ConnectorError::invalid_configuration("api_key is required"));
        }
        Ok(())
    }

    /// Create a redacted copy for logging.
    #[must_use]
    pub fn redacted(&self) -> Self {
        Self {
            api_key: REDACTED.to_string(),
            ..self.clone()
        }
    }
}

/// Settings of one export job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Remote connection.
    pub connection: ConnectionParameters,

    /// PIM channel exported by the job.
    pub channel: ChannelCode,

    /// Store view receiving the default locale values.
    #[serde(default = "default_store_view")]
    pub default_store_view: String,

    /// Create categories as anchors (products of children shown in parents).
    #[serde(default)]
    pub is_anchor: bool,

    /// Send a generated URL key with each category.
    #[serde(default)]
    pub url_key: bool,

    /// Remote attribute set used when creating products and families.
    #[serde(default)]
    pub attribute_set_id: Option<i64>,
}

fn default_store_view() -> String {
    DEFAULT_STORE_VIEW.to_string()
}

impl ExportConfig {
    /// Create an export configuration with default flags.
    pub fn new(connection: ConnectionParameters, channel: impl Into<String>) -> Self {
        Self {
            connection,
            channel: ChannelCode::new(channel),
            default_store_view: default_store_view(),
            is_anchor: false,
            url_key: false,
            attribute_set_id: None,
        }
    }

    /// Parse from a JSON document.
    pub fn from_json(json: &str) -> ConnectorResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the anchor flag.
    #[must_use]
    pub fn with_anchor(mut self, is_anchor: bool) -> Self {
        self.is_anchor = is_anchor;
        self
    }

    /// Set the URL key flag.
    #[must_use]
    pub fn with_url_key(mut self, url_key: bool) -> Self {
        self.url_key = url_key;
        self
    }

    /// Set the attribute set id.
    #[must_use]
    pub fn with_attribute_set(mut self, attribute_set_id: i64) -> Self {
        self.attribute_set_id = Some(attribute_set_id);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConnectorResult<()> {
        self.connection.validate()?;
        if self.channel.as_str().is_empty() {
            return Err(ConnectorError::invalid_configuration("channel is required"));
        }
        if self.default_store_view.is_empty() {
            return Err(ConnectorError::invalid_configuration(
                "default_store_view must not be empty",
            ));
        }
        Ok(())
    }
}

/// Options of a configuration field (translation keys).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOptions {
    /// Help text key.
    pub help: String,
    /// Label key.
    pub label: String,
    /// Extra options (e.g. a serialized mapping for mapping widgets).
    #[serde(flatten, default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Description of one configuration field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationField {
    /// Widget type (e.g. "checkbox", "text").
    #[serde(rename = "type")]
    pub field_type: String,
    /// Field options.
    pub options: FieldOptions,
}

impl ConfigurationField {
    /// A checkbox field.
    pub fn checkbox(help: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new("checkbox", help, label)
    }

    /// A field of any widget type.
    pub fn new(
        field_type: impl Into<String>,
        help: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            field_type: field_type.into(),
            options: FieldOptions {
                help: help.into(),
                label: label.into(),
                extra: BTreeMap::new(),
            },
        }
    }

    /// Attach an extra option.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.extra.insert(key.into(), value);
        self
    }
}

/// Configuration fields keyed by field name.
pub type ConfigurationFields = BTreeMap<String, ConfigurationField>;
