//! # Catalog Connector Framework
//!
//! Core abstractions for exporting PIM catalog data to a remote e-commerce
//! platform through its web-service API.
//!
//! The transport itself lives outside this workspace. This crate defines what
//! travels over it and the narrow traits the export engine calls:
//!
//! - [`RemoteCatalogService`] - store views, category status, attributes and writes
//! - [`CredentialValidator`] - gate for every mapping read and write
//!
//! ## Crate Organization
//!
//! - [`ids`] - Type-safe identifiers (`ConnectionId`, `ChannelCode`, ...)
//! - [`types`] - Remote store views, category snapshot, attribute cache
//! - [`error`] - Error types with transient/permanent classification
//! - [`config`] - Connection parameters, export settings, UI field descriptions
//! - [`mapping`] - Source → target mapping collections
//! - [`operation`] - Operation payloads for categories, products and attributes
//! - [`traits`] - Collaborator traits
//!
//! [`RemoteCatalogService`]: traits::RemoteCatalogService
//! [`CredentialValidator`]: traits::CredentialValidator

pub mod config;
pub mod error;
pub mod ids;
pub mod mapping;
pub mod operation;
pub mod traits;
pub mod types;

/// Prelude module for convenient imports.
///
/// ```
/// use pimbridge_connector::prelude::*;
/// ```
pub mod prelude {
    // IDs
    pub use crate::ids::{ChannelCode, ConnectionId, JobInstanceId, RemoteCategoryId};

    // Remote types
    pub use crate::types::{
        AttributeCache, AttributeScope, CategoryStatusSnapshot, RemoteAttribute, RemoteCategory,
        StoreView, DEFAULT_STORE_VIEW,
    };

    // Error handling
    pub use crate::error::{ConnectorError, ConnectorResult};

    // Configuration
    pub use crate::config::{
        ConfigurationField, ConfigurationFields, ConnectionParameters, ExportConfig,
    };

    // Mapping
    pub use crate::mapping::{MappingCollection, MappingEntry};

    // Operations
    pub use crate::operation::{
        AttributePayload, AttributeSetPayload, CategoryCreate, CategoryData, CategoryMove,
        CategoryRef, CategoryUpdate, CategoryVariation, OptionPayload, ProductCall, StoreLabel,
    };

    // Traits
    pub use crate::traits::{CredentialValidator, RemoteCatalogService};
}

// Re-export async_trait for collaborator implementors
pub use async_trait::async_trait;
