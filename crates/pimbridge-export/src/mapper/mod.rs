//! Field mappers.
//!
//! A [`Mapper`] resolves the source → target mapping configured for one
//! remote connection. Several mappers can serve the same connection; the
//! [`MappingMerger`] combines them by priority.
//!
//! ## Mappers
//!
//! | Mapper | Priority | Gated on credentials | Backing |
//! |--------|----------|----------------------|---------|
//! | [`StoredMapper`] | 10 | yes | [`SimpleMappingStore`] |
//! | [`StaticMapper`] | 0 | no | fixed collection |

use async_trait::async_trait;

use pimbridge_connector::config::ConnectionParameters;
use pimbridge_connector::mapping::MappingCollection;

use crate::error::ExportResult;

pub mod coerce;
pub mod credentials;
pub mod merger;
pub mod static_mapper;
pub mod store;
pub mod stored;

pub use coerce::{decode_mapping, mapping_from_json, mapping_from_value};
pub use credentials::CachingCredentialValidator;
pub use merger::MappingMerger;
pub use static_mapper::StaticMapper;
pub use store::{InMemorySimpleMappingStore, PgSimpleMappingStore, SimpleMappingStore};
pub use stored::StoredMapper;

/// Outcome of an operation that is skipped when credentials are invalid.
///
/// Keeps "nothing because the credentials are invalid" apart from "nothing
/// because nothing is configured".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialGated<T> {
    /// Credentials were valid and the operation ran.
    Allowed(T),
    /// Credentials were invalid; nothing was read or written.
    InvalidCredentials,
}

impl<T> CredentialGated<T> {
    /// Check if the operation ran.
    pub fn is_allowed(&self) -> bool {
        matches!(self, CredentialGated::Allowed(_))
    }

    /// Check if the operation was skipped.
    pub fn is_invalid_credentials(&self) -> bool {
        matches!(self, CredentialGated::InvalidCredentials)
    }

    /// Convert into an `Option`.
    pub fn into_option(self) -> Option<T> {
        match self {
            CredentialGated::Allowed(value) => Some(value),
            CredentialGated::InvalidCredentials => None,
        }
    }

    /// Map the allowed value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CredentialGated<U> {
        match self {
            CredentialGated::Allowed(value) => CredentialGated::Allowed(f(value)),
            CredentialGated::InvalidCredentials => CredentialGated::InvalidCredentials,
        }
    }
}

impl<T: Default> CredentialGated<T> {
    /// The allowed value, or the default (e.g. an empty collection).
    pub fn into_inner_or_default(self) -> T {
        self.into_option().unwrap_or_default()
    }
}

/// Resolves the mapping of one kind (attributes, categories, store views)
/// for a remote connection.
#[async_trait]
pub trait Mapper: Send + Sync {
    /// Name used in logs and configuration fields.
    fn name(&self) -> &str;

    /// Configured mapping for the connection.
    async fn mapping(
        &self,
        connection: &ConnectionParameters,
    ) -> ExportResult<CredentialGated<MappingCollection>>;

    /// Replace the mapping for the connection.
    async fn set_mapping(
        &self,
        connection: &ConnectionParameters,
        mapping: &MappingCollection,
    ) -> ExportResult<CredentialGated<()>>;

    /// Source codes available for mapping.
    async fn all_sources(&self) -> ExportResult<Vec<String>>;

    /// Target codes available for mapping; empty when the remote schema
    /// cannot be introspected.
    async fn all_targets(&self, _connection: &ConnectionParameters) -> ExportResult<Vec<String>> {
        Ok(Vec::new())
    }

    /// Higher priority wins when mappers are merged.
    fn priority(&self) -> i32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gated_collapses_to_empty() {
        let gated: CredentialGated<MappingCollection> = CredentialGated::InvalidCredentials;
        assert!(gated.is_invalid_credentials());
        assert!(gated.into_inner_or_default().is_empty());
    }

    #[test]
    fn test_gated_map() {
        let gated = CredentialGated::Allowed(MappingCollection::new().with("a", "b"));
        let len = gated.map(|m| m.len());
        assert_eq!(len, CredentialGated::Allowed(1));
    }
}
