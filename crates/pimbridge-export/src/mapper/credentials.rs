//! Memoized credential validation.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

use pimbridge_connector::config::ConnectionParameters;
use pimbridge_connector::ids::ConnectionId;
use pimbridge_connector::traits::CredentialValidator;

/// Remembers the verdict of a validator per connection identifier.
///
/// Each mapper of a job asks for the same connection; only the first
/// request reaches the wrapped validator.
pub struct CachingCredentialValidator<V> {
    inner: V,
    verdicts: RwLock<HashMap<ConnectionId, bool>>,
}

impl<V: CredentialValidator> CachingCredentialValidator<V> {
    /// Wrap a validator.
    pub fn new(inner: V) -> Self {
        Self {
            inner,
            verdicts: RwLock::new(HashMap::new()),
        }
    }

    /// Forget the verdict of one connection.
    pub fn invalidate(&self, connection: &ConnectionParameters) {
        self.verdicts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&connection.identifier());
    }

    fn cached(&self, id: &ConnectionId) -> Option<bool> {
        self.verdicts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .copied()
    }
}

#[async_trait]
impl<V: CredentialValidator> CredentialValidator for CachingCredentialValidator<V> {
    async fn is_valid(&self, connection: &ConnectionParameters) -> bool {
        let id = connection.identifier();
        if let Some(valid) = self.cached(&id) {
            return valid;
        }

        let valid = self.inner.is_valid(connection).await;
        debug!(connection = %connection.endpoint(), valid, "Credentials checked");
        self.verdicts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, valid);
        valid
    }
}
