//! Persistence of simple source → target mappings.

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::instrument;

use pimbridge_connector::mapping::{MappingCollection, MappingEntry};

use crate::error::MappingStoreError;

/// Stores mapping collections under an identifier
/// (`"{kind}:{connection identifier}"`).
#[async_trait]
pub trait SimpleMappingStore: Send + Sync {
    /// Get the mapping stored under `identifier` (empty when none).
    async fn get(&self, identifier: &str) -> Result<MappingCollection, MappingStoreError>;

    /// Replace every entry stored under `identifier`.
    async fn replace(
        &self,
        identifier: &str,
        mapping: &MappingCollection,
    ) -> Result<(), MappingStoreError>;
}

/// In-memory implementation of `SimpleMappingStore`.
#[derive(Debug, Default)]
pub struct InMemorySimpleMappingStore {
    mappings: RwLock<HashMap<String, MappingCollection>>,
}

impl InMemorySimpleMappingStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of identifiers with a stored mapping.
    pub fn count(&self) -> usize {
        self.mappings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl SimpleMappingStore for InMemorySimpleMappingStore {
    async fn get(&self, identifier: &str) -> Result<MappingCollection, MappingStoreError> {
        Ok(self
            .mappings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identifier)
            .cloned()
            .unwrap_or_default())
    }

    async fn replace(
        &self,
        identifier: &str,
        mapping: &MappingCollection,
    ) -> Result<(), MappingStoreError> {
        self.mappings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(identifier.to_string(), mapping.clone());
        Ok(())
    }
}

/// PostgreSQL implementation of `SimpleMappingStore`.
#[derive(Debug, Clone)]
pub struct PgSimpleMappingStore {
    pool: PgPool,
}

impl PgSimpleMappingStore {
    /// Create a store on a connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SimpleMappingStore for PgSimpleMappingStore {
    #[instrument(skip(self))]
    async fn get(&self, identifier: &str) -> Result<MappingCollection, MappingStoreError> {
        let rows = sqlx::query_as::<_, SimpleMappingRow>(
            r"
            SELECT source, target
            FROM pim_simple_mappings
            WHERE identifier = $1
            ORDER BY position ASC
            ",
        )
        .bind(identifier)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| MappingEntry::new(row.source, row.target))
            .collect())
    }

    #[instrument(skip(self, mapping), fields(entries = mapping.len()))]
    async fn replace(
        &self,
        identifier: &str,
        mapping: &MappingCollection,
    ) -> Result<(), MappingStoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM pim_simple_mappings WHERE identifier = $1")
            .bind(identifier)
            .execute(&mut *tx)
            .await?;

        for (position, entry) in mapping.iter().enumerate() {
            sqlx::query(
                r"
                INSERT INTO pim_simple_mappings (identifier, source, target, position)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(identifier)
            .bind(&entry.source)
            .bind(&entry.target)
            .bind(i32::try_from(position).unwrap_or(i32::MAX))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

/// Database row for a simple mapping entry.
#[derive(Debug, sqlx::FromRow)]
struct SimpleMappingRow {
    source: String,
    target: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_replace_and_get() {
        let store = InMemorySimpleMappingStore::new();
        assert!(store.get("attribute:abc").await.unwrap().is_empty());

        store
            .replace("attribute:abc", &MappingCollection::new().with("name", "title"))
            .await
            .unwrap();
        store
            .replace("attribute:abc", &MappingCollection::new().with("sku", "sku"))
            .await
            .unwrap();

        let mapping = store.get("attribute:abc").await.unwrap();
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.target("sku"), Some("sku"));
        assert_eq!(store.count(), 1);
    }

    #[tokio::test]
    async fn test_in_memory_identifiers_are_isolated() {
        let store = InMemorySimpleMappingStore::new();
        store
            .replace("attribute:a", &MappingCollection::new().with("name", "title"))
            .await
            .unwrap();

        assert!(store.get("attribute:b").await.unwrap().is_empty());
        assert!(store.get("category:a").await.unwrap().is_empty());
    }
}
