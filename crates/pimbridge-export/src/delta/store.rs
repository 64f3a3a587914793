//! Watermark storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::instrument;
use uuid::Uuid;

use pimbridge_connector::ids::{ChannelCode, JobInstanceId};

use crate::error::TrackerResult;

/// Last successful export of one entity for one channel and job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportWatermark {
    pub channel: ChannelCode,
    pub job_instance_id: JobInstanceId,
    pub entity_key: String,
    pub last_exported_at: DateTime<Utc>,
}

/// Persistence of export watermarks.
///
/// `record` must keep the latest timestamp: recording an older time than
/// the stored one leaves the row unchanged.
#[async_trait]
pub trait WatermarkStore: Send + Sync {
    /// Get the watermark of an entity.
    async fn get(
        &self,
        channel: &ChannelCode,
        job_instance_id: JobInstanceId,
        entity_key: &str,
    ) -> TrackerResult<Option<ExportWatermark>>;

    /// Record an export; returns the stored (maximum) timestamp.
    async fn record(
        &self,
        channel: &ChannelCode,
        job_instance_id: JobInstanceId,
        entity_key: &str,
        exported_at: DateTime<Utc>,
    ) -> TrackerResult<DateTime<Utc>>;

    /// Every watermark of a channel and job.
    async fn list(
        &self,
        channel: &ChannelCode,
        job_instance_id: JobInstanceId,
    ) -> TrackerResult<Vec<ExportWatermark>>;
}

type WatermarkKey = (ChannelCode, JobInstanceId, String);

/// In-memory implementation of `WatermarkStore`.
#[derive(Debug, Default)]
pub struct InMemoryWatermarkStore {
    watermarks: RwLock<HashMap<WatermarkKey, DateTime<Utc>>>,
}

impl InMemoryWatermarkStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored watermarks.
    pub fn count(&self) -> usize {
        self.watermarks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl WatermarkStore for InMemoryWatermarkStore {
    async fn get(
        &self,
        channel: &ChannelCode,
        job_instance_id: JobInstanceId,
        entity_key: &str,
    ) -> TrackerResult<Option<ExportWatermark>> {
        let key = (channel.clone(), job_instance_id, entity_key.to_string());
        let watermarks = self
            .watermarks
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        Ok(watermarks.get(&key).map(|at| ExportWatermark {
            channel: channel.clone(),
            job_instance_id,
            entity_key: entity_key.to_string(),
            last_exported_at: *at,
        }))
    }

    async fn record(
        &self,
        channel: &ChannelCode,
        job_instance_id: JobInstanceId,
        entity_key: &str,
        exported_at: DateTime<Utc>,
    ) -> TrackerResult<DateTime<Utc>> {
        let key = (channel.clone(), job_instance_id, entity_key.to_string());
        let mut watermarks = self
            .watermarks
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let stored = watermarks
            .entry(key)
            .and_modify(|at| *at = (*at).max(exported_at))
            .or_insert(exported_at);
        Ok(*stored)
    }

    async fn list(
        &self,
        channel: &ChannelCode,
        job_instance_id: JobInstanceId,
    ) -> TrackerResult<Vec<ExportWatermark>> {
        let watermarks = self
            .watermarks
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let mut result: Vec<ExportWatermark> = watermarks
            .iter()
            .filter(|((c, j, _), _)| c == channel && *j == job_instance_id)
            .map(|((c, j, key), at)| ExportWatermark {
                channel: c.clone(),
                job_instance_id: *j,
                entity_key: key.clone(),
                last_exported_at: *at,
            })
            .collect();
        result.sort_by(|a, b| a.entity_key.cmp(&b.entity_key));
        Ok(result)
    }
}

/// PostgreSQL implementation of `WatermarkStore`.
#[derive(Debug, Clone)]
pub struct PgWatermarkStore {
    pool: PgPool,
}

impl PgWatermarkStore {
    /// Create a store on a connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WatermarkStore for PgWatermarkStore {
    #[instrument(skip(self))]
    async fn get(
        &self,
        channel: &ChannelCode,
        job_instance_id: JobInstanceId,
        entity_key: &str,
    ) -> TrackerResult<Option<ExportWatermark>> {
        let row = sqlx::query_as::<_, WatermarkRow>(
            r"
            SELECT channel, job_instance_id, entity_key, last_exported_at
            FROM pim_export_watermarks
            WHERE channel = $1 AND job_instance_id = $2 AND entity_key = $3
            ",
        )
        .bind(channel.as_str())
        .bind(job_instance_id.as_uuid())
        .bind(entity_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ExportWatermark::from))
    }

    #[instrument(skip(self))]
    async fn record(
        &self,
        channel: &ChannelCode,
        job_instance_id: JobInstanceId,
        entity_key: &str,
        exported_at: DateTime<Utc>,
    ) -> TrackerResult<DateTime<Utc>> {
        let stored: DateTime<Utc> = sqlx::query_scalar(
            r"
            INSERT INTO pim_export_watermarks (channel, job_instance_id, entity_key, last_exported_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (channel, job_instance_id, entity_key) DO UPDATE SET
                last_exported_at = GREATEST(pim_export_watermarks.last_exported_at, EXCLUDED.last_exported_at)
            RETURNING last_exported_at
            ",
        )
        .bind(channel.as_str())
        .bind(job_instance_id.as_uuid())
        .bind(entity_key)
        .bind(exported_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        channel: &ChannelCode,
        job_instance_id: JobInstanceId,
    ) -> TrackerResult<Vec<ExportWatermark>> {
        let rows = sqlx::query_as::<_, WatermarkRow>(
            r"
            SELECT channel, job_instance_id, entity_key, last_exported_at
            FROM pim_export_watermarks
            WHERE channel = $1 AND job_instance_id = $2
            ORDER BY entity_key
            ",
        )
        .bind(channel.as_str())
        .bind(job_instance_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ExportWatermark::from).collect())
    }
}

/// Database row for a watermark.
#[derive(Debug, sqlx::FromRow)]
struct WatermarkRow {
    channel: String,
    job_instance_id: Uuid,
    entity_key: String,
    last_exported_at: DateTime<Utc>,
}

impl From<WatermarkRow> for ExportWatermark {
    fn from(row: WatermarkRow) -> Self {
        Self {
            channel: ChannelCode::new(row.channel),
            job_instance_id: JobInstanceId::from_uuid(row.job_instance_id),
            entity_key: row.entity_key,
            last_exported_at: row.last_exported_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_record_keeps_maximum() {
        let store = InMemoryWatermarkStore::new();
        let channel = ChannelCode::from("ecommerce");
        let job = JobInstanceId::new();

        assert_eq!(store.record(&channel, job, "ABC", at(10)).await.unwrap(), at(10));
        assert_eq!(store.record(&channel, job, "ABC", at(12)).await.unwrap(), at(12));
        assert_eq!(store.record(&channel, job, "ABC", at(10)).await.unwrap(), at(12));

        let watermark = store.get(&channel, job, "ABC").await.unwrap().unwrap();
        assert_eq!(watermark.last_exported_at, at(12));
        assert_eq!(store.count(), 1);
    }

    #[tokio::test]
    async fn test_watermarks_are_scoped_by_channel_and_job() {
        let store = InMemoryWatermarkStore::new();
        let ecommerce = ChannelCode::from("ecommerce");
        let print = ChannelCode::from("print");
        let job = JobInstanceId::new();
        let other_job = JobInstanceId::new();

        store.record(&ecommerce, job, "B", at(9)).await.unwrap();
        store.record(&ecommerce, job, "A", at(9)).await.unwrap();
        store.record(&print, job, "A", at(9)).await.unwrap();

        assert!(store.get(&ecommerce, other_job, "A").await.unwrap().is_none());
        let listed = store.list(&ecommerce, job).await.unwrap();
        let keys: Vec<&str> = listed.iter().map(|w| w.entity_key.as_str()).collect();
        assert_eq!(keys, vec!["A", "B"]);
    }
}
