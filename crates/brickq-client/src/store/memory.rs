//! In-process store.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::QueryResult;
use crate::types::{CacheKey, CacheRecord, ResultTable};

use super::CacheStore;

/// Append-only in-memory store. Duplicate inserts are kept; the earliest wins on lookup.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<CacheRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, duplicates included.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Snapshot of every stored record in insertion order.
    pub async fn records(&self) -> Vec<CacheRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn find_one(&self, key: &CacheKey) -> QueryResult<Option<ResultTable>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| r.matches(key))
            .map(|r| r.results.clone()))
    }

    async fn insert(&self, record: CacheRecord) -> QueryResult<()> {
        debug!(dataset = %record.dataset, rows = record.results.len(), "storing query results");
        self.records.write().await.push(record);
        Ok(())
    }
}
