//! Directory-backed store: one JSON record per key.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{QueryError, QueryResult};
use crate::types::{CacheKey, CacheRecord, ResultTable};

use super::{io, keys, CacheStore};

/// File-backed cache store.
///
/// Records are written atomically, so a duplicate insert for the same key
/// replaces one complete record with another and readers never observe a
/// partial file. On read the stored key is compared with the requested one.
#[derive(Debug, Clone)]
pub struct FileStore {
    cache_dir: PathBuf,
}

impl FileStore {
    /// Create a store in the default location (`<user cache dir>/brickq/queries`).
    pub fn new() -> QueryResult<Self> {
        Ok(Self {
            cache_dir: io::default_cache_dir()?,
        })
    }

    /// Create a store with a custom directory.
    pub fn with_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Remove every stored record and leftover temp file.
    ///
    /// Files the store did not write are left alone. The directory itself is
    /// removed only when nothing else remains in it.
    pub async fn clear(&self) -> QueryResult<()> {
        let Some(mut entries) = self.read_dir().await? else {
            return Ok(());
        };

        let mut removed = 0usize;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| QueryError::store(format!("failed to read directory entry: {}", e)))?
        {
            let name = entry.file_name();
            if !name.to_str().is_some_and(keys::is_store_file_name) {
                continue;
            }
            match fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(QueryError::store(format!(
                        "failed to remove cache record {}: {}",
                        entry.path().display(),
                        e
                    )))
                }
            }
        }

        // only succeeds once the directory is empty
        if fs::remove_dir(&self.cache_dir).await.is_err() {
            debug!(dir = %self.cache_dir.display(), "cache directory kept, not empty");
        }

        debug!(dir = %self.cache_dir.display(), removed, "cleared query cache");
        Ok(())
    }

    /// List stored records. Unreadable files are skipped.
    pub async fn list(&self) -> QueryResult<Vec<CacheRecord>> {
        let mut result = Vec::new();

        let Some(mut entries) = self.read_dir().await? else {
            return Ok(result);
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| QueryError::store(format!("failed to read directory entry: {}", e)))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match read_record(&path).await {
                Ok(Some(record)) => result.push(record),
                Ok(None) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable cache record"),
            }
        }

        result.sort_by(|a, b| a.stored_at.cmp(&b.stored_at));
        Ok(result)
    }

    /// `None` when the directory does not exist yet.
    async fn read_dir(&self) -> QueryResult<Option<fs::ReadDir>> {
        match fs::read_dir(&self.cache_dir).await {
            Ok(entries) => Ok(Some(entries)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(QueryError::store(format!(
                "failed to read cache directory: {}",
                e
            ))),
        }
    }
}

/// Read and parse a record. A missing file is `Ok(None)`.
async fn read_record(path: &Path) -> QueryResult<Option<CacheRecord>> {
    let content = match fs::read(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(QueryError::store(format!(
                "failed to read cache record: {}",
                e
            )))
        }
    };

    serde_json::from_slice(&content)
        .map(Some)
        .map_err(|e| QueryError::decode(format!("failed to parse cache record: {}", e)))
}

#[async_trait]
impl CacheStore for FileStore {
    async fn find_one(&self, key: &CacheKey) -> QueryResult<Option<ResultTable>> {
        let path = keys::record_path(&self.cache_dir, key);

        let Some(record) = read_record(&path).await? else {
            debug!(dataset = %key.dataset, "query not in cache");
            return Ok(None);
        };

        if !record.matches(key) {
            warn!(
                path = %path.display(),
                expected_dataset = %key.dataset,
                stored_dataset = %record.dataset,
                "cache integrity check failed"
            );
            return Err(QueryError::store(format!(
                "cache record {} does not belong to the requested key",
                path.display()
            )));
        }

        debug!(dataset = %key.dataset, rows = record.results.len(), "cache hit");
        Ok(Some(record.results))
    }

    async fn insert(&self, record: CacheRecord) -> QueryResult<()> {
        fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| QueryError::store(format!("failed to create cache directory: {}", e)))?;

        let path = keys::record_path(&self.cache_dir, &record.key());
        let json = serde_json::to_vec_pretty(&record)
            .map_err(|e| QueryError::store(format!("failed to serialize cache record: {}", e)))?;

        io::write_atomic(&path, &json).await?;

        debug!(dataset = %record.dataset, rows = record.results.len(), "cached query results");
        Ok(())
    }
}
