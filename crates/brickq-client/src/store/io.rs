//! Filesystem helpers for the file store.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{QueryError, QueryResult};

pub(crate) fn default_cache_dir() -> QueryResult<PathBuf> {
    let base = dirs::cache_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| QueryError::store("could not determine cache directory"))?;

    Ok(base.join("brickq").join("queries"))
}

/// Write via a uniquely named temp file and rename, so concurrent writers of
/// the same path never leave a torn file behind.
pub(crate) async fn write_atomic(path: &Path, content: &[u8]) -> QueryResult<()> {
    let temp_path = path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));

    fs::write(&temp_path, content)
        .await
        .map_err(|e| QueryError::store(format!("failed to write temp file: {}", e)))?;

    if let Err(e) = fs::rename(&temp_path, path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(QueryError::store(format!(
            "failed to rename temp file: {}",
            e
        )));
    }

    Ok(())
}
