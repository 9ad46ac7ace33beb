//! Cache key to file name derivation.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::types::CacheKey;

/// Hex SHA-256 over the length-prefixed dataset followed by the query.
///
/// The length prefix makes the encoding injective: no pair of distinct keys
/// feeds the same bytes to the hash, whatever characters the dataset holds.
pub(crate) fn key_digest(key: &CacheKey) -> String {
    let mut hasher = Sha256::new();
    hasher.update((key.dataset.len() as u64).to_be_bytes());
    hasher.update(key.dataset.as_bytes());
    hasher.update(key.query.as_bytes());
    hex::encode(hasher.finalize())
}

/// Whether `name` is a file this store writes: a record (`<digest>.json`) or
/// a temp file left by an interrupted write (`<digest>.<uuid>.tmp`).
pub(crate) fn is_store_file_name(name: &str) -> bool {
    let Some((digest, rest)) = name.split_once('.') else {
        return false;
    };
    let is_digest = digest.len() == 64 && digest.bytes().all(|b| b.is_ascii_hexdigit());
    if !is_digest {
        return false;
    }
    match rest.split_once('.') {
        None => rest == "json",
        Some((tag, ext)) => {
            ext == "tmp" && tag.len() == 32 && tag.bytes().all(|b| b.is_ascii_hexdigit())
        }
    }
}

pub(crate) fn record_path(cache_dir: &Path, key: &CacheKey) -> PathBuf {
    cache_dir.join(format!("{}.json", key_digest(key)))
}
