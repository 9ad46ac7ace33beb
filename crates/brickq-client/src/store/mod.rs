//! Cache stores for query results.
//!
//! A store is addressed by [`CacheKey`] and holds the [`ResultTable`] first
//! computed for it. Records are never updated; concurrent misses may insert
//! the same key twice, so lookups return the first matching record.
//!
//! # File Store Layout
//!
//! ```text
//! ~/.cache/brickq/queries/
//!   {sha256(dataset \n query)}.json   # CacheRecord
//! ```

use async_trait::async_trait;

use crate::error::QueryResult;
use crate::types::{CacheKey, CacheRecord, ResultTable};

mod file;
mod io;
pub(crate) mod keys;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key-addressable result store.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Find the table stored for `key`.
    ///
    /// Returns `Ok(None)` when nothing is stored; any `Err` is a real store
    /// failure.
    async fn find_one(&self, key: &CacheKey) -> QueryResult<Option<ResultTable>>;

    /// Persist a new record. Must tolerate a record for the same key already existing.
    async fn insert(&self, record: CacheRecord) -> QueryResult<()>;
}
