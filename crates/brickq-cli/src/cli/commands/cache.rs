//! `brickq cache`: inspect or purge the file cache.

use anyhow::Result;
use brickq_client::{FileStore, PREFIX_BLOCK};

use super::super::args::{CacheArgs, CacheLocationArgs, CacheSub};
use super::resolve_config;
use crate::exit_codes::EXIT_SUCCESS;

fn open_store(location: &CacheLocationArgs) -> Result<FileStore> {
    let config = resolve_config(None, location)?;
    Ok(match config.cache_dir {
        Some(dir) => FileStore::with_dir(dir),
        None => FileStore::new()?,
    })
}

pub async fn run(args: CacheArgs) -> Result<i32> {
    match args.cmd {
        CacheSub::List(location) => {
            let store = open_store(&location)?;
            for record in store.list().await? {
                let body = record
                    .query
                    .strip_prefix(PREFIX_BLOCK)
                    .unwrap_or(&record.query);
                let summary = body.lines().next().unwrap_or_default();
                println!(
                    "{}\t{}\t{} rows\t{}",
                    record.stored_at.to_rfc3339(),
                    record.dataset,
                    record.results.len(),
                    summary
                );
            }
            Ok(EXIT_SUCCESS)
        }
        CacheSub::Clear(location) => {
            let store = open_store(&location)?;
            store.clear().await?;
            tracing::info!(dir = %store.cache_dir().display(), "cache cleared");
            Ok(EXIT_SUCCESS)
        }
    }
}
