use super::args::*;

pub mod cache;
pub mod catalog;
pub mod query;

use brickq_client::{ClientConfig, DATASETS};

use crate::exit_codes::EXIT_SUCCESS;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Query(args) => query::run(args).await,
        Command::Catalog(args) => catalog::run(args),
        Command::Datasets => {
            for dataset in DATASETS {
                println!("{}", dataset);
            }
            Ok(EXIT_SUCCESS)
        }
        Command::Cache(args) => cache::run(args).await,
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(EXIT_SUCCESS)
        }
    }
}

/// Environment config with command-line overrides applied.
pub(crate) fn resolve_config(
    endpoint: Option<&EndpointArgs>,
    cache: &CacheLocationArgs,
) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::from_env()?;

    if let Some(endpoint) = endpoint {
        if let Some(url) = &endpoint.endpoint {
            config = config.with_endpoint(url);
        }
        if let Some(secs) = endpoint.timeout {
            config = config.with_timeout_secs(secs);
        }
    }
    if let Some(dir) = &cache.cache_dir {
        config = config.with_cache_dir(dir);
    }

    Ok(config)
}
