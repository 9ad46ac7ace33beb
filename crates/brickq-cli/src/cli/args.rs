use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use brickq_client::DEFAULT_DATASET;

#[derive(Parser)]
#[command(
    name = "brickq",
    version,
    about = "Run Brick queries against a SPARQL endpoint with a local result cache"
)]
pub struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a query file or a saved query against a dataset
    Query(QueryArgs),
    /// Browse the saved query catalog
    Catalog(CatalogArgs),
    /// List the datasets the endpoint is known to serve
    Datasets,
    /// Inspect or purge the local result cache
    Cache(CacheArgs),
    Version,
}

#[derive(clap::Args, Debug, Clone)]
pub struct QueryArgs {
    /// Dataset (building) to run on
    #[arg(long = "db", alias = "dataset", default_value = DEFAULT_DATASET)]
    pub dataset: String,

    /// SPARQL query file (body only; prefixes are added)
    #[arg(short = 'q', long, conflicts_with = "saved", required_unless_present = "saved")]
    pub file: Option<PathBuf>,

    /// Name of a saved query from the catalog
    #[arg(long)]
    pub saved: Option<String>,

    /// Print the rows instead of only the row count
    #[arg(long)]
    pub rows: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Render identifiers in known namespaces as CURIEs (text output)
    #[arg(long)]
    pub compact: bool,

    #[command(flatten)]
    pub endpoint: EndpointArgs,

    #[command(flatten)]
    pub cache: CacheLocationArgs,

    /// Skip the file cache and keep results in memory for this run only
    #[arg(long, conflicts_with = "cache_dir")]
    pub no_cache: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct EndpointArgs {
    /// SPARQL endpoint base URL (overrides BRICKQ_ENDPOINT)
    #[arg(short = 'a', long)]
    pub endpoint: Option<String>,

    /// Request timeout in seconds (overrides BRICKQ_TIMEOUT)
    #[arg(long)]
    pub timeout: Option<u64>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct CacheLocationArgs {
    /// Cache directory (overrides BRICKQ_CACHE_DIR)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub cmd: CatalogSub,
}

#[derive(Subcommand, Debug)]
pub enum CatalogSub {
    /// List saved query names
    List {
        /// Emit the full catalog as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the body of a saved query
    Show {
        /// Saved query name (case-insensitive)
        name: String,
    },
}

#[derive(Parser, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub cmd: CacheSub,
}

#[derive(Subcommand, Debug)]
pub enum CacheSub {
    /// List cached entries
    List(CacheLocationArgs),
    /// Remove every cached entry
    Clear(CacheLocationArgs),
}
