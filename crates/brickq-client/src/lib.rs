//! Cached SPARQL query client.
//!
//! This crate sits in front of a Fuseki-style SPARQL endpoint and provides:
//!
//! - Namespace prefix injection for Brick queries
//! - A result cache keyed by dataset and full query text
//! - Upstream dispatch on cache miss
//! - Normalization of SPARQL JSON results into typed identifier rows
//!
//! # Quick Start
//!
//! ```no_run
//! use brickq_client::{ClientConfig, QueryClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = QueryClient::new(ClientConfig::default().with_endpoint("http://localhost:3030"))?;
//!
//! let outcome = client
//!     .query("SodaHall", "SELECT ?vav WHERE { ?vav rdf:type brick:VAV }")
//!     .await?;
//! for row in &outcome.table {
//!     println!("{:?}", row);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Caching
//!
//! Entries are permanent: nothing here expires or updates them. Cosmetically
//! different queries (whitespace, variable names) are distinct entries.
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `BRICKQ_ENDPOINT` | Endpoint base URL (default: `http://localhost:80`) |
//! | `BRICKQ_TIMEOUT` | Request timeout in seconds (default: 30) |
//! | `BRICKQ_CACHE_DIR` | File cache directory |
//! | `BRICKQ_INSERT_FAILURE` | `return` (default) or `fail` |
//! | `BRICKQ_COALESCE` | Coalesce concurrent misses per key |

pub mod catalog;
pub mod client;
pub mod error;
pub mod identifier;
pub mod normalize;
pub mod prefixes;
pub mod store;
pub mod types;

// Re-export main types
pub use catalog::{SavedQuery, DATASETS, DEFAULT_DATASET, SAVED_QUERIES};
pub use client::{HttpTransport, QueryClient, Transport, CLIENT_USER_AGENT, SPARQL_RESULTS_JSON};
pub use error::{QueryError, QueryResult};
pub use identifier::Identifier;
pub use normalize::{normalize, normalize_slice};
pub use prefixes::{qualify, PREFIX_BLOCK};
pub use store::{CacheStore, FileStore, MemoryStore};
pub use types::{
    CacheKey, CacheRecord, ClientConfig, InsertFailurePolicy, QueryOutcome, ResultSource,
    ResultTable, Row,
};
