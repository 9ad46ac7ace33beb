//! Result, cache and configuration types.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::identifier::Identifier;

/// One result row, one identifier per bound variable in header order.
pub type Row = Vec<Identifier>;

/// Ordered table of normalized query results.
///
/// Rows may be shorter than the variable count when a trailing binding is
/// missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultTable {
    rows: Vec<Row>,
}

impl ResultTable {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub(crate) fn push(&mut self, row: Row) {
        self.rows.push(row);
    }
}

impl From<Vec<Row>> for ResultTable {
    fn from(rows: Vec<Row>) -> Self {
        Self::new(rows)
    }
}

impl<'a> IntoIterator for &'a ResultTable {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Cache address: dataset plus the fully prefixed query text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// Dataset (building) name on the endpoint.
    pub dataset: String,

    /// Query text exactly as sent upstream.
    pub query: String,
}

impl CacheKey {
    pub fn new(dataset: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            query: query.into(),
        }
    }
}

/// Persisted unit of the cache. Written once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Fully prefixed query text.
    pub query: String,

    /// Dataset name.
    #[serde(rename = "building")]
    pub dataset: String,

    /// Normalized table computed for this key.
    pub results: ResultTable,

    /// When the record was written.
    pub stored_at: DateTime<Utc>,
}

impl CacheRecord {
    pub fn new(key: CacheKey, results: ResultTable) -> Self {
        Self {
            query: key.query,
            dataset: key.dataset,
            results,
            stored_at: Utc::now(),
        }
    }

    pub fn matches(&self, key: &CacheKey) -> bool {
        self.dataset == key.dataset && self.query == key.query
    }

    pub fn key(&self) -> CacheKey {
        CacheKey::new(&self.dataset, &self.query)
    }
}

/// Where a returned table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    Cache,
    Upstream,
}

/// Outcome of a query.
#[derive(Debug)]
pub struct QueryOutcome {
    /// Normalized results.
    pub table: ResultTable,

    /// Whether the endpoint was contacted.
    pub source: ResultSource,

    /// Cache population failure, when the table was fetched but could not be stored.
    pub insert_error: Option<QueryError>,
}

impl QueryOutcome {
    pub fn is_cache_hit(&self) -> bool {
        self.source == ResultSource::Cache
    }
}

/// What to do when the cache insert fails after a successful fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertFailurePolicy {
    /// Return the fetched table together with the insert error.
    #[default]
    ReturnWithError,

    /// Fail the whole query.
    Fail,
}

impl FromStr for InsertFailurePolicy {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "return" | "return_with_error" => Ok(Self::ReturnWithError),
            "fail" => Ok(Self::Fail),
            other => Err(QueryError::Config {
                message: format!("unknown insert failure policy: {}", other),
            }),
        }
    }
}

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the SPARQL endpoint (datasets are addressed below it).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Directory for the file-backed cache store.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Behavior when a cache insert fails.
    #[serde(default)]
    pub insert_failure: InsertFailurePolicy,

    /// Serialize concurrent misses for the same key inside this process.
    #[serde(default)]
    pub coalesce_inflight: bool,
}

fn default_endpoint() -> String {
    "http://localhost:80".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout(),
            cache_dir: None,
            insert_failure: InsertFailurePolicy::default(),
            coalesce_inflight: false,
        }
    }
}

impl ClientConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `BRICKQ_ENDPOINT` | Endpoint base URL |
    /// | `BRICKQ_TIMEOUT` | Request timeout in seconds |
    /// | `BRICKQ_CACHE_DIR` | File cache directory |
    /// | `BRICKQ_INSERT_FAILURE` | `return` or `fail` |
    /// | `BRICKQ_COALESCE` | Coalesce concurrent misses (`1`/`true`) |
    ///
    /// Unparseable values fall back to the defaults, except the insert failure
    /// policy, which is rejected.
    pub fn from_env() -> Result<Self, QueryError> {
        let insert_failure = match std::env::var("BRICKQ_INSERT_FAILURE") {
            Ok(v) => v.parse()?,
            Err(_) => InsertFailurePolicy::default(),
        };

        Ok(Self {
            endpoint: std::env::var("BRICKQ_ENDPOINT").unwrap_or_else(|_| default_endpoint()),
            timeout_secs: std::env::var("BRICKQ_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_timeout),
            cache_dir: std::env::var_os("BRICKQ_CACHE_DIR").map(PathBuf::from),
            insert_failure,
            coalesce_inflight: std::env::var("BRICKQ_COALESCE")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }

    /// Set the endpoint base URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the cache directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn with_insert_failure(mut self, policy: InsertFailurePolicy) -> Self {
        self.insert_failure = policy;
        self
    }

    pub fn with_coalesce_inflight(mut self, enabled: bool) -> Self {
        self.coalesce_inflight = enabled;
        self
    }

    /// Endpoint with trailing slashes removed.
    pub fn endpoint_base(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }
}
