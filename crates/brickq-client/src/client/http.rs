//! HTTP layer: request shape and status mapping.
//!
//! This is the ONLY place for status code handling. client/mod.rs never
//! interprets status codes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use tracing::debug;

use crate::error::{QueryError, QueryResult};
use crate::types::ClientConfig;

/// Media type requested from the endpoint.
pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// User agent sent with every request.
pub const CLIENT_USER_AGENT: &str = concat!("brickq-client/", env!("CARGO_PKG_VERSION"));

/// Executes a fully qualified query against a dataset and returns the raw
/// result document.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, dataset: &str, query: &str) -> QueryResult<Vec<u8>>;
}

/// reqwest-backed transport for a Fuseki-style endpoint.
///
/// Issues `GET <endpoint>/<dataset>?query=...`. No retries.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> QueryResult<Self> {
        let base_url = config.endpoint_base().to_string();
        if base_url.is_empty() {
            return Err(QueryError::Config {
                message: "endpoint URL is empty".to_string(),
            });
        }

        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| QueryError::Network {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn dataset_url(&self, dataset: &str) -> String {
        format!("{}/{}", self.base_url, dataset)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, dataset: &str, query: &str) -> QueryResult<Vec<u8>> {
        let url = self.dataset_url(dataset);
        debug!(url = %url, "dispatching query upstream");

        let response = self
            .client
            .get(&url)
            .query(&[("query", query)])
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.is_empty() {
                status.to_string()
            } else {
                body.chars().take(200).collect()
            };
            return Err(QueryError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await.map_err(|e| QueryError::Network {
            message: format!("failed to read response body: {}", e),
        })?;

        Ok(bytes.to_vec())
    }
}
