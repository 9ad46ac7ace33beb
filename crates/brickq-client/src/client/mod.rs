//! Cached query client.
//!
//! Flow per call: prefix the body, look the key up, dispatch upstream on a
//! miss, normalize, store. A store error on lookup aborts before the network
//! is touched so that a broken store never masquerades as a miss.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::QueryResult;
use crate::normalize::normalize_slice;
use crate::prefixes::qualify;
use crate::store::{CacheStore, FileStore};
use crate::types::{
    CacheKey, CacheRecord, ClientConfig, InsertFailurePolicy, QueryOutcome, ResultSource,
    ResultTable,
};

mod http;

pub use http::{HttpTransport, Transport, CLIENT_USER_AGENT, SPARQL_RESULTS_JSON};

/// Query client with a result cache in front of the endpoint.
#[derive(Clone)]
pub struct QueryClient {
    transport: Arc<dyn Transport>,
    store: Arc<dyn CacheStore>,
    insert_failure: InsertFailurePolicy,
    inflight: Option<Arc<InflightLocks>>,
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("insert_failure", &self.insert_failure)
            .field("coalesce_inflight", &self.inflight.is_some())
            .finish_non_exhaustive()
    }
}

impl QueryClient {
    /// HTTP transport plus a file store (`config.cache_dir` or the default location).
    pub fn new(config: ClientConfig) -> QueryResult<Self> {
        let store = match &config.cache_dir {
            Some(dir) => FileStore::with_dir(dir),
            None => FileStore::new()?,
        };
        Self::with_store(config, Arc::new(store))
    }

    /// HTTP transport plus a caller-supplied store.
    pub fn with_store(config: ClientConfig, store: Arc<dyn CacheStore>) -> QueryResult<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_parts(Arc::new(transport), store)
            .with_insert_failure(config.insert_failure)
            .with_coalescing(config.coalesce_inflight))
    }

    pub fn from_env() -> QueryResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Assemble a client from an explicit transport and store.
    pub fn with_parts(transport: Arc<dyn Transport>, store: Arc<dyn CacheStore>) -> Self {
        Self {
            transport,
            store,
            insert_failure: InsertFailurePolicy::default(),
            inflight: None,
        }
    }

    pub fn with_insert_failure(mut self, policy: InsertFailurePolicy) -> Self {
        self.insert_failure = policy;
        self
    }

    /// Serialize concurrent misses for the same key so each key is fetched
    /// at most once per client.
    pub fn with_coalescing(mut self, enabled: bool) -> Self {
        self.inflight = enabled.then(|| Arc::new(InflightLocks::default()));
        self
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Run `body` against `dataset`, answering from the cache when possible.
    ///
    /// With [`InsertFailurePolicy::ReturnWithError`] a failed cache insert is
    /// reported in [`QueryOutcome::insert_error`] and the fetched table is
    /// still returned.
    pub async fn query(&self, dataset: &str, body: &str) -> QueryResult<QueryOutcome> {
        let key = CacheKey::new(dataset, qualify(body));

        let Some(inflight) = &self.inflight else {
            return self.lookup_or_fetch(&key).await;
        };

        let lock = inflight.acquire(&key).await;
        let result = {
            let _guard = lock.lock().await;
            self.lookup_or_fetch(&key).await
        };
        inflight.release(&key, &lock).await;
        result
    }

    /// Like [`query`](Self::query) but only returns the rows.
    pub async fn query_table(&self, dataset: &str, body: &str) -> QueryResult<ResultTable> {
        self.query(dataset, body).await.map(|outcome| outcome.table)
    }

    async fn lookup_or_fetch(&self, key: &CacheKey) -> QueryResult<QueryOutcome> {
        if let Some(table) = self.store.find_one(key).await? {
            debug!(dataset = %key.dataset, rows = table.len(), "answered from cache");
            return Ok(QueryOutcome {
                table,
                source: ResultSource::Cache,
                insert_error: None,
            });
        }

        debug!(dataset = %key.dataset, "cache miss");
        let body = self.transport.execute(&key.dataset, &key.query).await?;
        let table = normalize_slice(&body)?;

        let insert_error = match self
            .store
            .insert(CacheRecord::new(key.clone(), table.clone()))
            .await
        {
            Ok(()) => None,
            Err(e) => match self.insert_failure {
                InsertFailurePolicy::Fail => return Err(e),
                InsertFailurePolicy::ReturnWithError => {
                    warn!(dataset = %key.dataset, error = %e, "failed to cache query results");
                    Some(e)
                }
            },
        };

        Ok(QueryOutcome {
            table,
            source: ResultSource::Upstream,
            insert_error,
        })
    }
}

/// Per-key async locks for in-flight misses.
#[derive(Debug, Default)]
struct InflightLocks {
    locks: Mutex<HashMap<CacheKey, Arc<Mutex<()>>>>,
}

impl InflightLocks {
    async fn acquire(&self, key: &CacheKey) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(key.clone()).or_default().clone()
    }

    /// Drop the table entry once no other caller holds the key's lock.
    async fn release(&self, key: &CacheKey, lock: &Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().await;
        // one reference in the table, one held by the caller
        if Arc::strong_count(lock) <= 2 {
            locks.remove(key);
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::error::QueryError;
    use crate::identifier::Identifier;
    use crate::store::MemoryStore;

    const SENSORS: &str = r#"{
        "head": {"vars": ["sensor", "room"]},
        "results": {"bindings": [
            {
                "sensor": {"type": "uri", "value": "http://buildsys.org/ontologies/Brick#Zone_Temperature_Sensor"},
                "room": {"type": "uri", "value": "http://buildsys.org/ontologies/building_example#Room_410"}
            },
            {"sensor": {"type": "uri", "value": "http://buildsys.org/ontologies/Brick#CO2_Sensor"}}
        ]}
    }"#;

    struct StubTransport {
        body: Vec<u8>,
        calls: AtomicUsize,
        delay: Duration,
        last_query: std::sync::Mutex<Option<String>>,
    }

    impl StubTransport {
        fn new(body: &str) -> Self {
            Self {
                body: body.as_bytes().to_vec(),
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
                last_query: std::sync::Mutex::new(None),
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn execute(&self, _dataset: &str, query: &str) -> QueryResult<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_query.lock().unwrap() = Some(query.to_string());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(self.body.clone())
        }
    }

    struct FailingTransport;

    #[async_trait]
    impl Transport for FailingTransport {
        async fn execute(&self, _dataset: &str, _query: &str) -> QueryResult<Vec<u8>> {
            Err(QueryError::Network {
                message: "connection refused".to_string(),
            })
        }
    }

    /// Store whose lookups and inserts can be made to fail independently.
    #[derive(Default)]
    struct FaultyStore {
        inner: MemoryStore,
        fail_lookup: bool,
        fail_insert: bool,
    }

    #[async_trait]
    impl CacheStore for FaultyStore {
        async fn find_one(&self, key: &CacheKey) -> QueryResult<Option<ResultTable>> {
            if self.fail_lookup {
                return Err(QueryError::Store {
                    message: "connection reset".to_string(),
                });
            }
            self.inner.find_one(key).await
        }

        async fn insert(&self, record: CacheRecord) -> QueryResult<()> {
            if self.fail_insert {
                return Err(QueryError::Store {
                    message: "disk full".to_string(),
                });
            }
            self.inner.insert(record).await
        }
    }

    fn build_client(transport: Arc<dyn Transport>, store: Arc<dyn CacheStore>) -> QueryClient {
        QueryClient::with_parts(transport, store)
    }

    #[tokio::test]
    async fn test_second_query_is_served_from_cache() {
        let transport = Arc::new(StubTransport::new(SENSORS));
        let store = Arc::new(MemoryStore::new());
        let client = build_client(transport.clone(), store.clone());
        let body = "SELECT ?sensor ?room WHERE { ?sensor bf:isPointOf ?room }";

        let first = client.query("SodaHall", body).await.unwrap();
        assert_eq!(first.source, ResultSource::Upstream);
        assert!(first.insert_error.is_none());
        assert_eq!(transport.calls(), 1);

        let second = client.query("SodaHall", body).await.unwrap();
        assert!(second.is_cache_hit());
        assert_eq!(transport.calls(), 1);
        assert_eq!(first.table, second.table);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_query_sends_and_stores_prefixed_text() {
        let transport = Arc::new(StubTransport::new(SENSORS));
        let store = Arc::new(MemoryStore::new());
        let client = build_client(transport.clone(), store.clone());
        let body = "SELECT ?s WHERE { ?s a brick:VAV }";

        client.query("RiceHall", body).await.unwrap();

        let sent = transport.last_query.lock().unwrap().clone().unwrap();
        assert_eq!(sent, qualify(body));

        let records = store.records().await;
        assert_eq!(records[0].query, qualify(body));
        assert_eq!(records[0].dataset, "RiceHall");
    }

    #[tokio::test]
    async fn test_query_normalizes_rows() {
        let client = build_client(
            Arc::new(StubTransport::new(SENSORS)),
            Arc::new(MemoryStore::new()),
        );

        let table = client.query_table("SodaHall", "SELECT ...").await.unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.rows()[0][0],
            Identifier::new("http://buildsys.org/ontologies/Brick", "Zone_Temperature_Sensor")
        );
        assert_eq!(table.rows()[1].len(), 1);
    }

    #[tokio::test]
    async fn test_datasets_are_cached_separately() {
        let transport = Arc::new(StubTransport::new(SENSORS));
        let client = build_client(transport.clone(), Arc::new(MemoryStore::new()));

        client.query("SodaHall", "SELECT ?x {}").await.unwrap();
        client.query("Gates", "SELECT ?x {}").await.unwrap();
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_lookup_error_aborts_before_network() {
        let transport = Arc::new(StubTransport::new(SENSORS));
        let store = Arc::new(FaultyStore {
            fail_lookup: true,
            ..Default::default()
        });
        let client = build_client(transport.clone(), store);

        let err = client.query("SodaHall", "SELECT ?x {}").await.unwrap_err();
        assert!(matches!(err, QueryError::Store { .. }));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_corrupted_cache_record_aborts_before_network() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let store = FileStore::with_dir(temp_dir.path());
        let key = CacheKey::new("SodaHall", qualify("SELECT ?x {}"));
        tokio::fs::write(
            crate::store::keys::record_path(store.cache_dir(), &key),
            b"{\"query\": ",
        )
        .await
        .unwrap();

        let transport = Arc::new(StubTransport::new(SENSORS));
        let client = build_client(transport.clone(), Arc::new(store));

        let err = client.query("SodaHall", "SELECT ?x {}").await.unwrap_err();
        assert!(matches!(err, QueryError::Decode { .. }));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_transport_error_is_returned_unchanged() {
        let store = Arc::new(MemoryStore::new());
        let client = build_client(Arc::new(FailingTransport), store.clone());

        let err = client.query("SodaHall", "SELECT ?x {}").await.unwrap_err();
        match err {
            QueryError::Network { message } => assert_eq!(message, "connection refused"),
            other => panic!("expected Network, got {:?}", other),
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_malformed_response_is_not_cached() {
        let transport = Arc::new(StubTransport::new("{\"head\": "));
        let store = Arc::new(MemoryStore::new());
        let client = build_client(transport.clone(), store.clone());

        let err = client.query("SodaHall", "SELECT ?x {}").await.unwrap_err();
        assert!(matches!(err, QueryError::Decode { .. }));
        assert!(store.is_empty().await);

        client.query("SodaHall", "SELECT ?x {}").await.unwrap_err();
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_insert_failure_returns_table_with_error() {
        let store = Arc::new(FaultyStore {
            fail_insert: true,
            ..Default::default()
        });
        let client = build_client(Arc::new(StubTransport::new(SENSORS)), store);

        let outcome = client.query("SodaHall", "SELECT ?x {}").await.unwrap();
        assert_eq!(outcome.table.len(), 2);
        assert!(matches!(
            outcome.insert_error,
            Some(QueryError::Store { .. })
        ));
    }

    #[tokio::test]
    async fn test_insert_failure_policy_fail() {
        let store = Arc::new(FaultyStore {
            fail_insert: true,
            ..Default::default()
        });
        let client = build_client(Arc::new(StubTransport::new(SENSORS)), store)
            .with_insert_failure(InsertFailurePolicy::Fail);

        let err = client.query("SodaHall", "SELECT ?x {}").await.unwrap_err();
        assert!(matches!(err, QueryError::Store { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_misses_without_coalescing_stay_consistent() {
        let transport =
            Arc::new(StubTransport::new(SENSORS).with_delay(Duration::from_millis(50)));
        let store = Arc::new(MemoryStore::new());
        let client = build_client(transport.clone(), store.clone());

        let (a, b) = tokio::join!(
            client.query("SodaHall", "SELECT ?x {}"),
            client.query("SodaHall", "SELECT ?x {}")
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.table, b.table);
        assert_eq!(transport.calls(), 2);
        assert_eq!(store.len().await, 2);

        let third = client.query("SodaHall", "SELECT ?x {}").await.unwrap();
        assert!(third.is_cache_hit());
        assert_eq!(third.table, a.table);
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_coalescing_fetches_once() {
        let transport =
            Arc::new(StubTransport::new(SENSORS).with_delay(Duration::from_millis(50)));
        let store = Arc::new(MemoryStore::new());
        let client = build_client(transport.clone(), store.clone()).with_coalescing(true);

        let (a, b) = tokio::join!(
            client.query("SodaHall", "SELECT ?x {}"),
            client.query("SodaHall", "SELECT ?x {}")
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(transport.calls(), 1);
        assert_eq!(store.len().await, 1);
        assert_eq!(a.table, b.table);
        assert!(a.is_cache_hit() != b.is_cache_hit());

        let inflight = client.inflight.as_ref().unwrap();
        assert_eq!(inflight.len().await, 0);
    }
}
