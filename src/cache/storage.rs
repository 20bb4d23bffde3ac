//! Cache storage abstraction
//!
//! A store holds named namespaces, each mapping request keys to response
//! snapshots. Implementations must make every single-key write and every
//! namespace deletion atomic; the manager relies on nothing stronger.

use crate::cache::key::RequestKey;
use crate::error::OffcacheResult;
use crate::request::Response;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A stored response
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: RequestKey,
    pub response: Response,
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(key: RequestKey, response: Response) -> Self {
        Self {
            key,
            response,
            stored_at: Utc::now(),
        }
    }
}

/// Namespaced request/response store
///
/// Backends:
/// - `MemoryStorage`: process-local, used by tests and embedders
/// - `DiskStorage`: directory per namespace, used by the CLI
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Names of all namespaces, in creation order where the backend knows it
    async fn namespaces(&self) -> OffcacheResult<Vec<String>>;

    /// Create a namespace if it does not exist
    async fn open(&self, namespace: &str) -> OffcacheResult<()>;

    /// Delete a namespace and all its entries. Returns whether it existed.
    async fn delete_namespace(&self, namespace: &str) -> OffcacheResult<bool>;

    /// Store a response, replacing any previous entry for the key.
    /// Creates the namespace if needed.
    async fn put(&self, namespace: &str, key: &RequestKey, response: &Response)
        -> OffcacheResult<()>;

    /// Look up a key in one namespace
    async fn get(&self, namespace: &str, key: &RequestKey) -> OffcacheResult<Option<CacheEntry>>;

    /// Remove a single entry. Returns whether it existed.
    async fn remove(&self, namespace: &str, key: &RequestKey) -> OffcacheResult<bool>;

    /// Keys stored in a namespace (empty if it does not exist)
    async fn keys(&self, namespace: &str) -> OffcacheResult<Vec<RequestKey>>;

    /// Look up a key across every namespace, first match wins
    async fn match_any(&self, key: &RequestKey) -> OffcacheResult<Option<(String, CacheEntry)>> {
        for namespace in self.namespaces().await? {
            if let Some(entry) = self.get(&namespace, key).await? {
                return Ok(Some((namespace, entry)));
            }
        }
        Ok(None)
    }

    /// Human-readable backend name for display
    fn backend_name(&self) -> &'static str;
}
