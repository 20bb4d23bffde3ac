//! Network-to-cache transfer shared by install, fetch handling and
//! background refreshes

use crate::cache::{CacheEntry, CacheStorage, NamespaceSet, RequestKey};
use crate::error::{OffcacheError, OffcacheResult};
use crate::fetch::Fetcher;
use crate::policy::RoutePolicy;
use crate::request::{Request, Response};
use futures_util::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// What a `store_all` call is doing, for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Batch {
    Install,
    ContentRefresh,
}

impl Batch {
    fn error(self, url: &str, reason: String) -> OffcacheError {
        let url = url.to_string();
        match self {
            Self::Install => OffcacheError::InstallFailed { url, reason },
            Self::ContentRefresh => OffcacheError::RefreshFailed { url, reason },
        }
    }
}

/// Cloneable handle used both on the request path and by detached tasks
#[derive(Clone)]
pub(crate) struct Replenisher {
    pub(crate) storage: Arc<dyn CacheStorage>,
    pub(crate) fetcher: Arc<dyn Fetcher>,
    pub(crate) policy: Arc<RoutePolicy>,
    pub(crate) namespaces: NamespaceSet,
}

impl Replenisher {
    /// Fetch from the network and, on a 2xx response, store a copy in the
    /// pool chosen by the routing policy. Cache write failures are logged
    /// and never fail the returned response.
    pub(crate) async fn fetch_and_cache(&self, request: &Request) -> OffcacheResult<Response> {
        let response = self.fetcher.fetch(request).await?;
        if !response.is_ok() {
            debug!("Not caching {} ({})", request.url, response.status);
            return Ok(response);
        }

        let namespace = self.namespaces.name(self.policy.pool_for(&request.url));
        if let Err(e) = self.storage.put(namespace, &request.key(), &response).await {
            let e = OffcacheError::cache_write(namespace, e.to_string());
            warn!("Failed to cache {}: {}", request.url, e);
        }

        Ok(response)
    }

    /// Refetch `request` and replace the entry in `namespace` on a 2xx
    /// response. Used for revalidation, where the copy being served must be
    /// the one replaced.
    pub(crate) async fn refresh(&self, request: &Request, namespace: &str) -> OffcacheResult<Response> {
        let response = self.fetcher.fetch(request).await?;
        if response.is_ok() {
            if let Err(e) = self.storage.put(namespace, &request.key(), &response).await {
                warn!("Failed to refresh {} in {}: {}", request.url, namespace, e);
            }
        }
        Ok(response)
    }

    /// Entry for `key`, preferring the dynamic namespace (refreshed content)
    /// over the static one, then any other namespace. A namespace that fails
    /// to read counts as a miss.
    pub(crate) async fn lookup(&self, key: &RequestKey) -> OffcacheResult<Option<(String, CacheEntry)>> {
        let searched = [
            self.namespaces.dynamic_name().to_string(),
            self.namespaces.static_name().to_string(),
        ];
        for namespace in &searched {
            if let Some(entry) = self.get_or_miss(namespace, key).await {
                return Ok(Some((namespace.clone(), entry)));
            }
        }

        for namespace in self.storage.namespaces().await? {
            if searched.contains(&namespace) {
                continue;
            }
            if let Some(entry) = self.get_or_miss(&namespace, key).await {
                return Ok(Some((namespace, entry)));
            }
        }
        Ok(None)
    }

    async fn get_or_miss(&self, namespace: &str, key: &RequestKey) -> Option<CacheEntry> {
        match self.storage.get(namespace, key).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry {} in {}: {}", key, namespace, e);
                None
            }
        }
    }

    /// Fetch every URL, then store all responses in `namespace`.
    ///
    /// Nothing is written unless every fetch returned 2xx. If a write fails
    /// part-way, every key this call touched is put back the way it was:
    /// the previous entry is restored, or the key removed if it had none.
    pub(crate) async fn store_all(
        &self,
        batch: Batch,
        namespace: &str,
        urls: &[Url],
        on_fetched: &(dyn Fn(&Url) + Send + Sync),
    ) -> OffcacheResult<usize> {
        let fetches = urls.iter().map(|url| async move {
            let request = Request::get(url.clone());
            let response = self
                .fetcher
                .fetch(&request)
                .await
                .map_err(|e| batch.error(url.as_str(), e.to_string()))?;
            if !response.is_ok() {
                return Err(batch.error(url.as_str(), format!("HTTP {}", response.status)));
            }
            on_fetched(url);
            Ok((request.key(), response))
        });

        let responses = try_join_all(fetches).await?;

        let mut written: Vec<(&RequestKey, Option<CacheEntry>)> = Vec::with_capacity(responses.len());
        for (key, response) in &responses {
            let previous = match self.storage.get(namespace, key).await {
                Ok(previous) => previous,
                Err(e) => {
                    warn!("Could not read {} in {} before overwriting: {}", key, namespace, e);
                    None
                }
            };
            if let Err(e) = self.storage.put(namespace, key, response).await {
                self.rollback(namespace, written).await;
                let e = OffcacheError::cache_write(namespace, e.to_string());
                return Err(batch.error(key.url(), e.to_string()));
            }
            written.push((key, previous));
        }

        Ok(written.len())
    }

    async fn rollback(&self, namespace: &str, written: Vec<(&RequestKey, Option<CacheEntry>)>) {
        for (key, previous) in written.into_iter().rev() {
            let restored = match previous {
                Some(entry) => self.storage.put(namespace, key, &entry.response).await,
                None => self.storage.remove(namespace, key).await.map(|_| ()),
            };
            if let Err(e) = restored {
                warn!("Failed to roll back {} in {}: {}", key, namespace, e);
            }
        }
    }
}
