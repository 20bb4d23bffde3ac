//! In-memory cache storage

use crate::cache::key::RequestKey;
use crate::cache::storage::{CacheEntry, CacheStorage};
use crate::error::OffcacheResult;
use crate::request::Response;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

type Entries = HashMap<RequestKey, CacheEntry>;

/// Process-local store. Namespaces keep creation order.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    namespaces: RwLock<Vec<(String, Entries)>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in a namespace
    pub async fn len(&self, namespace: &str) -> usize {
        self.namespaces
            .read()
            .await
            .iter()
            .find(|(name, _)| name == namespace)
            .map(|(_, entries)| entries.len())
            .unwrap_or(0)
    }
}

fn find_or_create<'a>(namespaces: &'a mut Vec<(String, Entries)>, namespace: &str) -> &'a mut Entries {
    let index = match namespaces.iter().position(|(name, _)| name == namespace) {
        Some(index) => index,
        None => {
            namespaces.push((namespace.to_string(), HashMap::new()));
            namespaces.len() - 1
        }
    };
    &mut namespaces[index].1
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn namespaces(&self) -> OffcacheResult<Vec<String>> {
        Ok(self
            .namespaces
            .read()
            .await
            .iter()
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn open(&self, namespace: &str) -> OffcacheResult<()> {
        let mut namespaces = self.namespaces.write().await;
        find_or_create(&mut namespaces, namespace);
        Ok(())
    }

    async fn delete_namespace(&self, namespace: &str) -> OffcacheResult<bool> {
        let mut namespaces = self.namespaces.write().await;
        let before = namespaces.len();
        namespaces.retain(|(name, _)| name != namespace);
        Ok(namespaces.len() != before)
    }

    async fn put(
        &self,
        namespace: &str,
        key: &RequestKey,
        response: &Response,
    ) -> OffcacheResult<()> {
        let mut namespaces = self.namespaces.write().await;
        find_or_create(&mut namespaces, namespace)
            .insert(key.clone(), CacheEntry::new(key.clone(), response.clone()));
        Ok(())
    }

    async fn get(&self, namespace: &str, key: &RequestKey) -> OffcacheResult<Option<CacheEntry>> {
        Ok(self
            .namespaces
            .read()
            .await
            .iter()
            .find(|(name, _)| name == namespace)
            .and_then(|(_, entries)| entries.get(key).cloned()))
    }

    async fn remove(&self, namespace: &str, key: &RequestKey) -> OffcacheResult<bool> {
        let mut namespaces = self.namespaces.write().await;
        Ok(namespaces
            .iter_mut()
            .find(|(name, _)| name == namespace)
            .map(|(_, entries)| entries.remove(key).is_some())
            .unwrap_or(false))
    }

    async fn keys(&self, namespace: &str) -> OffcacheResult<Vec<RequestKey>> {
        let namespaces = self.namespaces.read().await;
        let mut keys: Vec<RequestKey> = namespaces
            .iter()
            .find(|(name, _)| name == namespace)
            .map(|(_, entries)| entries.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        Ok(keys)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use url::Url;

    fn key(path: &str) -> RequestKey {
        RequestKey::get(&Url::parse("https://site.dev/").unwrap().join(path).unwrap())
    }

    #[tokio::test]
    async fn put_creates_namespace_and_overwrites() {
        let storage = MemoryStorage::new();
        storage
            .put("a", &key("/x"), &Response::new(StatusCode::OK, "one"))
            .await
            .unwrap();
        storage
            .put("a", &key("/x"), &Response::new(StatusCode::OK, "two"))
            .await
            .unwrap();

        assert_eq!(storage.namespaces().await.unwrap(), vec!["a"]);
        let entry = storage.get("a", &key("/x")).await.unwrap().unwrap();
        assert_eq!(&entry.response.body[..], b"two");
        assert_eq!(storage.len("a").await, 1);
    }

    #[tokio::test]
    async fn match_any_searches_in_creation_order() {
        let storage = MemoryStorage::new();
        storage.open("first").await.unwrap();
        storage
            .put("second", &key("/x"), &Response::new(StatusCode::OK, "second"))
            .await
            .unwrap();
        storage
            .put("first", &key("/x"), &Response::new(StatusCode::OK, "first"))
            .await
            .unwrap();

        let (namespace, entry) = storage.match_any(&key("/x")).await.unwrap().unwrap();
        assert_eq!(namespace, "first");
        assert_eq!(&entry.response.body[..], b"first");
        assert!(storage.match_any(&key("/missing")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_and_remove() {
        let storage = MemoryStorage::new();
        storage
            .put("a", &key("/x"), &Response::new(StatusCode::OK, ""))
            .await
            .unwrap();

        assert!(storage.remove("a", &key("/x")).await.unwrap());
        assert!(!storage.remove("a", &key("/x")).await.unwrap());
        assert!(storage.delete_namespace("a").await.unwrap());
        assert!(!storage.delete_namespace("a").await.unwrap());
        assert!(storage.keys("a").await.unwrap().is_empty());
    }
}
