//! Directory-backed cache storage
//!
//! Layout under the store root:
//!
//! ```text
//! namespaces/
//!   xenon-static-v1.0.0/
//!     <sha256(key)>.entry    JSON metadata line, '\n', raw body
//!   xenon-dynamic-v1.0.0/
//! ```
//!
//! Entries are written to a temp file and renamed into place. Namespaces are
//! renamed aside before removal so readers never see a half-deleted one.

use crate::cache::key::RequestKey;
use crate::cache::storage::{CacheEntry, CacheStorage};
use crate::error::{OffcacheError, OffcacheResult};
use crate::request::Response;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

const ENTRY_EXT: &str = "entry";

/// Metadata stored ahead of the body in each entry file
#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
    key: RequestKey,
    status: u16,
    headers: Vec<(String, String)>,
    stored_at: DateTime<Utc>,
}

/// Store rooted at a directory
#[derive(Debug, Clone)]
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn namespaces_dir(&self) -> PathBuf {
        self.root.join("namespaces")
    }

    fn namespace_dir(&self, namespace: &str) -> OffcacheResult<PathBuf> {
        validate_namespace(namespace)?;
        Ok(self.namespaces_dir().join(namespace))
    }

    fn entry_path(&self, namespace: &str, key: &RequestKey) -> OffcacheResult<PathBuf> {
        Ok(self
            .namespace_dir(namespace)?
            .join(format!("{}.{}", key.digest(), ENTRY_EXT)))
    }
}

fn validate_namespace(namespace: &str) -> OffcacheResult<()> {
    if namespace.is_empty()
        || namespace.starts_with('.')
        || namespace.contains(['/', '\\'])
        || namespace.contains("..")
    {
        return Err(OffcacheError::Storage(format!(
            "Invalid namespace name '{}'",
            namespace
        )));
    }
    Ok(())
}

fn encode_entry(key: &RequestKey, response: &Response) -> OffcacheResult<Vec<u8>> {
    let meta = EntryMeta {
        key: key.clone(),
        status: response.status.as_u16(),
        headers: response
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect(),
        stored_at: Utc::now(),
    };

    let mut buf = serde_json::to_vec(&meta)?;
    buf.push(b'\n');
    buf.extend_from_slice(&response.body);
    Ok(buf)
}

fn decode_entry(path: &Path, data: Vec<u8>) -> OffcacheResult<CacheEntry> {
    let corrupt = |reason: String| {
        OffcacheError::Storage(format!("Corrupt cache entry {}: {}", path.display(), reason))
    };

    let split = data
        .iter()
        .position(|b| *b == b'\n')
        .ok_or_else(|| corrupt("missing metadata line".to_string()))?;
    let meta: EntryMeta =
        serde_json::from_slice(&data[..split]).map_err(|e| corrupt(e.to_string()))?;

    let status = StatusCode::from_u16(meta.status).map_err(|e| corrupt(e.to_string()))?;
    let mut headers = HeaderMap::new();
    for (name, value) in meta.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            headers.append(name, value);
        }
    }

    let body = Bytes::copy_from_slice(&data[split + 1..]);
    Ok(CacheEntry {
        key: meta.key,
        response: Response {
            status,
            headers,
            body,
        },
        stored_at: meta.stored_at,
    })
}

#[async_trait]
impl CacheStorage for DiskStorage {
    async fn namespaces(&self) -> OffcacheResult<Vec<String>> {
        let dir = self.namespaces_dir();
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(OffcacheError::io(format!("reading {}", dir.display()), e)),
        };

        let mut names = vec![];
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| OffcacheError::io("reading namespace entry", e))?
        {
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            if let Some(name) = entry.file_name().to_str() {
                if is_dir && !name.starts_with('.') {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }

    async fn open(&self, namespace: &str) -> OffcacheResult<()> {
        let dir = self.namespace_dir(namespace)?;
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| OffcacheError::io(format!("creating {}", dir.display()), e))
    }

    async fn delete_namespace(&self, namespace: &str) -> OffcacheResult<bool> {
        let dir = self.namespace_dir(namespace)?;
        let trash = self
            .namespaces_dir()
            .join(format!(".trash-{}-{}", namespace, Uuid::new_v4()));

        match fs::rename(&dir, &trash).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(OffcacheError::io(format!("deleting {}", dir.display()), e)),
        }

        fs::remove_dir_all(&trash)
            .await
            .map_err(|e| OffcacheError::io(format!("removing {}", trash.display()), e))?;
        debug!("Deleted namespace directory {}", dir.display());
        Ok(true)
    }

    async fn put(
        &self,
        namespace: &str,
        key: &RequestKey,
        response: &Response,
    ) -> OffcacheResult<()> {
        self.open(namespace).await?;

        let path = self.entry_path(namespace, key)?;
        let tmp = path.with_extension(format!("{}.tmp", Uuid::new_v4()));
        let data = encode_entry(key, response)?;

        fs::write(&tmp, data)
            .await
            .map_err(|e| OffcacheError::io(format!("writing {}", tmp.display()), e))?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(OffcacheError::io(format!("writing {}", path.display()), e));
        }
        Ok(())
    }

    async fn get(&self, namespace: &str, key: &RequestKey) -> OffcacheResult<Option<CacheEntry>> {
        let path = self.entry_path(namespace, key)?;
        let data = match fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(OffcacheError::io(format!("reading {}", path.display()), e)),
        };

        decode_entry(&path, data).map(Some)
    }

    async fn remove(&self, namespace: &str, key: &RequestKey) -> OffcacheResult<bool> {
        let path = self.entry_path(namespace, key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(OffcacheError::io(format!("removing {}", path.display()), e)),
        }
    }

    async fn keys(&self, namespace: &str) -> OffcacheResult<Vec<RequestKey>> {
        let dir = self.namespace_dir(namespace)?;
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(OffcacheError::io(format!("reading {}", dir.display()), e)),
        };

        let mut keys = vec![];
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| OffcacheError::io("reading cache entry", e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == ENTRY_EXT) {
                // Entries that fail to parse are skipped; a later put replaces them
                if let Ok(data) = fs::read(&path).await {
                    if let Ok(entry) = decode_entry(&path, data) {
                        keys.push(entry.key);
                    }
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    fn backend_name(&self) -> &'static str {
        "disk"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::CONTENT_TYPE;
    use tempfile::TempDir;
    use url::Url;

    fn key(path: &str) -> RequestKey {
        RequestKey::get(&Url::parse("https://site.dev/").unwrap().join(path).unwrap())
    }

    #[tokio::test]
    async fn put_and_get_preserve_snapshot() {
        let temp = TempDir::new().unwrap();
        let storage = DiskStorage::new(temp.path());

        let mut response = Response::new(StatusCode::OK, &b"body\nwith newline\0"[..]);
        response
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("text/css"));
        storage
            .put("xenon-static-v1.0.0", &key("/style.css"), &response)
            .await
            .unwrap();

        let entry = storage
            .get("xenon-static-v1.0.0", &key("/style.css"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.key, key("/style.css"));
        assert_eq!(entry.response.status, StatusCode::OK);
        assert_eq!(entry.response.content_type(), Some("text/css"));
        assert_eq!(&entry.response.body[..], b"body\nwith newline\0");
    }

    #[tokio::test]
    async fn lists_namespaces_and_keys() {
        let temp = TempDir::new().unwrap();
        let storage = DiskStorage::new(temp.path());

        assert!(storage.namespaces().await.unwrap().is_empty());

        storage.open("b-static-v1.0.0").await.unwrap();
        storage
            .put("a-dynamic-v1.0.0", &key("/x"), &Response::new(StatusCode::OK, "x"))
            .await
            .unwrap();

        assert_eq!(
            storage.namespaces().await.unwrap(),
            vec!["a-dynamic-v1.0.0", "b-static-v1.0.0"]
        );
        assert_eq!(storage.keys("a-dynamic-v1.0.0").await.unwrap(), vec![key("/x")]);
        assert!(storage.keys("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_namespace_removes_entries() {
        let temp = TempDir::new().unwrap();
        let storage = DiskStorage::new(temp.path());
        storage
            .put("old-static-v1.0.0", &key("/x"), &Response::new(StatusCode::OK, "x"))
            .await
            .unwrap();

        assert!(storage.delete_namespace("old-static-v1.0.0").await.unwrap());
        assert!(!storage.delete_namespace("old-static-v1.0.0").await.unwrap());
        assert!(storage.namespaces().await.unwrap().is_empty());
        assert!(storage
            .get("old-static-v1.0.0", &key("/x"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn rejects_path_like_namespaces() {
        let temp = TempDir::new().unwrap();
        let storage = DiskStorage::new(temp.path());
        assert!(storage.open("../escape").await.is_err());
        assert!(storage.open(".hidden").await.is_err());
        assert!(storage.open("").await.is_err());
    }

    #[tokio::test]
    async fn remove_entry() {
        let temp = TempDir::new().unwrap();
        let storage = DiskStorage::new(temp.path());
        storage
            .put("ns", &key("/x"), &Response::new(StatusCode::OK, "x"))
            .await
            .unwrap();

        assert!(storage.remove("ns", &key("/x")).await.unwrap());
        assert!(!storage.remove("ns", &key("/x")).await.unwrap());
    }
}
