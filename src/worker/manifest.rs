//! Assets that must be cached before an install succeeds

use crate::error::OffcacheResult;
use crate::request::resolve_url;
use url::Url;

/// Ordered list of absolute asset URLs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticAssetManifest {
    urls: Vec<Url>,
}

impl StaticAssetManifest {
    pub fn new(urls: Vec<Url>) -> Self {
        Self { urls }
    }

    /// Resolve site-relative entries against the origin
    pub fn resolve<S: AsRef<str>>(base: &Url, entries: &[S]) -> OffcacheResult<Self> {
        let urls = entries
            .iter()
            .map(|entry| resolve_url(base, entry.as_ref()))
            .collect::<OffcacheResult<Vec<_>>>()?;
        Ok(Self { urls })
    }

    pub fn urls(&self) -> &[Url] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
