//! Routing policy: which requests the cache layer handles, and where
//! their responses are stored

use crate::cache::Pool;
use crate::config::Config;
use crate::error::{OffcacheError, OffcacheResult};
use crate::request::Request;
use http::Method;
use url::Url;

/// Why a request bypasses the cache layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bypass {
    /// Only GET is intercepted
    Method,
    /// Cross-origin and not on the host allow-list
    CrossOrigin,
}

/// Routing decision for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Intercept,
    PassThrough(Bypass),
}

/// Allow-lists driving request routing
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    origin: Url,
    allowed_hosts: Vec<String>,
    static_extensions: Vec<String>,
}

impl RoutePolicy {
    pub fn new(origin: Url, allowed_hosts: Vec<String>, static_extensions: Vec<String>) -> Self {
        Self {
            origin,
            allowed_hosts: allowed_hosts
                .into_iter()
                .map(|h| h.trim_start_matches('.').to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
            static_extensions: static_extensions
                .into_iter()
                .map(|e| e.to_ascii_lowercase())
                .collect(),
        }
    }

    /// Build from the `origin` and `cache` config sections
    pub fn from_config(config: &Config) -> OffcacheResult<Self> {
        let origin = Url::parse(&config.origin.base_url).map_err(|e| OffcacheError::InvalidUrl {
            url: config.origin.base_url.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self::new(
            origin,
            config.origin.allowed_hosts.clone(),
            config.cache.static_extensions.clone(),
        ))
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn route(&self, request: &Request) -> Route {
        if request.method != Method::GET {
            return Route::PassThrough(Bypass::Method);
        }
        if !self.is_same_origin(&request.url) && !self.is_allowed_host(&request.url) {
            return Route::PassThrough(Bypass::CrossOrigin);
        }
        Route::Intercept
    }

    pub fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.origin.origin()
    }

    /// Host equals an allow-list entry or is a subdomain of one
    pub fn is_allowed_host(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        self.allowed_hosts.iter().any(|allowed| {
            host == *allowed
                || host
                    .strip_suffix(allowed.as_str())
                    .is_some_and(|rest| rest.ends_with('.'))
        })
    }

    /// Pool that a successful runtime fetch of `url` is stored in
    pub fn pool_for(&self, url: &Url) -> Pool {
        let path = url.path().to_ascii_lowercase();
        if self
            .static_extensions
            .iter()
            .any(|ext| path.ends_with(ext.as_str()))
        {
            Pool::Static
        } else {
            Pool::Dynamic
        }
    }
}
