//! Network access
//!
//! The manager never talks to the network directly; it goes through a
//! `Fetcher` so hosts and tests can supply their own transport.

use crate::error::{OffcacheError, OffcacheResult};
use crate::request::{Request, Response};
use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use std::time::Duration;
use tracing::debug;

/// Performs requests against the network
///
/// Non-2xx responses are successful fetches; only transport failures
/// (offline, DNS, TLS, timeouts) are errors.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &Request) -> OffcacheResult<Response>;
}

/// HTTP fetcher on a blocking `ureq` agent, run on the tokio blocking pool
#[derive(Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    /// Create a fetcher. A zero timeout disables the request timeout.
    pub fn new(timeout_secs: u64) -> Self {
        let timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build();
        Self {
            agent: config.into(),
        }
    }

    fn fetch_blocking(agent: &ureq::Agent, method: &Method, url: &str) -> OffcacheResult<Response> {
        let result = if *method == Method::GET {
            agent.get(url).call()
        } else if *method == Method::HEAD {
            agent.head(url).call()
        } else {
            let request = http::Request::builder()
                .method(method.clone())
                .uri(url)
                .body(Vec::<u8>::new())
                .map_err(|e| OffcacheError::network(url, e.to_string()))?;
            agent.run(request)
        };

        let mut response = result.map_err(|e| OffcacheError::network(url, e.to_string()))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| OffcacheError::network(url, e.to_string()))?;

        Ok(Response {
            status,
            headers,
            body: Bytes::from(body),
        })
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(30)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> OffcacheResult<Response> {
        let agent = self.agent.clone();
        let method = request.method.clone();
        let url = request.url.to_string();

        debug!("{} {}", method, url);
        let task_url = url.clone();
        tokio::task::spawn_blocking(move || Self::fetch_blocking(&agent, &method, &task_url))
            .await
            .map_err(|e| OffcacheError::network(url, format!("fetch task failed: {}", e)))?
    }
}
