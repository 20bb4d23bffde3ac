//! Normalized request keys

use http::Method;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use url::Url;

/// Cache key for a request: `METHOD URL`, fragment removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestKey(String);

impl RequestKey {
    pub fn new(method: &Method, url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        Self(format!("{} {}", method.as_str().to_ascii_uppercase(), url))
    }

    /// Key for a GET of `url`
    pub fn get(url: &Url) -> Self {
        Self::new(&Method::GET, url)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The method part of the key
    pub fn method(&self) -> &str {
        self.0.split_once(' ').map(|(m, _)| m).unwrap_or("")
    }

    /// The URL part of the key
    pub fn url(&self) -> &str {
        self.0.split_once(' ').map(|(_, u)| u).unwrap_or("")
    }

    /// Hex SHA256 of the key, safe to use as a file name
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.0.as_bytes()))
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fragment() {
        let a = RequestKey::get(&Url::parse("https://site.dev/index.html#about").unwrap());
        let b = RequestKey::get(&Url::parse("https://site.dev/index.html").unwrap());
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "GET https://site.dev/index.html");
    }

    #[test]
    fn method_distinguishes_keys() {
        let url = Url::parse("https://site.dev/api").unwrap();
        let get = RequestKey::new(&Method::GET, &url);
        let head = RequestKey::new(&Method::HEAD, &url);
        assert_ne!(get, head);
        assert_eq!(head.method(), "HEAD");
        assert_eq!(head.url(), "https://site.dev/api");
    }

    #[test]
    fn digest_is_stable_hex() {
        let key = RequestKey::get(&Url::parse("https://site.dev/").unwrap());
        let digest = key.digest();
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, key.digest());
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
