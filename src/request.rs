//! Requests and response snapshots passed between the host, the cache and the network

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, Method, StatusCode};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::cache::RequestKey;
use crate::error::{OffcacheError, OffcacheResult};

/// What the requesting client intends to do with the response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Destination {
    /// Top-level navigation
    Document,
    Image,
    Script,
    Style,
    Font,
    Manifest,
    /// fetch()/XHR and anything else
    #[default]
    Other,
}

impl Destination {
    /// Guess the destination of a plain URL from its path.
    ///
    /// Hosts that know the real destination should set it explicitly.
    pub fn infer(url: &Url) -> Self {
        let path = url.path().to_ascii_lowercase();
        if path.ends_with('/') || path.ends_with(".html") || path.ends_with(".htm") {
            return Self::Document;
        }
        match path.rsplit_once('.').map(|(_, ext)| ext) {
            Some("png" | "jpg" | "jpeg" | "webp" | "avif" | "gif" | "svg" | "ico") => Self::Image,
            Some("js" | "mjs") => Self::Script,
            Some("css") => Self::Style,
            Some("woff" | "woff2" | "ttf" | "otf") => Self::Font,
            Some("webmanifest") => Self::Manifest,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Image => "image",
            Self::Script => "script",
            Self::Style => "style",
            Self::Font => "font",
            Self::Manifest => "manifest",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Destination {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "document" => Ok(Self::Document),
            "image" => Ok(Self::Image),
            "script" => Ok(Self::Script),
            "style" => Ok(Self::Style),
            "font" => Ok(Self::Font),
            "manifest" => Ok(Self::Manifest),
            "other" | "" => Ok(Self::Other),
            other => Err(format!("unknown destination '{}'", other)),
        }
    }
}

/// An intercepted request
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub destination: Destination,
}

impl Request {
    /// GET request with the destination inferred from the URL
    pub fn get(url: Url) -> Self {
        let destination = Destination::infer(&url);
        Self {
            method: Method::GET,
            url,
            destination,
        }
    }

    /// Parse and resolve `target` against `base`, producing a GET request
    pub fn resolve(base: &Url, target: &str) -> OffcacheResult<Self> {
        Ok(Self::get(resolve_url(base, target)?))
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    /// Normalized cache key for this request
    pub fn key(&self) -> RequestKey {
        RequestKey::new(&self.method, &self.url)
    }
}

/// Resolve an absolute or site-relative URL
pub fn resolve_url(base: &Url, target: &str) -> OffcacheResult<Url> {
    base.join(target).map_err(|e| OffcacheError::InvalidUrl {
        url: target.to_string(),
        reason: e.to_string(),
    })
}

/// A response snapshot: status, headers and the full body
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// 200 response with a content type
    pub fn with_content_type(content_type: &'static str, body: impl Into<Bytes>) -> Self {
        let mut response = Self::new(StatusCode::OK, body);
        response
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        response
    }

    /// Whether the status is in the 2xx range
    pub fn is_ok(&self) -> bool {
        self.status.is_success()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }
}
