//! Error types for offcache
//!
//! All modules use `OffcacheResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for offcache operations
pub type OffcacheResult<T> = Result<T, OffcacheError>;

/// All errors that can occur in offcache
#[derive(Error, Debug)]
pub enum OffcacheError {
    // Lifecycle errors
    #[error("Install failed: could not cache {url}: {reason}")]
    InstallFailed { url: String, reason: String },

    #[error("Content refresh failed: could not cache {url}: {reason}")]
    RefreshFailed { url: String, reason: String },

    #[error("Cannot {action} while worker is {from}")]
    InvalidTransition { from: String, action: String },

    #[error("No worker registered in {0}")]
    NotRegistered(PathBuf),

    // Request path errors
    #[error("Network request failed for {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    // Cache storage errors
    #[error("Failed to write cache {namespace}: {reason}")]
    CacheWrite { namespace: String, reason: String },

    #[error("Cache storage error: {0}")]
    Storage(String),

    // Content errors
    #[error("Malformed content at {endpoint}: {reason}")]
    DataShape { endpoint: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl OffcacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a network error for a URL
    pub fn network(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a cache write error for a namespace
    pub fn cache_write(namespace: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CacheWrite {
            namespace: namespace.into(),
            reason: reason.into(),
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InstallFailed { .. }
                | Self::RefreshFailed { .. }
                | Self::Network { .. }
                | Self::CacheWrite { .. }
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::InstallFailed { .. } => {
                Some("Check that the origin is reachable, then run: offcache install")
            }
            Self::RefreshFailed { .. } => {
                Some("Cached content is unchanged; retry: offcache periodic-sync content-update")
            }
            Self::NotRegistered(_) => Some("Run: offcache install"),
            Self::InvalidTransition { .. } => Some("Run: offcache status"),
            Self::ConfigInvalid { .. } => Some("Run: offcache config init --force"),
            _ => None,
        }
    }
}
