//! Configuration schema for offcache
//!
//! Configuration is stored at `~/.config/offcache/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Site origin and third-party hosts
    pub origin: OriginConfig,

    /// Cache naming and routing
    pub cache: CacheConfig,

    /// Assets pinned at install time
    pub manifest: ManifestConfig,

    /// Data endpoints refreshed by periodic sync
    pub content: ContentConfig,

    /// Cache store location
    pub storage: StorageConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Origin settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Base URL of the site; relative URLs resolve against it
    pub base_url: String,

    /// Cross-origin hosts whose responses may be cached.
    /// An entry matches the host itself and any subdomain.
    pub allowed_hosts: Vec<String>,

    /// Per-request network timeout in seconds (0 = no timeout)
    pub timeout_secs: u64,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/".to_string(),
            allowed_hosts: vec![
                "unsplash.com".to_string(),
                "github.com".to_string(),
                "fontawesome.com".to_string(),
            ],
            timeout_secs: 30,
        }
    }
}

/// Cache naming and routing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Namespace prefix (e.g. "xenon" gives "xenon-static-v1.0.0")
    pub prefix: String,

    /// Cache version; bumping it evicts every older namespace on activate
    pub version: String,

    /// URL path suffixes routed to the static namespace
    pub static_extensions: Vec<String>,

    /// Document served when a navigation fails offline
    pub root_document: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            prefix: "xenon".to_string(),
            version: "1.0.0".to_string(),
            static_extensions: [
                ".css", ".js", ".json", ".png", ".jpg", ".jpeg", ".webp", ".avif", ".svg",
                ".woff", ".woff2",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            root_document: "/index.html".to_string(),
        }
    }
}

/// Install manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Site-relative or absolute URLs cached on install, in order
    pub assets: Vec<String>,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            assets: [
                "/",
                "/index.html",
                "/css/style.css",
                "/js/main.js",
                "/js/search.js",
                "/data/projects.json",
                "/data/blog.json",
                "/assets/img/photo_perfil_l.jpg",
                "/assets/img/ges-preview.png",
                "/assets/img/demo_storitic.webp",
                "/assets/img/storetic-preview.png",
                "/manifest.json",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Content endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Project list document
    pub projects: String,

    /// Blog post list document
    pub posts: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            projects: "/data/projects.json".to_string(),
            posts: "/data/blog.json".to_string(),
        }
    }
}

/// Cache store settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Store directory (defaults to the platform cache dir)
    pub dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[cache]"));
        assert!(toml.contains("[origin]"));
        assert!(toml.contains("[manifest]"));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.cache.prefix, "xenon");
        assert_eq!(config.manifest.assets.len(), 12);
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [cache]
            version = "2.0.0"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.cache.version, "2.0.0");
        assert_eq!(config.cache.prefix, "xenon"); // default preserved
        assert!(config
            .origin
            .allowed_hosts
            .contains(&"github.com".to_string()));
    }
}
