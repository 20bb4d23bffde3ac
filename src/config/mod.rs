//! Configuration management for offcache

pub mod schema;

pub use schema::Config;

use crate::cache::{check_prefix, check_version};
use crate::error::{OffcacheError, OffcacheResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("offcache")
            .join("config.toml")
    }

    /// Get the default cache store directory
    pub fn default_store_dir() -> PathBuf {
        dirs::cache_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("offcache")
    }

    /// Resolve the store directory for a config
    pub fn store_dir(config: &Config) -> PathBuf {
        config
            .storage
            .dir
            .clone()
            .unwrap_or_else(Self::default_store_dir)
    }

    /// Load configuration, using defaults if the file does not exist
    pub async fn load(&self) -> OffcacheResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> OffcacheResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| OffcacheError::io(format!("reading config from {}", path.display()), e))?;

        let config: Config = toml::from_str(&content).map_err(|e| OffcacheError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if let Err(reason) = check_version(&config.cache.version)
            .map_err(|e| format!("cache.version: {}", e))
            .and_then(|_| check_prefix(&config.cache.prefix).map_err(|e| format!("cache.prefix: {}", e)))
        {
            return Err(OffcacheError::ConfigInvalid {
                path: path.to_path_buf(),
                reason,
            });
        }

        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> OffcacheResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            OffcacheError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> OffcacheResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| OffcacheError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nonexistent.toml");
        let manager = ConfigManager::with_path(path);

        let config = manager.load().await.unwrap();
        assert_eq!(config.cache.version, "1.0.0");
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        let manager = ConfigManager::with_path(path);

        let mut config = Config::default();
        config.cache.version = "2.1.0".to_string();

        manager.save(&config).await.unwrap();
        let loaded = manager.load().await.unwrap();

        assert_eq!(loaded.cache.version, "2.1.0");
    }

    #[tokio::test]
    async fn rejects_unsafe_version() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        tokio::fs::write(&path, "[cache]\nversion = \"../latest\"\n")
            .await
            .unwrap();

        let err = ConfigManager::with_path(path).load().await.unwrap_err();
        assert!(matches!(err, OffcacheError::ConfigInvalid { .. }));
    }

    #[tokio::test]
    async fn accepts_plain_generation_tags() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        tokio::fs::write(&path, "[cache]\nprefix = \"\"\nversion = \"2\"\n")
            .await
            .unwrap();

        let config = ConfigManager::with_path(path).load().await.unwrap();
        assert_eq!(config.cache.version, "2");
        assert_eq!(config.cache.prefix, "");
    }

    #[test]
    fn store_dir_prefers_config() {
        let mut config = Config::default();
        config.storage.dir = Some(PathBuf::from("/tmp/offcache-store"));
        assert_eq!(
            ConfigManager::store_dir(&config),
            PathBuf::from("/tmp/offcache-store")
        );
    }
}
