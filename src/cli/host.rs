//! Wires the worker to the on-disk store, the HTTP fetcher and the terminal
//!
//! Each CLI invocation delivers one event, so the registration is loaded
//! before the event and saved after it.

use crate::cache::DiskStorage;
use crate::cli::notifier::TerminalNotifier;
use crate::config::{Config, ConfigManager};
use crate::error::OffcacheResult;
use crate::fetch::HttpFetcher;
use crate::ui::UiContext;
use crate::worker::{OfflineCacheManager, Registration};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Store location plus the capabilities injected into every manager
pub struct WorkerHost {
    config: Config,
    store_dir: PathBuf,
    storage: Arc<DiskStorage>,
    fetcher: Arc<HttpFetcher>,
    notifier: Arc<TerminalNotifier>,
}

impl WorkerHost {
    pub fn new(config: &Config, ctx: &UiContext) -> Self {
        let store_dir = ConfigManager::store_dir(config);
        debug!("Using cache store {}", store_dir.display());
        Self {
            config: config.clone(),
            storage: Arc::new(DiskStorage::new(&store_dir)),
            store_dir,
            fetcher: Arc::new(HttpFetcher::new(config.origin.timeout_secs)),
            notifier: Arc::new(TerminalNotifier::new(ctx.clone())),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }

    pub fn storage(&self) -> &Arc<DiskStorage> {
        &self.storage
    }

    pub fn fetcher(&self) -> &Arc<HttpFetcher> {
        &self.fetcher
    }

    /// New, uninstalled worker for the configured cache version
    pub fn new_worker(&self) -> OffcacheResult<OfflineCacheManager> {
        self.build(&self.config)
    }

    /// The registered worker, at the version it was installed with
    pub async fn resume(&self) -> OffcacheResult<(OfflineCacheManager, Registration)> {
        let registration = Registration::require(&self.store_dir).await?;

        let mut config = self.config.clone();
        if registration.version != config.cache.version {
            warn!(
                "Registered worker uses cache version {} but config says {}; run install to update",
                registration.version, config.cache.version
            );
            config.cache.version = registration.version.clone();
        }

        let manager = self.build(&config)?.restore(&registration);
        Ok((manager, registration))
    }

    /// Save the worker's lifecycle state
    pub async fn persist(
        &self,
        manager: &OfflineCacheManager,
        registration: &mut Registration,
    ) -> OffcacheResult<()> {
        manager.update_registration(registration);
        registration.save(&self.store_dir).await
    }

    fn build(&self, config: &Config) -> OffcacheResult<OfflineCacheManager> {
        Ok(
            OfflineCacheManager::new(config, self.storage.clone(), self.fetcher.clone())?
                .with_notifier(self.notifier.clone()),
        )
    }
}
