//! Offline cache manager
//!
//! Drives the worker lifecycle (install, activate, fetch, message, sync)
//! against injected storage, network and notification capabilities. Each
//! handler is an `async fn`; the host treats completion of the returned
//! future as completion of the event. The only work not tied to an event is
//! the stale-while-revalidate refresh of cached documents.

use crate::cache::{CacheEntry, CacheStorage, NamespaceSet, RequestKey};
use crate::config::Config;
use crate::error::{OffcacheError, OffcacheResult};
use crate::fetch::Fetcher;
use crate::notify::{LogNotifier, Notification, Notifier};
use crate::policy::{Route, RoutePolicy};
use crate::request::{resolve_url, Destination, Request, Response};
use crate::worker::fallback;
use crate::worker::manifest::StaticAssetManifest;
use crate::worker::message::{ControlMessage, SYNC_CONTACT_FORM, SYNC_CONTENT_UPDATE};
use crate::worker::registration::Registration;
use crate::worker::replenish::{Batch, Replenisher};
use crate::worker::state::WorkerState;
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use url::Url;
use uuid::Uuid;

/// Where a response handed back to the client came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Cache,
    Network,
    /// Cached root document or synthesized placeholder
    Fallback,
}

/// Result of handling an intercepted request
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// Not handled; the host performs the request itself
    PassThrough,
    Respond {
        response: Response,
        source: ResponseSource,
    },
}

impl FetchOutcome {
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::PassThrough => None,
            Self::Respond { response, .. } => Some(response),
        }
    }

    pub fn source(&self) -> Option<ResponseSource> {
        match self {
            Self::PassThrough => None,
            Self::Respond { source, .. } => Some(*source),
        }
    }
}

/// Summary of a successful install
#[derive(Debug, Clone)]
pub struct InstallReport {
    pub instance_id: Uuid,
    pub namespace: String,
    pub cached: usize,
    pub state: WorkerState,
}

/// Summary of an activation pass
#[derive(Debug, Clone, Default)]
pub struct ActivationReport {
    pub evicted: Vec<String>,
    pub retained: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
struct Lifecycle {
    state: WorkerState,
    skip_waiting: bool,
    clients_claimed: bool,
}

/// Versioned offline cache in front of the network
pub struct OfflineCacheManager {
    id: Uuid,
    replenisher: Replenisher,
    notifier: Arc<dyn Notifier>,
    root_document: Url,
    content_urls: Vec<Url>,
    lifecycle: RwLock<Lifecycle>,
    background: Mutex<JoinSet<()>>,
}

impl OfflineCacheManager {
    /// Create an uninstalled instance from configuration
    pub fn new(
        config: &Config,
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetcher>,
    ) -> OffcacheResult<Self> {
        let policy = RoutePolicy::from_config(config)?;
        let namespaces = NamespaceSet::new(&config.cache.prefix, &config.cache.version)?;
        let root_document = resolve_url(policy.origin(), &config.cache.root_document)?;
        let content_urls = vec![
            resolve_url(policy.origin(), &config.content.projects)?,
            resolve_url(policy.origin(), &config.content.posts)?,
        ];

        Ok(Self {
            id: Uuid::new_v4(),
            replenisher: Replenisher {
                storage,
                fetcher,
                policy: Arc::new(policy),
                namespaces,
            },
            notifier: Arc::new(LogNotifier),
            root_document,
            content_urls,
            lifecycle: RwLock::new(Lifecycle {
                state: WorkerState::Uninstalled,
                skip_waiting: false,
                clients_claimed: false,
            }),
            background: Mutex::new(JoinSet::new()),
        })
    }

    /// Use a different notifier
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Resume a previously registered instance
    pub fn restore(mut self, registration: &Registration) -> Self {
        self.id = registration.instance_id;
        {
            let lifecycle = self.lifecycle.get_mut().unwrap_or_else(|e| e.into_inner());
            lifecycle.state = registration.state;
            lifecycle.clients_claimed = registration.clients_claimed;
        }
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> WorkerState {
        self.read().state
    }

    pub fn clients_claimed(&self) -> bool {
        self.read().clients_claimed
    }

    pub fn skip_waiting_requested(&self) -> bool {
        self.read().skip_waiting
    }

    pub fn namespaces(&self) -> &NamespaceSet {
        &self.replenisher.namespaces
    }

    pub fn policy(&self) -> &RoutePolicy {
        &self.replenisher.policy
    }

    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.replenisher.storage
    }

    /// Copy lifecycle state into a registration record
    pub fn update_registration(&self, registration: &mut Registration) {
        let lifecycle = *self.read();
        registration.instance_id = self.id;
        registration.version = self.namespaces().version().to_string();
        registration.state = lifecycle.state;
        registration.clients_claimed = lifecycle.clients_claimed;
    }

    /// Snapshot of this instance as a new registration record
    pub fn registration(&self) -> Registration {
        let mut registration =
            Registration::new(self.id, self.namespaces().version().to_string(), self.state());
        self.update_registration(&mut registration);
        registration
    }

    fn read(&self) -> RwLockReadGuard<'_, Lifecycle> {
        self.lifecycle.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Lifecycle> {
        self.lifecycle.write().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: WorkerState) {
        self.write().state = state;
    }

    /// Move to `next` if `allowed` holds for the current state.
    /// Returns the state that was left.
    fn begin(
        &self,
        allowed: fn(&WorkerState) -> bool,
        next: WorkerState,
        action: &str,
    ) -> OffcacheResult<WorkerState> {
        let mut lifecycle = self.write();
        let previous = lifecycle.state;
        if !allowed(&previous) {
            return Err(OffcacheError::InvalidTransition {
                from: previous.to_string(),
                action: action.to_string(),
            });
        }
        lifecycle.state = next;
        Ok(previous)
    }

    /// Install: cache every manifest asset in the static namespace
    pub async fn install(&self, manifest: &StaticAssetManifest) -> OffcacheResult<InstallReport> {
        self.install_with_progress(manifest, &|_| {}).await
    }

    /// Install, calling `on_fetched` as each asset arrives.
    ///
    /// All-or-nothing: any failed or non-2xx fetch fails the install, nothing
    /// from this attempt stays cached, and the instance returns to
    /// `Uninstalled` so the install can be retried. On success skip-waiting
    /// is requested, promoting the instance straight to `Activating`.
    pub async fn install_with_progress(
        &self,
        manifest: &StaticAssetManifest,
        on_fetched: &(dyn Fn(&Url) + Send + Sync),
    ) -> OffcacheResult<InstallReport> {
        self.begin(WorkerState::can_install, WorkerState::Installing, "install")?;
        info!("Installing worker {} ({} assets)", self.id, manifest.len());

        let namespace = self.namespaces().static_name().to_string();
        match self
            .replenisher
            .store_all(Batch::Install, &namespace, manifest.urls(), on_fetched)
            .await
        {
            Ok(cached) => {
                self.set_state(WorkerState::Waiting);
                let state = self.skip_waiting();
                info!("Installed worker {}: {} assets in {}", self.id, cached, namespace);
                Ok(InstallReport {
                    instance_id: self.id,
                    namespace,
                    cached,
                    state,
                })
            }
            Err(e) => {
                self.set_state(WorkerState::Uninstalled);
                error!("Install failed: {}", e);
                Err(e)
            }
        }
    }

    /// Activate: delete every namespace not belonging to the current
    /// version, then claim clients.
    ///
    /// Running it again on an active instance repeats the cleanup and
    /// leaves the same two namespaces.
    pub async fn activate(&self) -> OffcacheResult<ActivationReport> {
        let previous = {
            let mut lifecycle = self.write();
            let previous = lifecycle.state;
            if !previous.can_activate() {
                return Err(OffcacheError::InvalidTransition {
                    from: previous.to_string(),
                    action: "activate".to_string(),
                });
            }
            if previous != WorkerState::Active {
                lifecycle.state = WorkerState::Activating;
            }
            previous
        };
        info!("Activating worker {}", self.id);

        match self.evict_stale().await {
            Ok(report) => {
                let mut lifecycle = self.write();
                lifecycle.state = WorkerState::Active;
                lifecycle.clients_claimed = true;
                info!(
                    "Worker {} active ({} old caches deleted)",
                    self.id,
                    report.evicted.len()
                );
                Ok(report)
            }
            Err(e) => {
                self.set_state(previous);
                error!("Activation failed: {}", e);
                Err(e)
            }
        }
    }

    async fn evict_stale(&self) -> OffcacheResult<ActivationReport> {
        let storage = self.storage();
        let namespaces = self.namespaces();

        let mut evicted = vec![];
        for name in storage.namespaces().await? {
            if namespaces.is_current(&name) {
                continue;
            }
            info!("Deleting old cache: {}", name);
            storage.delete_namespace(&name).await?;
            evicted.push(name);
        }

        storage.open(namespaces.static_name()).await?;
        storage.open(namespaces.dynamic_name()).await?;

        Ok(ActivationReport {
            evicted,
            retained: vec![
                namespaces.static_name().to_string(),
                namespaces.dynamic_name().to_string(),
            ],
        })
    }

    /// Request activation without waiting for old clients to close.
    /// Returns the resulting state.
    pub fn skip_waiting(&self) -> WorkerState {
        let mut lifecycle = self.write();
        lifecycle.skip_waiting = true;
        if lifecycle.state == WorkerState::Waiting {
            lifecycle.state = WorkerState::Activating;
        }
        lifecycle.state
    }

    /// Handle a control message posted by a client
    pub fn handle_message(&self, message: ControlMessage) -> WorkerState {
        match message {
            ControlMessage::SkipWaiting => {
                debug!("Received SKIP_WAITING");
                self.skip_waiting()
            }
        }
    }

    /// Handle an intercepted request.
    ///
    /// Cache first; network on a miss, storing successful responses;
    /// destination-specific fallbacks when the network is unreachable.
    pub async fn handle_fetch(&self, request: Request) -> OffcacheResult<FetchOutcome> {
        if !self.state().is_controlling() {
            return Ok(FetchOutcome::PassThrough);
        }

        if let Route::PassThrough(reason) = self.policy().route(&request) {
            debug!(
                "Passing through {} {} ({:?})",
                request.method, request.url, reason
            );
            return Ok(FetchOutcome::PassThrough);
        }

        match self.replenisher.lookup(&request.key()).await {
            Ok(Some((namespace, entry))) => {
                debug!("Cache hit for {} in {}", request.url, namespace);
                if request.destination == Destination::Document {
                    self.revalidate(request, namespace);
                }
                return Ok(FetchOutcome::Respond {
                    response: entry.response,
                    source: ResponseSource::Cache,
                });
            }
            Ok(None) => {}
            Err(e) => warn!("Cache lookup failed for {}: {}", request.url, e),
        }

        match self.replenisher.fetch_and_cache(&request).await {
            Ok(response) => Ok(FetchOutcome::Respond {
                response,
                source: ResponseSource::Network,
            }),
            Err(e) => self.fallback(&request, e).await,
        }
    }

    /// Refresh a cached document in the background. The response does not
    /// wait for it; dropping the manager cancels refreshes still running.
    fn revalidate(&self, request: Request, namespace: String) {
        let replenisher = self.replenisher.clone();
        let mut background = self.background.lock().unwrap_or_else(|e| e.into_inner());
        while background.try_join_next().is_some() {}
        background.spawn(async move {
            match replenisher.refresh(&request, &namespace).await {
                Ok(response) => debug!("Revalidated {} ({})", request.url, response.status),
                Err(e) => debug!("Background refresh of {} failed: {}", request.url, e),
            }
        });
    }

    /// Wait for background refreshes started so far
    pub async fn settle(&self) {
        let mut tasks = {
            let mut background = self.background.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *background)
        };
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                debug!("Background refresh task ended abnormally: {}", e);
            }
        }
    }

    async fn fallback(
        &self,
        request: &Request,
        error: OffcacheError,
    ) -> OffcacheResult<FetchOutcome> {
        match request.destination {
            Destination::Document => {
                let key = RequestKey::get(&self.root_document);
                match self.replenisher.lookup(&key).await {
                    Ok(Some((_, entry))) => {
                        info!(
                            "Offline: serving {} for {}",
                            self.root_document, request.url
                        );
                        return Ok(FetchOutcome::Respond {
                            response: entry.response,
                            source: ResponseSource::Fallback,
                        });
                    }
                    Ok(None) => {}
                    Err(e) => warn!("Cache lookup failed for {}: {}", self.root_document, e),
                }
                Err(error)
            }
            Destination::Image => {
                info!("Offline: serving placeholder for {}", request.url);
                Ok(FetchOutcome::Respond {
                    response: fallback::offline_image(),
                    source: ResponseSource::Fallback,
                })
            }
            _ => Err(error),
        }
    }

    /// Cached response for a GET of `url`, as `handle_fetch` would find it
    pub async fn lookup(&self, url: &Url) -> OffcacheResult<Option<CacheEntry>> {
        Ok(self
            .replenisher
            .lookup(&RequestKey::get(url))
            .await?
            .map(|(_, entry)| entry))
    }

    /// Handle a background sync event
    pub async fn handle_sync(&self, tag: &str) {
        if self.state().is_terminal() {
            return;
        }
        match tag {
            SYNC_CONTACT_FORM => {
                if let Err(e) = self
                    .notifier
                    .show(&Notification::contact_form_synced())
                    .await
                {
                    warn!("Contact form sync notification failed: {}", e);
                }
            }
            other => debug!("Ignoring sync event '{}'", other),
        }
    }

    /// Handle a periodic sync event
    pub async fn handle_periodic_sync(&self, tag: &str) {
        if self.state().is_terminal() {
            return;
        }
        match tag {
            SYNC_CONTENT_UPDATE => {
                if let Err(e) = self.refresh_content().await {
                    warn!("Content update failed: {}", e);
                }
            }
            other => debug!("Ignoring periodic sync event '{}'", other),
        }
    }

    /// Refetch the content documents into the dynamic namespace,
    /// all-or-nothing. Returns the number of documents stored.
    pub async fn refresh_content(&self) -> OffcacheResult<usize> {
        let namespace = self.namespaces().dynamic_name().to_string();
        let stored = self
            .replenisher
            .store_all(Batch::ContentRefresh, &namespace, &self.content_urls, &|_| {})
            .await?;
        info!("Refreshed {} content documents in {}", stored, namespace);
        Ok(stored)
    }

    /// Handle a push message
    pub async fn handle_push(&self, payload: Option<&str>) {
        if self.state().is_terminal() {
            return;
        }
        if let Err(e) = self.notifier.show(&Notification::push(payload)).await {
            warn!("Push notification failed: {}", e);
        }
    }

    /// Handle a click on a notification; `explore` opens the site root
    pub async fn handle_notification_click(&self, action: Option<&str>) {
        if action != Some("explore") {
            return;
        }
        let root = self.policy().origin().join("/").unwrap_or_else(|_| self.policy().origin().clone());
        if let Err(e) = self.notifier.open_window(root.as_str()).await {
            warn!("Failed to open window: {}", e);
        }
    }

    /// Mark this instance as replaced by a newer one
    pub fn supersede(&self) {
        let mut lifecycle = self.write();
        lifecycle.state = WorkerState::Redundant;
        lifecycle.clients_claimed = false;
        info!("Worker {} is redundant", self.id);
    }

    /// Delete every namespace in the store. Returns the deleted names.
    pub async fn clear(&self) -> OffcacheResult<Vec<String>> {
        let mut deleted = vec![];
        for name in self.storage().namespaces().await? {
            if self.storage().delete_namespace(&name).await? {
                deleted.push(name);
            }
        }
        info!("Cleared {} caches", deleted.len());
        Ok(deleted)
    }
}
