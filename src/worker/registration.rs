//! Registration persistence
//!
//! The CLI host runs one lifecycle event per invocation, so the worker's
//! state is saved next to the cache store between runs.

use crate::error::{OffcacheError, OffcacheResult};
use crate::worker::state::WorkerState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

const FILE_NAME: &str = "registration.json";

/// Persisted record of the registered worker instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    /// Worker instance ID
    pub instance_id: Uuid,

    /// Cache version the instance was installed with
    pub version: String,

    /// Current lifecycle state
    pub state: WorkerState,

    /// Whether the instance has claimed open clients
    pub clients_claimed: bool,

    /// Instance this one replaced, if any
    pub replaced: Option<Uuid>,

    /// When the instance was installed
    pub installed_at: DateTime<Utc>,

    /// When the record was last updated
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    /// Create a record for a freshly installed instance
    pub fn new(instance_id: Uuid, version: impl Into<String>, state: WorkerState) -> Self {
        let now = Utc::now();
        Self {
            instance_id,
            version: version.into(),
            state,
            clients_claimed: false,
            replaced: None,
            installed_at: now,
            updated_at: now,
        }
    }

    /// Registration file path inside a store directory
    pub fn file_path(store_dir: &Path) -> PathBuf {
        store_dir.join(FILE_NAME)
    }

    /// Load the registration from a store directory
    pub async fn load(store_dir: &Path) -> OffcacheResult<Option<Self>> {
        let path = Self::file_path(store_dir);

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).await.map_err(|e| {
            OffcacheError::io(format!("reading registration {}", path.display()), e)
        })?;

        let registration: Registration = serde_json::from_str(&content)?;
        Ok(Some(registration))
    }

    /// Load the registration, failing if none exists
    pub async fn require(store_dir: &Path) -> OffcacheResult<Self> {
        Self::load(store_dir)
            .await?
            .ok_or_else(|| OffcacheError::NotRegistered(store_dir.to_path_buf()))
    }

    /// Save the registration into a store directory
    pub async fn save(&mut self, store_dir: &Path) -> OffcacheResult<()> {
        fs::create_dir_all(store_dir)
            .await
            .map_err(|e| OffcacheError::io("creating store directory", e))?;

        self.updated_at = Utc::now();
        let path = Self::file_path(store_dir);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content).await.map_err(|e| {
            OffcacheError::io(format!("writing registration {}", path.display()), e)
        })?;

        Ok(())
    }

    /// Delete the registration file
    pub async fn delete(store_dir: &Path) -> OffcacheResult<()> {
        let path = Self::file_path(store_dir);
        if path.exists() {
            fs::remove_file(&path).await.map_err(|e| {
                OffcacheError::io(format!("deleting registration {}", path.display()), e)
            })?;
        }
        Ok(())
    }
}
