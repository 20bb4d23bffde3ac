//! User-facing notifications raised by sync and push handlers

use crate::error::OffcacheResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

const ICON: &str = "/assets/img/icons/icon-192x192.png";
const BADGE: &str = "/assets/img/icons/icon-72x72.png";
const ACTION_ICON: &str = "/assets/img/icons/icon-96x96.png";

/// Action button on a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

/// A notification to display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vibrate: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<NotificationAction>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    fn new(title: &str, body: &str) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
            icon: ICON.to_string(),
            badge: BADGE.to_string(),
            vibrate: vec![],
            actions: vec![],
            created_at: Utc::now(),
        }
    }

    /// Shown once a queued contact form has been synchronized
    pub fn contact_form_synced() -> Self {
        Self::new(
            "Formulario sincronizado",
            "Tu mensaje ha sido enviado correctamente",
        )
    }

    /// Shown for a push message; falls back to a generic update text
    pub fn push(payload: Option<&str>) -> Self {
        let body = payload
            .filter(|p| !p.trim().is_empty())
            .unwrap_or("Nueva actualización en el portafolio");
        let mut notification = Self::new("Xenon.py Portfolio", body);
        notification.vibrate = vec![100, 50, 100];
        notification.actions = vec![
            NotificationAction {
                action: "explore".to_string(),
                title: "Ver ahora".to_string(),
                icon: ACTION_ICON.to_string(),
            },
            NotificationAction {
                action: "close".to_string(),
                title: "Cerrar".to_string(),
                icon: ACTION_ICON.to_string(),
            },
        ];
        notification
    }
}

/// Host capability for showing notifications and opening client windows
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn show(&self, notification: &Notification) -> OffcacheResult<()>;

    async fn open_window(&self, url: &str) -> OffcacheResult<()>;
}

/// Notifier that only logs; used by the CLI host
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn show(&self, notification: &Notification) -> OffcacheResult<()> {
        info!("Notification: {} - {}", notification.title, notification.body);
        Ok(())
    }

    async fn open_window(&self, url: &str) -> OffcacheResult<()> {
        info!("Open window: {}", url);
        Ok(())
    }
}
