//! Worker lifecycle states

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a cache worker instance
///
/// ```text
/// Uninstalled -> Installing -> Waiting -> Activating -> Active -> Redundant
///                    |
///                    +-> Uninstalled (install failed, retryable)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Uninstalled,
    Installing,
    /// Installed, not yet controlling clients
    Waiting,
    Activating,
    Active,
    /// Superseded by a newer instance; terminal
    Redundant,
}

impl WorkerState {
    /// Whether fetch events are routed to this instance
    pub fn is_controlling(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Whether `install` may start from this state
    pub fn can_install(&self) -> bool {
        matches!(self, Self::Uninstalled)
    }

    /// Whether `activate` may start from this state. Re-activating an active
    /// instance only re-runs namespace cleanup.
    pub fn can_activate(&self) -> bool {
        matches!(self, Self::Waiting | Self::Activating | Self::Active)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Redundant)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninstalled => "uninstalled",
            Self::Installing => "installing",
            Self::Waiting => "waiting",
            Self::Activating => "activating",
            Self::Active => "active",
            Self::Redundant => "redundant",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
