//! Cache worker: lifecycle, event handlers and registration persistence

mod fallback;
mod manager;
mod manifest;
mod message;
mod registration;
mod replenish;
mod state;

pub use fallback::{offline_image, PLACEHOLDER_CONTENT_TYPE};
pub use manager::{
    ActivationReport, FetchOutcome, InstallReport, OfflineCacheManager, ResponseSource,
};
pub use manifest::StaticAssetManifest;
pub use message::{ControlMessage, SYNC_CONTACT_FORM, SYNC_CONTENT_UPDATE};
pub use registration::Registration;
pub use state::WorkerState;
