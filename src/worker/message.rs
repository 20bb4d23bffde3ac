//! Control messages accepted from clients

use serde::{Deserialize, Serialize};

/// Message posted to the worker, e.g. `{"type": "SKIP_WAITING"}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMessage {
    /// Activate immediately instead of waiting for old clients to close
    SkipWaiting,
}

/// Background sync tag for queued contact form submissions
pub const SYNC_CONTACT_FORM: &str = "contact-form";

/// Periodic sync tag for refreshing the content documents
pub const SYNC_CONTENT_UPDATE: &str = "content-update";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_skip_waiting() {
        let msg: ControlMessage = serde_json::from_str(r#"{"type":"SKIP_WAITING"}"#).unwrap();
        assert_eq!(msg, ControlMessage::SkipWaiting);
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(serde_json::from_str::<ControlMessage>(r#"{"type":"RELOAD"}"#).is_err());
    }
}
