//! Notifications rendered as terminal output

use crate::error::OffcacheResult;
use crate::notify::{Notification, Notifier};
use crate::ui::{self, UiContext};
use async_trait::async_trait;
use tracing::debug;

/// Prints notifications instead of showing them
pub struct TerminalNotifier {
    ctx: UiContext,
}

impl TerminalNotifier {
    pub fn new(ctx: UiContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Notifier for TerminalNotifier {
    async fn show(&self, notification: &Notification) -> OffcacheResult<()> {
        debug!("Notification payload: {:?}", notification);
        ui::step_info(
            &self.ctx,
            &format!("Notification: {} - {}", notification.title, notification.body),
        );
        if !notification.actions.is_empty() {
            let actions: Vec<&str> = notification
                .actions
                .iter()
                .map(|a| a.action.as_str())
                .collect();
            ui::remark(&self.ctx, &format!("actions: {}", actions.join(", ")));
        }
        Ok(())
    }

    async fn open_window(&self, url: &str) -> OffcacheResult<()> {
        ui::step_info(&self.ctx, &format!("Open window: {}", url));
        Ok(())
    }
}
