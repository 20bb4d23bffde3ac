//! Sync commands - deliver background and periodic sync events

use crate::cli::args::SyncArgs;
use crate::cli::WorkerHost;
use crate::error::OffcacheResult;
use crate::ui::{self, TaskSpinner, UiContext};
use crate::worker::{SYNC_CONTACT_FORM, SYNC_CONTENT_UPDATE};

/// Execute the sync command
pub async fn execute(args: SyncArgs, host: &WorkerHost) -> OffcacheResult<()> {
    let ctx = UiContext::detect();
    let (manager, _) = host.resume().await?;

    if args.tag != SYNC_CONTACT_FORM {
        ui::step_warn_hint(
            &ctx,
            &format!("No handler for sync tag '{}'", args.tag),
            &format!("Known tags: {}", SYNC_CONTACT_FORM),
        );
    }
    manager.handle_sync(&args.tag).await;

    Ok(())
}

/// Execute the periodic-sync command
pub async fn execute_periodic(args: SyncArgs, host: &WorkerHost) -> OffcacheResult<()> {
    let ctx = UiContext::detect();
    let (manager, _) = host.resume().await?;

    if args.tag != SYNC_CONTENT_UPDATE {
        ui::step_warn_hint(
            &ctx,
            &format!("No handler for periodic sync tag '{}'", args.tag),
            &format!("Known tags: {}", SYNC_CONTENT_UPDATE),
        );
        manager.handle_periodic_sync(&args.tag).await;
        return Ok(());
    }

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start("Refreshing content documents...");
    match manager.refresh_content().await {
        Ok(stored) => {
            spinner.stop(&format!("Refreshed {} content documents", stored));
            Ok(())
        }
        Err(e) => {
            spinner.stop_error("Content refresh failed; cached documents unchanged");
            Err(e)
        }
    }
}
