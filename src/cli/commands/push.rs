//! Push command - deliver a push message and optional notification click

use crate::cli::args::PushArgs;
use crate::cli::WorkerHost;
use crate::error::OffcacheResult;

/// Execute the push command
pub async fn execute(args: PushArgs, host: &WorkerHost) -> OffcacheResult<()> {
    let (manager, _) = host.resume().await?;

    manager.handle_push(args.payload.as_deref()).await;
    if let Some(ref action) = args.click {
        manager.handle_notification_click(Some(action.as_str())).await;
    }

    Ok(())
}
