//! Clear command - delete every cache namespace and the registration

use crate::cli::args::ClearArgs;
use crate::cli::WorkerHost;
use crate::error::OffcacheResult;
use crate::ui::{self, UiContext};
use crate::worker::Registration;

/// Execute the clear command
pub async fn execute(args: ClearArgs, host: &WorkerHost) -> OffcacheResult<()> {
    let ctx = UiContext::detect().with_auto_yes(args.yes);

    let confirmed = ui::confirm(
        &ctx,
        &format!("Delete all caches in {}?", host.store_dir().display()),
        false,
    )
    .await?;
    if !confirmed {
        ui::step_warn_hint(&ctx, "Nothing deleted", "Use --yes to skip confirmation");
        return Ok(());
    }

    let manager = host.new_worker()?;
    let deleted = manager.clear().await?;
    Registration::delete(host.store_dir()).await?;

    for name in &deleted {
        ui::step_ok(&ctx, &format!("Deleted {}", name));
    }
    ui::outro_success(&ctx, &format!("Cleared {} cache(s)", deleted.len()));

    Ok(())
}
