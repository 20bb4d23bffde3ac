//! Activate command - delete old caches and take control

use crate::cli::WorkerHost;
use crate::error::OffcacheResult;
use crate::ui::{self, TaskSpinner, UiContext};

/// Execute the activate command
pub async fn execute(host: &WorkerHost) -> OffcacheResult<()> {
    let ctx = UiContext::detect();
    let (manager, mut registration) = host.resume().await?;

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start("Activating worker...");
    let report = match manager.activate().await {
        Ok(report) => report,
        Err(e) => {
            spinner.stop_error("Activation failed");
            return Err(e);
        }
    };
    spinner.stop(&format!("Worker {} is active", manager.id()));

    host.persist(&manager, &mut registration).await?;

    if report.evicted.is_empty() {
        ui::step_info(&ctx, "No old caches to delete");
    }
    for name in &report.evicted {
        ui::step_ok(&ctx, &format!("Deleted old cache {}", name));
    }
    ui::remark(&ctx, &format!("Current caches: {}", report.retained.join(", ")));

    Ok(())
}
