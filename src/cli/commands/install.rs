//! Install command - cache the manifest and register a new worker

use crate::cli::args::InstallArgs;
use crate::cli::WorkerHost;
use crate::error::OffcacheResult;
use crate::ui::{self, InstallProgress, UiContext};
use crate::worker::{Registration, StaticAssetManifest, WorkerState};

/// Execute the install command
pub async fn execute(args: InstallArgs, host: &WorkerHost) -> OffcacheResult<()> {
    let ctx = UiContext::detect();
    let config = host.config();

    let previous = Registration::load(host.store_dir()).await?;
    if let Some(ref existing) = previous {
        let settled = existing.state != WorkerState::Uninstalled && !existing.state.is_terminal();
        if existing.version == config.cache.version && settled && !args.force {
            ui::step_warn_hint(
                &ctx,
                &format!(
                    "Version {} is already installed ({})",
                    existing.version, existing.state
                ),
                "Use --force to reinstall",
            );
            return Ok(());
        }
    }

    let manager = host.new_worker()?;
    let manifest = StaticAssetManifest::resolve(manager.policy().origin(), &config.manifest.assets)?;

    ui::intro(&ctx, &format!("Installing cache version {}", config.cache.version));

    let progress = InstallProgress::new(&ctx, manifest.len());
    let result = manager
        .install_with_progress(&manifest, &|url| progress.inc(url.as_str()))
        .await;
    progress.finish();
    let report = result?;

    ui::step_ok_detail(
        &ctx,
        &format!("Cached {} assets", report.cached),
        &report.namespace,
    );

    let mut registration = manager.registration();
    if let Some(existing) = previous {
        registration.replaced = Some(existing.instance_id);
        ui::remark(
            &ctx,
            &format!("Replaces worker {} (version {})", existing.instance_id, existing.version),
        );
    }

    if args.activate {
        let activation = manager.activate().await?;
        for name in &activation.evicted {
            ui::step_info(&ctx, &format!("Deleted old cache {}", name));
        }
    }

    host.persist(&manager, &mut registration).await?;

    if manager.state() == WorkerState::Active {
        ui::outro_success(&ctx, &format!("Worker {} is active", manager.id()));
    } else {
        ui::outro_success(&ctx, &format!("Worker {} installed", manager.id()));
        ui::remark(&ctx, "Run: offcache activate");
    }

    Ok(())
}
