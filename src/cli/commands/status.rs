//! Status command - show the registered worker and cache store

use crate::cache::{CacheStorage, NamespaceSet};
use crate::cli::args::{OutputFormat, StatusArgs};
use crate::cli::commands::namespaces::{summarize, NamespaceSummary};
use crate::cli::WorkerHost;
use crate::error::OffcacheResult;
use crate::ui::{self, UiContext};
use crate::worker::{Registration, WorkerState};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct StatusReport<'a> {
    origin: &'a str,
    store: String,
    backend: &'static str,
    configured_version: &'a str,
    worker: Option<&'a Registration>,
    namespaces: Vec<NamespaceSummary>,
}

/// Execute the status command
pub async fn execute(args: StatusArgs, host: &WorkerHost) -> OffcacheResult<()> {
    let config = host.config();
    let registration = Registration::load(host.store_dir()).await?;
    let current = NamespaceSet::new(&config.cache.prefix, &config.cache.version)?;
    let namespaces = summarize(host.storage().as_ref(), &current).await?;

    let report = StatusReport {
        origin: &config.origin.base_url,
        store: host.store_dir().display().to_string(),
        backend: host.storage().backend_name(),
        configured_version: &config.cache.version,
        worker: registration.as_ref(),
        namespaces,
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Plain => match report.worker {
            Some(worker) => println!("{} {} {}", worker.instance_id, worker.version, worker.state),
            None => println!("unregistered"),
        },
        OutputFormat::Table => print_report(&report),
    }

    Ok(())
}

fn print_report(report: &StatusReport<'_>) {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "offcache status");

    ui::section(&ctx, "Worker");
    match report.worker {
        Some(worker) => {
            ui::key_value(&ctx, "instance", &worker.instance_id.to_string());
            ui::key_value_status(
                &ctx,
                "state",
                worker.state.as_str(),
                worker.state == WorkerState::Active,
            );
            ui::key_value_status(
                &ctx,
                "version",
                &worker.version,
                worker.version == report.configured_version,
            );
            ui::key_value(&ctx, "clients claimed", &worker.clients_claimed.to_string());
            ui::key_value(
                &ctx,
                "installed",
                &worker.installed_at.format("%Y-%m-%d %H:%M").to_string(),
            );
            if let Some(replaced) = worker.replaced {
                ui::key_value(&ctx, "replaced", &replaced.to_string());
            }
            if worker.version != report.configured_version {
                ui::step_warn_hint(
                    &ctx,
                    &format!("Config version is {}", report.configured_version),
                    "Run: offcache install",
                );
            }
        }
        None => ui::step_warn_hint(&ctx, "No worker registered", "Run: offcache install"),
    }

    ui::section(&ctx, "Store");
    ui::key_value(&ctx, "origin", report.origin);
    ui::key_value(&ctx, "path", &report.store);
    ui::key_value(&ctx, "backend", report.backend);
    if report.namespaces.is_empty() {
        ui::remark(&ctx, "no caches");
    }
    for ns in &report.namespaces {
        ui::key_value_status(
            &ctx,
            &ns.name,
            &format!("{} entries", ns.entries),
            ns.current,
        );
    }
}
