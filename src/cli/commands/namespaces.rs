//! Namespaces command - list cache namespaces and their entry counts

use crate::cache::{CacheNamespace, CacheStorage, NamespaceSet};
use crate::cli::args::{NamespacesArgs, OutputFormat};
use crate::cli::WorkerHost;
use crate::error::OffcacheResult;
use crate::ui::{self, UiContext};
use console::style;
use serde::Serialize;

/// One namespace in the store
#[derive(Debug, Serialize)]
pub struct NamespaceSummary {
    pub name: String,
    pub entries: usize,
    pub current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Summarize every namespace in the store, flagging those of `current`
pub async fn summarize(
    storage: &dyn CacheStorage,
    current: &NamespaceSet,
) -> OffcacheResult<Vec<NamespaceSummary>> {
    let mut summaries = vec![];
    for name in storage.namespaces().await? {
        let entries = storage.keys(&name).await?.len();
        summaries.push(NamespaceSummary {
            current: current.is_current(&name),
            version: CacheNamespace::parse(&name).map(|ns| ns.version.to_string()),
            entries,
            name,
        });
    }
    Ok(summaries)
}

/// Execute the namespaces command
pub async fn execute(args: NamespacesArgs, host: &WorkerHost) -> OffcacheResult<()> {
    let config = host.config();
    let current = NamespaceSet::new(&config.cache.prefix, &config.cache.version)?;
    let summaries = summarize(host.storage().as_ref(), &current).await?;

    if summaries.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                let ctx = UiContext::detect();
                ui::step_info(&ctx, "No caches found");
            }
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&summaries),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
        OutputFormat::Plain => {
            for summary in &summaries {
                println!("{}", summary.name);
            }
        }
    }

    Ok(())
}

fn print_table(summaries: &[NamespaceSummary]) {
    println!(
        "{:<32} {:<10} {:<8} {:<8}",
        style("NAMESPACE").bold(),
        style("VERSION").bold(),
        style("ENTRIES").bold(),
        style("STATUS").bold()
    );
    println!("{}", "-".repeat(60));

    for summary in summaries {
        let status = if summary.current {
            style("current").green()
        } else {
            style("stale").yellow()
        };
        println!(
            "{:<32} {:<10} {:<8} {:<8}",
            summary.name,
            summary.version.as_deref().unwrap_or("-"),
            summary.entries,
            status
        );
    }

    println!();
    println!("{} namespace(s)", summaries.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryStorage, RequestKey};
    use crate::request::Response;
    use http::StatusCode;
    use url::Url;

    #[tokio::test]
    async fn summarize_flags_current_namespaces() {
        let storage = MemoryStorage::new();
        let key = RequestKey::get(&Url::parse("http://localhost:8080/").unwrap());
        let response = Response::new(StatusCode::OK, "ok");
        storage.put("xenon-static-v1.0.0", &key, &response).await.unwrap();
        storage.put("xenon-static-v0.9.0", &key, &response).await.unwrap();
        storage.open("scratch").await.unwrap();

        let current = NamespaceSet::new("xenon", "1.0.0").unwrap();
        let summaries = summarize(&storage, &current).await.unwrap();

        assert_eq!(summaries.len(), 3);
        assert!(summaries[0].current);
        assert_eq!(summaries[0].entries, 1);
        assert!(!summaries[1].current);
        assert_eq!(summaries[1].version.as_deref(), Some("0.9.0"));
        assert_eq!(summaries[2].version, None);
        assert_eq!(summaries[2].entries, 0);
    }
}
