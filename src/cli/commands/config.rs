//! Config command - show or edit configuration

use crate::cache::{check_prefix, check_version};
use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{OffcacheError, OffcacheResult};
use crate::ui::{self, UiContext};
use std::path::PathBuf;

/// Keys accepted by `config set`
const KEYS: &[&str] = &[
    "general.log_format",
    "origin.base_url",
    "origin.allowed_hosts",
    "origin.timeout_secs",
    "cache.prefix",
    "cache.version",
    "cache.static_extensions",
    "cache.root_document",
    "manifest.assets",
    "content.projects",
    "content.posts",
    "storage.dir",
];

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    manager: &ConfigManager,
    config: &Config,
) -> OffcacheResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => println!("{}", toml::to_string_pretty(config)?),
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => {
            set_value(manager, config, &key, &value).await?
        }
    }

    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> OffcacheResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    ui::step_ok_detail(&ctx, "Configuration initialized", &path.display().to_string());

    Ok(())
}

async fn set_value(
    manager: &ConfigManager,
    config: &Config,
    key: &str,
    value: &str,
) -> OffcacheResult<()> {
    let ctx = UiContext::detect();
    let mut config = config.clone();
    apply(&mut config, key, value)?;

    manager.save(&config).await?;
    ui::step_ok(&ctx, &format!("Set {} = {}", key, value));

    Ok(())
}

/// Apply a `section.field` assignment. List values are comma-separated.
fn apply(config: &mut Config, key: &str, value: &str) -> OffcacheResult<()> {
    match key {
        "general.log_format" => match value {
            "text" | "json" => config.general.log_format = value.to_string(),
            _ => return Err(invalid(key, "expected text or json")),
        },
        "origin.base_url" => {
            url::Url::parse(value).map_err(|e| invalid(key, &e.to_string()))?;
            config.origin.base_url = value.to_string();
        }
        "origin.allowed_hosts" => config.origin.allowed_hosts = parse_list(value),
        "origin.timeout_secs" => {
            config.origin.timeout_secs = value
                .parse()
                .map_err(|_| invalid(key, "expected a number of seconds"))?
        }
        "cache.prefix" => {
            check_prefix(value).map_err(|e| invalid(key, &e))?;
            config.cache.prefix = value.to_string();
        }
        "cache.version" => {
            check_version(value).map_err(|e| invalid(key, &e))?;
            config.cache.version = value.to_string();
        }
        "cache.static_extensions" => config.cache.static_extensions = parse_list(value),
        "cache.root_document" => config.cache.root_document = value.to_string(),
        "manifest.assets" => config.manifest.assets = parse_list(value),
        "content.projects" => config.content.projects = value.to_string(),
        "content.posts" => config.content.posts = value.to_string(),
        "storage.dir" => {
            config.storage.dir = if value.is_empty() {
                None
            } else {
                Some(PathBuf::from(value))
            }
        }
        _ => {
            return Err(OffcacheError::User(format!(
                "Unknown config key: {} (valid keys: {})",
                key,
                KEYS.join(", ")
            )))
        }
    }
    Ok(())
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn invalid(key: &str, reason: &str) -> OffcacheError {
    OffcacheError::User(format!("Invalid value for {}: {}", key, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_sets_scalar_and_list_keys() {
        let mut config = Config::default();
        apply(&mut config, "cache.version", "2.1.0").unwrap();
        apply(&mut config, "origin.allowed_hosts", "cdn.dev, , fonts.dev").unwrap();
        apply(&mut config, "storage.dir", "/var/cache/site").unwrap();

        assert_eq!(config.cache.version, "2.1.0");
        assert_eq!(config.origin.allowed_hosts, vec!["cdn.dev", "fonts.dev"]);
        assert_eq!(config.storage.dir, Some(PathBuf::from("/var/cache/site")));
    }

    #[test]
    fn apply_validates_values() {
        let mut config = Config::default();
        assert!(apply(&mut config, "cache.version", "").is_err());
        assert!(apply(&mut config, "cache.prefix", "a/b").is_err());
        assert!(apply(&mut config, "origin.timeout_secs", "soon").is_err());
        assert!(apply(&mut config, "general.log_format", "xml").is_err());
        assert_eq!(config.cache.version, "1.0.0");
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let err = apply(&mut Config::default(), "cache.size", "1").unwrap_err();
        assert!(err.to_string().contains("Unknown config key"));
    }
}
