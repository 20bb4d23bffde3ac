//! CLI argument definitions using clap derive

use crate::request::Destination;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Offcache - offline cache manager for static sites
///
/// Keeps versioned copies of a site's assets, serves them when the network
/// is unreachable, and refreshes pages in the background.
#[derive(Parser, Debug)]
#[command(name = "offcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "OFFCACHE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install a worker: cache every manifest asset
    Install(InstallArgs),

    /// Activate the installed worker and delete old caches
    Activate,

    /// Route a request through the worker
    Fetch(FetchArgs),

    /// Post a control message to the worker
    Message(MessageArgs),

    /// Deliver a background sync event
    Sync(SyncArgs),

    /// Deliver a periodic sync event
    PeriodicSync(SyncArgs),

    /// Deliver a push message
    Push(PushArgs),

    /// Show worker and cache status
    Status(StatusArgs),

    /// List cache namespaces
    Namespaces(NamespacesArgs),

    /// Show projects and posts from the cached content documents
    Content(ContentArgs),

    /// Delete every cache namespace and the worker registration
    Clear(ClearArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the install command
#[derive(Parser, Debug)]
pub struct InstallArgs {
    /// Reinstall even if this version is already installed
    #[arg(short, long)]
    pub force: bool,

    /// Activate immediately after a successful install
    #[arg(short, long)]
    pub activate: bool,
}

/// Arguments for the fetch command
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// URL to request; relative URLs resolve against the origin
    pub url: String,

    /// Request destination (inferred from the URL when omitted)
    #[arg(short, long)]
    pub destination: Option<Destination>,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Write the response body to a file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the response body to stdout
    #[arg(long, conflicts_with = "output")]
    pub print: bool,
}

/// Arguments for the message command
#[derive(Parser, Debug)]
pub struct MessageArgs {
    #[command(subcommand)]
    pub message: MessageKind,
}

/// Control messages
#[derive(Subcommand, Debug, Clone, Copy)]
pub enum MessageKind {
    /// Activate without waiting for old clients to close
    SkipWaiting,
}

/// Arguments for sync commands
#[derive(Parser, Debug)]
pub struct SyncArgs {
    /// Sync tag
    pub tag: String,
}

/// Arguments for the push command
#[derive(Parser, Debug)]
pub struct PushArgs {
    /// Message text (a default text is used when omitted)
    pub payload: Option<String>,

    /// Simulate a click on a notification action afterwards
    #[arg(long)]
    pub click: Option<String>,
}

/// Arguments for the status command
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the namespaces command
#[derive(Parser, Debug)]
pub struct NamespacesArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the content command
#[derive(Parser, Debug)]
pub struct ContentArgs {
    /// Only show projects in this category ("all" for every project)
    #[arg(long, default_value = "all")]
    pub category: String,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the clear command
#[derive(Parser, Debug)]
pub struct ClearArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., cache.version)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Output format for listing commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_install() {
        let cli = Cli::parse_from(["offcache", "install", "--activate"]);
        match cli.command {
            Commands::Install(args) => {
                assert!(args.activate);
                assert!(!args.force);
            }
            _ => panic!("expected Install command"),
        }
    }

    #[test]
    fn cli_parses_fetch() {
        let cli = Cli::parse_from([
            "offcache",
            "fetch",
            "/blog/",
            "--destination",
            "document",
            "-X",
            "POST",
        ]);
        match cli.command {
            Commands::Fetch(args) => {
                assert_eq!(args.url, "/blog/");
                assert_eq!(args.destination, Some(Destination::Document));
                assert_eq!(args.method, "POST");
                assert!(args.output.is_none());
            }
            _ => panic!("expected Fetch command"),
        }
    }

    #[test]
    fn cli_rejects_unknown_destination() {
        assert!(Cli::try_parse_from(["offcache", "fetch", "/", "-d", "video"]).is_err());
    }

    #[test]
    fn cli_parses_message() {
        let cli = Cli::parse_from(["offcache", "message", "skip-waiting"]);
        match cli.command {
            Commands::Message(args) => assert!(matches!(args.message, MessageKind::SkipWaiting)),
            _ => panic!("expected Message command"),
        }
    }

    #[test]
    fn cli_parses_periodic_sync() {
        let cli = Cli::parse_from(["offcache", "periodic-sync", "content-update"]);
        match cli.command {
            Commands::PeriodicSync(args) => assert_eq!(args.tag, "content-update"),
            _ => panic!("expected PeriodicSync command"),
        }
    }

    #[test]
    fn cli_parses_push() {
        let cli = Cli::parse_from(["offcache", "push", "Nuevo post", "--click", "explore"]);
        match cli.command {
            Commands::Push(args) => {
                assert_eq!(args.payload.as_deref(), Some("Nuevo post"));
                assert_eq!(args.click.as_deref(), Some("explore"));
            }
            _ => panic!("expected Push command"),
        }
    }

    #[test]
    fn cli_parses_status() {
        let cli = Cli::parse_from(["offcache", "status"]);
        assert!(matches!(cli.command, Commands::Status(_)));
    }

    #[test]
    fn cli_parses_namespaces_json() {
        let cli = Cli::parse_from(["offcache", "namespaces", "--format", "json"]);
        match cli.command {
            Commands::Namespaces(args) => assert!(matches!(args.format, OutputFormat::Json)),
            _ => panic!("expected Namespaces command"),
        }
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["offcache", "config", "set", "cache.version", "2.0.0"]);
        match cli.command {
            Commands::Config(ConfigArgs {
                action: Some(ConfigAction::Set { key, value }),
            }) => {
                assert_eq!(key, "cache.version");
                assert_eq!(value, "2.0.0");
            }
            _ => panic!("expected Config Set command"),
        }
    }

    #[test]
    fn cli_parses_global_verbose() {
        let cli = Cli::parse_from(["offcache", "-vv", "activate"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Activate));
    }
}
