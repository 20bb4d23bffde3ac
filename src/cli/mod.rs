//! Command-line host for the cache worker

pub mod args;
pub mod commands;
mod host;
mod notifier;

pub use args::{Cli, Commands};
pub use host::WorkerHost;
pub use notifier::TerminalNotifier;
