//! Spinners and the install progress bar, with plain fallbacks

use super::context::UiContext;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner for a single long-running step
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
}

impl TaskSpinner {
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
        }
    }

    pub fn start(&mut self, message: &str) {
        if self.interactive {
            let spinner = cliclack::spinner();
            spinner.start(message);
            self.spinner = Some(spinner);
        } else {
            println!("{} {}", style("...").dim(), message);
        }
    }

    pub fn stop(&mut self, message: &str) {
        match self.spinner.take() {
            Some(spinner) => spinner.stop(message),
            None => println!("{} {}", style("[OK]").green(), message),
        }
    }

    pub fn stop_error(&mut self, message: &str) {
        match self.spinner.take() {
            Some(spinner) => spinner.error(message),
            None => println!("{} {}", style("[FAIL]").red(), message),
        }
    }
}

/// Progress over the install manifest.
///
/// `inc` is called from concurrent fetches, so the bar is shared by
/// reference; indicatif handles the synchronization.
pub struct InstallProgress {
    bar: Option<ProgressBar>,
}

impl InstallProgress {
    pub fn new(ctx: &UiContext, total: usize) -> Self {
        let bar = if ctx.use_fancy_output() {
            let bar = ProgressBar::new(total as u64);
            if let Ok(progress_style) = ProgressStyle::default_bar()
                .template("  {spinner:.blue} Caching  {bar:24.blue/dim} {pos}/{len} {msg:.dim}")
            {
                bar.set_style(
                    progress_style
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                        .progress_chars("━╸─"),
                );
            }
            bar.enable_steady_tick(Duration::from_millis(120));
            Some(bar)
        } else {
            println!("Caching {} assets...", total);
            None
        };
        Self { bar }
    }

    /// Record one fetched asset
    pub fn inc(&self, label: &str) {
        match self.bar {
            Some(ref bar) => {
                bar.inc(1);
                bar.set_message(shorten(label, 48));
            }
            None => println!("  fetched {}", label),
        }
    }

    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}

/// Keep the tail of long labels; URLs differ at the end
fn shorten(label: &str, max: usize) -> String {
    let count = label.chars().count();
    if count <= max {
        return label.to_string();
    }
    let tail: String = label.chars().skip(count - (max - 3)).collect();
    format!("...{}", tail)
}
