//! Terminal output for the CLI
//!
//! Interactive terminals get `cliclack` step lines and spinners; pipes and
//! CI get plain `[OK]`/`[WARN]` lines.

mod context;
mod output;
mod progress;
mod prompts;
mod theme;

pub use context::UiContext;
pub use output::{
    intro, key_value, key_value_status, outro_success, remark, section, step_info, step_ok,
    step_ok_detail, step_warn_hint,
};
pub use progress::{InstallProgress, TaskSpinner};
pub use prompts::confirm;
pub use theme::{init_theme, OffcacheTheme};
