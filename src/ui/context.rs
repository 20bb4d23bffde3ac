//! Interactive vs plain output detection

use std::io::IsTerminal;

/// Environment variables set by common CI systems
const CI_VARS: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "BUILDKITE",
    "JENKINS_URL",
    "TF_BUILD",
];

/// Decides how the CLI renders output and prompts
#[derive(Debug, Clone)]
pub struct UiContext {
    /// Terminal on both ends and not under CI
    interactive: bool,
    /// Confirmations pre-answered by `--yes`
    auto_yes: bool,
}

impl UiContext {
    /// Inspect the attached terminal and CI variables
    pub fn detect() -> Self {
        Self {
            interactive: Self::terminal_attached() && !Self::in_ci(),
            auto_yes: false,
        }
    }

    /// Plain output, prompts answered with their defaults
    pub fn non_interactive() -> Self {
        Self {
            interactive: false,
            auto_yes: false,
        }
    }

    /// Answer every confirmation with yes (`--yes`)
    pub fn with_auto_yes(mut self, yes: bool) -> Self {
        self.auto_yes = yes;
        self
    }

    /// Whether prompts can be shown
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Whether confirmations are skipped
    pub fn auto_yes(&self) -> bool {
        self.auto_yes
    }

    /// Spinners, progress bars and cliclack log lines
    pub fn use_fancy_output(&self) -> bool {
        self.interactive
    }

    fn terminal_attached() -> bool {
        std::io::stdout().is_terminal() && std::io::stdin().is_terminal()
    }

    fn in_ci() -> bool {
        CI_VARS.iter().any(|var| std::env::var_os(var).is_some())
    }
}
