//! cliclack theme

use cliclack::ThemeState;
use console::Style;

/// Blue bars, green on submit
#[derive(Debug, Clone, Default)]
pub struct OffcacheTheme;

impl cliclack::Theme for OffcacheTheme {
    fn bar_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().blue(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().blue().dim(),
        }
    }

    fn state_symbol_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().blue(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().green(),
        }
    }
}

/// Install the theme for all cliclack output
pub fn init_theme() {
    cliclack::set_theme(OffcacheTheme);
}

#[cfg(test)]
mod tests {
    use super::*;
    use cliclack::Theme;

    #[test]
    fn submitted_prompts_turn_green() {
        let render = |style: Style| style.force_styling(true).apply_to("x").to_string();
        let theme = OffcacheTheme;
        assert_eq!(
            render(theme.state_symbol_color(&ThemeState::Submit)),
            render(Style::new().green())
        );
        assert_eq!(
            render(theme.bar_color(&ThemeState::Active)),
            render(Style::new().blue())
        );
    }
}
