//! cliclack theme matching the board's title colour

use cliclack::ThemeState;
use console::Style;

/// Green accent, red on errors
#[derive(Debug, Clone, Default)]
pub struct BoardTheme;

impl cliclack::Theme for BoardTheme {
    fn bar_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().green(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().green().dim(),
        }
    }

    fn state_symbol_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().cyan(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().green(),
        }
    }
}

/// Install the theme for all prompts
pub fn init_theme() {
    cliclack::set_theme(BoardTheme);
}
