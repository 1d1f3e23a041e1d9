//! Resolved colors and the styles built from them.

use ratatui::style::{Color, Modifier, Style};

use crate::config::ThemeConfig;

/// Colors used by every view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Focused borders, titles, and the selected menu entry.
    pub primary: Color,
    /// Secondary accents such as identifiers and keys in the help bar.
    pub secondary: Color,
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub error: Color,
    pub success: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default())
    }
}

impl Theme {
    pub fn from_config(config: &ThemeConfig) -> Self {
        Self {
            primary: config.primary(),
            secondary: config.secondary(),
            background: config.background(),
            text: config.text(),
            muted: Color::DarkGray,
            error: Color::Red,
            success: Color::Green,
        }
    }

    pub fn text_style(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    /// Border style for a pane, depending on whether it has focus.
    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.primary)
        } else {
            self.muted_style()
        }
    }

    /// Highlight for the selected row of a list or table.
    pub fn selection_style(&self) -> Style {
        Style::default()
            .fg(self.background)
            .bg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error).add_modifier(Modifier::BOLD)
    }
}
