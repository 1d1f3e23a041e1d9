//! Cosmetic theme configuration.

use std::str::FromStr;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// Theme colors as written in the config file.
///
/// Each value is anything ratatui can parse: a 256-color index such as
/// `"205"`, a hex value such as `"#ff00aa"`, or a color name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub primary_color: String,
    pub secondary_color: String,
    pub background_color: String,
    pub text_color: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            primary_color: "205".to_string(),
            secondary_color: "135".to_string(),
            background_color: "235".to_string(),
            text_color: "252".to_string(),
        }
    }
}

/// Parse a configured color, falling back when it is not understood.
pub fn parse_color(value: &str, fallback: Color) -> Color {
    Color::from_str(value.trim()).unwrap_or(fallback)
}

impl ThemeConfig {
    pub fn primary(&self) -> Color {
        parse_color(&self.primary_color, Color::Indexed(205))
    }

    pub fn secondary(&self) -> Color {
        parse_color(&self.secondary_color, Color::Indexed(135))
    }

    pub fn background(&self) -> Color {
        parse_color(&self.background_color, Color::Indexed(235))
    }

    pub fn text(&self) -> Color {
        parse_color(&self.text_color, Color::Indexed(252))
    }
}
