//! Animated loading indicator.

use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    widgets::Paragraph,
    Frame,
};

use crate::ui::theme::Theme;

const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// A spinner with a message, advanced once per tick while active.
#[derive(Debug, Clone, Default)]
pub struct LoadingIndicator {
    message: String,
    frame: usize,
    active: bool,
}

impl LoadingIndicator {
    /// Start spinning from the first frame with a new message.
    pub fn start(&mut self, message: impl Into<String>) {
        self.message = message.into();
        self.frame = 0;
        self.active = true;
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn tick(&mut self) {
        if self.active {
            self.frame = (self.frame + 1) % FRAMES.len();
        }
    }

    pub fn spinner_frame(&self) -> &'static str {
        FRAMES[self.frame]
    }

    /// Spinner and message, or an empty string when stopped.
    pub fn text(&self) -> String {
        if self.active {
            format!("{} {}", self.spinner_frame(), self.message)
        } else {
            String::new()
        }
    }

    /// Render centered in `area`. Draws nothing when stopped.
    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        if !self.active {
            return;
        }
        let paragraph = Paragraph::new(self.text())
            .style(Style::default().fg(theme.secondary))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }
}
