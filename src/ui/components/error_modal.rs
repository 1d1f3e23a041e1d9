//! Error modal offering Retry or Quit.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::error::AppError;
use crate::ui::centered_rect;
use crate::ui::theme::Theme;

/// The two answers the modal offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorChoice {
    #[default]
    Retry,
    Quit,
}

impl ErrorChoice {
    fn toggle(self) -> Self {
        match self {
            ErrorChoice::Retry => ErrorChoice::Quit,
            ErrorChoice::Quit => ErrorChoice::Retry,
        }
    }
}

/// A failed load, rendered as a modal that owns all input while visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorModal {
    message: String,
    suggestion: Option<&'static str>,
    detail: String,
    critical: bool,
    selected: ErrorChoice,
}

impl ErrorModal {
    pub fn from_error(error: &AppError) -> Self {
        Self {
            message: error.user_message(),
            suggestion: error.suggested_action(),
            detail: error.to_string(),
            critical: error.is_critical(),
            selected: ErrorChoice::Retry,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    pub fn selected(&self) -> ErrorChoice {
        self.selected
    }

    /// Handle a key press. Every key is consumed; most do nothing.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<ErrorChoice> {
        match (key.code, key.modifiers) {
            (KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab, _)
            | (KeyCode::Char('h') | KeyCode::Char('l'), KeyModifiers::NONE) => {
                self.selected = self.selected.toggle();
                None
            }
            (KeyCode::Enter, _) | (KeyCode::Char(' '), KeyModifiers::NONE) => Some(self.selected),
            (KeyCode::Char('r'), KeyModifiers::NONE) => Some(ErrorChoice::Retry),
            (KeyCode::Char('q'), KeyModifiers::NONE)
            | (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(ErrorChoice::Quit),
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let width = 60u16.min(area.width.saturating_sub(4));
        let height = 12u16.min(area.height.saturating_sub(2));
        let dialog = centered_rect(area, width, height);
        frame.render_widget(Clear, dialog);

        let title = if self.critical { " Fatal Error " } else { " Error " };
        let block = Block::default()
            .title(Span::styled(title, theme.error_style()))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.error));
        let inner = block.inner(dialog);
        frame.render_widget(block, dialog);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        let mut lines = vec![Line::from(Span::styled(
            self.message.clone(),
            theme.text_style().add_modifier(Modifier::BOLD),
        ))];
        if let Some(suggestion) = self.suggestion {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                suggestion,
                Style::default().fg(theme.secondary),
            )));
        }
        if self.detail != self.message {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                self.detail.clone(),
                theme.muted_style(),
            )));
        }
        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            chunks[0],
        );

        let button = |label: &'static str, choice: ErrorChoice| {
            if self.selected == choice {
                Span::styled(label, theme.selection_style())
            } else {
                Span::styled(label, theme.text_style())
            }
        };
        let buttons = Line::from(vec![
            button(" Retry ", ErrorChoice::Retry),
            Span::raw("    "),
            button(" Quit ", ErrorChoice::Quit),
        ]);
        frame.render_widget(
            Paragraph::new(buttons).alignment(Alignment::Center),
            chunks[1],
        );
    }
}
