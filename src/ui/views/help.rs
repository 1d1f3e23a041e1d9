//! Help overlay listing keyboard shortcuts.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::events::{help_sections, HelpSection};
use crate::ui::centered_rect;
use crate::ui::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpAction {
    Close,
}

/// Scrollable list of key bindings, grouped by context.
#[derive(Debug, Clone)]
pub struct HelpView {
    sections: &'static [HelpSection],
    scroll: usize,
    visible_height: usize,
}

impl Default for HelpView {
    fn default() -> Self {
        Self {
            sections: help_sections(),
            scroll: 0,
            visible_height: 0,
        }
    }
}

impl HelpView {
    /// Header, blank line, entries, and a trailing blank per section, plus
    /// the footer.
    fn total_lines(&self) -> usize {
        self.sections
            .iter()
            .map(|section| section.entries.len() + 3)
            .sum::<usize>()
            + 1
    }

    fn max_scroll(&self) -> usize {
        self.total_lines().saturating_sub(self.visible_height)
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Handle a key press. All keys are consumed while help is open.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<HelpAction> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('?') | KeyCode::Char('q'), _) | (KeyCode::Esc, _) => {
                Some(HelpAction::Close)
            }
            (KeyCode::Down, _) | (KeyCode::Char('j'), KeyModifiers::NONE) => {
                self.scroll = (self.scroll + 1).min(self.max_scroll());
                None
            }
            (KeyCode::Up, _) | (KeyCode::Char('k'), KeyModifiers::NONE) => {
                self.scroll = self.scroll.saturating_sub(1);
                None
            }
            (KeyCode::Char('g'), KeyModifiers::NONE) => {
                self.scroll = 0;
                None
            }
            (KeyCode::Char('G'), _) => {
                self.scroll = self.max_scroll();
                None
            }
            _ => None,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let width = 56u16.min(area.width.saturating_sub(4));
        let height = area.height.saturating_sub(4);
        let dialog = centered_rect(area, width, height);
        frame.render_widget(Clear, dialog);

        let block = Block::default()
            .title(" Help - Keyboard Shortcuts ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.primary));
        let inner = block.inner(dialog);
        frame.render_widget(block, dialog);

        self.visible_height = inner.height as usize;
        self.scroll = self.scroll.min(self.max_scroll());

        let paragraph = Paragraph::new(self.lines(theme)).scroll((self.scroll as u16, 0));
        frame.render_widget(paragraph, inner);
    }

    fn lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        let mut lines = Vec::with_capacity(self.total_lines());
        for section in self.sections {
            lines.push(Line::from(Span::styled(
                format!("── {} ──", section.title),
                Style::default()
                    .fg(theme.primary)
                    .add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::default());
            for entry in section.entries {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("{:>20}", entry.keys),
                        Style::default()
                            .fg(theme.secondary)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(entry.description, theme.text_style()),
                ]));
            }
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(
            "Press ?, q, or Esc to close",
            theme.muted_style(),
        )));
        lines
    }
}
