//! Left-hand menu for switching the main list.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::ui::theme::Theme;

/// What the main pane lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MainView {
    #[default]
    Issues,
    Projects,
}

impl MainView {
    pub const ALL: [MainView; 2] = [MainView::Issues, MainView::Projects];

    pub fn title(self) -> &'static str {
        match self {
            MainView::Issues => "Issues",
            MainView::Projects => "Projects",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Open(MainView),
}

#[derive(Debug, Clone, Default)]
pub struct MenuView {
    selected: usize,
}

impl MenuView {
    pub fn selected(&self) -> MainView {
        MainView::ALL[self.selected]
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Option<MenuAction> {
        match (key.code, key.modifiers) {
            (KeyCode::Left | KeyCode::Up, _)
            | (KeyCode::Char('h') | KeyCode::Char('k'), KeyModifiers::NONE) => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            (KeyCode::Right | KeyCode::Down, _)
            | (KeyCode::Char('l') | KeyCode::Char('j'), KeyModifiers::NONE) => {
                self.selected = (self.selected + 1).min(MainView::ALL.len() - 1);
                None
            }
            (KeyCode::Enter, _) => Some(MenuAction::Open(self.selected())),
            _ => None,
        }
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        focused: bool,
        active: MainView,
        theme: &Theme,
    ) {
        let lines: Vec<Line> = MainView::ALL
            .iter()
            .enumerate()
            .map(|(i, view)| {
                let marker = if *view == active { "● " } else { "  " };
                let text = format!("{}{}", marker, view.title());
                if i == self.selected && focused {
                    Line::from(Span::styled(text, theme.selection_style()))
                } else if *view == active {
                    Line::from(Span::styled(text, theme.title_style()))
                } else {
                    Line::from(Span::styled(text, theme.text_style()))
                }
            })
            .collect();

        let block = Block::default()
            .title(" Menu ")
            .borders(Borders::ALL)
            .border_style(theme.border_style(focused));
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}
