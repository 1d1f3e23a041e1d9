//! Issue and project tables for the main pane.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Rect},
    style::Modifier,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::domain::{Issue, Project};
use crate::ui::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    /// Show the selected item in the detail pane.
    OpenDetail,
}

/// Cursor over a list of `len` rows.
#[derive(Debug, Clone, Default)]
pub struct ListView {
    selected: usize,
}

impl ListView {
    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn select(&mut self, index: usize) {
        self.selected = index;
    }

    /// Keep the cursor on a row after the list changed length.
    pub fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn handle_input(&mut self, key: KeyEvent, len: usize) -> Option<ListAction> {
        let last = len.saturating_sub(1);
        match (key.code, key.modifiers) {
            (KeyCode::Down, _) | (KeyCode::Char('j'), KeyModifiers::NONE) => {
                self.selected = (self.selected + 1).min(last);
                None
            }
            (KeyCode::Up, _) | (KeyCode::Char('k'), KeyModifiers::NONE) => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            (KeyCode::Home, _) | (KeyCode::Char('g'), KeyModifiers::NONE) => {
                self.selected = 0;
                None
            }
            (KeyCode::End, _) | (KeyCode::Char('G'), _) => {
                self.selected = last;
                None
            }
            (KeyCode::Enter, _) if len > 0 => Some(ListAction::OpenDetail),
            _ => None,
        }
    }

    fn table_state(&self, len: usize) -> TableState {
        TableState::default().with_selected((len > 0).then_some(self.selected))
    }

    pub fn render_issues(
        &self,
        frame: &mut Frame,
        area: Rect,
        issues: &[Issue],
        focused: bool,
        theme: &Theme,
    ) {
        let header = Row::new(["ID", "Title", "Status", "Priority", "Assignee"])
            .style(theme.title_style());
        let rows = issues.iter().map(|issue| {
            Row::new([
                Cell::from(issue.id.as_str()).style(theme.text_style().fg(theme.secondary)),
                Cell::from(issue.title.as_str()),
                Cell::from(issue.status.as_str()),
                Cell::from(issue.priority.as_str()),
                Cell::from(issue.assignee.as_str()),
            ])
            .style(theme.text_style())
        });
        let widths = [
            Constraint::Length(10),
            Constraint::Min(20),
            Constraint::Length(14),
            Constraint::Length(9),
            Constraint::Length(16),
        ];
        let title = format!(" Issues ({}) ", issues.len());
        self.render_table(frame, area, header, rows, widths, title, focused, theme, issues.len());
    }

    pub fn render_projects(
        &self,
        frame: &mut Frame,
        area: Rect,
        projects: &[Project],
        focused: bool,
        theme: &Theme,
    ) {
        let header = Row::new(["Name", "Status", "Progress", "Started"]).style(theme.title_style());
        let rows = projects.iter().map(|project| {
            let started = project
                .created_at
                .map(|date| date.to_string())
                .unwrap_or_default();
            Row::new([
                Cell::from(project.name.clone()),
                Cell::from(project.status.clone()),
                Cell::from(format!("{:>3.0}%", project.progress * 100.0)),
                Cell::from(started),
            ])
            .style(theme.text_style())
        });
        let widths = [
            Constraint::Min(20),
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Length(11),
        ];
        let title = format!(" Projects ({}) ", projects.len());
        self.render_table(frame, area, header, rows, widths, title, focused, theme, projects.len());
    }

    #[allow(clippy::too_many_arguments)]
    fn render_table<'a>(
        &self,
        frame: &mut Frame,
        area: Rect,
        header: Row<'a>,
        rows: impl IntoIterator<Item = Row<'a>>,
        widths: impl IntoIterator<Item = Constraint>,
        title: String,
        focused: bool,
        theme: &Theme,
        len: usize,
    ) {
        let highlight = if focused {
            theme.selection_style()
        } else {
            theme.text_style().add_modifier(Modifier::REVERSED)
        };
        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(theme.border_style(focused)),
            )
            .highlight_style(highlight);

        let mut state = self.table_state(len);
        frame.render_stateful_widget(table, area, &mut state);
    }
}
