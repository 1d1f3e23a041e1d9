//! Detail pane for the selected issue or project.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::{Issue, Project};
use crate::ui::theme::Theme;

/// What the detail pane shows.
pub enum DetailContent<'a> {
    Issue(&'a Issue),
    Project(&'a Project),
    Empty,
}

#[derive(Debug, Clone, Default)]
pub struct DetailView {
    scroll: u16,
}

impl DetailView {
    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn reset_scroll(&mut self) {
        self.scroll = 0;
    }

    pub fn handle_input(&mut self, key: KeyEvent) {
        match (key.code, key.modifiers) {
            (KeyCode::Down, _) | (KeyCode::Char('j'), KeyModifiers::NONE) => {
                self.scroll = self.scroll.saturating_add(1);
            }
            (KeyCode::Up, _) | (KeyCode::Char('k'), KeyModifiers::NONE) => {
                self.scroll = self.scroll.saturating_sub(1);
            }
            (KeyCode::Home, _) | (KeyCode::Char('g'), KeyModifiers::NONE) => self.scroll = 0,
            _ => {}
        }
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        content: DetailContent<'_>,
        focused: bool,
        theme: &Theme,
    ) {
        let (title, lines) = match content {
            DetailContent::Issue(issue) => (format!(" {} ", issue.id), issue_lines(issue, theme)),
            DetailContent::Project(project) => {
                (format!(" {} ", project.name), project_lines(project, theme))
            }
            DetailContent::Empty => (
                " Detail ".to_string(),
                vec![Line::from(Span::styled("Nothing selected", theme.muted_style()))],
            ),
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(theme.border_style(focused));
        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0));
        frame.render_widget(paragraph, area);
    }
}

fn field<'a>(label: &'a str, value: String, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:<10}", label), Style::default().fg(theme.secondary)),
        Span::styled(value, theme.text_style()),
    ])
}

fn issue_lines<'a>(issue: &'a Issue, theme: &Theme) -> Vec<Line<'a>> {
    let mut lines = vec![
        Line::from(Span::styled(issue.title.as_str(), theme.title_style())),
        Line::default(),
        field("Status", issue.status.clone(), theme),
        field("Priority", issue.priority.clone(), theme),
        field("Assignee", issue.assignee.clone(), theme),
        field(
            "Created",
            issue.created_at.format("%Y-%m-%d %H:%M").to_string(),
            theme,
        ),
        Line::default(),
    ];
    if issue.description.is_empty() {
        lines.push(Line::from(Span::styled("No description", theme.muted_style())));
    } else {
        lines.extend(
            issue
                .description
                .lines()
                .map(|line| Line::from(Span::styled(line, theme.text_style()))),
        );
    }
    lines
}

fn project_lines<'a>(project: &'a Project, theme: &Theme) -> Vec<Line<'a>> {
    let started = project
        .created_at
        .map(|date| date.to_string())
        .unwrap_or_else(|| "-".to_string());
    let mut lines = vec![
        Line::from(Span::styled(project.name.as_str(), theme.title_style())),
        Line::default(),
        field("Status", project.status.clone(), theme),
        field("Progress", format!("{:.0}%", project.progress * 100.0), theme),
        field("Started", started, theme),
        Line::default(),
    ];
    if !project.description.is_empty() {
        lines.extend(
            project
                .description
                .lines()
                .map(|line| Line::from(Span::styled(line, theme.text_style()))),
        );
    }
    lines
}
