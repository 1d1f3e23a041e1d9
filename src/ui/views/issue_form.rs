//! Create/edit issue form, shown as a modal over the dashboard.
//!
//! Field focus is local to the form: Tab and Shift+Tab move between fields
//! and never reach the dashboard panes while the form is open.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::domain::{Issue, IssueDraft, PRIORITY_LABELS};
use crate::ui::centered_rect;
use crate::ui::components::TextInput;
use crate::ui::theme::Theme;

/// Form fields in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Title,
    Description,
    Status,
    Priority,
    Assignee,
    Submit,
}

impl FormField {
    const ORDER: [FormField; 6] = [
        FormField::Title,
        FormField::Description,
        FormField::Status,
        FormField::Priority,
        FormField::Assignee,
        FormField::Submit,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Whether the form creates a new issue or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit {
        linear_id: String,
        identifier: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    Cancel,
    Submit(IssueDraft),
}

#[derive(Debug, Clone)]
pub struct IssueForm {
    mode: FormMode,
    focus: FormField,
    title: TextInput,
    description: TextInput,
    status: TextInput,
    priority: usize,
    assignee: TextInput,
    error: Option<String>,
    submitting: bool,
}

impl IssueForm {
    /// An empty form for a new issue.
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            focus: FormField::Title,
            title: TextInput::new().with_placeholder("Issue title"),
            description: TextInput::new().with_placeholder("Optional"),
            status: TextInput::new().with_placeholder("Team default"),
            priority: 0,
            assignee: TextInput::new().with_placeholder("Unassigned"),
            error: None,
            submitting: false,
        }
    }

    /// A form pre-filled from `issue`.
    pub fn edit(issue: &Issue) -> Self {
        let draft = IssueDraft::from_issue(issue);
        let priority = PRIORITY_LABELS
            .iter()
            .position(|label| label.eq_ignore_ascii_case(&draft.priority))
            .unwrap_or(0);

        let mut form = Self::create();
        form.mode = FormMode::Edit {
            linear_id: issue.linear_id.clone(),
            identifier: issue.id.clone(),
        };
        form.title.set_value(draft.title);
        form.description.set_value(draft.description);
        form.status.set_value(draft.status);
        form.priority = priority;
        form.assignee.set_value(draft.assignee);
        form
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn focus(&self) -> FormField {
        self.focus
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Show a failed submission and allow another attempt.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.submitting = false;
    }

    pub fn priority_label(&self) -> &'static str {
        PRIORITY_LABELS[self.priority]
    }

    /// The form contents as a draft.
    pub fn draft(&self) -> IssueDraft {
        IssueDraft::new(
            self.title.value().trim(),
            self.description.value().trim(),
            self.priority_label(),
            self.assignee.value().trim(),
        )
        .with_status(self.status.value().trim())
    }

    /// Handle a key press.
    ///
    /// Every key is consumed. Input is ignored while a submission is in
    /// flight.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<FormAction> {
        if self.submitting {
            return None;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => Some(FormAction::Cancel),
            (KeyCode::Tab, KeyModifiers::NONE) => {
                self.focus = self.focus.next();
                None
            }
            (KeyCode::BackTab, _) | (KeyCode::Tab, KeyModifiers::SHIFT) => {
                self.focus = self.focus.prev();
                None
            }
            (KeyCode::Enter, _) if self.focus == FormField::Submit => self.submit(),
            (KeyCode::Enter, _) => {
                self.focus = self.focus.next();
                None
            }
            _ => {
                self.handle_field_input(key);
                None
            }
        }
    }

    fn submit(&mut self) -> Option<FormAction> {
        if self.title.value().trim().is_empty() {
            self.error = Some("Title is required".to_string());
            self.focus = FormField::Title;
            return None;
        }
        self.error = None;
        self.submitting = true;
        Some(FormAction::Submit(self.draft()))
    }

    fn handle_field_input(&mut self, key: KeyEvent) {
        match self.focus {
            FormField::Title => {
                self.title.handle_input(key);
            }
            FormField::Description => {
                self.description.handle_input(key);
            }
            FormField::Status => {
                self.status.handle_input(key);
            }
            FormField::Assignee => {
                self.assignee.handle_input(key);
            }
            FormField::Priority => match key.code {
                KeyCode::Up | KeyCode::Left | KeyCode::Char('k') | KeyCode::Char('h') => {
                    self.priority = self.priority.saturating_sub(1);
                }
                KeyCode::Down | KeyCode::Right | KeyCode::Char('j') | KeyCode::Char('l') => {
                    self.priority = (self.priority + 1).min(PRIORITY_LABELS.len() - 1);
                }
                _ => {}
            },
            FormField::Submit => {}
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let width = 64u16.min(area.width.saturating_sub(4));
        let height = 22u16.min(area.height.saturating_sub(2));
        let dialog = centered_rect(area, width, height);
        frame.render_widget(Clear, dialog);

        let title = match &self.mode {
            FormMode::Create => " New Issue ".to_string(),
            FormMode::Edit { identifier, .. } => format!(" Edit {} ", identifier),
        };
        let block = Block::default()
            .title(Span::styled(title, theme.title_style()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.primary));
        let inner = block.inner(dialog);
        frame.render_widget(block, dialog);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let focus = self.focus;
        self.title
            .render_with_label(frame, chunks[0], "Title *", focus == FormField::Title, theme);
        self.description.render_with_label(
            frame,
            chunks[1],
            "Description",
            focus == FormField::Description,
            theme,
        );
        self.status
            .render_with_label(frame, chunks[2], "Status", focus == FormField::Status, theme);
        self.render_priority(frame, chunks[3], focus == FormField::Priority, theme);
        self.assignee.render_with_label(
            frame,
            chunks[4],
            "Assignee",
            focus == FormField::Assignee,
            theme,
        );
        self.render_status_line(frame, chunks[5], theme);
        self.render_submit(frame, chunks[6], focus == FormField::Submit, theme);
    }

    fn render_priority(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        let title_style = if focused {
            theme.title_style()
        } else {
            theme.text_style()
        };
        let block = Block::default()
            .title(Span::styled(" Priority ", title_style))
            .borders(Borders::ALL)
            .border_style(theme.border_style(focused));
        let value = if focused {
            format!("← {} →", self.priority_label())
        } else {
            self.priority_label().to_string()
        };
        frame.render_widget(
            Paragraph::new(value).style(theme.text_style()).block(block),
            area,
        );
    }

    fn render_status_line(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let line = if let Some(error) = &self.error {
            Line::from(Span::styled(error.clone(), theme.error_style()))
        } else if self.submitting {
            Line::from(Span::styled("Saving...", Style::default().fg(theme.secondary)))
        } else {
            Line::default()
        };
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
    }

    fn render_submit(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        let label = match (&self.mode, self.submitting) {
            (_, true) => " Saving... ",
            (FormMode::Create, false) => " [Enter] Create Issue ",
            (FormMode::Edit { .. }, false) => " [Enter] Save Changes ",
        };
        let style = if focused {
            Style::default()
                .fg(theme.background)
                .bg(theme.success)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.success)
        };
        frame.render_widget(
            Paragraph::new(Span::styled(label, style)).alignment(Alignment::Center),
            area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn press(form: &mut IssueForm, code: KeyCode) -> Option<FormAction> {
        form.handle_input(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(form: &mut IssueForm, text: &str) {
        for c in text.chars() {
            press(form, KeyCode::Char(c));
        }
    }

    fn focus_on(form: &mut IssueForm, field: FormField) {
        while form.focus() != field {
            press(form, KeyCode::Tab);
        }
    }

    fn issue() -> Issue {
        Issue {
            id: "ENG-7".to_string(),
            linear_id: "abc".to_string(),
            title: "Crash on save".to_string(),
            description: "Stack trace attached".to_string(),
            status: "In Progress".to_string(),
            priority: "High".to_string(),
            assignee: "Grace Hopper".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_field_focus_cycles_both_ways() {
        let mut form = IssueForm::create();
        for _ in 0..FormField::ORDER.len() {
            press(&mut form, KeyCode::Tab);
        }
        assert_eq!(form.focus(), FormField::Title);

        press(&mut form, KeyCode::BackTab);
        assert_eq!(form.focus(), FormField::Submit);
    }

    #[test]
    fn test_submit_requires_title() {
        let mut form = IssueForm::create();
        focus_on(&mut form, FormField::Submit);

        assert_eq!(press(&mut form, KeyCode::Enter), None);
        assert_eq!(form.error(), Some("Title is required"));
        assert_eq!(form.focus(), FormField::Title);
        assert!(!form.is_submitting());
    }

    #[test]
    fn test_submit_builds_draft() {
        let mut form = IssueForm::create();
        type_str(&mut form, "Fix bug");
        focus_on(&mut form, FormField::Priority);
        press(&mut form, KeyCode::Down);
        press(&mut form, KeyCode::Down);
        focus_on(&mut form, FormField::Submit);

        let action = press(&mut form, KeyCode::Enter);
        assert_eq!(
            action,
            Some(FormAction::Submit(IssueDraft::new("Fix bug", "", "High", "")))
        );
        assert!(form.is_submitting());
    }

    #[test]
    fn test_input_ignored_while_submitting() {
        let mut form = IssueForm::create();
        type_str(&mut form, "Title");
        focus_on(&mut form, FormField::Submit);
        press(&mut form, KeyCode::Enter);

        assert_eq!(press(&mut form, KeyCode::Esc), None);
        form.fail("Linear returned an error");
        assert!(!form.is_submitting());
        assert_eq!(press(&mut form, KeyCode::Esc), Some(FormAction::Cancel));
    }

    #[test]
    fn test_enter_advances_fields() {
        let mut form = IssueForm::create();
        press(&mut form, KeyCode::Enter);
        assert_eq!(form.focus(), FormField::Description);
    }

    #[test]
    fn test_priority_stays_in_range() {
        let mut form = IssueForm::create();
        focus_on(&mut form, FormField::Priority);
        press(&mut form, KeyCode::Up);
        assert_eq!(form.priority_label(), "None");
        for _ in 0..10 {
            press(&mut form, KeyCode::Down);
        }
        assert_eq!(form.priority_label(), "Low");
    }

    #[test]
    fn test_edit_prefills_from_issue() {
        let form = IssueForm::edit(&issue());
        assert_eq!(
            form.mode(),
            &FormMode::Edit {
                linear_id: "abc".to_string(),
                identifier: "ENG-7".to_string(),
            }
        );
        let draft = form.draft();
        assert_eq!(draft.title, "Crash on save");
        assert_eq!(draft.status, "In Progress");
        assert_eq!(draft.priority, "High");
        assert_eq!(draft.assignee, "Grace Hopper");
    }
}
