//! Application state machine.
//!
//! `App` follows The Elm Architecture: [`App::update`] is a reducer that
//! takes one [`Event`] at a time, mutates state synchronously, and returns an
//! [`Effect`] describing the work the main loop should start. It never
//! touches the network, so the whole state machine is testable by feeding
//! events and inspecting state and effects.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tracing::{debug, info, trace, warn};

use crate::domain::{Issue, IssueDraft, Project};
use crate::error::AppError;
use crate::events::{is_quit, is_shortcut, Event};
use crate::service::WorkspaceData;
use crate::tasks::ApiMessage;
use crate::ui::components::{render_help_bar, ErrorChoice, ErrorModal, LoadingIndicator};
use crate::ui::theme::Theme;
use crate::ui::views::{
    DetailContent, DetailView, FormAction, FormMode, HelpAction, HelpView, IssueForm, ListAction,
    ListView, MainView, MenuAction, MenuView,
};

/// Load lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    /// The first load (or a manual refresh) is in flight.
    #[default]
    Loading,
    /// Data is loaded and displayed.
    Ready,
    /// The last load failed; the error modal is up.
    Error,
    /// A load requested from the error modal is in flight.
    Retrying,
}

/// The pane that receives keys when no modal is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusedPane {
    Menu,
    #[default]
    Main,
    Detail,
}

impl FocusedPane {
    /// The next pane in tab order, skipping a hidden detail pane.
    pub fn next(self, detail_visible: bool) -> Self {
        match self {
            FocusedPane::Menu => FocusedPane::Main,
            FocusedPane::Main if detail_visible => FocusedPane::Detail,
            FocusedPane::Main | FocusedPane::Detail => FocusedPane::Menu,
        }
    }

    /// The previous pane in tab order, skipping a hidden detail pane.
    pub fn prev(self, detail_visible: bool) -> Self {
        match self {
            FocusedPane::Menu if detail_visible => FocusedPane::Detail,
            FocusedPane::Menu | FocusedPane::Detail => FocusedPane::Main,
            FocusedPane::Main => FocusedPane::Menu,
        }
    }
}

/// Work requested by [`App::update`], carried out by `TaskSpawner`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Effect {
    #[default]
    None,
    LoadData,
    RefreshIssue(String),
    CreateIssue(IssueDraft),
    UpdateIssue {
        linear_id: String,
        draft: IssueDraft,
    },
    Quit,
}

/// One widget per focus target.
#[derive(Debug, Default)]
struct Panes {
    menu: MenuView,
    issues: ListView,
    projects: ListView,
    detail: DetailView,
}

/// The main application struct that holds all state.
pub struct App {
    state: AppState,
    focus: FocusedPane,
    detail_visible: bool,
    main_view: MainView,
    issues: Vec<Issue>,
    projects: Vec<Project>,
    last_error: Option<AppError>,
    panes: Panes,
    error_modal: Option<ErrorModal>,
    issue_form: Option<IssueForm>,
    help: Option<HelpView>,
    loading: LoadingIndicator,
    theme: Theme,
    should_quit: bool,
}

impl App {
    /// Create the application.
    ///
    /// Without a service there is no way to load anything, so the app starts
    /// in `Error` with the missing-key message in the error modal.
    pub fn new(has_service: bool) -> Self {
        let mut app = Self {
            state: AppState::Loading,
            focus: FocusedPane::Main,
            detail_visible: true,
            main_view: MainView::Issues,
            issues: Vec::new(),
            projects: Vec::new(),
            last_error: None,
            panes: Panes::default(),
            error_modal: None,
            issue_form: None,
            help: None,
            loading: LoadingIndicator::default(),
            theme: Theme::default(),
            should_quit: false,
        };

        if has_service {
            app.loading.start("Loading issues...");
        } else {
            app.fail(AppError::MissingApiKey);
        }
        app
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// The effect to run before the first event.
    pub fn init(&self) -> Effect {
        match self.state {
            AppState::Loading => Effect::LoadData,
            _ => Effect::None,
        }
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn focus(&self) -> FocusedPane {
        self.focus
    }

    pub fn main_view(&self) -> MainView {
        self.main_view
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn last_error(&self) -> Option<&AppError> {
        self.last_error.as_ref()
    }

    pub fn error_modal(&self) -> Option<&ErrorModal> {
        self.error_modal.as_ref()
    }

    pub fn issue_form(&self) -> Option<&IssueForm> {
        self.issue_form.as_ref()
    }

    /// Whether a modal currently owns keyboard input.
    pub fn has_modal(&self) -> bool {
        self.error_modal.is_some() || self.issue_form.is_some() || self.help.is_some()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// The issue under the issue list cursor.
    pub fn get_selected_issue(&self) -> Option<&Issue> {
        self.issues.get(self.panes.issues.selected())
    }

    fn get_selected_project(&self) -> Option<&Project> {
        self.projects.get(self.panes.projects.selected())
    }

    /// Update the application state based on an event.
    ///
    /// Resizes need no state change here. Every pane is laid out from the
    /// frame area on the next draw, so the new size reaches the widgets then.
    pub fn update(&mut self, event: Event) -> Effect {
        match event {
            Event::Key(key) => {
                trace!(key = ?key.code, modifiers = ?key.modifiers, "Key event");
                self.handle_key(key)
            }
            Event::Resize(width, height) => {
                trace!(width, height, "Terminal resize event");
                Effect::None
            }
            Event::Tick => {
                self.loading.tick();
                Effect::None
            }
            Event::Api(message) => self.handle_api(message),
        }
    }

    fn quit(&mut self) -> Effect {
        info!("Quit requested");
        self.should_quit = true;
        Effect::Quit
    }

    fn fail(&mut self, error: AppError) {
        warn!(error = %error, "Load failed");
        self.loading.stop();
        self.error_modal = Some(ErrorModal::from_error(&error));
        self.last_error = Some(error);
        self.state = AppState::Error;
    }

    fn retry(&mut self) -> Effect {
        info!("Retrying load");
        self.error_modal = None;
        self.state = AppState::Retrying;
        self.loading.start("Retrying...");
        Effect::LoadData
    }

    fn refresh(&mut self) -> Effect {
        if self.state != AppState::Ready {
            debug!(state = ?self.state, "Refresh ignored while not ready");
            return Effect::None;
        }
        info!("Manual refresh");
        self.state = AppState::Loading;
        self.loading.start("Refreshing...");
        Effect::LoadData
    }

    fn handle_key(&mut self, key: KeyEvent) -> Effect {
        if let Some(modal) = self.error_modal.as_mut() {
            return match modal.handle_input(key) {
                Some(ErrorChoice::Retry) => self.retry(),
                Some(ErrorChoice::Quit) => self.quit(),
                None => Effect::None,
            };
        }

        if let Some(form) = self.issue_form.as_mut() {
            return match form.handle_input(key) {
                Some(FormAction::Cancel) => {
                    debug!("Issue form cancelled");
                    self.issue_form = None;
                    Effect::None
                }
                Some(FormAction::Submit(draft)) => match form.mode() {
                    FormMode::Create => Effect::CreateIssue(draft),
                    FormMode::Edit { linear_id, .. } => Effect::UpdateIssue {
                        linear_id: linear_id.clone(),
                        draft,
                    },
                },
                None => Effect::None,
            };
        }

        if let Some(help) = self.help.as_mut() {
            if help.handle_input(key) == Some(HelpAction::Close) {
                self.help = None;
            }
            return Effect::None;
        }

        if is_quit(&key) {
            return self.quit();
        }

        match (key.code, key.modifiers) {
            (KeyCode::Tab, KeyModifiers::NONE) => {
                self.focus = self.focus.next(self.detail_visible);
                return Effect::None;
            }
            (KeyCode::BackTab, _) | (KeyCode::Tab, KeyModifiers::SHIFT) => {
                self.focus = self.focus.prev(self.detail_visible);
                return Effect::None;
            }
            (KeyCode::Esc, _) => {
                self.focus = FocusedPane::Main;
                return Effect::None;
            }
            (KeyCode::Char('d'), KeyModifiers::CONTROL) => {
                self.toggle_detail();
                return Effect::None;
            }
            _ => {}
        }

        if is_shortcut(&key, 'r') {
            return self.refresh();
        }
        if is_shortcut(&key, 'c') {
            debug!("Opening create form");
            self.issue_form = Some(IssueForm::create());
            return Effect::None;
        }
        if is_shortcut(&key, 'e') {
            self.open_edit_form();
            return Effect::None;
        }
        if is_shortcut(&key, '?') {
            self.help = Some(HelpView::default());
            return Effect::None;
        }

        self.handle_pane_key(key);
        Effect::None
    }

    fn handle_pane_key(&mut self, key: KeyEvent) {
        match self.focus {
            FocusedPane::Menu => {
                if let Some(MenuAction::Open(view)) = self.panes.menu.handle_input(key) {
                    debug!(view = view.title(), "Switching main view");
                    self.main_view = view;
                    self.panes.detail.reset_scroll();
                    self.focus = FocusedPane::Main;
                }
            }
            FocusedPane::Main => {
                let (list, len) = match self.main_view {
                    MainView::Issues => (&mut self.panes.issues, self.issues.len()),
                    MainView::Projects => (&mut self.panes.projects, self.projects.len()),
                };
                let before = list.selected();
                let action = list.handle_input(key, len);
                if list.selected() != before {
                    self.panes.detail.reset_scroll();
                }
                if action == Some(ListAction::OpenDetail) {
                    self.detail_visible = true;
                    self.focus = FocusedPane::Detail;
                }
            }
            FocusedPane::Detail => self.panes.detail.handle_input(key),
        }
    }

    fn toggle_detail(&mut self) {
        self.detail_visible = !self.detail_visible;
        if !self.detail_visible && self.focus == FocusedPane::Detail {
            self.focus = FocusedPane::Main;
        }
    }

    fn open_edit_form(&mut self) {
        if self.main_view != MainView::Issues {
            return;
        }
        let form = self.get_selected_issue().map(IssueForm::edit);
        match form {
            Some(form) => {
                debug!("Opening edit form");
                self.issue_form = Some(form);
            }
            None => debug!("No issue selected to edit"),
        }
    }

    fn handle_api(&mut self, message: ApiMessage) -> Effect {
        match message {
            ApiMessage::DataLoaded(result) => self.handle_data_loaded(result),
            ApiMessage::IssueRefreshed { linear_id, result } => {
                match result {
                    Ok(issue) => {
                        if !self.patch_issue(issue) {
                            debug!(%linear_id, "Refreshed issue is no longer listed");
                        }
                    }
                    Err(e) => warn!(%linear_id, error = %e, "Issue refresh failed"),
                }
                Effect::None
            }
            ApiMessage::IssueCreated(result) => {
                match result {
                    Ok(issue) => {
                        info!(issue = %issue.id, "Issue created");
                        self.issue_form = None;
                        self.issues.insert(0, issue);
                        self.panes.issues.select(0);
                    }
                    Err(e) => self.fail_form(e),
                }
                Effect::None
            }
            ApiMessage::IssueUpdated { linear_id, result } => match result {
                Ok(issue) => {
                    info!(issue = %issue.id, "Issue updated");
                    self.issue_form = None;
                    self.patch_issue(issue);
                    Effect::RefreshIssue(linear_id)
                }
                Err(e) => {
                    self.fail_form(e);
                    Effect::None
                }
            },
        }
    }

    fn handle_data_loaded(&mut self, result: Result<WorkspaceData, AppError>) -> Effect {
        if !matches!(self.state, AppState::Loading | AppState::Retrying) {
            debug!(state = ?self.state, "Ignoring load result");
            return Effect::None;
        }

        match result {
            Ok(data) => {
                info!(
                    issues = data.issues.len(),
                    projects = data.projects.len(),
                    "Workspace loaded"
                );
                self.issues = data.issues;
                self.projects = data.projects;
                self.panes.issues.clamp(self.issues.len());
                self.panes.projects.clamp(self.projects.len());
                self.last_error = None;
                self.loading.stop();
                self.state = AppState::Ready;
            }
            Err(e) => self.fail(e),
        }
        Effect::None
    }

    /// Replace the issue with the same Linear ID. Returns whether one matched.
    fn patch_issue(&mut self, issue: Issue) -> bool {
        let Some(index) = self
            .issues
            .iter()
            .position(|existing| existing.linear_id == issue.linear_id)
        else {
            return false;
        };
        self.issues[index] = issue;

        if index == self.panes.issues.selected() {
            debug!("Selected issue refreshed");
            self.panes.detail.reset_scroll();
        }
        true
    }

    fn fail_form(&mut self, error: AppError) {
        warn!(error = %error, "Issue mutation failed");
        match self.issue_form.as_mut() {
            Some(form) => form.fail(error.user_message()),
            None => debug!("Mutation result arrived with no form open"),
        }
    }

    /// Render the application UI.
    pub fn view(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_header(frame, chunks[0]);
        self.render_panes(frame, chunks[1]);
        render_help_bar(frame, chunks[2], self.hints(), &self.theme);

        if let Some(help) = self.help.as_mut() {
            help.render(frame, area, &self.theme);
        }
        if let Some(form) = &self.issue_form {
            form.render(frame, area, &self.theme);
        }
        if let Some(modal) = &self.error_modal {
            modal.render(frame, area, &self.theme);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(self.theme.muted_style());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(24)])
            .split(inner);

        let title = Line::from(vec![
            Span::styled(" LazyLinear ", self.theme.title_style()),
            Span::styled(format!("│ {}", self.main_view.title()), self.theme.text_style()),
        ]);
        frame.render_widget(Paragraph::new(title), chunks[0]);

        if self.loading.is_active() {
            self.loading.render(frame, chunks[1], &self.theme);
        } else {
            let status = match self.state {
                AppState::Error => Span::styled("error ", self.theme.error_style()),
                _ => Span::styled("ready ", self.theme.muted_style()),
            };
            frame.render_widget(
                Paragraph::new(Line::from(status)).alignment(Alignment::Right),
                chunks[1],
            );
        }
    }

    fn render_panes(&self, frame: &mut Frame, area: Rect) {
        let mut constraints = vec![Constraint::Length(16), Constraint::Min(20)];
        if self.detail_visible {
            constraints.push(Constraint::Percentage(40));
        }
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(area);
        // A modal owns the input, so no pane shows focus beneath it.
        let focused = |pane: FocusedPane| !self.has_modal() && self.focus == pane;

        self.panes.menu.render(
            frame,
            chunks[0],
            focused(FocusedPane::Menu),
            self.main_view,
            &self.theme,
        );

        let main_focused = focused(FocusedPane::Main);
        match self.main_view {
            MainView::Issues => self.panes.issues.render_issues(
                frame,
                chunks[1],
                &self.issues,
                main_focused,
                &self.theme,
            ),
            MainView::Projects => self.panes.projects.render_projects(
                frame,
                chunks[1],
                &self.projects,
                main_focused,
                &self.theme,
            ),
        }

        if self.detail_visible {
            let content = match self.main_view {
                MainView::Issues => self
                    .get_selected_issue()
                    .map_or(DetailContent::Empty, DetailContent::Issue),
                MainView::Projects => self
                    .get_selected_project()
                    .map_or(DetailContent::Empty, DetailContent::Project),
            };
            self.panes.detail.render(
                frame,
                chunks[2],
                content,
                focused(FocusedPane::Detail),
                &self.theme,
            );
        }
    }

    fn hints(&self) -> &'static str {
        if self.error_modal.is_some() {
            return " [←/→] choose  [Enter] confirm  [r] retry  [q] quit";
        }
        if let Some(form) = &self.issue_form {
            if form.is_submitting() {
                return " Saving...";
            }
            return " [Tab] next field  [↑/↓] priority  [Enter] submit  [Esc] cancel";
        }
        if self.help.is_some() {
            return " [j/k] scroll  [?/Esc] close";
        }
        match self.focus {
            FocusedPane::Menu => " [h/l] select  [Enter] open  [Tab] focus  [?] help  [q] quit",
            FocusedPane::Main => {
                " [j/k] move  [Enter] detail  [c] create  [e] edit  [r] refresh  [?] help  [q] quit"
            }
            FocusedPane::Detail => " [j/k] scroll  [e] edit  [Ctrl+d] hide  [Esc] back  [?] help",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::service::ServiceError;
    use chrono::{TimeZone, Utc};
    use ratatui::{backend::TestBackend, Terminal};

    fn issue(n: usize) -> Issue {
        Issue {
            id: format!("ENG-{}", n),
            linear_id: format!("lin-{}", n),
            title: format!("Issue {}", n),
            description: String::new(),
            status: "Todo".to_string(),
            priority: "Normal".to_string(),
            assignee: "Unassigned".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    fn project(n: usize) -> Project {
        Project {
            id: format!("p{}", n),
            name: format!("Project {}", n),
            description: String::new(),
            status: "started".to_string(),
            progress: 0.25,
            created_at: None,
        }
    }

    fn workspace(issues: usize, projects: usize) -> WorkspaceData {
        WorkspaceData {
            issues: (1..=issues).map(issue).collect(),
            projects: (1..=projects).map(project).collect(),
        }
    }

    fn network_failure() -> AppError {
        AppError::Service(ServiceError::new(
            "failed to fetch issues from Linear API",
            ApiError::network("connection refused"),
        ))
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn loaded(result: Result<WorkspaceData, AppError>) -> Event {
        Event::Api(ApiMessage::DataLoaded(result))
    }

    fn ready_app() -> App {
        let mut app = App::new(true);
        app.update(loaded(Ok(workspace(5, 3))));
        assert_eq!(app.state(), AppState::Ready);
        app
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            app.update(key(KeyCode::Char(c)));
        }
    }

    /// Tab through the form fields to the submit button and press Enter.
    fn submit_form(app: &mut App) -> Effect {
        for _ in 0..5 {
            app.update(key(KeyCode::Tab));
        }
        app.update(key(KeyCode::Enter))
    }

    #[test]
    fn test_new_with_service_starts_loading() {
        let app = App::new(true);
        assert_eq!(app.state(), AppState::Loading);
        assert_eq!(app.focus(), FocusedPane::Main);
        assert_eq!(app.init(), Effect::LoadData);
        assert!(!app.has_modal());
    }

    #[test]
    fn test_new_without_service_shows_error_modal() {
        let app = App::new(false);
        assert_eq!(app.state(), AppState::Error);
        assert_eq!(app.init(), Effect::None);
        assert!(matches!(app.last_error(), Some(AppError::MissingApiKey)));
        assert_eq!(
            app.error_modal().unwrap().message(),
            "Linear API key not configured."
        );
    }

    #[test]
    fn test_first_load_selects_first_issue() {
        let app = ready_app();
        assert_eq!(app.issues().len(), 5);
        assert_eq!(app.projects().len(), 3);
        assert_eq!(app.get_selected_issue().unwrap().id, "ENG-1");
        assert!(app.last_error().is_none());
    }

    #[test]
    fn test_failed_load_then_retry_succeeds() {
        let mut app = App::new(true);
        app.update(loaded(Err(network_failure())));

        assert_eq!(app.state(), AppState::Error);
        let modal = app.error_modal().unwrap();
        assert_eq!(modal.selected(), ErrorChoice::Retry);
        assert!(modal.message().contains("Connection failed"));

        assert_eq!(app.update(key(KeyCode::Enter)), Effect::LoadData);
        assert_eq!(app.state(), AppState::Retrying);
        assert!(app.error_modal().is_none());

        app.update(loaded(Ok(workspace(2, 1))));
        assert_eq!(app.state(), AppState::Ready);
        assert!(app.last_error().is_none());
        assert_eq!(app.issues().len(), 2);
    }

    #[test]
    fn test_failed_retry_returns_to_error() {
        let mut app = App::new(true);
        app.update(loaded(Err(network_failure())));
        app.update(key(KeyCode::Char('r')));
        app.update(loaded(Err(network_failure())));
        assert_eq!(app.state(), AppState::Error);
        assert!(app.error_modal().is_some());
    }

    #[test]
    fn test_quit_from_error_modal() {
        let mut app = App::new(false);
        app.update(key(KeyCode::Right));
        assert!(!app.should_quit());

        assert_eq!(app.update(key(KeyCode::Enter)), Effect::Quit);
        assert!(app.should_quit());
    }

    #[test]
    fn test_ctrl_c_quits_through_modal() {
        let mut app = App::new(false);
        assert_eq!(app.update(ctrl('c')), Effect::Quit);
        assert!(app.should_quit());
    }

    #[test]
    fn test_tab_cycles_back_to_start_from_each_pane() {
        for start in [FocusedPane::Menu, FocusedPane::Main, FocusedPane::Detail] {
            let mut app = ready_app();
            app.focus = start;
            for _ in 0..3 {
                app.update(key(KeyCode::Tab));
            }
            assert_eq!(app.focus(), start);
        }
    }

    #[test]
    fn test_tab_order() {
        let mut app = ready_app();
        app.update(key(KeyCode::Tab));
        assert_eq!(app.focus(), FocusedPane::Detail);
        app.update(key(KeyCode::Tab));
        assert_eq!(app.focus(), FocusedPane::Menu);
        app.update(key(KeyCode::BackTab));
        assert_eq!(app.focus(), FocusedPane::Detail);
    }

    #[test]
    fn test_hidden_detail_is_skipped() {
        let mut app = ready_app();
        app.update(ctrl('d'));
        assert!(!app.detail_visible);

        app.update(key(KeyCode::Tab));
        assert_eq!(app.focus(), FocusedPane::Menu);
        app.update(key(KeyCode::Tab));
        assert_eq!(app.focus(), FocusedPane::Main);
        app.update(key(KeyCode::BackTab));
        assert_eq!(app.focus(), FocusedPane::Menu);
        app.update(key(KeyCode::BackTab));
        assert_eq!(app.focus(), FocusedPane::Main);
    }

    #[test]
    fn test_hiding_focused_detail_moves_focus_to_main() {
        let mut app = ready_app();
        app.update(key(KeyCode::Tab));
        assert_eq!(app.focus(), FocusedPane::Detail);
        app.update(ctrl('d'));
        assert_eq!(app.focus(), FocusedPane::Main);
    }

    #[test]
    fn test_esc_returns_focus_to_main() {
        let mut app = ready_app();
        app.update(key(KeyCode::BackTab));
        assert_eq!(app.focus(), FocusedPane::Menu);
        app.update(key(KeyCode::Esc));
        assert_eq!(app.focus(), FocusedPane::Main);
    }

    #[test]
    fn test_error_modal_blocks_focus_cycling() {
        let mut app = App::new(true);
        app.update(loaded(Err(network_failure())));
        app.update(key(KeyCode::Tab));
        app.update(key(KeyCode::BackTab));
        app.update(key(KeyCode::Esc));
        assert_eq!(app.focus(), FocusedPane::Main);
        assert!(app.error_modal().is_some());
    }

    #[test]
    fn test_issue_form_blocks_focus_cycling() {
        let mut app = ready_app();
        app.update(key(KeyCode::Char('c')));
        assert!(app.has_modal());

        app.update(key(KeyCode::Tab));
        assert_eq!(app.focus(), FocusedPane::Main);
        type_str(&mut app, "q");
        assert!(!app.should_quit());
    }

    #[test]
    fn test_help_overlay_blocks_focus_cycling() {
        let mut app = ready_app();
        app.update(key(KeyCode::Char('?')));
        assert!(app.help.is_some());
        app.update(key(KeyCode::Tab));
        assert_eq!(app.focus(), FocusedPane::Main);

        app.update(key(KeyCode::Esc));
        assert!(!app.help.is_some());
    }

    #[test]
    fn test_manual_refresh_keeps_data() {
        let mut app = ready_app();
        assert_eq!(app.update(key(KeyCode::Char('r'))), Effect::LoadData);
        assert_eq!(app.state(), AppState::Loading);
        assert_eq!(app.issues().len(), 5);

        assert_eq!(app.update(key(KeyCode::Char('r'))), Effect::None);

        app.update(loaded(Ok(workspace(6, 3))));
        assert_eq!(app.state(), AppState::Ready);
        assert_eq!(app.issues().len(), 6);
    }

    #[test]
    fn test_load_result_ignored_when_ready() {
        let mut app = ready_app();
        app.update(loaded(Err(network_failure())));
        assert_eq!(app.state(), AppState::Ready);
        assert!(app.error_modal().is_none());
    }

    #[test]
    fn test_cursor_clamped_when_reload_shrinks_list() {
        let mut app = ready_app();
        for _ in 0..4 {
            app.update(key(KeyCode::Char('j')));
        }
        assert_eq!(app.get_selected_issue().unwrap().id, "ENG-5");

        app.update(key(KeyCode::Char('r')));
        app.update(loaded(Ok(workspace(2, 0))));
        assert_eq!(app.get_selected_issue().unwrap().id, "ENG-2");
    }

    #[test]
    fn test_issue_refresh_patches_by_linear_id() {
        let mut app = ready_app();
        app.update(key(KeyCode::Char('j')));

        let mut refreshed = issue(2);
        refreshed.title = "Renamed".to_string();
        let effect = app.update(Event::Api(ApiMessage::IssueRefreshed {
            linear_id: "lin-2".to_string(),
            result: Ok(refreshed),
        }));

        assert_eq!(effect, Effect::None);
        assert_eq!(app.get_selected_issue().unwrap().title, "Renamed");
        assert_eq!(app.issues().len(), 5);
        assert_eq!(app.state(), AppState::Ready);
    }

    #[test]
    fn test_issue_refresh_failure_is_silent() {
        let mut app = ready_app();
        app.update(Event::Api(ApiMessage::IssueRefreshed {
            linear_id: "lin-1".to_string(),
            result: Err(network_failure()),
        }));
        assert_eq!(app.state(), AppState::Ready);
        assert!(!app.has_modal());
        assert_eq!(app.issues()[0].title, "Issue 1");
    }

    #[test]
    fn test_create_issue_flow() {
        let mut app = ready_app();
        app.update(key(KeyCode::Char('c')));
        type_str(&mut app, "Fix bug");

        let effect = submit_form(&mut app);
        assert_eq!(
            effect,
            Effect::CreateIssue(IssueDraft::new("Fix bug", "", "None", ""))
        );
        assert!(app.issue_form().unwrap().is_submitting());
        assert_eq!(app.hints(), " Saving...");

        let mut created = issue(9);
        created.title = "Fix bug".to_string();
        app.update(Event::Api(ApiMessage::IssueCreated(Ok(created))));

        assert!(app.issue_form().is_none());
        assert_eq!(app.issues().len(), 6);
        assert_eq!(app.get_selected_issue().unwrap().title, "Fix bug");
    }

    #[test]
    fn test_create_failure_keeps_form_open() {
        let mut app = ready_app();
        app.update(key(KeyCode::Char('c')));
        type_str(&mut app, "Fix bug");
        submit_form(&mut app);

        app.update(Event::Api(ApiMessage::IssueCreated(Err(AppError::Service(
            ServiceError::new(
                "failed to create issue",
                ApiError::api("GraphQL errors: title too long", 200),
            ),
        )))));

        let form = app.issue_form().unwrap();
        assert!(!form.is_submitting());
        assert!(form.error().unwrap().contains("title too long"));
        assert_eq!(app.issues().len(), 5);
        assert_eq!(app.state(), AppState::Ready);
    }

    #[test]
    fn test_esc_cancels_form() {
        let mut app = ready_app();
        app.update(key(KeyCode::Char('c')));
        app.update(key(KeyCode::Esc));
        assert!(app.issue_form().is_none());
        assert_eq!(app.focus(), FocusedPane::Main);
    }

    #[test]
    fn test_edit_issue_flow() {
        let mut app = ready_app();
        app.update(key(KeyCode::Char('j')));
        app.update(key(KeyCode::Char('e')));
        assert!(matches!(
            app.issue_form().unwrap().mode(),
            FormMode::Edit { linear_id, .. } if linear_id == "lin-2"
        ));

        match submit_form(&mut app) {
            Effect::UpdateIssue { linear_id, draft } => {
                assert_eq!(linear_id, "lin-2");
                assert_eq!(draft.title, "Issue 2");
            }
            other => panic!("expected an update, got {:?}", other),
        }

        let mut updated = issue(2);
        updated.status = "Done".to_string();
        let effect = app.update(Event::Api(ApiMessage::IssueUpdated {
            linear_id: "lin-2".to_string(),
            result: Ok(updated),
        }));

        assert_eq!(effect, Effect::RefreshIssue("lin-2".to_string()));
        assert!(app.issue_form().is_none());
        assert_eq!(app.get_selected_issue().unwrap().status, "Done");
    }

    #[test]
    fn test_edit_needs_issues_view() {
        let mut app = ready_app();
        app.main_view = MainView::Projects;
        app.update(key(KeyCode::Char('e')));
        assert!(app.issue_form().is_none());
    }

    #[test]
    fn test_menu_switches_main_view() {
        let mut app = ready_app();
        app.update(key(KeyCode::BackTab));
        app.update(key(KeyCode::Right));
        app.update(key(KeyCode::Enter));

        assert_eq!(app.main_view(), MainView::Projects);
        assert_eq!(app.focus(), FocusedPane::Main);
    }

    #[test]
    fn test_enter_opens_detail() {
        let mut app = ready_app();
        app.update(ctrl('d'));
        app.update(key(KeyCode::Enter));
        assert!(app.detail_visible);
        assert_eq!(app.focus(), FocusedPane::Detail);
    }

    #[test]
    fn test_tick_advances_spinner_while_loading() {
        let mut app = App::new(true);
        let before = app.loading.spinner_frame();
        app.update(Event::Tick);
        assert_ne!(app.loading.spinner_frame(), before);
    }

    #[test]
    fn test_resize_relays_out_on_next_draw() {
        let mut app = ready_app();
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| app.view(frame)).unwrap();

        assert_eq!(app.update(Event::Resize(60, 20)), Effect::None);
        assert_eq!(app.state(), AppState::Ready);

        terminal.backend_mut().resize(60, 20);
        let frame = terminal.draw(|frame| app.view(frame)).unwrap();
        assert_eq!(frame.area, Rect::new(0, 0, 60, 20));
    }

    #[test]
    fn test_quit_key() {
        let mut app = ready_app();
        assert_eq!(app.update(key(KeyCode::Char('q'))), Effect::Quit);
        assert!(app.should_quit());

        let mut app = ready_app();
        assert_eq!(app.update(ctrl('c')), Effect::Quit);
        assert!(app.should_quit());
    }
}
