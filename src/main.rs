//! LazyLinear - A terminal-based user interface for Linear
//!
//! Browse issues and projects, and create or edit issues, without leaving
//! the terminal.

mod api;
mod app;
mod config;
mod domain;
mod error;
mod events;
mod logging;
mod service;
mod tasks;
mod ui;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::api::{DiagnosticSink, FileSink, LinearClient, NoopSink};
use crate::app::App;
use crate::config::Config;
use crate::error::AppError;
use crate::events::{Event, EventHandler};
use crate::service::LinearService;
use crate::tasks::{create_task_channel, ApiMessage, TaskSpawner};
use crate::ui::Theme;

/// Terminal UI for Linear.
#[derive(Debug, Parser)]
#[command(name = "lazylinear", version, about)]
struct Cli {
    /// Read configuration from this file instead of the default location.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Record every API request and response to the diagnostics log.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("Warning: logging disabled: {e}");
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .map_err(|e| {
        let e = AppError::from(e);
        eprintln!("{}", e.user_message());
        e
    })
    .context("failed to load configuration")?;
    config.debug_mode |= cli.debug;

    let service = build_service(&config)?;
    let app = App::new(service.is_some()).with_theme(Theme::from_config(&config.theme));

    let (tx, rx) = create_task_channel();
    let spawner = TaskSpawner::new(tx, service.clone());

    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, app, spawner, rx);
    restore_terminal(&mut terminal)?;

    if let Some(service) = &service {
        service.shutdown();
    }

    logging::shutdown();
    if let Err(e) = &result {
        error!(error = ?e, "Application error");
    }
    result
}

/// Build the service when an API key is configured.
fn build_service(config: &Config) -> Result<Option<Arc<LinearService>>> {
    let Some(api_key) = config.api_key() else {
        warn!("No Linear API key configured");
        return Ok(None);
    };

    let client = LinearClient::from_api_key(api_key, diagnostic_sink(config))
        .context("failed to create Linear client")?;
    Ok(Some(Arc::new(LinearService::new(client))))
}

fn diagnostic_sink(config: &Config) -> Arc<dyn DiagnosticSink> {
    if !config.debug_mode {
        return Arc::new(NoopSink);
    }
    let Some(path) = logging::diagnostics_path() else {
        warn!("Debug mode requested but no log directory is available");
        return Arc::new(NoopSink);
    };
    match FileSink::open(&path) {
        Ok(sink) => {
            info!(path = %path.display(), "Writing request diagnostics");
            Arc::new(sink)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not open diagnostics log");
            Arc::new(NoopSink)
        }
    }
}

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Draw, drain finished tasks, wait for input, and run the resulting effects
/// until the app asks to quit.
fn run(
    terminal: &mut Tui,
    mut app: App,
    spawner: TaskSpawner,
    mut rx: mpsc::UnboundedReceiver<ApiMessage>,
) -> Result<()> {
    let handler = EventHandler::new();
    spawner.dispatch(app.init());

    while !app.should_quit() {
        terminal.draw(|frame| app.view(frame))?;

        while let Ok(message) = rx.try_recv() {
            let effect = app.update(Event::Api(message));
            spawner.dispatch(effect);
        }

        let effect = app.update(handler.next()?);
        spawner.dispatch(effect);
    }

    info!("Event loop finished");
    Ok(())
}
