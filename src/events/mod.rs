//! Event handling for the application.
//!
//! Terminal input, ticks, and background task results all arrive as an
//! [`Event`] and are fed to `App::update` one at a time.

mod handler;
mod keys;

use crossterm::event::KeyEvent;

use crate::tasks::ApiMessage;

pub use handler::EventHandler;
pub use keys::{help_sections, is_quit, is_shortcut, HelpSection};

/// Everything the application reacts to.
#[derive(Debug)]
pub enum Event {
    /// A key press from the terminal.
    Key(KeyEvent),
    /// The terminal was resized.
    Resize(u16, u16),
    /// No input within the tick rate; drives animations.
    Tick,
    /// A background operation finished.
    Api(ApiMessage),
}
