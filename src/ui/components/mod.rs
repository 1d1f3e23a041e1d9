//! Reusable UI components.

mod error_modal;
mod help_bar;
mod input;
mod loading;

pub use error_modal::{ErrorChoice, ErrorModal};
pub use help_bar::render_help_bar;
pub use input::TextInput;
pub use loading::LoadingIndicator;
