//! Screens and panes.

mod detail;
mod help;
mod issue_form;
mod list;
mod menu;

pub use detail::{DetailContent, DetailView};
pub use help::{HelpAction, HelpView};
pub use issue_form::{FormAction, FormMode, IssueForm};
pub use list::{ListAction, ListView};
pub use menu::{MainView, MenuAction, MenuView};
