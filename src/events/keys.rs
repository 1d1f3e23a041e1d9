//! Key binding helpers and the help table.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Whether `key` is `q` or Ctrl+C.
pub fn is_quit(key: &KeyEvent) -> bool {
    matches!(
        (key.code, key.modifiers),
        (KeyCode::Char('q'), KeyModifiers::NONE) | (KeyCode::Char('c'), KeyModifiers::CONTROL)
    )
}

/// Whether `key` is the plain character `c`, optionally with Shift.
///
/// Crossterm reports uppercase letters with the Shift modifier on some
/// terminals and without it on others.
pub fn is_shortcut(key: &KeyEvent, c: char) -> bool {
    key.code == KeyCode::Char(c) && key.modifiers.difference(KeyModifiers::SHIFT).is_empty()
}

/// One row of the help overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelpEntry {
    pub keys: &'static str,
    pub description: &'static str,
}

/// A titled group of help rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelpSection {
    pub title: &'static str,
    pub entries: &'static [HelpEntry],
}

const fn entry(keys: &'static str, description: &'static str) -> HelpEntry {
    HelpEntry { keys, description }
}

const GLOBAL: &[HelpEntry] = &[
    entry("Tab / Shift+Tab", "Cycle focus between panes"),
    entry("Esc", "Return focus to the main list"),
    entry("r", "Reload issues and projects"),
    entry("c", "Create an issue"),
    entry("Ctrl+d", "Show or hide the detail pane"),
    entry("?", "Toggle this help"),
    entry("q / Ctrl+c", "Quit"),
];

const MENU: &[HelpEntry] = &[
    entry("h / l, Left / Right", "Select a view"),
    entry("Enter", "Open the selected view"),
];

const LIST: &[HelpEntry] = &[
    entry("j / k, Down / Up", "Move selection"),
    entry("g / G", "First / last item"),
    entry("Enter", "Show details"),
    entry("e", "Edit the selected issue"),
];

const DETAIL: &[HelpEntry] = &[
    entry("j / k, Down / Up", "Scroll"),
    entry("e", "Edit the issue"),
];

const FORM: &[HelpEntry] = &[
    entry("Tab / Shift+Tab", "Next / previous field"),
    entry("Up / Down", "Change priority"),
    entry("Enter", "Submit (on the submit button)"),
    entry("Esc", "Cancel"),
];

const ERROR: &[HelpEntry] = &[
    entry("Left / Right", "Choose Retry or Quit"),
    entry("Enter / Space", "Confirm"),
    entry("r", "Retry"),
];

/// All help sections in display order.
pub fn help_sections() -> &'static [HelpSection] {
    const SECTIONS: &[HelpSection] = &[
        HelpSection { title: "Global", entries: GLOBAL },
        HelpSection { title: "Menu", entries: MENU },
        HelpSection { title: "Lists", entries: LIST },
        HelpSection { title: "Detail", entries: DETAIL },
        HelpSection { title: "Issue form", entries: FORM },
        HelpSection { title: "Error dialog", entries: ERROR },
    ];
    SECTIONS
}
