//! Terminal user interface: reusable components, panes, and the theme.

pub mod components;
pub mod theme;
pub mod views;

use ratatui::layout::Rect;

pub use theme::Theme;

/// A `width` x `height` rectangle centered in `area`, clipped to it.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
