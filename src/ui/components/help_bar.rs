//! Footer line of key hints.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::ui::theme::Theme;

/// Render `hints` on one line. Bracketed keys stand out from the text.
pub fn render_help_bar(frame: &mut Frame, area: Rect, hints: &str, theme: &Theme) {
    let line = Line::from(hint_spans(hints, theme));
    frame.render_widget(Paragraph::new(line), area);
}

/// Split hint text like `"[j/k] move  [?] help"` into styled spans.
fn hint_spans(hints: &str, theme: &Theme) -> Vec<Span<'static>> {
    let key_style = Style::default().fg(theme.secondary);
    let text_style = theme.muted_style();

    let mut spans = Vec::new();
    let mut rest = hints;
    while let Some(open) = rest.find('[') {
        let Some(close) = rest[open..].find(']').map(|i| open + i) else {
            break;
        };
        if open > 0 {
            spans.push(Span::styled(rest[..open].to_string(), text_style));
        }
        spans.push(Span::styled(rest[open..=close].to_string(), key_style));
        rest = &rest[close + 1..];
    }
    if !rest.is_empty() {
        spans.push(Span::styled(rest.to_string(), text_style));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(hints: &str) -> Vec<String> {
        hint_spans(hints, &Theme::default())
            .into_iter()
            .map(|span| span.content.into_owned())
            .collect()
    }

    #[test]
    fn test_keys_and_text_alternate() {
        assert_eq!(
            contents("[j/k] move  [?] help"),
            vec!["[j/k]", " move  ", "[?]", " help"]
        );
    }

    #[test]
    fn test_plain_and_empty() {
        assert_eq!(contents("just text"), vec!["just text"]);
        assert!(contents("").is_empty());
    }

    #[test]
    fn test_unclosed_bracket_is_text() {
        assert_eq!(contents("[Enter"), vec!["[Enter"]);
    }
}
