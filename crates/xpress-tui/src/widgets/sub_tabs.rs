//! Horizontal sub-tab bar for filter choices within a screen (stock status,
//! vendor status, role picker).

use ratatui::style::Modifier;
use ratatui::text::{Line, Span};

use crate::theme;

/// Renders a horizontal tab bar line with the active tab highlighted.
///
/// The active tab gets Electric Purple + brackets; inactive tabs get Dim White.
pub fn render_sub_tabs<'a>(prefix: &'a str, labels: &[&'a str], active_index: usize) -> Line<'a> {
    let mut spans = Vec::with_capacity(labels.len() * 2 + 1);
    if !prefix.is_empty() {
        spans.push(Span::styled(prefix, theme::key_hint()));
    }

    for (i, label) in labels.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  ", theme::key_hint()));
        }

        if i == active_index {
            spans.push(Span::styled(
                format!("[{label}]"),
                theme::tab_active().add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(*label, theme::tab_inactive()));
        }
    }

    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_tab_is_bracketed() {
        let line = render_sub_tabs(" Stock: ", &["All", "In Stock", "Low Stock"], 1);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, " Stock: All  [In Stock]  Low Stock");
    }
}
