use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::error::RetailError;

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Domain errors read well as they are; anything else shows its root cause.
pub(crate) fn surface_error(err: &Error) -> String {
    if let Some(retail) = err.downcast_ref::<RetailError>() {
        return retail.to_string();
    }
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

/// True for errors the user caused, which are logged below `error`.
pub(crate) fn is_user_error(err: &Error) -> bool {
    err.downcast_ref::<RetailError>().is_some()
}

/// `[key] label` pairs for the footer.
pub(crate) fn key_hints(pairs: &[(&'static str, &'static str)]) -> Line<'static> {
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let mut spans = Vec::with_capacity(pairs.len() * 2);
    for (index, (key, label)) in pairs.iter().enumerate() {
        spans.push(Span::styled(format!("[{key}]"), key_style));
        if index + 1 == pairs.len() {
            spans.push(Span::raw(format!(" {label}")));
        } else {
            spans.push(Span::raw(format!(" {label}   ")));
        }
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn retail_errors_keep_their_own_message() {
        let err = anyhow::Error::from(RetailError::NotAuthorized);
        assert_eq!(
            surface_error(&err),
            "Must be logged in as a manager or administrator to use this function."
        );
        assert!(is_user_error(&err));
    }

    #[test]
    fn other_errors_show_the_root_cause() {
        let result: anyhow::Result<()> = Err(anyhow::anyhow!("disk full")).context("failed to insert order");
        let err = result.err().map(|err| surface_error(&err));
        assert_eq!(err.as_deref(), Some("disk full"));
    }

    #[test]
    fn centered_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered_rect(60, 50, area);
        assert_eq!(popup.width, 60);
        assert_eq!(popup.height, 20);
        assert_eq!(popup.x, 20);
        assert_eq!(popup.y, 10);
    }

    #[test]
    fn key_hints_alternate_keys_and_labels() {
        let line = key_hints(&[("q", "Quit"), ("Esc", "Back")]);
        let text: String = line.spans.iter().map(|span| span.content.to_string()).collect();
        assert_eq!(text, "[q] Quit   [Esc] Back");
    }
}
