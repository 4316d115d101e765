use std::cmp::min;
use std::ops::Range;

use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;

use crate::models::Book;

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

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

/// Window of `capacity` items out of `len` that keeps `selected` visible.
pub(crate) fn visible_window(selected: usize, capacity: usize, len: usize) -> Range<usize> {
    let capacity = capacity.max(1);
    let mut start = if selected >= capacity {
        selected + 1 - capacity
    } else {
        0
    };
    if start + capacity > len {
        start = len.saturating_sub(capacity);
    }
    start..min(start + capacity, len)
}

/// Green "Read" / red "Unread" badge.
pub(crate) fn read_badge(book: &Book) -> Span<'static> {
    let color = if book.read_status {
        Color::Green
    } else {
        Color::Red
    };
    Span::styled(
        format!(" {} ", book.status_label()),
        Style::default()
            .fg(Color::White)
            .bg(color)
            .add_modifier(Modifier::BOLD),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_follows_selection() {
        assert_eq!(visible_window(0, 3, 10), 0..3);
        assert_eq!(visible_window(5, 3, 10), 3..6);
        assert_eq!(visible_window(9, 3, 10), 7..10);
        assert_eq!(visible_window(1, 5, 2), 0..2);
    }

    #[test]
    fn surface_error_prefers_root_cause() {
        let err = anyhow::anyhow!("disk full").context("failed to save");
        assert_eq!(surface_error(&err), "disk full");
    }
}
