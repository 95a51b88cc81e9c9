//! Terminal UI rendering.

pub mod form;
pub mod login;
pub mod stats_panel;
pub mod status_bar;
pub mod task_list;
pub mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

use crate::app::{App, Mode, Screen};

/// Main draw function for the entire UI.
pub fn draw(frame: &mut Frame, app: &App) {
    if app.screen == Screen::Login {
        login::render(frame, frame.area(), app);
        return;
    }

    // Content area with status bar at the bottom.
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    let content_area = main_chunks[0];
    let status_area = main_chunks[1];

    // Task list on the left, stats on the right.
    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(72), Constraint::Percentage(28)])
        .split(content_area);

    task_list::render(frame, content_chunks[0], app);
    stats_panel::render(frame, content_chunks[1], app);

    // The task form floats over the list when open.
    if app.mode == Mode::Form {
        form::render(frame, centered_rect(60, 16, frame.area()), app);
    }

    status_bar::render(frame, status_area, app);
}

/// Render `value` with a block cursor at the given character index.
pub(crate) fn with_cursor(value: &str, cursor: usize) -> String {
    let byte_idx = value
        .char_indices()
        .nth(cursor)
        .map_or(value.len(), |(i, _)| i);
    let mut display = value.to_string();
    display.insert(byte_idx, '█');
    display
}

/// A centered rectangle of at most `width` x `height` cells.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
