//! Stats panel rendering.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
};

use super::theme;
use crate::app::App;

/// Render the aggregate counters and progress gauges.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let stats = app.stats();

    let block = Block::default()
        .title(Span::styled(
            " Stats ",
            theme::panel_title(theme::STATS_TITLE),
        ))
        .borders(Borders::ALL)
        .border_style(theme::normal());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // counters
            Constraint::Length(2), // completion gauge
            Constraint::Length(2), // productivity gauge
            Constraint::Min(0),
        ])
        .split(inner);

    let counters = vec![
        Line::from(vec![
            Span::styled("Total: ", theme::dimmed()),
            Span::styled(stats.total.to_string(), theme::bold()),
            Span::styled("  Active: ", theme::dimmed()),
            Span::styled(stats.active.to_string(), theme::bold()),
            Span::styled("  Done: ", theme::dimmed()),
            Span::styled(stats.completed.to_string(), theme::bold()),
        ]),
        Line::from(vec![
            Span::styled("Starred: ", theme::dimmed()),
            Span::styled(stats.starred.to_string(), theme::normal().fg(theme::STAR)),
        ]),
        Line::from(vec![
            Span::styled("High: ", theme::dimmed()),
            Span::styled(
                stats.high_priority.to_string(),
                theme::normal().fg(theme::ERROR),
            ),
            Span::styled("  Med: ", theme::dimmed()),
            Span::styled(
                stats.medium_priority.to_string(),
                theme::normal().fg(theme::WARNING),
            ),
            Span::styled("  Low: ", theme::dimmed()),
            Span::styled(stats.low_priority.to_string(), theme::normal()),
        ]),
    ];
    frame.render_widget(Paragraph::new(counters), rows[0]);

    let completion = Gauge::default()
        .label(format!("Completed {}%", stats.completion_rate))
        .gauge_style(theme::normal().fg(theme::SUCCESS))
        .percent(u16::from(stats.completion_rate));
    frame.render_widget(completion, rows[1]);

    let productivity = Gauge::default()
        .label(format!("Productivity {}", stats.productivity_score))
        .gauge_style(theme::normal().fg(theme::HIGHLIGHT))
        .percent(u16::from(stats.productivity_score));
    frame.render_widget(productivity, rows[2]);
}
