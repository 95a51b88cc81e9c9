//! Status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::{App, Mode};

/// Render the status bar at the bottom of the screen.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    // A pending confirmation or error takes over the whole bar.
    if let Some(confirm) = app.confirm {
        let line = Line::from(Span::styled(confirm.prompt(), theme::bold()));
        frame.render_widget(Paragraph::new(line).style(theme::status_bar_bg()), area);
        return;
    }
    if let Some(error) = &app.error {
        let line = Line::from(Span::styled(error.as_str(), theme::error()));
        frame.render_widget(Paragraph::new(line).style(theme::status_bar_bg()), area);
        return;
    }

    let help_text = match app.mode {
        Mode::Normal => {
            "n: new | e: edit | d: delete | Space: done | s: star | /: search | f: filter | o: sort | r: refresh | L: logout | q: quit"
        }
        Mode::Search => "Enter: apply | Esc: clear",
        Mode::Form => "Enter: save | Tab: next field | Esc: cancel",
        Mode::Confirm => "y/n",
    };

    let who = app
        .user
        .as_ref()
        .map_or_else(String::new, |u| u.display_name().to_string());

    let mut spans = vec![
        Span::styled(who, theme::bold()),
        Span::raw(" | "),
        Span::styled(help_text, theme::dimmed()),
    ];
    if app.busy {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled("syncing…", theme::normal().fg(theme::WARNING)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}
