//! Login / registration screen rendering.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::theme;
use crate::app::{App, Input, LoginField};

/// Render the login screen centered in the terminal.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let box_area = super::centered_rect(50, 14, area);

    let title = if app.login.registering {
        "TaskFlow - Sign up"
    } else {
        "TaskFlow - Sign in"
    };
    let block = Block::default()
        .title(Span::styled(title, theme::panel_title(theme::TASKS_TITLE)))
        .borders(Borders::ALL)
        .border_style(theme::highlighted());
    let inner = block.inner(box_area);
    frame.render_widget(block, box_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // email
            Constraint::Length(2), // password
            Constraint::Length(2), // name (sign-up only)
            Constraint::Length(1), // error
            Constraint::Min(1),    // help
        ])
        .split(inner);

    let focus = app.login.focus.unwrap_or(LoginField::Email);
    render_field(frame, rows[0], "Email", &app.login.email, focus == LoginField::Email, false);
    render_field(
        frame,
        rows[1],
        "Password",
        &app.login.password,
        focus == LoginField::Password,
        true,
    );
    if app.login.registering {
        render_field(frame, rows[2], "Name", &app.login.name, focus == LoginField::Name, false);
    }

    if let Some(error) = &app.error {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(error.as_str(), theme::error()))),
            rows[3],
        );
    }

    let mode_hint = if app.login.registering {
        "Ctrl-R: switch to sign in"
    } else {
        "Ctrl-R: switch to sign up"
    };
    let help = Line::from(Span::styled(
        format!("Enter: submit | Tab: next field | {mode_hint} | Esc: quit"),
        theme::dimmed(),
    ));
    frame.render_widget(Paragraph::new(help), rows[4]);
}

/// Render one labeled input row, masking the value for passwords.
fn render_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    input: &Input,
    focused: bool,
    mask: bool,
) {
    let shown = if mask {
        "*".repeat(input.value.chars().count())
    } else {
        input.value.clone()
    };
    let text = if focused {
        super::with_cursor(&shown, input.cursor)
    } else {
        shown
    };
    let label_style = if focused {
        theme::highlighted()
    } else {
        theme::dimmed()
    };
    let line = Line::from(vec![
        Span::styled(format!("{label:>9}: "), label_style),
        Span::styled(text, theme::normal()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
