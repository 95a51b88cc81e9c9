//! New/edit task form rendering.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::theme;
use crate::app::{App, FormField, Input};

/// Render the task form as a floating box over the list.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(form) = &app.form else {
        return;
    };

    let title = if form.target.is_some() {
        " Edit task "
    } else {
        " New task "
    };
    let block = Block::default()
        .title(Span::styled(title, theme::panel_title(theme::TASKS_TITLE)))
        .borders(Borders::ALL)
        .border_style(theme::highlighted());
    let inner = block.inner(area);

    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // title
            Constraint::Length(2), // description
            Constraint::Length(2), // tags
            Constraint::Length(2), // due date
            Constraint::Length(2), // priority
            Constraint::Length(1), // error
            Constraint::Min(1),    // help
        ])
        .split(inner);

    render_field(frame, rows[0], "Title", &form.title, form.focus == FormField::Title);
    render_field(
        frame,
        rows[1],
        "Description",
        &form.description,
        form.focus == FormField::Description,
    );
    render_field(frame, rows[2], "Tags", &form.tags, form.focus == FormField::Tags);
    render_field(frame, rows[3], "Due date", &form.due_date, form.focus == FormField::DueDate);

    let priority_focused = form.focus == FormField::Priority;
    let priority_line = Line::from(vec![
        Span::styled(
            format!("{:>12}: ", "Priority"),
            if priority_focused {
                theme::highlighted()
            } else {
                theme::dimmed()
            },
        ),
        Span::styled(
            format!("< {} >", form.priority),
            theme::normal().fg(theme::priority_color(form.priority)),
        ),
    ]);
    frame.render_widget(Paragraph::new(priority_line), rows[4]);

    if let Some(error) = &app.error {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(error.as_str(), theme::error()))),
            rows[5],
        );
    }

    let help = Line::from(Span::styled(
        "Enter: save | Tab: next field | Space: cycle priority | Esc: cancel",
        theme::dimmed(),
    ));
    frame.render_widget(Paragraph::new(help), rows[6]);
}

fn render_field(frame: &mut Frame, area: Rect, label: &str, input: &Input, focused: bool) {
    let text = if focused {
        super::with_cursor(&input.value, input.cursor)
    } else {
        input.value.clone()
    };
    let label_style = if focused {
        theme::highlighted()
    } else {
        theme::dimmed()
    };
    let line = Line::from(vec![
        Span::styled(format!("{label:>12}: "), label_style),
        Span::styled(text, theme::normal()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
