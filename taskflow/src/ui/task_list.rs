//! Task list rendering.

use ratatui::{
    Frame,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

use taskflow_proto::task::Task;

use super::theme;
use crate::app::{App, Mode};

/// Render the task list with the active search/filter/sort in the title.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let visible = app.visible_tasks();

    let items: Vec<ListItem> = visible
        .iter()
        .enumerate()
        .map(|(idx, task)| {
            let line = task_line(task, &app.date_format);
            let style = if idx == app.selected && app.mode != Mode::Search {
                theme::selected()
            } else {
                theme::normal()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let mut title = format!(
        " Tasks [{} / {}] ",
        app.view.filter.label(),
        app.view.sort.label()
    );
    if app.mode == Mode::Search {
        title.push_str(&format!("search: {} ", super::with_cursor(&app.search.value, app.search.cursor)));
    } else if !app.view.query.is_empty() {
        title.push_str(&format!("search: {} ", app.view.query));
    }

    let block = Block::default()
        .title(Span::styled(title, theme::panel_title(theme::TASKS_TITLE)))
        .borders(Borders::ALL)
        .border_style(if app.mode == Mode::Search {
            theme::highlighted()
        } else {
            theme::normal()
        });

    frame.render_widget(List::new(items).block(block), area);
}

/// One display row: checkbox, star, priority, title, tags, due date.
fn task_line<'a>(task: &'a Task, date_format: &str) -> Line<'a> {
    let checkbox = if task.completed { "[✓]" } else { "[ ]" };
    let star = if task.starred() { "★" } else { " " };

    let title_style = if task.completed {
        theme::dimmed().add_modifier(Modifier::CROSSED_OUT)
    } else {
        theme::normal()
    };

    let mut spans = vec![
        Span::styled(checkbox, theme::dimmed()),
        Span::raw(" "),
        Span::styled(star, theme::normal().fg(theme::STAR)),
        Span::raw(" "),
        Span::styled(
            format!("[{}]", task.priority()),
            theme::normal().fg(theme::priority_color(task.priority())),
        ),
        Span::raw(" "),
        Span::styled(task.title.as_str(), title_style),
    ];

    for tag in task.tags() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!("#{tag}"), theme::dimmed()));
    }

    if let Some(due) = &task.due_date {
        // Server dates are YYYY-MM-DD; unparsable values render as-is.
        let shown = chrono::NaiveDate::parse_from_str(due, "%Y-%m-%d")
            .map_or_else(|_| due.clone(), |d| d.format(date_format).to_string());
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            format!("due {shown}"),
            theme::normal().fg(theme::WARNING),
        ));
    }

    Line::from(spans)
}
