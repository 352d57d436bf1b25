use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Focus, LoadState};
use crate::form::{FormField, TaskForm};
use crate::task_list::TaskList;

const TITLE: &str = "TO-DO LIST";
const QUOTE: &str = "Consistency beats intensity";
pub const LOADING_MESSAGE: &str = "Loading tasks...";

pub fn draw(f: &mut Frame<'_>, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_navbar(f, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[1]);

    draw_form(f, columns[0], &app.form, app.focus() == Focus::Form);
    draw_tasks(f, columns[1], app);
    draw_hints(f, rows[2], app);

    if let Some(message) = app.notice() {
        draw_notice(f, message);
    }
}

fn draw_navbar(f: &mut Frame<'_>, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            TITLE,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(QUOTE, Style::default().add_modifier(Modifier::ITALIC)),
    ]);
    let navbar = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(navbar, area);
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn draw_form(f: &mut Frame<'_>, area: Rect, form: &TaskForm, focused: bool) {
    let block = Block::default()
        .title("Add a Task")
        .borders(Borders::ALL)
        .border_style(focus_style(focused));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let field = |label: &'static str, value: &str, which: FormField, placeholder: &'static str| {
        let active = focused && form.field == which;
        let text = if value.is_empty() && !active {
            Line::from(Span::styled(placeholder, Style::default().fg(Color::DarkGray)))
        } else if active {
            Line::from(format!("{value}_"))
        } else {
            Line::from(value.to_string())
        };
        Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(label)
                    .borders(Borders::ALL)
                    .border_style(focus_style(active)),
            )
    };

    f.render_widget(
        field("Title", &form.title, FormField::Title, "Enter task title"),
        rows[0],
    );
    f.render_widget(
        field(
            "Description",
            &form.description,
            FormField::Description,
            "Enter task description",
        ),
        rows[1],
    );

    if let Some(error) = form.error() {
        f.render_widget(
            Paragraph::new(Span::styled(error, Style::default().fg(Color::Red))),
            rows[2],
        );
    }

    let button = if form.is_submitting() {
        Span::styled("Adding...", Style::default().fg(Color::Yellow))
    } else {
        Span::styled("[Enter] Add Task", Style::default().add_modifier(Modifier::BOLD))
    };
    f.render_widget(Paragraph::new(button), rows[3]);
}

fn draw_tasks(f: &mut Frame<'_>, area: Rect, app: &App) {
    let title = match app.load_state() {
        LoadState::Refreshing => "Recent Tasks (refreshing)",
        _ => "Recent Tasks",
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(focus_style(app.focus() == Focus::List));
    let inner = block.inner(area);
    f.render_widget(block, area);

    match app.load_state() {
        LoadState::Loading => {
            f.render_widget(Paragraph::new(LOADING_MESSAGE), inner);
        }
        LoadState::Failed(message) => {
            let banner = Paragraph::new(vec![
                Line::from(vec![
                    Span::styled("Connection Error: ", Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(message.as_str()),
                ]),
                Line::from("[r] Retry Connection"),
            ])
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Red)));
            f.render_widget(banner, inner);
        }
        LoadState::Ready | LoadState::Refreshing => {
            let list = TaskList {
                tasks: app.tasks(),
                cards: app.cards(),
                pending: app.pending(),
                selected: app.selected(),
            };
            f.render_widget(list, inner);
        }
    }
}

fn draw_hints(f: &mut Frame<'_>, area: Rect, app: &App) {
    let hint = match app.focus() {
        Focus::Form => "Tab next field | Enter add | Esc tasks | Ctrl+C quit",
        Focus::List => "j/k move | d done | e edit | r retry | Tab form | q quit",
    };
    f.render_widget(
        Paragraph::new(Span::styled(hint, Style::default().fg(Color::DarkGray))),
        area,
    );
}

fn draw_notice(f: &mut Frame<'_>, message: &str) {
    let area = centered_rect(50, 5, f.area());
    let popup = Paragraph::new(vec![
        Line::from(message),
        Line::from(""),
        Line::from(Span::styled("[Enter] OK", Style::default().add_modifier(Modifier::BOLD))),
    ])
    .block(
        Block::default()
            .title("Notice")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );
    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

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

/// Flattens a rendered buffer into newline-separated rows.
#[cfg(test)]
pub(crate) fn buffer_text(buf: &ratatui::buffer::Buffer) -> String {
    let area = buf.area;
    let mut text = String::new();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            text.push_str(buf[(x, y)].symbol());
        }
        text.push('\n');
    }
    text
}
