use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::form::{is_text, FormField};
use crate::task::{Task, TaskId};

pub const FIELDS_REQUIRED: &str = "Title and description are required";

/// Unsaved values of a card being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub name: String,
    pub description: String,
    pub field: FormField,
    pub error: Option<String>,
}

impl Draft {
    fn seeded(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            description: task.description.clone(),
            field: FormField::Title,
            error: None,
        }
    }

    fn field_mut(&mut self) -> &mut String {
        match self.field {
            FormField::Title => &mut self.name,
            FormField::Description => &mut self.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TaskCard {
    #[default]
    Viewing,
    Editing(Draft),
}

/// Requests a card hands up to the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardAction {
    None,
    Complete(TaskId),
    Edit(Task),
}

impl TaskCard {
    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing(_))
    }

    pub fn draft(&self) -> Option<&Draft> {
        match self {
            Self::Viewing => None,
            Self::Editing(draft) => Some(draft),
        }
    }

    pub fn complete(&self, task: &Task) -> CardAction {
        CardAction::Complete(task.id)
    }

    pub fn begin_edit(&mut self, task: &Task) {
        *self = Self::Editing(Draft::seeded(task));
    }

    pub fn cancel(&mut self) {
        *self = Self::Viewing;
    }

    /// Validates the draft. On success the card returns to viewing and the
    /// task overlaid with the trimmed values is handed back; otherwise the
    /// card stays in editing with an error.
    pub fn save(&mut self, task: &Task) -> CardAction {
        let Self::Editing(draft) = self else {
            return CardAction::None;
        };
        let name = draft.name.trim();
        let description = draft.description.trim();
        if name.is_empty() || description.is_empty() {
            draft.error = Some(FIELDS_REQUIRED.to_string());
            return CardAction::None;
        }
        let updated = task.with_fields(name.to_string(), description.to_string());
        *self = Self::Viewing;
        CardAction::Edit(updated)
    }

    pub fn handle_key(&mut self, task: &Task, key: KeyEvent) -> CardAction {
        match self {
            Self::Viewing => match key.code {
                KeyCode::Char('d') => self.complete(task),
                KeyCode::Char('e') => {
                    self.begin_edit(task);
                    CardAction::None
                }
                _ => CardAction::None,
            },
            Self::Editing(draft) => match key.code {
                KeyCode::Enter => self.save(task),
                KeyCode::Esc => {
                    self.cancel();
                    CardAction::None
                }
                KeyCode::Tab | KeyCode::BackTab => {
                    draft.field = match draft.field {
                        FormField::Title => FormField::Description,
                        FormField::Description => FormField::Title,
                    };
                    CardAction::None
                }
                KeyCode::Backspace => {
                    draft.field_mut().pop();
                    draft.error = None;
                    CardAction::None
                }
                KeyCode::Char(c) if is_text(&key) => {
                    draft.field_mut().push(c);
                    draft.error = None;
                    CardAction::None
                }
                _ => CardAction::None,
            },
        }
    }
}

/// One task drawn in the list, in whichever state its card is in.
pub struct CardView<'a> {
    pub task: &'a Task,
    pub card: &'a TaskCard,
    pub selected: bool,
    pub pending: bool,
}

impl CardView<'_> {
    pub fn height(&self) -> u16 {
        if self.card.is_editing() {
            6
        } else {
            5
        }
    }

    fn viewing_lines(&self) -> Vec<Line<'_>> {
        let mut header = vec![Span::styled(
            self.task.name.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        let created = self.task.created_label();
        if !created.is_empty() {
            header.push(Span::styled(
                format!("  {created}"),
                Style::default().fg(Color::DarkGray),
            ));
        }
        if self.task.completed {
            header.push(Span::styled("  (done)", Style::default().fg(Color::Green)));
        }
        let actions = if self.pending {
            Line::from(Span::styled("Saving...", Style::default().fg(Color::Yellow)))
        } else {
            Line::from("[d] Done  [e] Edit")
        };
        vec![
            Line::from(header),
            Line::from(self.task.description.as_str()),
            actions,
        ]
    }

    fn editing_lines<'b>(draft: &'b Draft) -> Vec<Line<'b>> {
        let field = |label: &'static str, value: &'b str, focused: bool| {
            let style = if focused {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            };
            let cursor = if focused { "_" } else { "" };
            Line::from(vec![
                Span::styled(label, style),
                Span::raw(value),
                Span::raw(cursor),
            ])
        };
        let error = draft.error.as_deref().map_or_else(Line::default, |message| {
            Line::from(Span::styled(message, Style::default().fg(Color::Red)))
        });
        vec![
            field("Title: ", &draft.name, draft.field == FormField::Title),
            field(
                "Description: ",
                &draft.description,
                draft.field == FormField::Description,
            ),
            error,
            Line::from("[Enter] Save  [Esc] Cancel"),
        ]
    }
}

impl Widget for CardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = match self.card.draft() {
            Some(draft) => Self::editing_lines(draft),
            None => self.viewing_lines(),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(if self.selected {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            });
        Paragraph::new(lines).block(block).render(area, buf);
    }
}
