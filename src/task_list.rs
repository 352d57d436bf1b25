use std::collections::HashMap;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Paragraph, Widget},
};

use crate::card::{CardView, TaskCard};
use crate::task::{Task, TaskId};

pub const EMPTY_MESSAGE: &str = "No tasks yet. Add one to get started!";

/// Cards for a task sequence, or the empty placeholder. Holds no state of
/// its own; card states come from the shell keyed by task id.
pub struct TaskList<'a> {
    pub tasks: &'a [Task],
    pub cards: &'a HashMap<TaskId, TaskCard>,
    /// In-flight complete/update requests per task.
    pub pending: &'a HashMap<TaskId, usize>,
    pub selected: Option<usize>,
}

static VIEWING: TaskCard = TaskCard::Viewing;

impl<'a> TaskList<'a> {
    fn views(&self) -> Vec<CardView<'a>> {
        let Self {
            tasks,
            cards,
            pending,
            selected,
        } = *self;
        tasks
            .iter()
            .enumerate()
            .map(|(index, task)| CardView {
                task,
                card: cards.get(&task.id).unwrap_or(&VIEWING),
                selected: selected == Some(index),
                pending: pending.contains_key(&task.id),
            })
            .collect()
    }
}

/// First card to draw so that the selected one fits in `height` rows.
fn first_visible(heights: &[u16], selected: usize, height: u16) -> usize {
    let mut first = 0;
    let mut used: u32 = heights[..=selected].iter().copied().map(u32::from).sum();
    while used > u32::from(height) && first < selected {
        used -= u32::from(heights[first]);
        first += 1;
    }
    first
}

impl Widget for TaskList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.tasks.is_empty() {
            Paragraph::new(EMPTY_MESSAGE)
                .style(Style::default().fg(Color::DarkGray))
                .render(area, buf);
            return;
        }

        let views = self.views();
        let heights: Vec<u16> = views.iter().map(CardView::height).collect();
        let selected = self.selected.unwrap_or(0).min(views.len() - 1);
        let first = first_visible(&heights, selected, area.height);

        let mut y = area.y;
        let bottom = area.y + area.height;
        for (view, height) in views.into_iter().zip(heights).skip(first) {
            if y >= bottom {
                break;
            }
            let card_area = Rect {
                x: area.x,
                y,
                width: area.width,
                height: height.min(bottom - y),
            };
            view.render(card_area, buf);
            y += height;
        }
    }
}
