use std::collections::HashMap;
use std::mem;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::card::{CardAction, TaskCard};
use crate::form::{is_text, FormEvent, FormField, TaskForm};
use crate::protocol::{Request, Response};
use crate::task::{Task, TaskId};

pub const CONNECTION_ERROR: &str = "Could not connect to server. Please try again.";
pub const COMPLETE_FAILED: &str = "Error completing task";
pub const UPDATE_FAILED: &str = "Error updating task";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    /// Re-fetching while the previous list stays on screen.
    Refreshing,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Form,
    List,
}

/// Application shell: owns the task collection and turns user intent into
/// backend requests. Requests are queued and picked up by the runtime with
/// [`App::take_requests`]; their outcomes come back through
/// [`App::handle_response`].
#[derive(Debug)]
pub struct App {
    tasks: Vec<Task>,
    cards: HashMap<TaskId, TaskCard>,
    pending: HashMap<TaskId, usize>,
    pub form: TaskForm,
    load: LoadState,
    focus: Focus,
    selected: usize,
    notice: Option<String>,
    outbox: Vec<Request>,
    pub should_quit: bool,
}

impl App {
    /// A fresh shell with the initial fetch already queued.
    pub fn new() -> Self {
        let mut app = Self {
            tasks: Vec::new(),
            cards: HashMap::new(),
            pending: HashMap::new(),
            form: TaskForm::default(),
            load: LoadState::Loading,
            focus: Focus::Form,
            selected: 0,
            notice: None,
            outbox: Vec::new(),
            should_quit: false,
        };
        app.fetch_tasks();
        app
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn cards(&self) -> &HashMap<TaskId, TaskCard> {
        &self.cards
    }

    pub fn pending(&self) -> &HashMap<TaskId, usize> {
        &self.pending
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Index of the highlighted card, if any card is shown.
    pub fn selected(&self) -> Option<usize> {
        (self.shows_list() && !self.tasks.is_empty()).then_some(self.selected)
    }

    /// Whether the task list is on screen (after the first successful fetch
    /// and outside a connection error).
    pub fn shows_list(&self) -> bool {
        matches!(self.load, LoadState::Ready | LoadState::Refreshing)
    }

    pub fn take_requests(&mut self) -> Vec<Request> {
        mem::take(&mut self.outbox)
    }

    fn send(&mut self, request: Request) {
        debug!(?request, "queueing request");
        self.outbox.push(request);
    }

    pub fn fetch_tasks(&mut self) {
        self.load = match self.load {
            LoadState::Ready | LoadState::Refreshing => LoadState::Refreshing,
            LoadState::Loading | LoadState::Failed(_) => LoadState::Loading,
        };
        self.send(Request::FetchTasks);
    }

    /// Re-issues the list fetch after a connection error.
    pub fn retry(&mut self) {
        if matches!(self.load, LoadState::Failed(_)) {
            self.fetch_tasks();
        }
    }

    pub fn on_task_added(&mut self) {
        self.fetch_tasks();
    }

    pub fn complete_task(&mut self, id: TaskId) {
        self.begin_pending(id);
        self.send(Request::Complete(id));
    }

    pub fn edit_task(&mut self, task: Task) {
        self.begin_pending(task.id);
        self.send(Request::Update(task));
    }

    fn begin_pending(&mut self, id: TaskId) {
        *self.pending.entry(id).or_default() += 1;
    }

    /// A task stays pending until every request issued for it has answered.
    fn finish_pending(&mut self, id: TaskId) {
        if let Some(count) = self.pending.get_mut(&id) {
            *count -= 1;
            if *count == 0 {
                self.pending.remove(&id);
            }
        }
    }

    pub fn handle_response(&mut self, response: Response) {
        match response {
            Response::Fetched(Ok(tasks)) => self.replace_tasks(tasks),
            Response::Fetched(Err(_)) => {
                self.load = LoadState::Failed(CONNECTION_ERROR.to_string());
            }
            Response::Created(outcome) => {
                if self.form.finish(&outcome) {
                    self.on_task_added();
                }
            }
            Response::Completed(id, outcome) => {
                self.finish_pending(id);
                match outcome {
                    Ok(()) => self.fetch_tasks(),
                    Err(_) => self.notify(COMPLETE_FAILED),
                }
            }
            Response::Updated(id, outcome) => {
                self.finish_pending(id);
                match outcome {
                    Ok(()) => self.fetch_tasks(),
                    Err(_) => self.notify(UPDATE_FAILED),
                }
            }
        }
    }

    fn replace_tasks(&mut self, tasks: Vec<Task>) {
        self.cards
            .retain(|id, _| tasks.iter().any(|task| task.id == *id));
        self.selected = self.selected.min(tasks.len().saturating_sub(1));
        self.tasks = tasks;
        self.load = LoadState::Ready;
    }

    fn notify(&mut self, message: &str) {
        self.notice = Some(message.to_string());
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.notice.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.notice = None;
            }
            return;
        }

        match self.focus {
            Focus::Form => match self.form.handle_key(key) {
                FormEvent::Submit(task) => self.send(Request::Create(task)),
                FormEvent::Leave => self.focus = Focus::List,
                FormEvent::None => {}
            },
            Focus::List => self.handle_list_key(key),
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        if let Some(task) = self.selected().map(|index| self.tasks[index].clone()) {
            let card = self.cards.entry(task.id).or_default();
            if card.is_editing() || (is_text(&key) && matches!(key.code, KeyCode::Char('d' | 'e'))) {
                match card.handle_key(&task, key) {
                    CardAction::Complete(id) => self.complete_task(id),
                    CardAction::Edit(updated) => self.edit_task(updated),
                    CardAction::None => {}
                }
                return;
            }
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') => self.retry(),
            KeyCode::Tab => self.focus_form(FormField::Title),
            KeyCode::BackTab => self.focus_form(FormField::Description),
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.tasks.len() {
                    self.selected += 1;
                }
            }
            _ => {}
        }
    }

    fn focus_form(&mut self, field: FormField) {
        self.form.field = field;
        self.focus = Focus::Form;
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
