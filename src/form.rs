use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::api::ApiError;
use crate::task::NewTask;

pub const MISSING_FIELDS: &str = "Please fill in both title and description";
pub const CREATE_FAILED: &str = "Failed to add task. Please try again.";
pub const CREATE_UNREACHABLE: &str = "Failed to connect to server";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Title,
    Description,
}

/// What the shell should do after the form consumed a key.
#[derive(Debug, PartialEq, Eq)]
pub enum FormEvent {
    None,
    Submit(NewTask),
    Leave,
}

/// The "Add a Task" form.
#[derive(Debug, Default)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub field: FormField,
    submitting: bool,
    error: Option<String>,
}

impl TaskForm {
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormEvent {
        match key.code {
            KeyCode::Enter => self.submit().map_or(FormEvent::None, FormEvent::Submit),
            KeyCode::Esc => FormEvent::Leave,
            KeyCode::Tab => match self.field {
                FormField::Title => {
                    self.field = FormField::Description;
                    FormEvent::None
                }
                FormField::Description => {
                    self.field = FormField::Title;
                    FormEvent::Leave
                }
            },
            KeyCode::BackTab => {
                self.field = FormField::Title;
                FormEvent::None
            }
            KeyCode::Backspace => {
                self.field_mut().pop();
                self.error = None;
                FormEvent::None
            }
            KeyCode::Char(c) if is_text(&key) => {
                self.field_mut().push(c);
                self.error = None;
                FormEvent::None
            }
            _ => FormEvent::None,
        }
    }

    fn field_mut(&mut self) -> &mut String {
        match self.field {
            FormField::Title => &mut self.title,
            FormField::Description => &mut self.description,
        }
    }

    /// Validates the fields and, when both are filled, marks the form as
    /// submitting and returns the payload to send. A form that is already
    /// submitting ignores further submits.
    pub fn submit(&mut self) -> Option<NewTask> {
        if self.submitting {
            return None;
        }
        let name = self.title.trim();
        let description = self.description.trim();
        if name.is_empty() || description.is_empty() {
            self.error = Some(MISSING_FIELDS.to_string());
            return None;
        }
        let payload = NewTask {
            name: name.to_string(),
            description: description.to_string(),
        };
        self.submitting = true;
        self.error = None;
        Some(payload)
    }

    /// Applies the outcome of a create request. Returns true when the task
    /// was added and the list should be refreshed.
    pub fn finish(&mut self, outcome: &Result<(), ApiError>) -> bool {
        self.submitting = false;
        match outcome {
            Ok(()) => {
                self.title.clear();
                self.description.clear();
                self.field = FormField::Title;
                true
            }
            Err(err) => {
                let message = if err.is_transport() {
                    CREATE_UNREACHABLE
                } else {
                    CREATE_FAILED
                };
                self.error = Some(message.to_string());
                false
            }
        }
    }
}

/// Plain or shifted characters; chords with Ctrl or Alt are not text.
pub(crate) fn is_text(key: &KeyEvent) -> bool {
    !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use reqwest::StatusCode;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(form: &mut TaskForm, text: &str) {
        for c in text.chars() {
            form.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn filled(title: &str, description: &str) -> TaskForm {
        TaskForm {
            title: title.into(),
            description: description.into(),
            ..TaskForm::default()
        }
    }

    #[test]
    fn typing_goes_to_focused_field() {
        let mut form = TaskForm::default();
        type_text(&mut form, "Test Task");
        form.handle_key(key(KeyCode::Tab));
        type_text(&mut form, "Details");
        assert_eq!(form.title, "Test Task");
        assert_eq!(form.description, "Details");
    }

    #[test]
    fn control_chords_are_not_typed() {
        let mut form = TaskForm::default();
        form.handle_key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL));
        form.handle_key(KeyEvent::new(KeyCode::Char('b'), KeyModifiers::ALT));
        form.handle_key(KeyEvent::new(KeyCode::Char('C'), KeyModifiers::SHIFT));
        assert_eq!(form.title, "C");
    }

    #[test]
    fn tab_from_description_leaves_form() {
        let mut form = TaskForm::default();
        assert_eq!(form.handle_key(key(KeyCode::Tab)), FormEvent::None);
        assert_eq!(form.handle_key(key(KeyCode::Tab)), FormEvent::Leave);
        assert_eq!(form.field, FormField::Title);
    }

    #[test]
    fn submit_trims_values() {
        let mut form = filled("  Task 1 ", "\tDesc 1  ");
        let event = form.handle_key(key(KeyCode::Enter));
        assert_eq!(
            event,
            FormEvent::Submit(NewTask {
                name: "Task 1".into(),
                description: "Desc 1".into(),
            })
        );
        assert!(form.is_submitting());
    }

    #[test]
    fn blank_fields_are_rejected() {
        for (title, description) in [("", ""), ("   ", "desc"), ("title", " \t "), ("", "desc")] {
            let mut form = filled(title, description);
            assert_eq!(form.submit(), None);
            assert_eq!(form.error(), Some(MISSING_FIELDS));
            assert!(!form.is_submitting());
        }
    }

    #[test]
    fn editing_clears_validation_error() {
        let mut form = TaskForm::default();
        form.submit();
        assert!(form.error().is_some());
        type_text(&mut form, "a");
        assert_eq!(form.error(), None);

        form.submit();
        form.handle_key(key(KeyCode::Backspace));
        assert_eq!(form.error(), None);
    }

    #[test]
    fn pending_submit_blocks_another() {
        let mut form = filled("a", "b");
        assert!(form.submit().is_some());
        assert_eq!(form.submit(), None);
    }

    #[test]
    fn success_clears_fields() {
        let mut form = filled("a", "b");
        form.field = FormField::Description;
        form.submit();
        assert!(form.finish(&Ok(())));
        assert!(form.title.is_empty());
        assert!(form.description.is_empty());
        assert_eq!(form.field, FormField::Title);
        assert!(!form.is_submitting());
    }

    #[test]
    fn rejected_create_keeps_fields() {
        let mut form = filled("Task", "Desc");
        form.submit();
        assert!(!form.finish(&Err(ApiError::Status(StatusCode::BAD_REQUEST))));
        assert_eq!(form.error(), Some(CREATE_FAILED));
        assert_eq!(form.title, "Task");
        assert_eq!(form.description, "Desc");
        assert!(!form.is_submitting());
    }

    #[test]
    fn network_failure_says_so() {
        let mut form = filled("Task", "Desc");
        form.submit();
        form.finish(&Err(ApiError::offline()));
        assert_eq!(form.error(), Some(CREATE_UNREACHABLE));
        assert_eq!(form.title, "Task");
    }

    #[test]
    fn decode_failure_uses_generic_wording() {
        let mut form = filled("Task", "Desc");
        form.submit();
        let err = serde_json::from_str::<u8>("x").unwrap_err();
        form.finish(&Err(ApiError::Decode(err)));
        assert_eq!(form.error(), Some(CREATE_FAILED));
    }
}
