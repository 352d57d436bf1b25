use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

pub type TaskId = u64;

/// A task as the backend stores it.
///
/// `created_at` is kept as the raw string the backend sent so that an update
/// sends it back untouched.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, alias = "isCompleted")]
    pub completed: bool,
}

/// Body of a create request.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub name: String,
    pub description: String,
}

impl Task {
    /// Creation time in the `Jan 1, 2023, 10:00 AM` form, or an empty string
    /// when the backend did not send one.
    pub fn created_label(&self) -> String {
        self.created_at
            .as_deref()
            .map(format_created_at)
            .unwrap_or_default()
    }

    /// Copy of this task with a new name and description, everything else kept.
    pub fn with_fields(&self, name: String, description: String) -> Self {
        Self {
            name,
            description,
            ..self.clone()
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

const DISPLAY_FORMAT: &str = "%b %-d, %Y, %I:%M %p";

pub fn format_created_at(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|ts| ts.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return Some(ts);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_local());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_backend_shape() {
        let task: Task = serde_json::from_value(json!({
            "id": 7,
            "name": "Buy milk",
            "description": "2 litres",
            "completed": false,
            "createdAt": "2024-03-05T14:07:00"
        }))
        .unwrap();
        assert_eq!(task.id, 7);
        assert_eq!(task.name, "Buy milk");
        assert_eq!(task.created_at.as_deref(), Some("2024-03-05T14:07:00"));
        assert!(!task.completed);
    }

    #[test]
    fn accepts_title_and_is_completed_aliases() {
        let task: Task =
            serde_json::from_value(json!({"id": 1, "title": "Test Task", "isCompleted": true}))
                .unwrap();
        assert_eq!(task.name, "Test Task");
        assert!(task.completed);
        assert_eq!(task.description, "");
        assert_eq!(task.created_at, None);
    }

    #[test]
    fn null_description_becomes_empty() {
        let task: Task =
            serde_json::from_value(json!({"id": 1, "name": "x", "description": null})).unwrap();
        assert_eq!(task.description, "");
    }

    #[test]
    fn serializes_with_canonical_keys() {
        let task = Task {
            id: 1,
            name: "Updated Title".into(),
            description: "d".into(),
            created_at: Some("2023-01-01T09:30:00.123456".into()),
            completed: false,
        };
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 1,
                "name": "Updated Title",
                "description": "d",
                "createdAt": "2023-01-01T09:30:00.123456",
                "completed": false
            })
        );
    }

    #[test]
    fn omits_missing_created_at() {
        let task = Task {
            id: 2,
            name: "n".into(),
            description: String::new(),
            created_at: None,
            completed: true,
        };
        let value = serde_json::to_value(&task).unwrap();
        assert!(value.get("createdAt").is_none());
    }

    #[test]
    fn formats_timestamps() {
        assert_eq!(format_created_at("2024-03-05T14:07:00"), "Mar 5, 2024, 02:07 PM");
        assert_eq!(format_created_at("2024-03-05T14:07:00.987"), "Mar 5, 2024, 02:07 PM");
        assert_eq!(format_created_at("2023-01-01"), "Jan 1, 2023, 12:00 AM");
        assert_eq!(format_created_at("2024-03-05T09:15:00+05:30"), "Mar 5, 2024, 09:15 AM");
        assert_eq!(format_created_at("yesterday"), "yesterday");
    }

    #[test]
    fn with_fields_keeps_identity() {
        let task = Task {
            id: 3,
            name: "old".into(),
            description: "old desc".into(),
            created_at: Some("2023-01-01".into()),
            completed: true,
        };
        let edited = task.with_fields("new".into(), "new desc".into());
        assert_eq!(edited.id, 3);
        assert_eq!(edited.created_at, task.created_at);
        assert!(edited.completed);
        assert_eq!(edited.name, "new");
    }
}
