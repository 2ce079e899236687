use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::task::{TaskId, TaskStatus};

pub type ChangeId = Uuid;

/// Attribute touched by a pending change. `Created` and `Sprint` are the
/// entries written by task creation and moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeField {
    Created,
    Sprint,
    Title,
    Points,
    Status,
    Assignee,
    Description,
}

impl ChangeField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeField::Created => "created",
            ChangeField::Sprint => "sprint",
            ChangeField::Title => "title",
            ChangeField::Points => "points",
            ChangeField::Status => "status",
            ChangeField::Assignee => "assignee",
            ChangeField::Description => "description",
        }
    }
}

impl fmt::Display for ChangeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Old or new value of a pending change. Serialized untagged, so a ledger
/// reloaded from disk may surface a text value that happens to spell a
/// status label as `Status`; the accessors treat both forms alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum ChangeValue {
    #[default]
    Empty,
    Number(f64),
    Status(TaskStatus),
    Text(String),
}

impl ChangeValue {
    pub fn text(value: Option<&str>) -> Self {
        match value {
            Some(text) => ChangeValue::Text(text.to_string()),
            None => ChangeValue::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ChangeValue::Empty)
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            ChangeValue::Text(text) => Some(text.clone()),
            ChangeValue::Status(status) => Some(status.label().to_string()),
            ChangeValue::Number(n) => Some(n.to_string()),
            ChangeValue::Empty => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ChangeValue::Number(n) => Some(*n),
            ChangeValue::Text(text) => text.parse().ok(),
            _ => None,
        }
    }

    pub fn as_status(&self) -> Option<TaskStatus> {
        match self {
            ChangeValue::Status(status) => Some(*status),
            ChangeValue::Text(text) => text.parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for ChangeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeValue::Empty => f.write_str("(none)"),
            ChangeValue::Number(n) => write!(f, "{}", n),
            ChangeValue::Status(status) => write!(f, "{}", status),
            ChangeValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for ChangeValue {
    fn from(value: f64) -> Self {
        ChangeValue::Number(value)
    }
}

impl From<TaskStatus> for ChangeValue {
    fn from(value: TaskStatus) -> Self {
        ChangeValue::Status(value)
    }
}

impl From<&str> for ChangeValue {
    fn from(value: &str) -> Self {
        ChangeValue::Text(value.to_string())
    }
}

impl From<Option<&String>> for ChangeValue {
    fn from(value: Option<&String>) -> Self {
        ChangeValue::text(value.map(String::as_str))
    }
}

/// One local edit not yet confirmed against the remote tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingChange {
    pub id: ChangeId,
    /// Position in the ledger; strictly increasing in append order.
    #[serde(default)]
    pub sequence: u64,
    pub task_id: TaskId,
    /// Task title when the change was recorded.
    pub task_title: String,
    pub field: ChangeField,
    pub old_value: ChangeValue,
    pub new_value: ChangeValue,
    pub timestamp: DateTime<Utc>,
}

impl PendingChange {
    pub fn is_creation(&self) -> bool {
        self.field == ChangeField::Created
    }

    pub fn summary(&self) -> String {
        match self.field {
            ChangeField::Created => format!("created '{}'", self.task_title),
            field => format!(
                "{} of '{}': {} -> {}",
                field, self.task_title, self.old_value, self.new_value
            ),
        }
    }
}
