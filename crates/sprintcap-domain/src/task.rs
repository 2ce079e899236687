use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::field_update::FieldUpdate;

pub type TaskId = String;
pub type SprintName = String;

/// Label used wherever a task's location is shown and it has no sprint.
pub const BACKLOG_LABEL: &str = "Backlog";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
    Backlog,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::ToDo,
        TaskStatus::InProgress,
        TaskStatus::Done,
        TaskStatus::Backlog,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
            TaskStatus::Backlog => "Backlog",
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    /// Accepts the display labels as well as compact forms such as `todo`
    /// or `in-progress`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match compact.as_str() {
            "todo" => Ok(TaskStatus::ToDo),
            "inprogress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            "backlog" => Ok(TaskStatus::Backlog),
            _ => Err(format!(
                "Invalid status '{}'. Expected one of: To Do, In Progress, Done, Backlog",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub points: f64,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default)]
    pub sprint: Option<SprintName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_link: Option<String>,
    /// Display-only colour override. Never logged and never synced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>, points: f64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            points: sanitize_points(points),
            status: TaskStatus::Backlog,
            assignee: None,
            sprint: None,
            description: None,
            external_link: None,
            color: None,
        }
    }

    pub fn is_in_backlog(&self) -> bool {
        self.sprint.is_none()
    }

    /// The sprint name, or the backlog label when unplanned.
    pub fn location(&self) -> &str {
        self.sprint.as_deref().unwrap_or(BACKLOG_LABEL)
    }

    pub fn is_assigned_to(&self, assignee: &str) -> bool {
        self.assignee.as_deref() == Some(assignee)
    }

    /// Apply a partial update. Sprint and status are set independently here;
    /// only the move operation couples them.
    pub fn apply(&mut self, updates: TaskUpdate) {
        if let Some(title) = updates.title {
            self.title = title;
        }
        if let Some(points) = updates.points {
            self.points = sanitize_points(points);
        }
        if let Some(status) = updates.status {
            self.status = status;
        }
        updates.assignee.apply_to(&mut self.assignee);
        updates.sprint.apply_to(&mut self.sprint);
        updates.description.apply_to(&mut self.description);
        updates.color.apply_to(&mut self.color);
    }
}

/// Points are non-negative; anything else is coerced to zero.
pub fn sanitize_points(points: f64) -> f64 {
    if points.is_finite() && points > 0.0 {
        points
    } else {
        0.0
    }
}

/// Partial update for Task
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub points: Option<f64>,
    pub status: Option<TaskStatus>,
    pub assignee: FieldUpdate<String>,
    pub sprint: FieldUpdate<SprintName>,
    pub description: FieldUpdate<String>,
    pub color: FieldUpdate<String>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.points.is_none()
            && self.status.is_none()
            && !self.assignee.is_change()
            && !self.sprint.is_change()
            && !self.description.is_change()
            && !self.color.is_change()
    }
}

/// Fields for a task created locally. Unset status defaults to Backlog and
/// unset id to a generated local id.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub id: Option<TaskId>,
    pub title: String,
    pub points: f64,
    pub status: Option<TaskStatus>,
    pub assignee: Option<String>,
    pub sprint: Option<SprintName>,
    pub description: Option<String>,
    pub color: Option<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, points: f64) -> Self {
        Self {
            title: title.into(),
            points,
            ..Self::default()
        }
    }

    pub fn into_task(self) -> Task {
        let id = self
            .id
            .unwrap_or_else(|| format!("local-{}", uuid::Uuid::new_v4()));
        Task {
            id,
            title: self.title,
            points: sanitize_points(self.points),
            status: self.status.unwrap_or(TaskStatus::Backlog),
            assignee: self.assignee,
            sprint: self.sprint,
            description: self.description,
            external_link: None,
            color: self.color,
        }
    }
}
