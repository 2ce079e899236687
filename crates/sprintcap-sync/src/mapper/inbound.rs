use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::collections::BTreeSet;

use sprintcap_core::config::{DEFAULT_SPRINT_CAPACITY, DEFAULT_SPRINT_COUNT};
use sprintcap_domain::{natural_cmp, parse_window, DateWindow, Sprint, Task, TaskStatus};

use super::{POINTS_FIELD_HINT, SPRINT_FIELD_HINT};
use crate::credentials::Credentials;
use crate::remote::{RemoteCustomField, RemoteTask};

/// Points given to a task whose points field is missing or empty. A remote
/// value of zero is kept as zero rather than replaced with this default.
pub const DEFAULT_POINTS: f64 = 5.0;

const UNKNOWN_SECTION: &str = "Unknown";

/// How remote fields map onto the board.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConfig {
    pub project_id: String,
    pub sprint_field_id: Option<String>,
    pub points_field_id: Option<String>,
    /// How many sprints to keep; zero keeps all of them.
    pub sprint_count: usize,
    pub default_capacity: f64,
}

impl FieldConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            sprint_field_id: None,
            points_field_id: None,
            sprint_count: DEFAULT_SPRINT_COUNT,
            default_capacity: DEFAULT_SPRINT_CAPACITY,
        }
    }

    pub fn from_credentials(credentials: &Credentials) -> Self {
        Self {
            sprint_field_id: credentials.sprint_field_id.clone(),
            points_field_id: credentials.points_field_id.clone(),
            ..Self::new(credentials.project_id.clone())
        }
    }

    pub fn with_sprint_count(mut self, sprint_count: usize) -> Self {
        self.sprint_count = sprint_count;
        self
    }

    pub fn with_default_capacity(mut self, capacity: f64) -> Self {
        self.default_capacity = capacity;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportResult {
    pub sprints: Vec<Sprint>,
    pub tasks: Vec<Task>,
}

/// Find a custom field by gid when one is configured, otherwise by a
/// case-insensitive name fragment.
pub(crate) fn find_field<'a>(
    fields: &'a [RemoteCustomField],
    id: Option<&str>,
    hint: &str,
) -> Option<&'a RemoteCustomField> {
    match id {
        Some(id) => fields.iter().find(|f| f.gid == id),
        None => fields
            .iter()
            .find(|f| f.name.to_lowercase().contains(hint)),
    }
}

/// Status implied by a section name.
pub fn status_from_section(section: &str) -> TaskStatus {
    let section = section.to_lowercase();
    if section.contains("backlog") {
        TaskStatus::Backlog
    } else if section.contains("done") || section.contains("complete") {
        TaskStatus::Done
    } else if section.contains("progress") || section.contains("doing") {
        TaskStatus::InProgress
    } else {
        TaskStatus::ToDo
    }
}

fn section_name<'a>(record: &'a RemoteTask, project_id: &str) -> &'a str {
    record
        .memberships
        .iter()
        .find(|m| m.project.as_ref().is_some_and(|p| p.gid == project_id))
        .or_else(|| record.memberships.first())
        .and_then(|m| m.section.as_ref())
        .map(|s| s.name.as_str())
        .unwrap_or(UNKNOWN_SECTION)
}

fn map_task(record: &RemoteTask, config: &FieldConfig) -> Task {
    let points = find_field(
        &record.custom_fields,
        config.points_field_id.as_deref(),
        POINTS_FIELD_HINT,
    )
    .and_then(|f| f.number_value)
    .unwrap_or(DEFAULT_POINTS);

    // A task tagged with several sprints lands in the last one listed.
    let sprint = find_field(
        &record.custom_fields,
        config.sprint_field_id.as_deref(),
        SPRINT_FIELD_HINT,
    )
    .and_then(|f| f.multi_enum_values.as_ref())
    .and_then(|values| values.last())
    .map(|value| value.name.clone())
    .filter(|name| !name.is_empty());

    let status = match sprint {
        None => TaskStatus::Backlog,
        Some(_) if record.completed => TaskStatus::Done,
        Some(_) => status_from_section(section_name(record, &config.project_id)),
    };

    let mut task = Task::new(record.gid.clone(), record.name.clone(), points);
    task.status = status;
    task.sprint = sprint;
    task.assignee = record
        .assignee
        .as_ref()
        .map(|a| a.name.clone())
        .filter(|name| !name.is_empty());
    task.description = record.html_notes.clone().filter(|n| !n.is_empty());
    task.external_link = record.permalink_url.clone();
    task
}

/// Order sprints with a parseable window by start date, then undated
/// sprints by natural name order.
fn compare_sprints(a: &(String, Option<DateWindow>), b: &(String, Option<DateWindow>)) -> Ordering {
    match (&a.1, &b.1) {
        (Some(x), Some(y)) => x.start.cmp(&y.start).then_with(|| natural_cmp(&a.0, &b.0)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => natural_cmp(&a.0, &b.0),
    }
}

/// Keep the first sprint that has not ended yet and the ones after it, up
/// to `count`. When every sprint is over or undated, keep the last `count`.
fn select_window(
    sorted: Vec<(String, Option<DateWindow>)>,
    count: usize,
    now: NaiveDateTime,
) -> Vec<(String, Option<DateWindow>)> {
    if count == 0 || sorted.is_empty() {
        return sorted;
    }

    let today = now.date();
    let start = sorted
        .iter()
        .position(|(_, window)| window.is_some_and(|w| w.end >= today));

    match start {
        Some(i) => sorted.into_iter().skip(i).take(count).collect(),
        None => {
            let skip = sorted.len().saturating_sub(count);
            sorted.into_iter().skip(skip).collect()
        }
    }
}

/// Build a replacement board from a full project listing.
pub fn import_remote(records: &[RemoteTask], config: &FieldConfig, now: NaiveDateTime) -> ImportResult {
    let tasks: Vec<Task> = records.iter().map(|r| map_task(r, config)).collect();

    let names: BTreeSet<&str> = tasks.iter().filter_map(|t| t.sprint.as_deref()).collect();
    let mut sprints: Vec<(String, Option<DateWindow>)> = names
        .into_iter()
        .map(|name| (name.to_string(), parse_window(name, now)))
        .collect();
    sprints.sort_by(compare_sprints);

    let total = sprints.len();
    let selected = select_window(sprints, config.sprint_count, now);
    let kept: BTreeSet<&str> = selected.iter().map(|(name, _)| name.as_str()).collect();

    let tasks: Vec<Task> = tasks
        .iter()
        .filter(|t| {
            t.status == TaskStatus::Backlog
                || t.sprint.as_deref().is_some_and(|s| kept.contains(s))
        })
        .cloned()
        .collect();

    tracing::info!(
        "Mapped {} remote tasks: kept {} tasks and {} of {} sprints",
        records.len(),
        tasks.len(),
        selected.len(),
        total
    );

    let sprints = selected
        .into_iter()
        .map(|(name, _)| Sprint::new(name, config.default_capacity))
        .collect();

    ImportResult { sprints, tasks }
}
