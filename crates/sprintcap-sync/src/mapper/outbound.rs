//! Folding pending changes into remote writes.
//!
//! Changes are grouped by task and folded in ledger order, last write wins
//! per field. Tasks with a creation entry become a create followed by a
//! section move; every other task becomes at most one update and one move.

use futures::future::join_all;
use std::collections::HashMap;

use sprintcap_domain::{ChangeField, ChangeId, PendingChange, Task, TaskId, TaskStatus};

use super::inbound::{FieldConfig, DEFAULT_POINTS};
use super::{POINTS_FIELD_HINT, SPRINT_FIELD_HINT};
use crate::error::{SyncError, SyncResult};
use crate::remote::{CustomFieldDef, CustomFieldValue, NamedRef, RemoteApi, TaskPayload};

/// What an export did, by remote gid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportReport {
    /// Local id and the gid the remote assigned to it.
    pub created: Vec<(TaskId, String)>,
    pub updated: Vec<String>,
    pub moved: Vec<String>,
    /// Tasks whose changes had nothing to send.
    pub skipped: Vec<TaskId>,
    /// Ledger entries covered by this export.
    pub exported_ids: Vec<ChangeId>,
}

impl ExportReport {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.moved.is_empty()
    }
}

/// Sections and custom fields of the target project.
#[derive(Debug, Clone, Default)]
pub(crate) struct ProjectMetadata {
    sections: Vec<NamedRef>,
    fields: Vec<CustomFieldDef>,
}

impl ProjectMetadata {
    fn section_for(&self, status: TaskStatus) -> Option<&NamedRef> {
        let keywords: &[&str] = match status {
            TaskStatus::ToDo => &["to do", "todo"],
            TaskStatus::InProgress => &["progress", "doing"],
            TaskStatus::Done => &["done", "complete"],
            TaskStatus::Backlog => &["backlog"],
        };
        keywords.iter().find_map(|keyword| {
            self.sections
                .iter()
                .find(|s| s.name.to_lowercase().contains(keyword))
        })
    }

    fn field(&self, id: Option<&str>, hint: &str) -> Option<&CustomFieldDef> {
        match id {
            Some(id) => self.fields.iter().find(|f| f.gid == id),
            None => self
                .fields
                .iter()
                .find(|f| f.name.to_lowercase().contains(hint)),
        }
    }

    /// Option gid for a sprint name: exact case-insensitive match first,
    /// then substring.
    fn sprint_option<'a>(field: &'a CustomFieldDef, sprint: &str) -> Option<&'a NamedRef> {
        let wanted = sprint.to_lowercase();
        field
            .enum_options
            .iter()
            .find(|o| o.name.to_lowercase() == wanted)
            .or_else(|| {
                field
                    .enum_options
                    .iter()
                    .find(|o| o.name.to_lowercase().contains(&wanted))
            })
    }
}

async fn fetch_metadata(api: &dyn RemoteApi, project_id: &str) -> SyncResult<ProjectMetadata> {
    let (sections, settings) = tokio::try_join!(
        api.fetch_sections(project_id),
        api.fetch_custom_field_settings(project_id)
    )
    .map_err(|e| SyncError::Metadata(format!("failed to fetch project metadata: {e}")))?;

    Ok(ProjectMetadata {
        sections,
        fields: settings.into_iter().map(|s| s.custom_field).collect(),
    })
}

/// Net effect of one task's pending changes. `Some(None)` clears a field.
#[derive(Debug, Clone, Default, PartialEq)]
struct TaskPlan {
    task_id: TaskId,
    created: bool,
    title: Option<String>,
    points: Option<f64>,
    status: Option<TaskStatus>,
    sprint: Option<Option<String>>,
    description: Option<Option<String>>,
    assignee_changed: bool,
    change_ids: Vec<ChangeId>,
}

impl TaskPlan {
    fn new(task_id: &str) -> Self {
        Self {
            task_id: task_id.to_string(),
            ..Self::default()
        }
    }

    fn fold(&mut self, change: &PendingChange) {
        self.change_ids.push(change.id);
        let value = &change.new_value;
        match change.field {
            ChangeField::Created => {
                self.created = true;
                self.title.get_or_insert_with(|| change.task_title.clone());
            }
            ChangeField::Title => self.title = value.as_text(),
            ChangeField::Points => self.points = value.as_number(),
            ChangeField::Status => self.status = value.as_status(),
            ChangeField::Sprint => self.sprint = Some(value.as_text()),
            ChangeField::Description => self.description = Some(value.as_text()),
            ChangeField::Assignee => self.assignee_changed = true,
        }
    }

    /// For creations, the task as it stands locally is sent in full.
    fn overlay_local(&mut self, task: &Task) {
        self.title = Some(task.title.clone());
        self.points = Some(task.points);
        self.status = Some(task.status);
        self.sprint = Some(task.sprint.clone());
        self.description = Some(task.description.clone());
    }

    /// Status whose section the task should end up in.
    fn target_status(&self) -> Option<TaskStatus> {
        match (self.status, &self.sprint) {
            (Some(status), _) => Some(status),
            (None, Some(None)) => Some(TaskStatus::Backlog),
            _ => None,
        }
    }
}

/// Group changes by task in first-seen order and fold each group.
fn build_plans(changes: &[PendingChange], tasks: &[Task]) -> Vec<TaskPlan> {
    let mut order: Vec<TaskPlan> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    let mut sorted: Vec<&PendingChange> = changes.iter().collect();
    sorted.sort_by_key(|c| c.sequence);

    for change in sorted {
        let slot = *index.entry(change.task_id.as_str()).or_insert_with(|| {
            order.push(TaskPlan::new(&change.task_id));
            order.len() - 1
        });
        order[slot].fold(change);
    }

    for plan in order.iter_mut().filter(|p| p.created) {
        if let Some(task) = tasks.iter().find(|t| t.id == plan.task_id) {
            plan.overlay_local(task);
        }
    }
    order
}

fn wrap_notes(notes: Option<&str>) -> String {
    match notes {
        Some(text) if text.trim_start().starts_with("<body>") => text.to_string(),
        Some(text) => format!("<body>{text}</body>"),
        None => "<body></body>".to_string(),
    }
}

fn build_payload(plan: &TaskPlan, metadata: &ProjectMetadata, config: &FieldConfig) -> TaskPayload {
    let mut payload = TaskPayload {
        name: plan.title.clone(),
        ..TaskPayload::default()
    };

    if let Some(description) = &plan.description {
        if plan.created {
            payload.html_notes = description.as_deref().map(|d| wrap_notes(Some(d)));
        } else {
            payload.html_notes = Some(wrap_notes(description.as_deref()));
        }
    }

    if !plan.created {
        payload.completed = plan.status.map(|s| s == TaskStatus::Done);
    }

    let points = if plan.created {
        Some(plan.points.unwrap_or(DEFAULT_POINTS))
    } else {
        plan.points
    };
    if let Some(points) = points {
        match metadata.field(config.points_field_id.as_deref(), POINTS_FIELD_HINT) {
            Some(field) => {
                payload
                    .custom_fields
                    .insert(field.gid.clone(), CustomFieldValue::Number(points));
            }
            None => tracing::warn!("No points field found; skipping points for {}", plan.task_id),
        }
    }

    if let Some(sprint) = &plan.sprint {
        match metadata.field(config.sprint_field_id.as_deref(), SPRINT_FIELD_HINT) {
            Some(field) => match sprint {
                Some(name) => match ProjectMetadata::sprint_option(field, name) {
                    Some(option) => {
                        payload.custom_fields.insert(
                            field.gid.clone(),
                            CustomFieldValue::Options(vec![option.gid.clone()]),
                        );
                    }
                    None => tracing::warn!(
                        "No sprint option matches '{}'; skipping sprint for {}",
                        name,
                        plan.task_id
                    ),
                },
                None if !plan.created => {
                    payload
                        .custom_fields
                        .insert(field.gid.clone(), CustomFieldValue::Options(Vec::new()));
                }
                None => {}
            },
            None => tracing::warn!("No sprint field found; skipping sprint for {}", plan.task_id),
        }
    }

    payload
}

#[derive(Debug, Default)]
struct PlanOutcome {
    created: Option<(TaskId, String)>,
    updated: Option<String>,
    moved: Option<String>,
    skipped: bool,
}

async fn execute_plan(
    plan: &TaskPlan,
    metadata: &ProjectMetadata,
    config: &FieldConfig,
    api: &dyn RemoteApi,
) -> SyncResult<PlanOutcome> {
    let mut outcome = PlanOutcome::default();
    let mut payload = build_payload(plan, metadata, config);

    let remote_id = if plan.created {
        payload.projects = Some(vec![config.project_id.clone()]);
        let gid = api.create_task(&payload).await?;
        tracing::debug!("Created remote task {} for {}", gid, plan.task_id);
        outcome.created = Some((plan.task_id.clone(), gid.clone()));
        gid
    } else {
        if plan.assignee_changed {
            tracing::warn!("Assignee changes are not pushed; skipping for {}", plan.task_id);
        }
        if !payload.is_empty() {
            api.update_task(&plan.task_id, &payload).await?;
            outcome.updated = Some(plan.task_id.clone());
        }
        plan.task_id.clone()
    };

    let target = if plan.created {
        Some(plan.status.unwrap_or(TaskStatus::Backlog))
    } else {
        plan.target_status()
    };
    if let Some(status) = target {
        match metadata.section_for(status) {
            Some(section) => {
                api.add_task_to_section(&section.gid, &remote_id).await?;
                outcome.moved = Some(remote_id.clone());
            }
            None => tracing::warn!("No section matches status '{}'; task {} not moved", status, remote_id),
        }
    }

    outcome.skipped = outcome.created.is_none() && outcome.updated.is_none() && outcome.moved.is_none();
    Ok(outcome)
}

/// Push pending changes to the remote project.
///
/// Every task plan is attempted even when others fail. Any failure makes
/// the whole export an error so the caller keeps its ledger.
pub async fn export_changes(
    changes: &[PendingChange],
    tasks: &[Task],
    config: &FieldConfig,
    api: &dyn RemoteApi,
) -> SyncResult<ExportReport> {
    if changes.is_empty() {
        return Ok(ExportReport::default());
    }

    let metadata = fetch_metadata(api, &config.project_id).await?;
    let plans = build_plans(changes, tasks);
    let total = plans.len();

    let results = join_all(
        plans
            .iter()
            .map(|plan| execute_plan(plan, &metadata, config, api)),
    )
    .await;

    let mut report = ExportReport::default();
    let mut failures: Vec<SyncError> = Vec::new();
    for (plan, result) in plans.iter().zip(results) {
        match result {
            Ok(outcome) => {
                report.created.extend(outcome.created);
                report.updated.extend(outcome.updated);
                report.moved.extend(outcome.moved);
                if outcome.skipped {
                    report.skipped.push(plan.task_id.clone());
                }
                report.exported_ids.extend(plan.change_ids.iter().copied());
            }
            Err(e) => {
                tracing::error!("Failed to push changes for {}: {}", plan.task_id, e);
                failures.push(e);
            }
        }
    }

    if let Some(first) = failures.first() {
        return Err(SyncError::Partial {
            failed: failures.len(),
            total,
            first: first.to_string(),
        });
    }

    tracing::info!(
        "Pushed {} changes: {} created, {} updated, {} moved",
        report.exported_ids.len(),
        report.created.len(),
        report.updated.len(),
        report.moved.len()
    );
    Ok(report)
}
