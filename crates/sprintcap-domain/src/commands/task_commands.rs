use super::{Command, CommandContext};
use crate::change::{ChangeField, ChangeId, ChangeValue, PendingChange};
use crate::{SprintName, Task, TaskId, TaskStatus, TaskUpdate, BACKLOG_LABEL};
use sprintcap_core::PlannerResult;

/// Move a task into a sprint, or into the backlog when `target` is `None`
/// or names the backlog
pub struct MoveTask {
    pub task_id: TaskId,
    pub target: Option<SprintName>,
}

impl Command for MoveTask {
    fn execute(&self, context: &mut CommandContext) -> PlannerResult<()> {
        let Some(task) = context.tasks.iter_mut().find(|t| t.id == self.task_id) else {
            return Ok(());
        };
        let target = self.target.as_ref().filter(|name| name.as_str() != BACKLOG_LABEL);
        if task.location() == target.map_or(BACKLOG_LABEL, String::as_str) {
            return Ok(());
        }

        context.ledger.record(
            task,
            ChangeField::Sprint,
            ChangeValue::from(task.sprint.as_ref()),
            ChangeValue::from(target),
        );
        task.sprint = target.cloned();
        if task.sprint.is_none() {
            task.status = TaskStatus::Backlog;
        }

        context.mark_changed();
        Ok(())
    }

    fn description(&self) -> String {
        match &self.target {
            Some(sprint) => format!("Move task {} to {}", self.task_id, sprint),
            None => format!("Move task {} to backlog", self.task_id),
        }
    }
}

/// Update task fields, logging one ledger entry per effective change
pub struct UpdateTask {
    pub task_id: TaskId,
    pub updates: TaskUpdate,
}

impl Command for UpdateTask {
    fn execute(&self, context: &mut CommandContext) -> PlannerResult<()> {
        if self.updates.is_empty() {
            return Ok(());
        }
        let Some(task) = context.tasks.iter_mut().find(|t| t.id == self.task_id) else {
            return Ok(());
        };

        context.ledger.record_updates(task, &self.updates);
        task.apply(self.updates.clone());

        context.mark_changed();
        Ok(())
    }

    fn description(&self) -> String {
        format!("Update task {}", self.task_id)
    }
}

/// Add a locally created task
pub struct CreateTask {
    pub task: Task,
}

impl Command for CreateTask {
    fn execute(&self, context: &mut CommandContext) -> PlannerResult<()> {
        if context.tasks.iter().any(|t| t.id == self.task.id) {
            tracing::warn!("Task {} already exists, not creating", self.task.id);
            return Ok(());
        }

        context.ledger.record_creation(&self.task);
        context.tasks.push(self.task.clone());

        context.mark_changed();
        Ok(())
    }

    fn description(&self) -> String {
        format!("Create task: '{}'", self.task.title)
    }
}

/// Revert the field named by one ledger entry and drop the entry
pub struct UndoChange {
    pub change_id: ChangeId,
}

impl Command for UndoChange {
    fn execute(&self, context: &mut CommandContext) -> PlannerResult<()> {
        let Some(change) = context.ledger.take(self.change_id) else {
            return Ok(());
        };
        context.mark_changed();

        if change.is_creation() {
            context.tasks.retain(|t| t.id != change.task_id);
            let dropped = context.ledger.remove_for_task(&change.task_id);
            tracing::debug!(
                "Removed created task {} and {} later entries",
                change.task_id,
                dropped
            );
            return Ok(());
        }

        match context.task_mut(&change.task_id) {
            Some(task) => revert(task, &change),
            None => tracing::debug!("Task {} gone, dropping entry only", change.task_id),
        }
        Ok(())
    }

    fn description(&self) -> String {
        format!("Undo change {}", self.change_id)
    }
}

fn revert(task: &mut Task, change: &PendingChange) {
    let old = &change.old_value;
    match change.field {
        ChangeField::Created => {}
        ChangeField::Sprint => {
            task.sprint = old.as_text();
            if task.sprint.is_none() {
                task.status = TaskStatus::Backlog;
            }
        }
        ChangeField::Title => {
            if let Some(title) = old.as_text() {
                task.title = title;
            }
        }
        ChangeField::Points => {
            if let Some(points) = old.as_number() {
                task.points = points;
            }
        }
        ChangeField::Status => {
            if let Some(status) = old.as_status() {
                task.status = status;
            }
        }
        ChangeField::Assignee => task.assignee = old.as_text(),
        ChangeField::Description => task.description = old.as_text(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChangeLedger, FieldUpdate, Sprint};

    struct Fixture {
        tasks: Vec<Task>,
        sprints: Vec<Sprint>,
        ledger: ChangeLedger,
        demo: bool,
        filter: Option<String>,
    }

    impl Fixture {
        fn new() -> Self {
            let mut task = Task::new("1", "Login", 3.0);
            task.sprint = Some("Sprint 1".to_string());
            task.status = TaskStatus::InProgress;
            Self {
                tasks: vec![task],
                sprints: vec![Sprint::new("Sprint 1", 50.0)],
                ledger: ChangeLedger::new(),
                demo: false,
                filter: None,
            }
        }

        fn run(&mut self, command: &dyn Command) -> bool {
            let mut ctx = CommandContext::new(
                &mut self.tasks,
                &mut self.sprints,
                &mut self.ledger,
                &mut self.demo,
                &mut self.filter,
            );
            command.execute(&mut ctx).unwrap();
            ctx.has_changed()
        }
    }

    #[test]
    fn test_move_to_backlog_sets_status() {
        let mut f = Fixture::new();
        let changed = f.run(&MoveTask {
            task_id: "1".to_string(),
            target: None,
        });

        assert!(changed);
        assert_eq!(f.tasks[0].sprint, None);
        assert_eq!(f.tasks[0].status, TaskStatus::Backlog);
        assert_eq!(f.ledger.len(), 1);
        assert_eq!(f.ledger.entries()[0].new_value, ChangeValue::Empty);
    }

    #[test]
    fn test_move_into_sprint_keeps_status() {
        let mut f = Fixture::new();
        f.run(&MoveTask {
            task_id: "1".to_string(),
            target: Some("Sprint 2".to_string()),
        });

        assert_eq!(f.tasks[0].sprint.as_deref(), Some("Sprint 2"));
        assert_eq!(f.tasks[0].status, TaskStatus::InProgress);
    }

    #[test]
    fn test_move_to_same_location_is_noop() {
        let mut f = Fixture::new();
        let changed = f.run(&MoveTask {
            task_id: "1".to_string(),
            target: Some("Sprint 1".to_string()),
        });

        assert!(!changed);
        assert!(f.ledger.is_empty());
    }

    #[test]
    fn test_move_named_backlog_resolves_to_backlog() {
        let mut f = Fixture::new();
        f.tasks[0].sprint = None;
        f.tasks[0].status = TaskStatus::Backlog;

        let changed = f.run(&MoveTask {
            task_id: "1".to_string(),
            target: Some(BACKLOG_LABEL.to_string()),
        });
        assert!(!changed);
        assert!(f.ledger.is_empty());

        f.tasks[0].sprint = Some("Sprint 1".to_string());
        f.run(&MoveTask {
            task_id: "1".to_string(),
            target: Some(BACKLOG_LABEL.to_string()),
        });
        assert_eq!(f.tasks[0].sprint, None);
        assert_eq!(f.tasks[0].status, TaskStatus::Backlog);
        assert_eq!(f.ledger.entries()[0].new_value, ChangeValue::Empty);
    }

    #[test]
    fn test_stale_ids_are_noops() {
        let mut f = Fixture::new();
        let before = f.tasks.clone();

        assert!(!f.run(&MoveTask {
            task_id: "missing".to_string(),
            target: None,
        }));
        assert!(!f.run(&UpdateTask {
            task_id: "missing".to_string(),
            updates: TaskUpdate {
                points: Some(1.0),
                ..TaskUpdate::default()
            },
        }));
        assert!(!f.run(&UndoChange {
            change_id: uuid::Uuid::new_v4(),
        }));

        assert_eq!(f.tasks, before);
        assert!(f.ledger.is_empty());
    }

    #[test]
    fn test_undo_restores_points() {
        let mut f = Fixture::new();
        f.run(&UpdateTask {
            task_id: "1".to_string(),
            updates: TaskUpdate {
                points: Some(8.0),
                ..TaskUpdate::default()
            },
        });
        let id = f.ledger.entries()[0].id;

        f.run(&UndoChange { change_id: id });

        assert_eq!(f.tasks[0].points, 3.0);
        assert!(f.ledger.is_empty());
    }

    #[test]
    fn test_undo_sprint_entry_with_empty_old_value_forces_backlog() {
        let mut f = Fixture::new();
        f.tasks[0].sprint = None;
        f.tasks[0].status = TaskStatus::Backlog;
        f.run(&MoveTask {
            task_id: "1".to_string(),
            target: Some("Sprint 1".to_string()),
        });
        f.run(&UpdateTask {
            task_id: "1".to_string(),
            updates: TaskUpdate {
                status: Some(TaskStatus::ToDo),
                ..TaskUpdate::default()
            },
        });
        let move_id = f.ledger.entries()[0].id;

        f.run(&UndoChange { change_id: move_id });

        assert_eq!(f.tasks[0].sprint, None);
        assert_eq!(f.tasks[0].status, TaskStatus::Backlog);
        assert_eq!(f.ledger.len(), 1);
        assert_eq!(f.ledger.entries()[0].field, ChangeField::Status);
    }

    #[test]
    fn test_undo_assignee_clears_when_previously_unset() {
        let mut f = Fixture::new();
        f.run(&UpdateTask {
            task_id: "1".to_string(),
            updates: TaskUpdate {
                assignee: FieldUpdate::Set("Bob".to_string()),
                ..TaskUpdate::default()
            },
        });
        let id = f.ledger.entries()[0].id;

        f.run(&UndoChange { change_id: id });
        assert_eq!(f.tasks[0].assignee, None);
    }

    #[test]
    fn test_undo_creation_removes_task_and_its_entries() {
        let mut f = Fixture::new();
        let task = Task::new("local-1", "Search", 5.0);
        f.run(&CreateTask { task });
        f.run(&UpdateTask {
            task_id: "local-1".to_string(),
            updates: TaskUpdate {
                points: Some(2.0),
                ..TaskUpdate::default()
            },
        });
        f.run(&UpdateTask {
            task_id: "1".to_string(),
            updates: TaskUpdate {
                points: Some(1.0),
                ..TaskUpdate::default()
            },
        });
        let created = f.ledger.entries()[0].id;

        f.run(&UndoChange { change_id: created });

        assert!(f.tasks.iter().all(|t| t.id != "local-1"));
        assert_eq!(f.ledger.len(), 1);
        assert_eq!(f.ledger.entries()[0].task_id, "1");
    }

    #[test]
    fn test_create_duplicate_id_is_ignored() {
        let mut f = Fixture::new();
        let changed = f.run(&CreateTask {
            task: Task::new("1", "Duplicate", 1.0),
        });

        assert!(!changed);
        assert_eq!(f.tasks.len(), 1);
        assert_eq!(f.tasks[0].title, "Login");
    }
}
