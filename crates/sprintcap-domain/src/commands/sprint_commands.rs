use super::{Command, CommandContext};
use crate::change::{ChangeField, ChangeValue};
use crate::{Sprint, SprintName, TaskStatus};
use sprintcap_core::{PlannerError, PlannerResult};

/// Create a new sprint; an existing name is left as is
pub struct CreateSprint {
    pub name: SprintName,
    pub capacity: f64,
}

impl Command for CreateSprint {
    fn execute(&self, context: &mut CommandContext) -> PlannerResult<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(PlannerError::Validation(
                "Sprint name cannot be empty".to_string(),
            ));
        }
        if context.sprints.iter().any(|s| s.name == name) {
            return Ok(());
        }

        context.sprints.push(Sprint::new(name, self.capacity));
        context.mark_changed();
        Ok(())
    }

    fn description(&self) -> String {
        format!("Create sprint {}", self.name)
    }
}

/// Delete a sprint, returning its tasks to the backlog
pub struct DeleteSprint {
    pub name: SprintName,
}

impl Command for DeleteSprint {
    fn execute(&self, context: &mut CommandContext) -> PlannerResult<()> {
        let before = context.sprints.len();
        context.sprints.retain(|s| s.name != self.name);
        if context.sprints.len() != before {
            context.mark_changed();
        }

        let mut moved = 0;
        for task in context
            .tasks
            .iter_mut()
            .filter(|t| t.sprint.as_deref() == Some(self.name.as_str()))
        {
            context.ledger.record(
                task,
                ChangeField::Sprint,
                ChangeValue::from(self.name.as_str()),
                ChangeValue::Empty,
            );
            task.sprint = None;
            task.status = TaskStatus::Backlog;
            moved += 1;
        }

        if moved > 0 {
            tracing::debug!("Returned {} tasks from {} to backlog", moved, self.name);
            context.mark_changed();
        }
        Ok(())
    }

    fn description(&self) -> String {
        format!("Delete sprint {}", self.name)
    }
}

/// Set the total capacity of a sprint
pub struct SetSprintCapacity {
    pub name: SprintName,
    pub capacity: f64,
}

impl Command for SetSprintCapacity {
    fn execute(&self, context: &mut CommandContext) -> PlannerResult<()> {
        let Some(sprint) = context.sprint_mut(&self.name) else {
            return Ok(());
        };
        sprint.set_capacity(self.capacity);
        context.mark_changed();
        Ok(())
    }

    fn description(&self) -> String {
        format!("Set capacity of {} to {}", self.name, self.capacity)
    }
}

/// Set one assignee's capacity within a sprint
pub struct SetAssigneeCapacity {
    pub name: SprintName,
    pub assignee: String,
    pub capacity: f64,
}

impl Command for SetAssigneeCapacity {
    fn execute(&self, context: &mut CommandContext) -> PlannerResult<()> {
        let Some(sprint) = context.sprint_mut(&self.name) else {
            return Ok(());
        };
        sprint.set_assignee_capacity(self.assignee.clone(), self.capacity);
        context.mark_changed();
        Ok(())
    }

    fn description(&self) -> String {
        format!(
            "Set capacity of {} in {} to {}",
            self.assignee, self.name, self.capacity
        )
    }
}
