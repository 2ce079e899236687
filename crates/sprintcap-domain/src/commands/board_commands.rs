use super::{Command, CommandContext};
use crate::change::ChangeId;
use crate::{Sprint, Task};
use sprintcap_core::PlannerResult;

/// Replace the whole board with imported data and leave demo mode
pub struct ImportBoard {
    pub sprints: Vec<Sprint>,
    pub tasks: Vec<Task>,
}

impl Command for ImportBoard {
    fn execute(&self, context: &mut CommandContext) -> PlannerResult<()> {
        *context.sprints = self.sprints.clone();
        *context.tasks = self.tasks.clone();
        context.ledger.clear();
        *context.is_demo_mode = false;

        tracing::info!(
            "Imported {} tasks across {} sprints",
            self.tasks.len(),
            self.sprints.len()
        );
        context.mark_changed();
        Ok(())
    }

    fn description(&self) -> String {
        format!(
            "Import {} tasks and {} sprints",
            self.tasks.len(),
            self.sprints.len()
        )
    }
}

/// Drop every pending change without reverting anything
pub struct ClearPendingChanges;

impl Command for ClearPendingChanges {
    fn execute(&self, context: &mut CommandContext) -> PlannerResult<()> {
        if context.ledger.is_empty() {
            return Ok(());
        }
        context.ledger.clear();
        context.mark_changed();
        Ok(())
    }

    fn description(&self) -> String {
        "Clear pending changes".to_string()
    }
}

/// Drop the listed ledger entries once they have reached the remote side
pub struct RemoveChanges {
    pub ids: Vec<ChangeId>,
}

impl Command for RemoveChanges {
    fn execute(&self, context: &mut CommandContext) -> PlannerResult<()> {
        if context.ledger.remove_many(&self.ids) > 0 {
            context.mark_changed();
        }
        Ok(())
    }

    fn description(&self) -> String {
        format!("Remove {} pushed changes", self.ids.len())
    }
}

/// Restrict capacity views to one assignee, or clear the filter
pub struct SetAssigneeFilter {
    pub assignee: Option<String>,
}

impl Command for SetAssigneeFilter {
    fn execute(&self, context: &mut CommandContext) -> PlannerResult<()> {
        if *context.filter_assignee == self.assignee {
            return Ok(());
        }
        *context.filter_assignee = self.assignee.clone();
        context.mark_changed();
        Ok(())
    }

    fn description(&self) -> String {
        match &self.assignee {
            Some(name) => format!("Filter by {}", name),
            None => "Clear assignee filter".to_string(),
        }
    }
}
