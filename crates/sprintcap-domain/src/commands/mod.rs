use sprintcap_core::PlannerResult;

pub mod board_commands;
pub mod sprint_commands;
pub mod task_commands;

pub use board_commands::*;
pub use sprint_commands::*;
pub use task_commands::*;

use crate::{ChangeLedger, Sprint, Task};

/// Trait for board commands that mutate state
/// Commands represent intent; stale ids make them a no-op, never an error
pub trait Command: Send + Sync {
    /// Execute this command, mutating the board state
    fn execute(&self, context: &mut CommandContext) -> PlannerResult<()>;

    /// Human-readable description of what this command does
    fn description(&self) -> String;
}

/// Context passed to commands for mutation
/// Contains references to everything the board owns
pub struct CommandContext<'a> {
    pub tasks: &'a mut Vec<Task>,
    pub sprints: &'a mut Vec<Sprint>,
    pub ledger: &'a mut ChangeLedger,
    pub is_demo_mode: &'a mut bool,
    pub filter_assignee: &'a mut Option<String>,
    changed: bool,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        tasks: &'a mut Vec<Task>,
        sprints: &'a mut Vec<Sprint>,
        ledger: &'a mut ChangeLedger,
        is_demo_mode: &'a mut bool,
        filter_assignee: &'a mut Option<String>,
    ) -> Self {
        Self {
            tasks,
            sprints,
            ledger,
            is_demo_mode,
            filter_assignee,
            changed: false,
        }
    }

    /// Record that the command altered state and a snapshot is due.
    pub fn mark_changed(&mut self) {
        self.changed = true;
    }

    pub fn has_changed(&self) -> bool {
        self.changed
    }

    pub fn task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }

    pub fn sprint_mut(&mut self, name: &str) -> Option<&mut Sprint> {
        self.sprints.iter_mut().find(|s| s.name == name)
    }
}
