//! The planning board state machine.
//!
//! `BoardState` exclusively owns the live tasks, sprints and change ledger.
//! Every mutation runs as a [`Command`] against a [`CommandContext`]; when
//! the command reports a change, a [`BoardSnapshot`] is handed to the
//! configured [`SnapshotSink`].
//!
//! Operations addressed by a stale id are no-ops: they return `false` and
//! leave the board untouched.

use std::fmt;
use std::sync::Arc;

use sprintcap_core::PlannerResult;

use crate::change::{ChangeId, PendingChange};
use crate::commands::*;
use crate::demo;
use crate::query::{self, SprintLoad};
use crate::{
    BoardSnapshot, ChangeLedger, NewTask, NoopSink, SnapshotSink, Sprint, SprintName, Task, TaskId,
    TaskUpdate,
};

pub struct BoardState {
    tasks: Vec<Task>,
    sprints: Vec<Sprint>,
    ledger: ChangeLedger,
    is_demo_mode: bool,
    filter_assignee: Option<String>,
    sink: Arc<dyn SnapshotSink>,
}

impl BoardState {
    /// Empty board, not in demo mode.
    pub fn new() -> Self {
        Self::from_snapshot(BoardSnapshot::default())
    }

    /// Seeded demo board.
    pub fn demo() -> Self {
        Self::from_snapshot(demo::demo_snapshot())
    }

    pub fn from_snapshot(snapshot: BoardSnapshot) -> Self {
        Self {
            tasks: snapshot.tasks,
            sprints: snapshot.sprints,
            ledger: ChangeLedger::from_entries(snapshot.pending_changes),
            is_demo_mode: snapshot.is_demo_mode,
            filter_assignee: snapshot.filter_assignee,
            sink: Arc::new(NoopSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn SnapshotSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn set_sink(&mut self, sink: Arc<dyn SnapshotSink>) {
        self.sink = sink;
    }

    /// Execute a command. Returns whether it changed the board; a snapshot is
    /// handed to the sink only in that case.
    pub fn execute(&mut self, command: &dyn Command) -> PlannerResult<bool> {
        tracing::debug!("Executing: {}", command.description());

        let mut context = CommandContext::new(
            &mut self.tasks,
            &mut self.sprints,
            &mut self.ledger,
            &mut self.is_demo_mode,
            &mut self.filter_assignee,
        );
        command.execute(&mut context)?;
        let changed = context.has_changed();

        if changed {
            self.sink.persist(self.snapshot());
        }
        Ok(changed)
    }

    fn apply(&mut self, command: &dyn Command) -> bool {
        match self.execute(command) {
            Ok(changed) => changed,
            Err(e) => {
                tracing::warn!("{} rejected: {}", command.description(), e);
                false
            }
        }
    }

    /// Move a task to a sprint, or to the backlog when `target` is `None`.
    pub fn move_task(&mut self, task_id: &str, target: Option<&str>) -> bool {
        self.apply(&MoveTask {
            task_id: task_id.to_string(),
            target: target.map(str::to_string),
        })
    }

    pub fn update_task(&mut self, task_id: &str, updates: TaskUpdate) -> bool {
        self.apply(&UpdateTask {
            task_id: task_id.to_string(),
            updates,
        })
    }

    /// Add a locally created task and return its id.
    pub fn add_task(&mut self, new_task: NewTask) -> TaskId {
        let task = new_task.into_task();
        let id = task.id.clone();
        self.apply(&CreateTask { task });
        id
    }

    pub fn add_sprint(&mut self, name: &str, capacity: f64) -> bool {
        self.apply(&CreateSprint {
            name: name.to_string(),
            capacity,
        })
    }

    pub fn delete_sprint(&mut self, name: &str) -> bool {
        self.apply(&DeleteSprint {
            name: name.to_string(),
        })
    }

    pub fn update_sprint_capacity(&mut self, name: &str, capacity: f64) -> bool {
        self.apply(&SetSprintCapacity {
            name: name.to_string(),
            capacity,
        })
    }

    pub fn update_assignee_capacity(&mut self, name: &str, assignee: &str, capacity: f64) -> bool {
        self.apply(&SetAssigneeCapacity {
            name: name.to_string(),
            assignee: assignee.to_string(),
            capacity,
        })
    }

    pub fn undo_change(&mut self, change_id: ChangeId) -> bool {
        self.apply(&UndoChange { change_id })
    }

    pub fn clear_pending_changes(&mut self) -> bool {
        self.apply(&ClearPendingChanges)
    }

    /// Drop ledger entries that have been exported.
    pub fn remove_changes(&mut self, ids: Vec<ChangeId>) -> bool {
        self.apply(&RemoveChanges { ids })
    }

    /// Replace all tasks and sprints, clear the ledger and leave demo mode.
    pub fn import_data(&mut self, sprints: Vec<Sprint>, tasks: Vec<Task>) -> bool {
        self.apply(&ImportBoard { sprints, tasks })
    }

    pub fn set_filter_assignee(&mut self, assignee: Option<String>) -> bool {
        self.apply(&SetAssigneeFilter { assignee })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn sprints(&self) -> &[Sprint] {
        &self.sprints
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn sprint(&self, name: &str) -> Option<&Sprint> {
        self.sprints.iter().find(|s| s.name == name)
    }

    pub fn sprint_names(&self) -> Vec<SprintName> {
        self.sprints.iter().map(|s| s.name.clone()).collect()
    }

    pub fn pending_changes(&self) -> &[PendingChange] {
        self.ledger.entries()
    }

    pub fn ledger(&self) -> &ChangeLedger {
        &self.ledger
    }

    pub fn is_demo_mode(&self) -> bool {
        self.is_demo_mode
    }

    pub fn filter_assignee(&self) -> Option<&str> {
        self.filter_assignee.as_deref()
    }

    /// Load of every sprint under the current assignee filter.
    pub fn sprint_loads(&self) -> Vec<SprintLoad> {
        query::board_load(&self.sprints, &self.tasks, self.filter_assignee())
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            tasks: self.tasks.clone(),
            sprints: self.sprints.clone(),
            is_demo_mode: self.is_demo_mode,
            filter_assignee: self.filter_assignee.clone(),
            pending_changes: self.ledger.entries().to_vec(),
        }
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoardState")
            .field("tasks", &self.tasks.len())
            .field("sprints", &self.sprints.len())
            .field("pending_changes", &self.ledger.len())
            .field("is_demo_mode", &self.is_demo_mode)
            .field("filter_assignee", &self.filter_assignee)
            .finish()
    }
}
