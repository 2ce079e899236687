//! Capacity and load queries over the board.
//!
//! Pure functions over task and sprint slices; the assignee filter narrows
//! both the tasks counted and the capacity they are measured against.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::{Sprint, Task};

/// Points planned into one sprint against its capacity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintLoad {
    pub name: String,
    pub capacity: f64,
    pub load: f64,
    pub task_count: usize,
}

impl SprintLoad {
    /// Capacity left; negative when over-committed.
    pub fn remaining(&self) -> f64 {
        self.capacity - self.load
    }

    pub fn is_over_capacity(&self) -> bool {
        self.load > self.capacity
    }

    /// Load as a percentage of capacity. Zero capacity with any load reads as
    /// infinitely full.
    pub fn fill_percentage(&self) -> f64 {
        if self.capacity > 0.0 {
            self.load / self.capacity * 100.0
        } else if self.load > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    }
}

fn matches_filter(task: &Task, filter: Option<&str>) -> bool {
    filter.map_or(true, |assignee| task.is_assigned_to(assignee))
}

/// Tasks planned into a sprint, optionally narrowed to one assignee.
pub fn sprint_tasks<'a>(name: &str, tasks: &'a [Task], filter: Option<&str>) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| t.sprint.as_deref() == Some(name) && matches_filter(t, filter))
        .collect()
}

/// Tasks with no sprint, optionally narrowed to one assignee.
pub fn backlog_tasks<'a>(tasks: &'a [Task], filter: Option<&str>) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| t.is_in_backlog() && matches_filter(t, filter))
        .collect()
}

/// Sum of points over the given tasks.
pub fn total_points(tasks: &[&Task]) -> f64 {
    tasks.iter().map(|t| t.points).sum()
}

pub fn sprint_load(sprint: &Sprint, tasks: &[Task], filter: Option<&str>) -> SprintLoad {
    let planned = sprint_tasks(&sprint.name, tasks, filter);
    SprintLoad {
        name: sprint.name.clone(),
        capacity: sprint.effective_capacity(filter),
        load: total_points(&planned),
        task_count: planned.len(),
    }
}

/// Load of every sprint, in board order.
pub fn board_load(sprints: &[Sprint], tasks: &[Task], filter: Option<&str>) -> Vec<SprintLoad> {
    sprints
        .iter()
        .map(|sprint| sprint_load(sprint, tasks, filter))
        .collect()
}

/// Distinct non-empty assignee names, sorted.
pub fn assignees(tasks: &[Task]) -> Vec<String> {
    tasks
        .iter()
        .filter_map(|t| t.assignee.as_deref())
        .filter(|name| !name.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Points per assignee within one sprint. Unassigned tasks are keyed by the
/// empty string.
pub fn assignee_breakdown(name: &str, tasks: &[Task]) -> BTreeMap<String, f64> {
    let mut breakdown = BTreeMap::new();
    for task in sprint_tasks(name, tasks, None) {
        let key = task.assignee.clone().unwrap_or_default();
        *breakdown.entry(key).or_insert(0.0) += task.points;
    }
    breakdown
}
