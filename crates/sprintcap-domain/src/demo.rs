//! Seed board shown before any remote data has been pulled.

use crate::{BoardSnapshot, Sprint, Task, TaskStatus};

pub const DEMO_CAPACITY: f64 = 50.0;

const DEMO_SPRINTS: [&str; 3] = ["Sprint 24.1", "Sprint 24.2", "Sprint 24.3"];

type Row = (&'static str, &'static str, Option<&'static str>, f64, TaskStatus, &'static str);

const DEMO_TASKS: [Row; 16] = [
    ("1", "Implement Login", Some("Sprint 24.1"), 3.0, TaskStatus::Done, "Alice"),
    ("2", "Database Schema Design", Some("Sprint 24.1"), 5.0, TaskStatus::Done, "Bob"),
    ("3a", "API Gateway Setup (Part 1)", Some("Sprint 24.1"), 4.0, TaskStatus::InProgress, "Charlie"),
    ("3b", "API Gateway Setup (Part 2)", Some("Sprint 24.2"), 4.0, TaskStatus::ToDo, "Charlie"),
    ("4", "User Profile UI", Some("Sprint 24.2"), 5.0, TaskStatus::InProgress, "Alice"),
    ("5", "Settings Page", Some("Sprint 24.2"), 3.0, TaskStatus::ToDo, "Bob"),
    ("6", "Payment Integration", Some("Sprint 24.3"), 13.0, TaskStatus::ToDo, "Charlie"),
    ("7", "Email Notifications", None, 2.0, TaskStatus::Backlog, "Alice"),
    ("8", "Admin Dashboard", None, 8.0, TaskStatus::Backlog, "Bob"),
    ("9", "Mobile Responsive Fixes", None, 1.0, TaskStatus::Backlog, "Charlie"),
    ("10", "Search Functionality", Some("Sprint 24.3"), 5.0, TaskStatus::ToDo, "Alice"),
    ("11", "Audit Logging", None, 3.0, TaskStatus::Backlog, "Bob"),
    ("12", "Performance Optimization", None, 5.0, TaskStatus::Backlog, "Charlie"),
    ("13", "Deprecated Code Removal", None, 0.5, TaskStatus::Backlog, "Alice"),
    ("14", "Update Documentation", None, 1.0, TaskStatus::Backlog, "Alice"),
    ("15", "Fix Typos in Footer", None, 0.5, TaskStatus::Backlog, "Bob"),
];

pub fn demo_sprints() -> Vec<Sprint> {
    DEMO_SPRINTS
        .iter()
        .map(|name| Sprint::new(*name, DEMO_CAPACITY))
        .collect()
}

pub fn demo_tasks() -> Vec<Task> {
    DEMO_TASKS
        .iter()
        .map(|(id, title, sprint, points, status, assignee)| {
            let mut task = Task::new(*id, *title, *points);
            task.sprint = sprint.map(str::to_string);
            task.status = *status;
            task.assignee = Some(assignee.to_string());
            task
        })
        .collect()
}

/// Demo board with demo mode switched on and an empty ledger.
pub fn demo_snapshot() -> BoardSnapshot {
    BoardSnapshot {
        tasks: demo_tasks(),
        sprints: demo_sprints(),
        is_demo_mode: true,
        filter_assignee: None,
        pending_changes: Vec::new(),
    }
}
