use crate::cli::SprintAction;
use crate::context::CliContext;
use crate::output;
use anyhow::{anyhow, bail};
use serde::Serialize;
use sprintcap_domain::query::{self, SprintLoad};
use std::collections::BTreeMap;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SprintSummary<'a> {
    #[serde(flatten)]
    load: SprintLoad,
    assignee_capacities: &'a BTreeMap<String, f64>,
    /// Points per assignee; unassigned work is keyed by "".
    assignee_load: BTreeMap<String, f64>,
}

pub fn handle(ctx: &mut CliContext, action: SprintAction) -> anyhow::Result<()> {
    match action {
        SprintAction::Add { name, capacity } => {
            let name = name.trim().to_string();
            if name.is_empty() {
                bail!("Sprint name cannot be empty");
            }
            let capacity = capacity.unwrap_or(ctx.config.board.default_sprint_capacity);
            let mut board = ctx.board();
            if board.sprint(&name).is_some() {
                bail!("Sprint already exists: {}", name);
            }
            board.add_sprint(&name, capacity);
            output::output_success(board.sprint(&name))
        }
        SprintAction::List => {
            let board = ctx.board();
            let sprints: Vec<SprintSummary> = board
                .sprints()
                .iter()
                .map(|sprint| SprintSummary {
                    load: query::sprint_load(sprint, board.tasks(), None),
                    assignee_capacities: &sprint.assignee_capacities,
                    assignee_load: query::assignee_breakdown(&sprint.name, board.tasks()),
                })
                .collect();
            output::output_list(sprints)
        }
        SprintAction::Delete { name } => {
            let mut board = ctx.board();
            if board.sprint(&name).is_none() {
                bail!("Sprint not found: {}", name);
            }
            let moved = query::sprint_tasks(&name, board.tasks(), None).len();
            board.delete_sprint(&name);
            output::output_success(serde_json::json!({
                "deleted": name,
                "movedToBacklog": moved,
            }))
        }
        SprintAction::Capacity { name, capacity } => {
            let mut board = ctx.board();
            if !board.update_sprint_capacity(&name, capacity) && board.sprint(&name).is_none() {
                bail!("Sprint not found: {}", name);
            }
            output::output_success(board.sprint(&name))
        }
        SprintAction::AssigneeCapacity {
            name,
            assignee,
            capacity,
        } => {
            let mut board = ctx.board();
            if board.sprint(&name).is_none() {
                bail!("Sprint not found: {}", name);
            }
            board.update_assignee_capacity(&name, &assignee, capacity);
            let sprint = board
                .sprint(&name)
                .ok_or_else(|| anyhow!("Sprint not found: {}", name))?;
            output::output_success(sprint)
        }
    }
}
