use crate::cli::{BoardArgs, FilterArgs};
use crate::context::CliContext;
use crate::output;
use serde::Serialize;
use sprintcap_domain::palette::{assignee_color, visual_height};
use sprintcap_domain::query::{self, SprintLoad};
use sprintcap_domain::Task;

/// A task with the drawing hints a board view needs.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView<'a> {
    #[serde(flatten)]
    pub task: &'a Task,
    pub height: f64,
    pub assignee_color: &'static str,
}

impl<'a> From<&'a Task> for TaskView<'a> {
    fn from(task: &'a Task) -> Self {
        Self {
            task,
            height: visual_height(task.points),
            assignee_color: assignee_color(task.assignee.as_deref().unwrap_or_default()),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SprintView<'a> {
    #[serde(flatten)]
    load: SprintLoad,
    remaining: f64,
    fill_percentage: f64,
    over_capacity: bool,
    tasks: Vec<TaskView<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BoardView<'a> {
    is_demo_mode: bool,
    filter_assignee: Option<&'a str>,
    pending_changes: usize,
    sprints: Vec<SprintView<'a>>,
    backlog: Vec<TaskView<'a>>,
    backlog_points: f64,
}

pub fn handle_show(ctx: &CliContext, args: BoardArgs) -> anyhow::Result<()> {
    let board = ctx.board();
    let filter = args.assignee.as_deref().or(board.filter_assignee());

    let sprints = board
        .sprints()
        .iter()
        .map(|sprint| {
            let load = query::sprint_load(sprint, board.tasks(), filter);
            SprintView {
                remaining: load.remaining(),
                fill_percentage: load.fill_percentage(),
                over_capacity: load.is_over_capacity(),
                tasks: query::sprint_tasks(&sprint.name, board.tasks(), filter)
                    .into_iter()
                    .map(TaskView::from)
                    .collect(),
                load,
            }
        })
        .collect();

    let backlog = query::backlog_tasks(board.tasks(), filter);
    let view = BoardView {
        is_demo_mode: board.is_demo_mode(),
        filter_assignee: filter,
        pending_changes: board.pending_changes().len(),
        backlog_points: query::total_points(&backlog),
        backlog: backlog.into_iter().map(TaskView::from).collect(),
        sprints,
    };
    output::output_success(view)
}

pub fn handle_filter(ctx: &mut CliContext, args: FilterArgs) -> anyhow::Result<()> {
    let mut board = ctx.board();
    if args.clear {
        board.set_filter_assignee(None);
    } else if let Some(assignee) = args.assignee {
        board.set_filter_assignee(Some(assignee));
    }

    output::output_success(serde_json::json!({
        "filterAssignee": board.filter_assignee(),
        "assignees": query::assignees(board.tasks()),
    }))
}
