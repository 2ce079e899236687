use crate::cli::{TaskAction, TaskAddArgs, TaskUpdateArgs};
use crate::context::CliContext;
use crate::handlers::board::TaskView;
use crate::output;
use anyhow::{anyhow, bail};
use sprintcap_domain::{FieldUpdate, NewTask, TaskUpdate};

fn field_update<T>(value: Option<T>, clear: bool) -> FieldUpdate<T> {
    if clear {
        FieldUpdate::Clear
    } else {
        value.map(FieldUpdate::Set).unwrap_or(FieldUpdate::NoChange)
    }
}

pub fn handle(ctx: &mut CliContext, action: TaskAction) -> anyhow::Result<()> {
    match action {
        TaskAction::Add(args) => handle_add(ctx, args),
        TaskAction::List {
            sprint,
            backlog,
            assignee,
        } => {
            let board = ctx.board();
            let tasks: Vec<TaskView> = board
                .tasks()
                .iter()
                .filter(|t| match (&sprint, backlog) {
                    (Some(name), _) => t.sprint.as_ref() == Some(name),
                    (None, true) => t.is_in_backlog(),
                    (None, false) => true,
                })
                .filter(|t| assignee.as_deref().map_or(true, |a| t.is_assigned_to(a)))
                .map(TaskView::from)
                .collect();
            output::output_list(tasks)
        }
        TaskAction::Get { id } => {
            let board = ctx.board();
            let task = board
                .task(&id)
                .ok_or_else(|| anyhow!("Task not found: {}", id))?;
            output::output_success(TaskView::from(task))
        }
        TaskAction::Update(args) => handle_update(ctx, args),
        TaskAction::Move { id, to, backlog } => {
            let mut board = ctx.board();
            if board.task(&id).is_none() {
                bail!("Task not found: {}", id);
            }
            let target = if backlog { None } else { to };
            if let Some(name) = &target {
                if board.sprint(name).is_none() {
                    bail!("Sprint not found: {}", name);
                }
            }

            let changed = board.move_task(&id, target.as_deref());
            output::output_success(serde_json::json!({
                "task": board.task(&id),
                "changed": changed,
            }))
        }
    }
}

fn handle_add(ctx: &mut CliContext, args: TaskAddArgs) -> anyhow::Result<()> {
    if args.title.trim().is_empty() {
        bail!("Task title cannot be empty");
    }
    let mut board = ctx.board();
    if let Some(id) = &args.id {
        if board.task(id).is_some() {
            bail!("Task already exists: {}", id);
        }
    }

    let id = board.add_task(NewTask {
        id: args.id,
        title: args.title,
        points: args.points,
        status: args.status,
        assignee: args.assignee,
        sprint: args.sprint,
        description: args.description,
        color: args.color,
    });
    let task = board
        .task(&id)
        .ok_or_else(|| anyhow!("Task was not created: {}", id))?;
    output::output_success(TaskView::from(task))
}

fn handle_update(ctx: &mut CliContext, args: TaskUpdateArgs) -> anyhow::Result<()> {
    let mut board = ctx.board();
    if board.task(&args.id).is_none() {
        bail!("Task not found: {}", args.id);
    }

    let updates = TaskUpdate {
        title: args.title,
        points: args.points,
        status: args.status,
        assignee: field_update(args.assignee, args.clear_assignee),
        sprint: field_update(args.sprint, args.clear_sprint),
        description: field_update(args.description, args.clear_description),
        color: field_update(args.color, args.clear_color),
    };
    let changed = board.update_task(&args.id, updates);

    output::output_success(serde_json::json!({
        "task": board.task(&args.id),
        "changed": changed,
    }))
}
