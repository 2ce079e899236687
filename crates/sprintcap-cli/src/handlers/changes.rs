use crate::cli::ChangesAction;
use crate::context::CliContext;
use crate::output;
use anyhow::bail;
use serde::Serialize;
use sprintcap_domain::PendingChange;

#[derive(Serialize)]
struct ChangeView<'a> {
    #[serde(flatten)]
    change: &'a PendingChange,
    summary: String,
}

pub fn handle(ctx: &mut CliContext, action: ChangesAction) -> anyhow::Result<()> {
    let mut board = ctx.board();
    match action {
        ChangesAction::List => {
            let changes: Vec<ChangeView> = board
                .ledger()
                .recent_first()
                .map(|change| ChangeView {
                    change,
                    summary: change.summary(),
                })
                .collect();
            output::output_list(changes)
        }
        ChangesAction::Undo { id } => {
            let Some(change) = board.ledger().get(id).cloned() else {
                bail!("Change not found: {}", id);
            };
            board.undo_change(id);
            output::output_success(serde_json::json!({
                "undone": change.summary(),
                "task": board.task(&change.task_id),
                "remaining": board.pending_changes().len(),
            }))
        }
        ChangesAction::Clear => {
            let cleared = board.pending_changes().len();
            board.clear_pending_changes();
            output::output_success(serde_json::json!({ "cleared": cleared }))
        }
    }
}
