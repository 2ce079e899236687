use crate::cli::SyncAction;
use crate::context::CliContext;
use crate::output;
use anyhow::bail;
use sprintcap_sync::{HttpConnector, PullOutcome, SyncCoordinator, SyncSettings};
use std::sync::Arc;

fn coordinator(ctx: &CliContext) -> SyncCoordinator {
    SyncCoordinator::new(
        ctx.shared_board(),
        Arc::new(HttpConnector::from_config(&ctx.config.remote)),
        Arc::new(ctx.config.remote.clone()),
        SyncSettings::from_config(&ctx.config),
    )
}

fn report_pull(coordinator: &SyncCoordinator, outcome: PullOutcome) -> anyhow::Result<()> {
    if let PullOutcome::Failed { error } = outcome {
        bail!("Pull failed: {}", error);
    }
    output::output_success(serde_json::json!({
        "pull": outcome,
        "status": coordinator.status(),
    }))
}

pub async fn handle(ctx: &CliContext, action: SyncAction) -> anyhow::Result<()> {
    let coordinator = coordinator(ctx);
    match action {
        SyncAction::Pull => {
            let outcome = coordinator.pull().await;
            report_pull(&coordinator, outcome)
        }
        SyncAction::Auto => {
            let outcome = coordinator.auto_ingest().await;
            report_pull(&coordinator, outcome)
        }
        SyncAction::Push => {
            let report = coordinator.push().await?;
            let created: Vec<_> = report
                .export
                .created
                .iter()
                .map(|(local, remote)| serde_json::json!({"localId": local, "remoteId": remote}))
                .collect();
            output::output_success(serde_json::json!({
                "created": created,
                "updated": report.export.updated,
                "moved": report.export.moved,
                "skipped": report.export.skipped,
                "exported": report.export.exported_ids.len(),
                "pull": report.refresh,
                "status": coordinator.status(),
            }))
        }
    }
}
