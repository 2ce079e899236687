mod cli;
mod context;
mod handlers;
mod output;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use context::CliContext;
use sprintcap_core::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Ok(log_path) = std::env::var("SPRINTCAP_DEBUG_LOG") {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(tracing::Level::WARN)
            .init();
    }

    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "sprintcap", &mut std::io::stdout());
        return Ok(());
    }

    if let Err(e) = run(cli).await {
        output::output_error(&format!("{e:#}"));
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };
    if cli.config.is_some() {
        config.apply_overrides(|key| std::env::var(key).ok());
    }

    let file_path = cli.file.unwrap_or_else(|| config.effective_data_file());
    let mut ctx = CliContext::load(&file_path, config).await?;

    let result = match cli.command {
        Commands::Board(args) => handlers::board::handle_show(&ctx, args),
        Commands::Task(task_cmd) => handlers::task::handle(&mut ctx, task_cmd.action),
        Commands::Sprint(sprint_cmd) => handlers::sprint::handle(&mut ctx, sprint_cmd.action),
        Commands::Changes(changes_cmd) => handlers::changes::handle(&mut ctx, changes_cmd.action),
        Commands::Filter(args) => handlers::board::handle_filter(&mut ctx, args),
        Commands::Sync(sync_cmd) => handlers::sync::handle(&ctx, sync_cmd.action).await,
        Commands::Completions { .. } => Ok(()),
    };

    ctx.finish().await?;
    result
}
