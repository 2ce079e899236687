use clap::{Args, Parser, Subcommand};
use sprintcap_domain::TaskStatus;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "sprintcap")]
#[command(about = "Plan sprints against capacity and sync them with a remote tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the board data file (or set SPRINTCAP_FILE env var)
    #[arg(long, short, global = true, value_name = "FILE", env = "SPRINTCAP_FILE")]
    pub file: Option<PathBuf>,

    /// Config file to use instead of the per-user one
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show sprints with their load and the backlog
    Board(BoardArgs),
    /// Task operations
    Task(TaskCommand),
    /// Sprint operations
    Sprint(SprintCommand),
    /// Pending change operations
    Changes(ChangesCommand),
    /// Narrow capacity views to one assignee
    Filter(FilterArgs),
    /// Pull from or push to the remote tracker
    Sync(SyncCommand),
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args)]
pub struct BoardArgs {
    /// Show only this assignee's tasks and capacity (defaults to the saved filter)
    #[arg(long)]
    pub assignee: Option<String>,
}

#[derive(Args)]
pub struct FilterArgs {
    #[arg(long, conflicts_with = "clear")]
    pub assignee: Option<String>,
    #[arg(long)]
    pub clear: bool,
}

// Task commands
#[derive(Args)]
pub struct TaskCommand {
    #[command(subcommand)]
    pub action: TaskAction,
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a task
    Add(TaskAddArgs),
    /// List tasks
    List {
        #[arg(long, conflicts_with = "backlog")]
        sprint: Option<String>,
        #[arg(long)]
        backlog: bool,
        #[arg(long)]
        assignee: Option<String>,
    },
    /// Get a specific task
    Get {
        #[arg(long)]
        id: String,
    },
    /// Update a task
    Update(TaskUpdateArgs),
    /// Move a task to a sprint or the backlog
    Move {
        #[arg(long)]
        id: String,
        #[arg(long, required_unless_present = "backlog")]
        to: Option<String>,
        #[arg(long, conflicts_with = "to")]
        backlog: bool,
    },
}

#[derive(Args)]
pub struct TaskAddArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub points: f64,
    /// Explicit id; a local id is generated when omitted
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long)]
    pub status: Option<TaskStatus>,
    #[arg(long)]
    pub sprint: Option<String>,
    #[arg(long)]
    pub assignee: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub color: Option<String>,
}

#[derive(Args)]
pub struct TaskUpdateArgs {
    #[arg(long)]
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub points: Option<f64>,
    #[arg(long)]
    pub status: Option<TaskStatus>,
    #[arg(long, conflicts_with = "clear_assignee")]
    pub assignee: Option<String>,
    #[arg(long)]
    pub clear_assignee: bool,
    #[arg(long, conflicts_with = "clear_sprint")]
    pub sprint: Option<String>,
    #[arg(long)]
    pub clear_sprint: bool,
    #[arg(long, conflicts_with = "clear_description")]
    pub description: Option<String>,
    #[arg(long)]
    pub clear_description: bool,
    #[arg(long, conflicts_with = "clear_color")]
    pub color: Option<String>,
    #[arg(long)]
    pub clear_color: bool,
}

// Sprint commands
#[derive(Args)]
pub struct SprintCommand {
    #[command(subcommand)]
    pub action: SprintAction,
}

#[derive(Subcommand)]
pub enum SprintAction {
    /// Create a sprint
    Add {
        #[arg(long)]
        name: String,
        /// Defaults to the configured sprint capacity
        #[arg(long)]
        capacity: Option<f64>,
    },
    /// List sprints with load and per-assignee breakdown
    List,
    /// Delete a sprint, moving its tasks to the backlog
    Delete {
        #[arg(long)]
        name: String,
    },
    /// Set a sprint's total capacity
    Capacity {
        #[arg(long)]
        name: String,
        #[arg(long)]
        capacity: f64,
    },
    /// Set one assignee's capacity within a sprint
    AssigneeCapacity {
        #[arg(long)]
        name: String,
        #[arg(long)]
        assignee: String,
        #[arg(long)]
        capacity: f64,
    },
}

// Pending change commands
#[derive(Args)]
pub struct ChangesCommand {
    #[command(subcommand)]
    pub action: ChangesAction,
}

#[derive(Subcommand)]
pub enum ChangesAction {
    /// List pending changes, most recent first
    List,
    /// Revert one pending change
    Undo {
        #[arg(long)]
        id: Uuid,
    },
    /// Drop every pending change without reverting
    Clear,
}

// Sync commands
#[derive(Args)]
pub struct SyncCommand {
    #[command(subcommand)]
    pub action: SyncAction,
}

#[derive(Subcommand)]
pub enum SyncAction {
    /// Replace the board with the remote project
    Pull,
    /// Send pending changes, then pull
    Push,
    /// Pull once if the board still holds demo data
    Auto,
}
