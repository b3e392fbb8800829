//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use poqt_constant::app;
use poqt_core::{Priority, ReminderLead, RenderKind};

#[derive(Parser)]
#[command(
    name = app::NAME,
    about = app::DESCRIPTION,
    version = app::VERSION,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output (debug logs on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format: text (human-readable) or json (machine-readable)
    #[arg(short, long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Data directory (default: $POQT_DATA_DIR or ~/.poqt)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Colored terminal output for humans
    #[default]
    Text,
    /// Structured JSON for scripts
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Add a task to the selected list
    Add {
        /// What needs doing
        description: String,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Change a task; omitted fields keep their value
    Edit {
        id: i64,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
        #[command(flatten)]
        fields: TaskFields,
        /// Remove the due date
        #[arg(long, conflicts_with = "due")]
        no_due: bool,
    },
    /// Mark a task completed
    Done { id: i64 },
    /// Move a completed task back to active
    Restore { id: i64 },
    /// Delete a task
    Rm { id: i64 },
    /// Show the tasks of the selected list (or of LIST)
    Show {
        /// `active`, `completed`, a list name or a list id
        list: Option<String>,
    },
    /// Select the next list
    Next,
    /// Select the previous list
    Prev,
    /// Select a list by name, id, `active` or `completed`
    Select { list: String },
    /// Manage custom lists
    List {
        #[command(subcommand)]
        action: ListAction,
    },
    /// Add or remove tasks from custom lists
    Member {
        #[command(subcommand)]
        action: MemberAction,
    },
    /// Read and write preferences
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Reload pending reminders and deliver them until interrupted
    Watch {
        /// Seconds between re-reads of storage, to pick up changes made by
        /// other invocations (0 disables)
        #[arg(long, default_value = "60")]
        rescan: u64,
    },
}

#[derive(Args, Default)]
pub struct TaskFields {
    /// Due date, local time: `YYYY-MM-DD HH:MM` or `YYYY-MM-DD` (09:00)
    #[arg(long)]
    pub due: Option<String>,
    /// low, normal or high
    #[arg(short, long)]
    pub priority: Option<Priority>,
    /// Reminder lead: none, due, 5m, 15m, 30m, 1h, 2h, 1d, 1w
    #[arg(short, long)]
    pub remind: Option<ReminderLead>,
}

#[derive(Subcommand)]
pub enum ListAction {
    /// Create a custom list
    Add {
        name: String,
        /// Render kind: colored or plain
        #[arg(short, long, default_value = "colored")]
        render: RenderKind,
    },
    /// Rename a list or change its render kind
    Edit {
        /// List name or id
        list: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        render: Option<RenderKind>,
    },
    /// Delete a custom list (its tasks are kept)
    Rm { list: String },
    /// Show every list in cycle order
    Ls,
}

#[derive(Subcommand)]
pub enum MemberAction {
    /// Add a task to a custom list
    Add { task: i64, list: String },
    /// Remove a task from a custom list (default: the selected list)
    Rm { task: i64, list: Option<String> },
    /// Show the custom lists a task belongs to
    Ls { task: i64 },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show every stored option
    Ls,
    /// Show one option
    Get { key: String },
    /// Set one option, e.g. `urgency.time_window_minutes 120`
    Set { key: String, value: String },
}
