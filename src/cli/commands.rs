use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gy", about = concat!("[>] gantry v", env!("CARGO_PKG_VERSION"), " - your schedule is a flat file"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different directory
    #[arg(short = 'C', long = "dir", global = true)]
    pub dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a schedule file in the current directory
    Init(InitArgs),
    /// List tasks as an indented tree
    List(ListArgs),
    /// Show one task in detail
    Show(ShowArgs),
    /// Add a task
    Add(AddArgs),
    /// Edit a task's fields
    Edit(EditArgs),
    /// Set a task's progress percentage
    Progress(ProgressArgs),
    /// Set a task's workflow status
    Status(StatusArgs),
    /// Delete a task and all of its descendants
    Rm(RmArgs),
    /// Move a task under a new parent
    Mv(MvArgs),
    /// Print the timeline axis for a zoom unit
    Scale(ScaleArgs),
    /// Print a task's bar geometry on the axis
    Pos(PosArgs),
    /// Show schedule statistics
    Stats,
}

// ---------------------------------------------------------------------------
// Init args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Seed the schedule with the bundled demo plan
    #[arg(long)]
    pub sample: bool,
    /// Overwrite an existing schedule file
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// Filter by status (draft, in_progress, completed)
    #[arg(long)]
    pub status: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Task id to show
    pub id: u64,
}

#[derive(Args)]
pub struct ScaleArgs {
    /// Zoom unit (day, week, month, quarter, year; default from config)
    #[arg(long)]
    pub unit: Option<String>,
    /// Range start (YYYY-MM-DD; default: earliest task date)
    #[arg(long)]
    pub from: Option<String>,
    /// Range end (YYYY-MM-DD; default: latest task date)
    #[arg(long)]
    pub to: Option<String>,
    /// Also print the upper header bands
    #[arg(long)]
    pub bands: bool,
}

#[derive(Args)]
pub struct PosArgs {
    /// Task id
    pub id: u64,
    /// Zoom unit (default from config)
    #[arg(long)]
    pub unit: Option<String>,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Task role: project, phase, task, or milestone
    pub kind: String,
    /// Display label
    pub text: String,
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: String,
    /// End date (YYYY-MM-DD; defaults to the start date)
    #[arg(long)]
    pub end: Option<String>,
    /// Parent task id (omit for a root task)
    #[arg(long)]
    pub parent: Option<u64>,
    /// Budget amount (digits, separators allowed)
    #[arg(long)]
    pub price: Option<String>,
    /// Budget share percentage
    #[arg(long)]
    pub ratio: Option<f64>,
    /// Initial progress percentage
    #[arg(long)]
    pub progress: Option<u8>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task id to edit
    pub id: u64,
    /// New display label
    #[arg(long)]
    pub text: Option<String>,
    /// New start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,
    /// New end date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,
    /// New progress percentage
    #[arg(long)]
    pub progress: Option<u8>,
    /// New budget amount
    #[arg(long)]
    pub price: Option<String>,
    /// New budget share percentage
    #[arg(long)]
    pub ratio: Option<f64>,
    /// New status (draft, in_progress, completed)
    #[arg(long)]
    pub status: Option<String>,
    /// Convert a normal task into a milestone
    #[arg(long, conflicts_with = "to_task")]
    pub to_milestone: bool,
    /// Convert a milestone back into a normal task
    #[arg(long)]
    pub to_task: bool,
}

#[derive(Args)]
pub struct ProgressArgs {
    /// Task id
    pub id: u64,
    /// Progress percentage (0-100)
    pub percent: u8,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Task id
    pub id: u64,
    /// New status (draft, in_progress, completed)
    pub status: String,
}

#[derive(Args)]
pub struct RmArgs {
    /// Task id to delete (descendants go with it)
    pub id: u64,
}

#[derive(Args)]
pub struct MvArgs {
    /// Task id to move
    pub id: u64,
    /// New parent id, or 0 to make it a root task
    pub parent: u64,
}
