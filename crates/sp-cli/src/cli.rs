//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::complete::CompleteArgs;
use crate::commands::create::CreateArgs;
use crate::commands::delete::DeleteArgs;
use crate::commands::list::ListArgs;
use crate::commands::schedule::ScheduleArgs;
use crate::commands::show::ShowArgs;

/// Study planner.
///
/// Turns a syllabus or topic list into a day-by-day study calendar that fits
/// before a deadline, then tracks progress through it.
#[derive(Debug, Parser)]
#[command(name = "sp", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Preview a schedule for a topic file without saving it.
    Schedule(ScheduleArgs),

    /// Create and store a study plan.
    Create(CreateArgs),

    /// List stored plans.
    List(ListArgs),

    /// Show a plan's summary and checklist.
    Show(ShowArgs),

    /// Mark a schedule item as completed.
    Done(CompleteArgs),

    /// Mark a schedule item as not completed.
    Undo(CompleteArgs),

    /// Delete a plan and its schedule.
    Delete(DeleteArgs),

    /// Show database location and plan count.
    Status,
}
