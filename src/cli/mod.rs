//! Command-line interface for projectpro
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command family is implemented in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::calendar::WeekStart;
use crate::config::Config;
use crate::error::Result;
use crate::model::Priority;
use crate::output::OutputOptions;
use crate::session::Session;

mod init;
mod project;
mod task;
mod views;
mod watch;

/// projectpro - Project Pro
///
/// Personal project and task management with a deadline calendar and
/// completion progress views.
#[derive(Parser, Debug)]
#[command(name = "projectpro")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the store (defaults to current directory)
    #[arg(long, global = true, env = "PROJECTPRO_ROOT")]
    pub root: Option<PathBuf>,

    /// Owner identity for queries and new documents
    #[arg(long, global = true, env = "PROJECTPRO_USER")]
    pub user: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the store in the root directory
    Init,

    /// Project management
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Month calendar with deadline markers
    Calendar {
        /// Month to show (YYYY-MM, defaults to the current month)
        #[arg(long)]
        month: Option<String>,

        /// First day of the week (overrides config)
        #[arg(long, value_enum)]
        week_start: Option<WeekStart>,
    },

    /// Deadlines on one day
    Agenda {
        /// Day to show (YYYY-MM-DD, defaults to today)
        date: Option<String>,
    },

    /// Deadlines over the next days
    Upcoming {
        /// Number of days including today (overrides config)
        #[arg(long)]
        days: Option<u32>,
    },

    /// Completion progress per project
    Progress {
        /// Limit to one project (id or unique prefix)
        project: Option<String>,
    },

    /// Follow store changes and print the agenda after each one
    Watch {
        /// Day to follow (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Create a project
    New {
        /// Project title
        title: String,

        #[arg(long)]
        description: Option<String>,

        /// Deadline (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        deadline: Option<String>,

        #[arg(long, value_enum)]
        priority: Option<Priority>,

        /// Image reference (path or URL)
        #[arg(long)]
        image: Option<String>,
    },

    /// List projects with progress
    List,

    /// Show a project and its tasks
    Show {
        /// Project id or unique prefix
        id: String,
    },

    /// Edit a project
    Edit {
        /// Project id or unique prefix
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,

        #[arg(long)]
        clear_description: bool,

        #[arg(long, conflicts_with = "clear_deadline")]
        deadline: Option<String>,

        #[arg(long)]
        clear_deadline: bool,

        #[arg(long, value_enum)]
        priority: Option<Priority>,

        #[arg(long, conflicts_with = "clear_image")]
        image: Option<String>,

        #[arg(long)]
        clear_image: bool,
    },

    /// Delete a project and all of its tasks
    Rm {
        /// Project id or unique prefix
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a task in a project
    New {
        /// Owning project id or unique prefix
        project: String,

        /// Task title
        title: String,

        #[arg(long)]
        description: Option<String>,

        /// Deadline (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        deadline: Option<String>,

        #[arg(long, value_enum)]
        priority: Option<Priority>,
    },

    /// List tasks, open first then by priority
    List {
        /// Limit to one project (id or unique prefix)
        #[arg(long)]
        project: Option<String>,

        /// Hide completed tasks
        #[arg(long)]
        open: bool,
    },

    /// Show a task
    Show {
        /// Task id or unique prefix
        id: String,
    },

    /// Edit a task
    Edit {
        /// Task id or unique prefix
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,

        #[arg(long)]
        clear_description: bool,

        #[arg(long, conflicts_with = "clear_deadline")]
        deadline: Option<String>,

        #[arg(long)]
        clear_deadline: bool,

        #[arg(long, value_enum)]
        priority: Option<Priority>,

        /// Move the task to another project
        #[arg(long)]
        project: Option<String>,
    },

    /// Flip a task between open and completed
    Toggle {
        /// Task id or unique prefix
        id: String,
    },

    /// Delete a task
    Rm {
        /// Task id or unique prefix
        id: String,
    },
}

/// Everything a command needs besides its own arguments.
pub(crate) struct Context {
    pub root: PathBuf,
    pub config: Config,
    pub user: Option<String>,
    pub output: OutputOptions,
    pub verbose: bool,
}

impl Context {
    pub fn session(&self) -> Result<Session> {
        Session::open(&self.root, self.user.clone(), &self.config)
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let root = match self.root {
            Some(root) => root,
            None => std::env::current_dir()?,
        };
        let config = Config::discover(&root);
        let ctx = Context {
            root,
            config,
            user: self.user,
            output: OutputOptions {
                json: self.json,
                quiet: self.quiet,
            },
            verbose: self.verbose,
        };
        tracing::debug!(root = %ctx.root.display(), command = ?self.command, "running command");

        match self.command {
            Commands::Init => init::run(&ctx),
            Commands::Project(command) => project::run(&ctx, command),
            Commands::Task(command) => task::run(&ctx, command),
            Commands::Calendar { month, week_start } => {
                views::run_calendar(&ctx, month, week_start)
            }
            Commands::Agenda { date } => views::run_agenda(&ctx, date),
            Commands::Upcoming { days } => views::run_upcoming(&ctx, days),
            Commands::Progress { project } => views::run_progress(&ctx, project),
            Commands::Watch { date } => watch::run(&ctx, date),
        }
    }
}

/// `Some(None)` when `clear` is set, `Some(Some(v))` when a value is given.
fn optional_change<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
    if clear {
        Some(None)
    } else {
        value.map(Some)
    }
}

/// Parse a `YYYY-MM-DD` argument, defaulting to today.
fn day_arg(raw: Option<&str>) -> Result<chrono::NaiveDate> {
    match raw {
        None => Ok(crate::date::today()),
        Some(raw) => crate::date::parse_day(raw).ok_or_else(|| {
            let message = format!("invalid date '{raw}' (expected YYYY-MM-DD)");
            crate::error::Error::InvalidArgument(message)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_change_maps_flags() {
        assert_eq!(optional_change(Some(1), false), Some(Some(1)));
        assert_eq!(optional_change::<i32>(None, true), Some(None));
        assert_eq!(optional_change::<i32>(None, false), None);
    }

    #[test]
    fn cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "projectpro",
            "task",
            "list",
            "--open",
            "--json",
            "--user",
            "alice",
        ])
        .expect("parse");
        assert!(cli.json);
        assert_eq!(cli.user.as_deref(), Some("alice"));
        assert!(matches!(
            cli.command,
            Commands::Task(TaskCommands::List { open: true, .. })
        ));
    }

    #[test]
    fn day_arg_rejects_garbage() {
        assert!(day_arg(Some("tomorrow")).is_err());
        assert_eq!(
            day_arg(Some("2025-10-15")).expect("day"),
            chrono::NaiveDate::from_ymd_opt(2025, 10, 15).expect("date")
        );
    }
}
