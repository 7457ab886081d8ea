use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::modules::projects::core::charge::ChargeId;
use crate::modules::projects::use_cases::errors::ApplicationError;
use crate::modules::projects::use_cases::list_records::inbound::cli as list_cli;
use crate::modules::projects::use_cases::manage_charges::inbound::cli as charges_cli;
use crate::modules::projects::use_cases::manage_projects::inbound::cli as projects_cli;
use crate::modules::projects::use_cases::monthly_summary::inbound::cli as summary_cli;
use crate::shared::core::primitives::Timezone;
use crate::shell::state::AppState;

#[derive(Parser)]
#[command(name = "project_time")]
#[command(about = "Track time charged to projects", long_about = None)]
pub struct Cli {
    /// SQLite connection URL, or `memory`.
    #[arg(long, global = true, env = "DATABASE_URL")]
    pub database: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Add a project
    Mkproject {
        /// A name for the project
        name: String,
    },
    /// Rename a project
    Rename {
        /// The current name of the project
        current_name: String,
        /// The new name for the project
        new_name: String,
    },
    /// Mark a project as active
    SetActive { name: String },
    /// Mark a project as inactive
    SetInactive { name: String },
    /// Delete a project
    Rm { name: String },
    /// Add a charge
    Mkcharge(MkchargeArgs),
    /// Commit an end time for a charge
    Commit(CommitArgs),
    /// Close a charge
    Close(ChargeArgs),
    /// Delete a charge
    Rmcharge(ChargeArgs),
    /// List records
    #[command(subcommand)]
    Ls(LsCommand),
    /// Summarize hours per project over a month
    Summary(SummaryArgs),
    /// Serve the HTTP and GraphQL API
    Serve,
}

#[derive(Args)]
pub struct MkchargeArgs {
    /// The name of the project to charge
    pub name: String,
    /// The date to charge on (default: today)
    #[arg(short, long)]
    pub date: Option<NaiveDate>,
    /// The time to start the charge on (default: now)
    #[arg(short, long, value_parser = parse_time)]
    pub start: Option<NaiveTime>,
    /// The time to end the charge on
    #[arg(short, long, value_parser = parse_time)]
    pub end: Option<NaiveTime>,
    /// Mark the charge as closed
    #[arg(short, long)]
    pub close: bool,
}

#[derive(Args)]
pub struct CommitArgs {
    /// The id of the charge to end (default: latest open)
    #[arg(long)]
    pub id: Option<ChargeId>,
    /// The time to end the charge on (default: now)
    #[arg(short, long, value_parser = parse_time)]
    pub end: Option<NaiveTime>,
    /// Close the charge
    #[arg(short, long)]
    pub close: bool,
}

#[derive(Args)]
pub struct ChargeArgs {
    /// The id of the charge (default: latest open)
    #[arg(long)]
    pub id: Option<ChargeId>,
}

#[derive(Subcommand)]
pub enum LsCommand {
    Projects {
        /// List inactive projects as well
        #[arg(short, long)]
        all: bool,
    },
    Charges {
        /// List closed charges as well
        #[arg(short, long)]
        all: bool,
        /// Filter results to a specific project
        #[arg(short, long)]
        project: Option<String>,
    },
}

#[derive(Args)]
pub struct SummaryArgs {
    /// Any day of the month to summarize (default: today)
    #[arg(short, long)]
    pub date: Option<NaiveDate>,
    /// Restrict the summary to these projects
    #[arg(short, long = "project")]
    pub projects: Vec<String>,
}

/// A failed command, carrying the message shown to the user.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct CommandError(pub String);

impl CommandError {
    /// Phrase an application error for the command that hit it, e.g.
    /// `verb = "rename"`, `entity = "project"`.
    pub fn from_application(error: ApplicationError, verb: &str, entity: &str) -> Self {
        let message = match error {
            ApplicationError::Validation(_) => {
                format!("Unable to {verb} {entity} due to a validation error.")
            }
            ApplicationError::NotFound { entity: "project", key } => {
                format!("No project with name `{key}` found.")
            }
            ApplicationError::NotFound { entity, key } => format!("No {entity} with id `{key}` found."),
            ApplicationError::NoOpenCharge => format!("There are no open charges to {verb}."),
            ApplicationError::ProtectedReferenceExists { .. } => {
                format!("Unable to {verb} {entity} due to database protection.")
            }
            ApplicationError::PersistenceFailure(_) => format!("Failed to {verb} {entity}."),
        };
        Self(message)
    }
}

/// Accepts `HH:MM`, `HH:MM:SS` and fractional seconds.
pub fn parse_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| format!("`{value}` is not a time, expected HH:MM[:SS]"))
}

/// Render rows as a pipe-delimited markdown table.
pub fn markdown_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<String>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        format!("| {} |", padded.join(" | "))
    };

    let mut lines = vec![
        line(headers.iter().map(|header| header.to_string()).collect()),
        line(widths.iter().map(|width| "-".repeat(*width)).collect()),
    ];
    lines.extend(rows.iter().map(|row| line(row.clone())));
    lines.join("\n")
}

/// Run every command except `serve`, which belongs to the binary.
pub async fn execute(
    command: Command,
    state: &AppState,
    timezone: Timezone,
) -> Result<String, CommandError> {
    match command {
        Command::Mkproject { name } => projects_cli::mkproject(state, name).await,
        Command::Rename {
            current_name,
            new_name,
        } => projects_cli::rename(state, current_name, new_name).await,
        Command::SetActive { name } => projects_cli::set_active(state, name, true).await,
        Command::SetInactive { name } => projects_cli::set_active(state, name, false).await,
        Command::Rm { name } => projects_cli::rm(state, name).await,
        Command::Mkcharge(args) => charges_cli::mkcharge(state, args, timezone).await,
        Command::Commit(args) => charges_cli::commit(state, args, timezone).await,
        Command::Close(args) => charges_cli::close(state, args.id).await,
        Command::Rmcharge(args) => charges_cli::rmcharge(state, args.id).await,
        Command::Ls(LsCommand::Projects { all }) => list_cli::ls_projects(state, all, timezone).await,
        Command::Ls(LsCommand::Charges { all, project }) => {
            list_cli::ls_charges(state, all, project, timezone).await
        }
        Command::Summary(args) => summary_cli::summary(state, args, timezone).await,
        Command::Serve => Err(CommandError("`serve` runs the server, not a command.".into())),
    }
}
