//! CLI module - Command-line interface for Shelter Records
//!
//! Each record group gets a subcommand with `list`/`add`/`update`/`delete`
//! verbs. Updates are full-row writes: options left out keep their current
//! value, an empty string clears an optional text field.

mod commands;
mod output;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::warn;
use std::path::PathBuf;

use crate::backend::config::{AppConfig, MAX_HORIZON_DAYS};
use crate::backend::domain::models::{ExportFormat, ValidationError};
use crate::backend::domain::soon_notice;
use crate::backend::{initialize_backend, AppState};
use shared::{AdoptionStatus, ReportKind};

pub use output::{format_table, Output, Spinner};

/// Shelter Records - animal shelter record keeping
#[derive(Parser, Debug)]
#[command(name = "shelter")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Data directory holding the config file, database and exports
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Skip the startup reminder notice and the progress spinner
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the data directory, config file and database
    Init,

    /// Manage animal types
    Types {
        #[command(subcommand)]
        command: TypeCommands,
    },

    /// Manage animals
    Animals {
        #[command(subcommand)]
        command: AnimalCommands,
    },

    /// Manage sponsors
    Sponsors {
        #[command(subcommand)]
        command: SponsorCommands,
    },

    /// Manage donations
    Donations {
        #[command(subcommand)]
        command: DonationCommands,
    },

    /// Manage vaccine applications
    Vaccines {
        #[command(subcommand)]
        command: HealthCommands,
    },

    /// Manage deworming applications
    Dewormings {
        #[command(subcommand)]
        command: HealthCommands,
    },

    /// Manage adopters
    Adopters {
        #[command(subcommand)]
        command: AdopterCommands,
    },

    /// Manage adoptions
    Adoptions {
        #[command(subcommand)]
        command: AdoptionCommands,
    },

    /// Show vaccines and dewormings coming due
    Reminders {
        /// Days ahead to look (defaults to the configured horizon)
        #[arg(long, value_parser = clap::value_parser!(i64).range(0..=MAX_HORIZON_DAYS))]
        days: Option<i64>,
    },

    /// Show headline counts, the donation series and upcoming reminders
    #[command(alias = "dash")]
    Dashboard,

    /// Show a report, optionally exporting it to a file
    Report {
        kind: ReportKindArg,

        /// Export format
        #[arg(long, value_enum)]
        export: Option<FormatArg>,

        /// Output file (defaults to the export directory)
        #[arg(long, short, requires = "export")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum TypeCommands {
    /// List animal types
    #[command(alias = "ls")]
    List,
    /// Add an animal type
    Add { name: String },
    /// Rename an animal type
    Rename { id: i64, name: String },
    /// Delete an animal type
    #[command(alias = "rm")]
    Delete {
        id: i64,
        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct AnimalArgs {
    #[arg(long)]
    pub type_id: Option<i64>,
    #[arg(long)]
    pub sex: Option<String>,
    #[arg(long)]
    pub age_months: Option<i64>,
    /// Intake date (YYYY-MM-DD)
    #[arg(long)]
    pub intake_date: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum AnimalCommands {
    /// List animals, newest first
    #[command(alias = "ls")]
    List {
        /// Name contains
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        sex: Option<String>,
        #[arg(long)]
        type_id: Option<i64>,
    },
    /// Add an animal
    Add {
        name: String,
        #[command(flatten)]
        fields: AnimalArgs,
    },
    /// Update an animal
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: AnimalArgs,
    },
    /// Delete an animal
    #[command(alias = "rm")]
    Delete {
        id: i64,
        #[arg(long, short)]
        yes: bool,
    },
    /// Show an animal's profile
    Show { id: i64 },
    /// Export an animal's profile sheet as PDF
    Profile {
        id: i64,
        /// Output file (defaults to the export directory)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct SponsorArgs {
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum SponsorCommands {
    /// List sponsors, newest first
    #[command(alias = "ls")]
    List {
        /// Matches name, phone or email
        #[arg(long)]
        search: Option<String>,
    },
    /// Add a sponsor
    Add {
        name: String,
        #[command(flatten)]
        fields: SponsorArgs,
    },
    /// Update a sponsor
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: SponsorArgs,
    },
    /// Delete a sponsor
    #[command(alias = "rm")]
    Delete {
        id: i64,
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct DonationArgs {
    /// Donation date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub sponsor_id: Option<i64>,
    /// Animal the donation is earmarked for
    #[arg(long)]
    pub animal_id: Option<i64>,
    #[arg(long)]
    pub amount: Option<f64>,
    #[arg(long)]
    pub method: Option<String>,
    #[arg(long)]
    pub note: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum DonationCommands {
    /// List donations, newest first
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        sponsor_id: Option<i64>,
    },
    /// Record a donation (date defaults to today)
    Add {
        #[command(flatten)]
        fields: DonationArgs,
    },
    /// Update a donation
    Update {
        id: i64,
        /// Detach the donation from its animal
        #[arg(long, conflicts_with = "animal_id")]
        no_animal: bool,
        #[command(flatten)]
        fields: DonationArgs,
    },
    /// Delete a donation
    #[command(alias = "rm")]
    Delete {
        id: i64,
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct HealthArgs {
    #[arg(long)]
    pub animal_id: Option<i64>,
    /// Vaccine or deworming product name
    #[arg(long)]
    pub product: Option<String>,
    /// Application date (YYYY-MM-DD)
    #[arg(long)]
    pub applied_on: Option<String>,
    /// Next due date (YYYY-MM-DD)
    #[arg(long)]
    pub next_due: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum HealthCommands {
    /// List applications, newest first
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        animal_id: Option<i64>,
    },
    /// Record an application (date defaults to today)
    Add {
        #[command(flatten)]
        fields: HealthArgs,
    },
    /// Update an application
    Update {
        id: i64,
        #[command(flatten)]
        fields: HealthArgs,
    },
    /// Delete an application
    #[command(alias = "rm")]
    Delete {
        id: i64,
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct AdopterArgs {
    /// Identity document number
    #[arg(long)]
    pub document: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum AdopterCommands {
    /// List adopters, newest first
    #[command(alias = "ls")]
    List {
        /// Matches name or document
        #[arg(long)]
        search: Option<String>,
    },
    /// Add an adopter
    Add {
        name: String,
        #[command(flatten)]
        fields: AdopterArgs,
    },
    /// Update an adopter
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: AdopterArgs,
    },
    /// Delete an adopter
    #[command(alias = "rm")]
    Delete {
        id: i64,
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct AdoptionArgs {
    #[arg(long)]
    pub animal_id: Option<i64>,
    #[arg(long)]
    pub adopter_id: Option<i64>,
    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,
    /// Exit date (YYYY-MM-DD), today when marked adopted without one
    #[arg(long)]
    pub exit_date: Option<String>,
    #[arg(long)]
    pub observations: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum AdoptionCommands {
    /// List adoptions, newest first
    #[command(alias = "ls")]
    List {
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },
    /// Record an adoption (status defaults to in-progress)
    Add {
        #[command(flatten)]
        fields: AdoptionArgs,
    },
    /// Update an adoption
    Update {
        id: i64,
        #[command(flatten)]
        fields: AdoptionArgs,
    },
    /// Delete an adoption
    #[command(alias = "rm")]
    Delete {
        id: i64,
        #[arg(long, short)]
        yes: bool,
    },
    /// List animals that have not been adopted
    Available,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusArg {
    InProgress,
    Adopted,
    Rejected,
}

impl From<StatusArg> for AdoptionStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::InProgress => AdoptionStatus::InProgress,
            StatusArg::Adopted => AdoptionStatus::Adopted,
            StatusArg::Rejected => AdoptionStatus::Rejected,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKindArg {
    Animals,
    AnimalTypes,
    Sponsors,
    Adopters,
    Donations,
    Adoptions,
}

impl From<ReportKindArg> for ReportKind {
    fn from(arg: ReportKindArg) -> Self {
        match arg {
            ReportKindArg::Animals => ReportKind::Animals,
            ReportKindArg::AnimalTypes => ReportKind::AnimalTypes,
            ReportKindArg::Sponsors => ReportKind::Sponsors,
            ReportKindArg::Adopters => ReportKind::Adopters,
            ReportKindArg::Donations => ReportKind::Donations,
            ReportKindArg::Adoptions => ReportKind::Adoptions,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Csv,
    Xlsx,
    Pdf,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Xlsx => ExportFormat::Xlsx,
            FormatArg::Pdf => ExportFormat::Pdf,
        }
    }
}

/// Print the soon-due reminder notice; failures are only logged
async fn startup_notice(state: &AppState, today: NaiveDate) {
    let soon_days = state.config.soon_threshold_days;
    let reminders = state
        .health_service
        .upcoming(today, state.config.reminder_horizon_days, soon_days)
        .await;

    match reminders {
        Ok(reminders) => {
            if let Some(notice) = soon_notice(&reminders, soon_days) {
                eprintln!("🔔 {}", notice.message());
                eprintln!();
            }
        }
        Err(e) => warn!("Could not compute health reminders: {:#}", e),
    }
}

/// Open the data directory and dispatch a parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    let data_dir = cli.data_dir.clone().unwrap_or_else(AppConfig::default_data_dir);
    let out = Output::new(cli.json, cli.quiet);
    let state = initialize_backend(&data_dir).await?;
    let today = Local::now().date_naive();

    if !matches!(cli.command, Commands::Init) && !cli.quiet && !cli.json {
        startup_notice(&state, today).await;
    }

    match cli.command {
        Commands::Init => commands::cmd_init(&state, &out),
        Commands::Types { command } => commands::cmd_types(&state, &out, command).await,
        Commands::Animals { command } => commands::cmd_animals(&state, &out, command, today).await,
        Commands::Sponsors { command } => commands::cmd_sponsors(&state, &out, command).await,
        Commands::Donations { command } => commands::cmd_donations(&state, &out, command, today).await,
        Commands::Vaccines { command } => {
            commands::cmd_health(&state, &out, shared::HealthKind::Vaccine, command, today).await
        }
        Commands::Dewormings { command } => {
            commands::cmd_health(&state, &out, shared::HealthKind::Deworming, command, today).await
        }
        Commands::Adopters { command } => commands::cmd_adopters(&state, &out, command).await,
        Commands::Adoptions { command } => commands::cmd_adoptions(&state, &out, command, today).await,
        Commands::Reminders { days } => commands::cmd_reminders(&state, &out, days, today).await,
        Commands::Dashboard => commands::cmd_dashboard(&state, &out, today).await,
        Commands::Report { kind, export, output } => {
            commands::cmd_report(&state, &out, kind.into(), export.map(Into::into), output, today).await
        }
    }
}

/// Print an error for the user and return the process exit code
pub fn report_error(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<ValidationError>() {
        Some(validation) => {
            eprintln!("✗ {}", validation);
            2
        }
        None => {
            eprintln!("Error: {:#}", error);
            1
        }
    }
}
