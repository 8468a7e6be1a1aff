use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use mission_console::core::log::init_logging;
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct ValidateCommand {
    /// Start date of the range
    #[arg(long)]
    start: Option<String>,

    /// End date of the range
    #[arg(long)]
    end: Option<String>,

    /// Start of the enclosing range
    #[arg(long, requires = "parent_end")]
    parent_start: Option<String>,

    /// End of the enclosing range
    #[arg(long, requires = "parent_start")]
    parent_end: Option<String>,

    /// Fetch the enclosing range from this mandate on the backend
    #[arg(long, conflicts_with_all = ["parent_start", "parent_end"])]
    mandate_id: Option<u64>,

    /// Reference date for the past-date rule (defaults to the local date)
    #[arg(long)]
    today: Option<String>,

    /// Accept a start date in the past, as when editing an existing record
    #[arg(long)]
    allow_past: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Print the inclusive number of days between two dates
    Duration {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
    /// Validate a date range, optionally against a parent range
    Validate(ValidateCommand),
    /// Split a total into advance and balance
    Decompose {
        /// Total amount of the mission
        #[arg(long)]
        total: Decimal,
        /// Advance rate in percent (defaults to the configured rate)
        #[arg(long)]
        rate: Option<Decimal>,
    },
    /// Validate every record of a local plan file
    Check {
        /// Plan file with mandates, stages and mission orders
        plan: PathBuf,
        /// Reference date for the past-date rule (defaults to the local date)
        #[arg(long)]
        today: Option<String>,
    },
    /// Validate the stages stored on the backend against their mandates
    Audit {
        #[arg(long)]
        today: Option<String>,
    },
}

impl From<Commands> for mission_console::AppCommand {
    fn from(cmd: Commands) -> mission_console::AppCommand {
        match cmd {
            Commands::Duration { start, end } => mission_console::AppCommand::Duration { start, end },
            Commands::Validate(args) => {
                mission_console::AppCommand::Validate(mission_console::ValidateArgs {
                    start: args.start,
                    end: args.end,
                    parent_start: args.parent_start,
                    parent_end: args.parent_end,
                    mandate_id: args.mandate_id,
                    today: args.today,
                    allow_past: args.allow_past,
                })
            }
            Commands::Decompose { total, rate } => {
                mission_console::AppCommand::Decompose { total, rate }
            }
            Commands::Check { plan, today } => mission_console::AppCommand::Check { plan, today },
            Commands::Audit { today } => mission_console::AppCommand::Audit { today },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => mission_console::cli::setup::setup(),
        Some(cmd) => mission_console::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Command failed");
    }
    result
}
