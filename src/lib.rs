pub mod cli;
pub mod core;
pub mod providers;

use crate::cli::dates::ParentSource;
use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use crate::core::derivation::RangeRules;
use crate::providers::RestBackend;
use anyhow::Result;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Arguments of the `validate` command, dates still in their raw form.
#[derive(Debug, Clone, Default)]
pub struct ValidateArgs {
    pub start: Option<String>,
    pub end: Option<String>,
    pub parent_start: Option<String>,
    pub parent_end: Option<String>,
    pub mandate_id: Option<u64>,
    pub today: Option<String>,
    pub allow_past: bool,
}

#[derive(Debug, Clone)]
pub enum AppCommand {
    Duration {
        start: String,
        end: String,
    },
    Validate(ValidateArgs),
    Decompose {
        total: Decimal,
        rate: Option<Decimal>,
    },
    Check {
        plan: PathBuf,
        today: Option<String>,
    },
    Audit {
        today: Option<String>,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Mission console starting...");

    let config = AppConfig::load_or_default(config_path)?;
    debug!("Loaded config: {config:#?}");

    let fmt = config.date_format.as_str();
    let backend = RestBackend::new(&config.backend.base_url, Arc::new(Cache::new()));

    match command {
        AppCommand::Duration { start, end } => {
            cli::dates::run_duration(cli::parse_date(&start, fmt)?, cli::parse_date(&end, fmt)?)
        }
        AppCommand::Validate(args) => {
            let start = cli::parse_optional_date(args.start.as_deref(), fmt)?;
            let end = cli::parse_optional_date(args.end.as_deref(), fmt)?;
            let today = cli::resolve_today(args.today.as_deref(), fmt)?;
            let parent = ParentSource::from_args(
                cli::parse_optional_date(args.parent_start.as_deref(), fmt)?,
                cli::parse_optional_date(args.parent_end.as_deref(), fmt)?,
                args.mandate_id,
            )?
            .resolve(&backend)
            .await?;
            let rules = if args.allow_past || !config.forms.reject_past_start_on_create {
                RangeRules::edit()
            } else {
                RangeRules::create()
            };
            cli::dates::run_validate(start, end, today, parent, rules)
        }
        AppCommand::Decompose { total, rate } => {
            let rate = rate.unwrap_or(config.forms.default_advance_rate);
            cli::decompose::run(total, rate).map(|_| ())
        }
        AppCommand::Check { plan, today } => {
            let today = cli::resolve_today(today.as_deref(), fmt)?;
            cli::check::run(&plan, today, &config.forms)
        }
        AppCommand::Audit { today } => {
            let today = cli::resolve_today(today.as_deref(), fmt)?;
            cli::audit::run(&backend, today).await
        }
    }
}
