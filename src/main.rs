use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::warn;
use tracker_sync::config::{Config, ConfigOverrides};
use tracker_sync::jobs::{run_offboarding_refresh, run_onboarding_refresh, run_sla_refresh};
use tracker_sync::model::{OffboardingRecord, OnboardingRecord, SchoolYear};
use tracker_sync::notify::sink::{NotifySink, StdoutSink, WebhookSink};
use tracker_sync::notify::RunReport;
use tracker_sync::output::csv::{offboarding_to_csv, onboarding_to_csv};
use tracker_sync::output::json::render_json;
use tracker_sync::output::table::{render_offboarding_table, render_onboarding_table};
use tracker_sync::sheets::client::GoogleSheetsClient;
use tracker_sync::warehouse::bigquery::BigQueryWarehouse;
use tracker_sync::warehouse::dbt::DbtTrigger;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "tracker-sync",
    about = "HR onboarding/offboarding tracker reconciliation and SLA reporting"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Rendering for --dry-run output.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Reconcile a school year's onboarding tracker.
    Refresh {
        /// School year in YY-YY format; ex. '24-25'
        #[arg(long = "school-year")]
        school_year: String,
        /// Trigger the upstream warehouse transform before reading.
        #[arg(long)]
        refresh_warehouse: bool,
        /// Compute the merge but write nothing back.
        #[arg(long)]
        dry_run: bool,
    },
    /// Reconcile the offboarding tracker.
    Offboarding {
        #[arg(long)]
        dry_run: bool,
    },
    /// Rebuild the SLA_data_source reporting tab.
    Sla,
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides::from_env());

    if matches!(cli.command, Commands::Config { .. }) {
        return handle_config_command(&cli.command, &config, &config_path);
    }

    let sinks = build_sinks(&config);

    match &cli.command {
        Commands::Refresh {
            school_year,
            refresh_warehouse,
            dry_run,
        } => {
            let year = SchoolYear::from_str(school_year)?;
            let tracker = tracker_client(&config);
            let hr_mot = GoogleSheetsClient::new(
                &config.sheets.api_base,
                &config.sheets.access_token,
                &config.sheets.hr_mot_spreadsheet_id,
            );
            let warehouse = build_warehouse(&config);
            let mut report = RunReport::start(format!("{year} tracker refresh"));
            let result = run_onboarding_refresh(
                &tracker,
                &hr_mot,
                &warehouse,
                year,
                *refresh_warehouse,
                *dry_run,
                &mut report,
            )
            .await;
            let records = conclude(report, &sinks, &config, result).await?;
            if *dry_run {
                print_onboarding(&records, cli.output)?;
            }
        }
        Commands::Offboarding { dry_run } => {
            let tracker = tracker_client(&config);
            let warehouse = build_warehouse(&config);
            let mut report = RunReport::start("offboarding tracker refresh".to_string());
            let result =
                run_offboarding_refresh(&tracker, &warehouse, *dry_run, &mut report).await;
            let records = conclude(report, &sinks, &config, result).await?;
            if *dry_run {
                print_offboarding(&records, cli.output)?;
            }
        }
        Commands::Sla => {
            let tracker = tracker_client(&config);
            let mut report = RunReport::start("SLA source refresh".to_string());
            let result = run_sla_refresh(&tracker, config.sla.grace_days, &mut report).await;
            conclude(report, &sinks, &config, result).await?;
        }
        Commands::Config { .. } => unreachable!("config command handled before dispatch"),
    }

    Ok(())
}

fn handle_config_command(command: &Commands, config: &Config, config_path: &PathBuf) -> Result<()> {
    let Commands::Config { init, show } = command else {
        return Ok(());
    };
    if *init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if *show || !*init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn tracker_client(config: &Config) -> GoogleSheetsClient {
    GoogleSheetsClient::new(
        &config.sheets.api_base,
        &config.sheets.access_token,
        &config.sheets.tracker_spreadsheet_id,
    )
}

fn build_warehouse(config: &Config) -> BigQueryWarehouse {
    let dbt = if config.warehouse.dbt_job_url.trim().is_empty() {
        None
    } else {
        Some(DbtTrigger::new(
            config.warehouse.dbt_job_url.clone(),
            config.warehouse.dbt_token.clone(),
            config.warehouse.dbt_settle_secs,
        ))
    };
    BigQueryWarehouse::new(
        &config.warehouse.api_base,
        &config.sheets.access_token,
        &config.warehouse.project,
        &config.warehouse.dataset,
        dbt,
    )
}

fn build_sinks(config: &Config) -> Vec<Box<dyn NotifySink>> {
    let mut sinks: Vec<Box<dyn NotifySink>> = Vec::new();
    if config.notify.enable_stdout {
        sinks.push(Box::new(StdoutSink));
    }
    if !config.notify.webhook.trim().is_empty() {
        sinks.push(Box::new(WebhookSink::new(config.notify.webhook.clone())));
    }
    sinks
}

/// Close out a run: stamp the outcome, notify, and propagate the error so a
/// failed job exits non-zero. Failure always notifies; success honors the
/// notify_on_success switch.
async fn conclude<T>(
    mut report: RunReport,
    sinks: &[Box<dyn NotifySink>],
    config: &Config,
    result: Result<T>,
) -> Result<T> {
    match result {
        Ok(value) => {
            report.succeed();
            if config.notify.notify_on_success {
                send_all(sinks, &report).await;
            }
            Ok(value)
        }
        Err(err) => {
            report.fail(&err);
            send_all(sinks, &report).await;
            Err(err)
        }
    }
}

async fn send_all(sinks: &[Box<dyn NotifySink>], report: &RunReport) {
    for sink in sinks {
        if let Err(err) = sink.send(report).await {
            warn!("failed sending notification: {err}");
        }
    }
}

fn print_onboarding(records: &[OnboardingRecord], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_onboarding_table(records)),
        OutputFormat::Json => println!("{}", render_json(records)?),
        OutputFormat::Csv => println!("{}", onboarding_to_csv(records)?),
    }
    Ok(())
}

fn print_offboarding(records: &[OffboardingRecord], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_offboarding_table(records)),
        OutputFormat::Json => println!("{}", render_json(records)?),
        OutputFormat::Csv => println!("{}", offboarding_to_csv(records)?),
    }
    Ok(())
}
