use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use betbalance_cli::commands::{
    self, BalancesArgs, DiffArgs, MapColumnsArgs, RiskArgs, StreaksArgs, ValidateArgs,
};
use betbalance_core::config_loader::DEFAULT_CONFIG_PATH;
use betbalance_core::ConfigLoader;

#[derive(Parser)]
#[command(name = "betbalance")]
#[command(about = "Bankroll analytics and reconciliation for sports betting operations", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Win/loss streaks and KPIs of the daily ledger
    Streaks(StreaksArgs),
    /// Preview the changes between two record sets
    Diff(DiffArgs),
    /// Suggest which sheet column feeds each field
    MapColumns(MapColumnsArgs),
    /// Validate a sheet against an import schema
    Validate(ValidateArgs),
    /// Reconcile house balances against cash movements
    Balances(BalancesArgs),
    /// Evaluate the bankroll risk semaphore
    Risk(RiskArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ConfigLoader::load_from(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    match cli.command {
        Commands::Streaks(args) => commands::run_streaks(args, &config)?,
        Commands::Diff(args) => commands::run_diff(args)?,
        Commands::MapColumns(args) => commands::run_map_columns(args, &config)?,
        Commands::Validate(args) => commands::run_validate(args, &config)?,
        Commands::Balances(args) => commands::run_balances(args, &config)?,
        Commands::Risk(args) => commands::run_risk(args, &config)?,
    }

    Ok(())
}
