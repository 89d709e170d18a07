//! Streaks CLI command.
//!
//! Reads the daily results ledger (and optionally individual bets) and
//! prints the streak and KPI reports.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use betbalance_analytics::{KpiSummary, ReportFormatter, StreakAnalyzer};
use betbalance_core::AppConfig;

use crate::io::{load_bets, load_daily};

/// Arguments for the streaks command.
#[derive(Args, Debug, Clone)]
pub struct StreaksArgs {
    /// Daily results CSV (columns: date, result)
    #[arg(long)]
    pub daily: PathBuf,

    /// Individual bets CSV (columns: date, result, stake, profit)
    #[arg(long)]
    pub bets: Option<PathBuf>,
}

/// Runs the streaks command.
///
/// # Errors
/// Returns an error if an input file cannot be read.
pub fn run_streaks(args: StreaksArgs, config: &AppConfig) -> Result<()> {
    let days = load_daily(&args.daily, config)?;
    let bets = match &args.bets {
        Some(path) => load_bets(path, config)?,
        None => Vec::new(),
    };
    tracing::info!("Loaded {} days and {} bets", days.len(), bets.len());

    let analyzer = StreakAnalyzer::from_config(&config.analytics);

    match analyzer.analyze_daily(&days) {
        Some(summary) => println!("{}", ReportFormatter::streaks(&summary)),
        None => println!("No daily results in {}", args.daily.display()),
    }

    if args.bets.is_some() {
        match analyzer.analyze_bets(&bets) {
            Some(summary) => println!("{}", ReportFormatter::bet_streaks(&summary)),
            None => println!("No settled bets found"),
        }
    }

    println!("{}", ReportFormatter::kpi(&KpiSummary::from_outcomes(&days, &bets)));
    Ok(())
}
