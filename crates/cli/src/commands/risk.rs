//! Risk CLI command.
//!
//! Combines the daily ledger, house balances and bankroll into the risk
//! semaphore.

use anyhow::{bail, Result};
use clap::Args;
use rust_decimal::Decimal;
use std::path::PathBuf;

use betbalance_analytics::{KpiSummary, ReportFormatter, RiskInputs, RiskReport, RiskSemaphore, StreakAnalyzer};
use betbalance_core::AppConfig;
use betbalance_reconcile::BalanceReconciler;

use crate::io::{load_daily, load_movements, load_reported};

/// Arguments for the risk command.
#[derive(Args, Debug, Clone)]
pub struct RiskArgs {
    /// Daily results CSV (columns: date, result)
    #[arg(long)]
    pub daily: PathBuf,

    /// Cash movements CSV (columns: house, date, kind, amount)
    #[arg(long)]
    pub movements: PathBuf,

    /// Reported balances CSV, used to flag houses that do not reconcile
    #[arg(long)]
    pub reported: Option<PathBuf>,

    /// Total bankroll the ratios are measured against
    #[arg(long)]
    pub bankroll: Decimal,
}

/// Runs the risk command.
///
/// # Errors
/// Returns an error if the bankroll is not positive or an input file cannot be read.
pub fn run_risk(args: RiskArgs, config: &AppConfig) -> Result<()> {
    let report = evaluate(&args, config)?;
    println!("{}", ReportFormatter::risk(&report));
    Ok(())
}

/// Loads the inputs and evaluates the semaphore.
///
/// # Errors
/// Returns an error if the bankroll is not positive or an input file cannot be read.
pub fn evaluate(args: &RiskArgs, config: &AppConfig) -> Result<RiskReport> {
    if args.bankroll <= Decimal::ZERO {
        bail!("Bankroll must be positive, got {}", args.bankroll);
    }

    let days = load_daily(&args.daily, config)?;
    let movements = load_movements(&args.movements, config)?;
    let reported = match &args.reported {
        Some(path) => load_reported(path, config)?,
        None => Vec::new(),
    };

    let streaks = StreakAnalyzer::from_config(&config.analytics).analyze_daily(&days);
    let kpi = KpiSummary::from_outcomes(&days, &[]);
    let balances = BalanceReconciler::from_config(&config.reconciliation).reconcile(&movements, &reported);
    if args.reported.is_some() {
        for check in balances.discrepancies() {
            tracing::warn!("{}: {} (difference {})", check.house, check.status, check.difference);
        }
    }

    let inputs = RiskInputs::from_analysis(
        args.bankroll,
        &kpi,
        streaks.as_ref(),
        KpiSummary::last_day(&days),
        balances.float,
        balances.largest_house_balance(),
    );
    let report = RiskSemaphore::new(config.risk.clone()).evaluate(&inputs);
    tracing::info!("Risk level {} (score {})", report.level.as_str(), report.score);
    Ok(report)
}
