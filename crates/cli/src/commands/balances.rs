//! Balances CLI command.
//!
//! Reconciles house balances derived from cash movements against the
//! balances each house reports.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use betbalance_analytics::ReportFormatter;
use betbalance_core::AppConfig;
use betbalance_reconcile::BalanceReconciler;

use crate::io::{load_movements, load_reported};

/// Arguments for the balances command.
#[derive(Args, Debug, Clone)]
pub struct BalancesArgs {
    /// Cash movements CSV (columns: house, date, kind, amount)
    #[arg(long)]
    pub movements: PathBuf,

    /// Reported balances CSV (columns: house, balance)
    #[arg(long)]
    pub reported: PathBuf,
}

/// Runs the balances command.
///
/// # Errors
/// Returns an error if an input file cannot be read.
pub fn run_balances(args: BalancesArgs, config: &AppConfig) -> Result<()> {
    let movements = load_movements(&args.movements, config)?;
    let reported = load_reported(&args.reported, config)?;

    let report = BalanceReconciler::from_config(&config.reconciliation).reconcile(&movements, &reported);
    println!("{}", ReportFormatter::balances(&report));

    let discrepancies = report.discrepancies().count();
    if discrepancies > 0 {
        tracing::warn!("{} houses do not reconcile", discrepancies);
    }
    Ok(())
}
