//! Diff CLI command.
//!
//! Previews a sync between two JSON record sets.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use betbalance_core::Record;
use betbalance_reconcile::{compute_diff, DiffResult};

use crate::io::read_json_records;

/// Arguments for the diff command.
#[derive(Args, Debug, Clone)]
pub struct DiffArgs {
    /// JSON array holding the records as they are now
    #[arg(long)]
    pub current: PathBuf,

    /// JSON array holding the records to sync in
    #[arg(long)]
    pub incoming: PathBuf,

    /// Field that identifies a record
    #[arg(long, default_value = "id")]
    pub id_field: String,

    /// Print the full diff as JSON
    #[arg(long)]
    pub json: bool,
}

/// Runs the diff command.
///
/// # Errors
/// Returns an error if a file cannot be read or a record set has duplicate or missing identifiers.
pub fn run_diff(args: DiffArgs) -> Result<()> {
    let current = read_json_records(&args.current)?;
    let incoming = read_json_records(&args.incoming)?;
    let diff = compute_diff(&current, &incoming, &args.id_field)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&diff)?);
    } else {
        print_summary(&diff, &args.id_field);
    }
    Ok(())
}

fn print_summary(diff: &DiffResult, id_field: &str) {
    if diff.is_empty() {
        println!("Record sets are in sync");
        return;
    }

    println!("{} changes", diff.total_changes());
    print_bucket("Add", &diff.to_add, id_field);
    print_bucket("Update", &diff.to_update, id_field);
    print_bucket("Remove", &diff.to_remove, id_field);
}

fn print_bucket(label: &str, records: &[Record], id_field: &str) {
    let ids: Vec<String> = records
        .iter()
        .filter_map(|r| r.identifier(id_field))
        .collect();
    println!("  {:<8} {:>4}  {}", label, records.len(), ids.join(", "));
}
