//! Validate CLI command.
//!
//! Maps a sheet onto one of the configured schemas and lists every problem
//! found. Fails when any row has an error so it can gate an import script.

use anyhow::{anyhow, bail, Result};
use clap::Args;
use std::path::PathBuf;

use betbalance_core::AppConfig;
use betbalance_reconcile::Severity;

use crate::io::{load_rows, LoadedRows};

/// Arguments for the validate command.
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// CSV file to check
    #[arg(long)]
    pub file: PathBuf,

    /// Schema name from the import settings (bets, daily, movements, ...)
    #[arg(long)]
    pub schema: String,
}

/// Runs the validate command.
///
/// # Errors
/// Returns an error if the schema is unknown, the file cannot be read, or any row has an error.
pub fn run_validate(args: ValidateArgs, config: &AppConfig) -> Result<()> {
    let loaded = validate_file(&args, config)?;
    print_report(&loaded);

    let errors = loaded.error_count();
    if errors > 0 {
        bail!("{} has {} validation errors", args.file.display(), errors);
    }
    Ok(())
}

/// Loads and validates a file against the named schema.
///
/// # Errors
/// Returns an error if the schema is unknown or the file cannot be read.
pub fn validate_file(args: &ValidateArgs, config: &AppConfig) -> Result<LoadedRows> {
    let schema = config.import.schema(&args.schema).ok_or_else(|| {
        let known: Vec<&str> = config.import.schemas.keys().map(String::as_str).collect();
        anyhow!(
            "Unknown schema '{}'. Valid values: {}",
            args.schema,
            known.join(", ")
        )
    })?;
    load_rows(&args.file, schema, &config.import)
}

fn print_report(loaded: &LoadedRows) {
    println!("Column mapping");
    for mapping in &loaded.mappings {
        println!(
            "  {} -> {}",
            mapping.source,
            mapping.target.as_deref().unwrap_or("(unmapped)")
        );
    }
    println!();

    for issue in &loaded.issues {
        let tag = match issue.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN ",
        };
        // Sheet line number, header included.
        println!("  {} row {:>4}  {}", tag, issue.row_index + 2, issue.message);
    }

    let errors = loaded.error_count();
    println!(
        "\n{} rows, {} valid, {} errors, {} warnings",
        loaded.rows.len(),
        loaded.valid_rows().len(),
        errors,
        loaded.issues.len() - errors
    );
}
