//! Map-columns CLI command.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use betbalance_core::AppConfig;
use betbalance_reconcile::ColumnMapper;

use crate::io::read_csv;

/// Arguments for the map-columns command.
#[derive(Args, Debug, Clone)]
pub struct MapColumnsArgs {
    /// CSV file whose header row is mapped
    #[arg(long)]
    pub file: PathBuf,

    /// Comma-separated target field names
    #[arg(long, value_delimiter = ',', required = true)]
    pub fields: Vec<String>,

    /// Override the configured similarity threshold (0.0 - 1.0)
    #[arg(long)]
    pub threshold: Option<f64>,
}

/// Runs the map-columns command.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn run_map_columns(args: MapColumnsArgs, config: &AppConfig) -> Result<()> {
    let table = read_csv(&args.file)?;
    let mapper = args
        .threshold
        .map_or_else(|| ColumnMapper::from_config(&config.import), ColumnMapper::new);
    let mappings = mapper.detect(&table.headers, &args.fields);

    let width = table.headers.iter().map(String::len).max().unwrap_or(0);
    for mapping in &mappings {
        println!(
            "{:<width$}  ->  {}",
            mapping.source,
            mapping.target.as_deref().unwrap_or("(unmapped)"),
            width = width
        );
    }

    let unmatched: Vec<&str> = args
        .fields
        .iter()
        .filter(|f| !mappings.iter().any(|m| m.target.as_deref() == Some(f.as_str())))
        .map(String::as_str)
        .collect();
    if !unmatched.is_empty() {
        println!("\nFields without a column: {}", unmatched.join(", "));
    }
    Ok(())
}
