//! File loading shared by the commands.
//!
//! CSV sheets are read as text records, their headers are mapped onto a
//! schema's fields, and the mapped rows are validated and normalized before
//! being turned into typed domain values.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use std::path::Path;

use betbalance_core::{
    coerce_date, coerce_decimal, AppConfig, BetOutcome, BetResult, CoercionOptions, DailyOutcome,
    FieldType, ImportConfig, Record, RecordSchema,
};
use betbalance_reconcile::{
    normalize_row, partition_valid_rows, remap, validate_mapped_rows, CashMovement, ColumnMapper,
    ColumnMapping, MovementKind, ReportedBalance, ValidationIssue,
};

/// A CSV file as raw text records keyed by header.
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Record>,
}

/// Reads a CSV file with a header row. Cells are trimmed and kept as text.
///
/// # Errors
/// Returns an error if the file cannot be opened or is not valid CSV.
pub fn read_csv(path: &Path) -> Result<CsvTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("Failed to read header row of {}", path.display()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.with_context(|| format!("Malformed CSV row in {}", path.display()))?;
        rows.push(
            headers
                .iter()
                .zip(record.iter())
                .map(|(header, cell)| (header.clone(), Value::String(cell.to_string())))
                .collect(),
        );
    }

    tracing::debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(CsvTable { headers, rows })
}

/// Reads a JSON array of objects.
///
/// # Errors
/// Returns an error if the file cannot be read, is not a JSON array, or holds a non-object element.
pub fn read_json_records(path: &Path) -> Result<Vec<Record>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let values: Vec<Value> = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON array", path.display()))?;

    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            Record::from_json(value)
                .ok_or_else(|| anyhow!("Element {} of {} is not an object", index, path.display()))
        })
        .collect()
}

/// Rows of a sheet after header mapping, normalization and validation.
#[derive(Debug, Clone)]
pub struct LoadedRows {
    pub mappings: Vec<ColumnMapping>,
    /// Every row, renamed to schema fields and normalized where readable.
    pub rows: Vec<Record>,
    pub issues: Vec<ValidationIssue>,
}

impl LoadedRows {
    /// Rows free of error-severity issues.
    #[must_use]
    pub fn valid_rows(&self) -> Vec<&Record> {
        partition_valid_rows(self.rows.len(), &self.issues)
            .into_iter()
            .filter_map(|i| self.rows.get(i))
            .collect()
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.is_error()).count()
    }
}

/// Loads a CSV sheet and maps it onto `schema`.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn load_rows(path: &Path, schema: &RecordSchema, import: &ImportConfig) -> Result<LoadedRows> {
    let table = read_csv(path)?;
    let options = import.coercion_options();
    let fields: Vec<&str> = schema.field_names().collect();
    let mappings = ColumnMapper::from_config(import).detect(&table.headers, &fields);

    let mapped: Vec<Record> = table.rows.iter().map(|row| remap(&mappings, row)).collect();
    let issues = validate_mapped_rows(&mapped, schema, &options);
    let rows = mapped
        .iter()
        .map(|row| normalize_row(row, schema, &options))
        .collect();

    let loaded = LoadedRows {
        mappings,
        rows,
        issues,
    };
    if loaded.error_count() > 0 {
        tracing::warn!(
            "{}: {} validation errors across {} rows",
            path.display(),
            loaded.error_count(),
            loaded.rows.len()
        );
    }
    Ok(loaded)
}

/// Looks up a named schema in the import settings, falling back to the built-in one.
#[must_use]
pub fn schema_or(config: &AppConfig, name: &str, fallback: fn() -> RecordSchema) -> RecordSchema {
    config
        .import
        .schema(name)
        .cloned()
        .unwrap_or_else(fallback)
}

/// Schema of a house balance statement.
#[must_use]
pub fn reported_balance_schema() -> RecordSchema {
    RecordSchema::new()
        .required("house", FieldType::Text)
        .required("balance", FieldType::Decimal)
}

/// Loads the daily results ledger. Unreadable results count as zero.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn load_daily(path: &Path, config: &AppConfig) -> Result<Vec<DailyOutcome>> {
    let schema = schema_or(config, "daily", RecordSchema::daily);
    let loaded = load_rows(path, &schema, &config.import)?;
    let options = config.import.coercion_options();

    Ok(loaded
        .rows
        .iter()
        .filter_map(|row| {
            let date = date_field(row, "date", &options)?;
            Some(DailyOutcome::from_raw(
                date,
                &text_field(row, "result").unwrap_or_default(),
            ))
        })
        .collect())
}

/// Loads individual bets. Rows with an unreadable date or result are skipped.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn load_bets(path: &Path, config: &AppConfig) -> Result<Vec<BetOutcome>> {
    let schema = schema_or(config, "bets", RecordSchema::bets);
    let loaded = load_rows(path, &schema, &config.import)?;
    let options = config.import.coercion_options();

    Ok(loaded
        .rows
        .iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let date = date_field(row, "date", &options)?;
            let result = match text_field(row, "result")?.parse::<BetResult>() {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!("Skipping bet row {}: {}", index, e);
                    return None;
                }
            };
            Some(BetOutcome {
                date,
                result,
                stake: decimal_field(row, "stake"),
                profit: decimal_field(row, "profit"),
            })
        })
        .collect())
}

/// Loads cash movements, skipping rows that fail validation.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn load_movements(path: &Path, config: &AppConfig) -> Result<Vec<CashMovement>> {
    let schema = schema_or(config, "movements", RecordSchema::movements);
    let loaded = load_rows(path, &schema, &config.import)?;
    let options = config.import.coercion_options();

    Ok(loaded
        .valid_rows()
        .into_iter()
        .filter_map(|row| {
            let kind = match text_field(row, "kind")?.parse::<MovementKind>() {
                Ok(kind) => kind,
                Err(e) => {
                    tracing::warn!("Skipping movement: {}", e);
                    return None;
                }
            };
            Some(CashMovement {
                house: text_field(row, "house")?,
                date: date_field(row, "date", &options)?,
                kind,
                amount: decimal_field(row, "amount")?,
            })
        })
        .collect())
}

/// Loads reported house balances, skipping rows that fail validation.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn load_reported(path: &Path, config: &AppConfig) -> Result<Vec<ReportedBalance>> {
    let loaded = load_rows(path, &reported_balance_schema(), &config.import)?;

    Ok(loaded
        .valid_rows()
        .into_iter()
        .filter_map(|row| {
            Some(ReportedBalance {
                house: text_field(row, "house")?,
                balance: decimal_field(row, "balance")?,
            })
        })
        .collect())
}

fn text_field(row: &Record, field: &str) -> Option<String> {
    match row.get(field)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
    }
}

fn decimal_field(row: &Record, field: &str) -> Option<Decimal> {
    row.get(field).and_then(|v| coerce_decimal(v).value())
}

fn date_field(row: &Record, field: &str, options: &CoercionOptions) -> Option<NaiveDate> {
    row.get(field).and_then(|v| coerce_date(v, options).value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    // =========================================================================
    // Raw readers
    // =========================================================================

    #[test]
    fn read_csv_keeps_cells_as_trimmed_text() {
        let file = csv_file("Data, Resultado\n01/04/2024 , 12\n");
        let table = read_csv(file.path()).unwrap();

        assert_eq!(table.headers, vec!["Data", "Resultado"]);
        assert_eq!(table.rows[0].get("Data"), Some(&Value::String("01/04/2024".into())));
    }

    #[test]
    fn read_json_rejects_non_objects() {
        let file = csv_file(r#"[{"id": 1}, 2]"#);
        assert!(read_json_records(file.path()).is_err());

        let file = csv_file(r#"[{"id": 1, "v": "a"}]"#);
        assert_eq!(read_json_records(file.path()).unwrap().len(), 1);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(read_csv(Path::new("/nonexistent/daily.csv")).is_err());
    }

    // =========================================================================
    // Typed loaders
    // =========================================================================

    #[test]
    fn daily_loader_maps_localized_headers() {
        let file = csv_file("Data,Resultado\n01/04/2024,\"1.250,50\"\n02/04/2024,-30\n03/04/2024,abc\n");
        let days = load_daily(file.path(), &AppConfig::default()).unwrap();

        assert_eq!(days.len(), 3);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(days[0].value(), dec!(1250.5));
        assert_eq!(days[1].value(), dec!(-30));
        assert_eq!(days[2].result_value, None);
    }

    #[test]
    fn bet_loader_skips_unknown_results() {
        let file = csv_file("date,result,stake,profit\n2024-04-01,green,10,8\n2024-04-01,won,10,8\n2024-04-02,pending,5,\n");
        let bets = load_bets(file.path(), &AppConfig::default()).unwrap();

        assert_eq!(bets.len(), 2);
        assert_eq!(bets[0].profit, Some(dec!(8)));
        assert_eq!(bets[1].result, BetResult::Pending);
        assert_eq!(bets[1].profit, None);
    }

    #[test]
    fn movement_loader_skips_invalid_rows() {
        let file = csv_file("house,date,kind,amount\nalpha,2024-04-01,deposit,100\nbeta,2024-04-01,deposit,lots\n");
        let movements = load_movements(file.path(), &AppConfig::default()).unwrap();

        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].house, "alpha");
        assert_eq!(movements[0].kind, MovementKind::Deposit);
    }

    #[test]
    fn load_rows_reports_issues() {
        let file = csv_file("date,result\n2024-04-01,\n");
        let loaded = load_rows(file.path(), &RecordSchema::daily(), &ImportConfig::default()).unwrap();

        assert_eq!(loaded.error_count(), 1);
        assert!(loaded.valid_rows().is_empty());
    }
}
