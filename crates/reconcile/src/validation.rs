//! Field-level validation of mapped import rows.
//!
//! Problems are collected as [`ValidationIssue`] values and never raised:
//! the operator decides whether to skip the offending rows or abandon the
//! batch.

use betbalance_core::{coerce_field, is_blank, CoercionOptions, FieldType, Record, RecordSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Zero-based position of the row in the batch.
    pub row_index: usize,
    pub field_name: String,
    pub message: String,
    pub severity: Severity,
}

impl ValidationIssue {
    fn error(row_index: usize, field_name: &str, message: String) -> Self {
        Self {
            row_index,
            field_name: field_name.to_string(),
            message,
            severity: Severity::Error,
        }
    }

    fn warning(row_index: usize, field_name: &str, message: String) -> Self {
        Self {
            row_index,
            field_name: field_name.to_string(),
            message,
            severity: Severity::Warning,
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Checks required fields and typed values of each row against `schema`.
///
/// Issues come out ordered by row, then by schema field order. A missing
/// required field yields a single error and no type check.
#[must_use]
pub fn validate_mapped_rows(
    rows: &[Record],
    schema: &RecordSchema,
    options: &CoercionOptions,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for (row_index, row) in rows.iter().enumerate() {
        for field in &schema.fields {
            let value = row.get(&field.name);

            if is_blank(value) {
                if field.required {
                    issues.push(ValidationIssue::error(
                        row_index,
                        &field.name,
                        format!("{} is required", field.name),
                    ));
                }
                continue;
            }

            if let Some(value) = value {
                if let Some(issue) = check_type(row_index, &field.name, value, field.field_type, options) {
                    issues.push(issue);
                }
            }
        }
    }

    let errors = issues.iter().filter(|i| i.is_error()).count();
    tracing::debug!(
        "Validated {} rows: {} errors, {} warnings",
        rows.len(),
        errors,
        issues.len() - errors
    );
    issues
}

fn check_type(
    row_index: usize,
    field_name: &str,
    value: &Value,
    field_type: FieldType,
    options: &CoercionOptions,
) -> Option<ValidationIssue> {
    let coercion = coerce_field(value, field_type, options);
    if coercion.is_failed() {
        return Some(ValidationIssue::error(
            row_index,
            field_name,
            format!("{field_name}: cannot read '{}' as {field_type}", raw_text(value)),
        ));
    }
    coercion
        .note()
        .map(|note| ValidationIssue::warning(row_index, field_name, format!("{field_name}: {note}")))
}

fn raw_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Returns the indexes of rows with no error-severity issue.
#[must_use]
pub fn partition_valid_rows(row_count: usize, issues: &[ValidationIssue]) -> Vec<usize> {
    (0..row_count)
        .filter(|i| !issues.iter().any(|issue| issue.row_index == *i && issue.is_error()))
        .collect()
}

/// Coerces typed fields of a row to their normalized form, leaving unreadable values untouched.
#[must_use]
pub fn normalize_row(row: &Record, schema: &RecordSchema, options: &CoercionOptions) -> Record {
    row.fields()
        .map(|(name, value)| {
            let normalized = schema
                .get(name)
                .filter(|_| !is_blank(Some(value)))
                .and_then(|field| coerce_field(value, field.field_type, options).value())
                .unwrap_or_else(|| value.clone());
            (name.clone(), normalized)
        })
        .collect()
}
