pub mod balance;
pub mod diff;
pub mod error;
pub mod mapping;
pub mod validation;

pub use balance::{
    BalanceCheck, BalanceReconciler, BalanceReport, BalanceStatus, CashMovement, MovementKind,
    ReportedBalance, UnknownMovementKind,
};
pub use diff::{compute_diff, DiffResult};
pub use error::{DiffSide, ReconcileError};
pub use mapping::{auto_detect_column_mapping, remap, ColumnMapper, ColumnMapping};
pub use validation::{
    normalize_row, partition_valid_rows, validate_mapped_rows, Severity, ValidationIssue,
};
