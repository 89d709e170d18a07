//! Error types for record reconciliation.

use thiserror::Error;

/// Which of the two record sets an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffSide {
    Current,
    Incoming,
}

impl std::fmt::Display for DiffSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Current => write!(f, "current"),
            Self::Incoming => write!(f, "incoming"),
        }
    }
}

/// Errors that make a diff meaningless. Field-level problems are reported
/// as validation issues instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// The same identifier occurs twice within one side.
    #[error("duplicate identifier '{id}' in {side} records")]
    DuplicateIdentifier {
        /// Side holding the duplicate.
        side: DiffSide,
        /// The repeated identifier.
        id: String,
    },

    /// A record has no usable value in the identifier field.
    #[error("{side} record #{index} has no '{id_field}' value")]
    MissingIdentifier {
        /// Side holding the record.
        side: DiffSide,
        /// Position of the record within its side.
        index: usize,
        /// Identifier field name.
        id_field: String,
    },
}

/// Result alias for reconciliation operations.
pub type Result<T> = std::result::Result<T, ReconcileError>;
