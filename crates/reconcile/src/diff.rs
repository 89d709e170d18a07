//! Three-way diff between a current record set and an incoming one.
//!
//! Used to preview a sync before it is applied: which records the incoming
//! set adds, which it changes, and which it no longer carries. Records are
//! matched by an identifier field and compared by full deep equality.
//!
//! # Example
//!
//! ```
//! use betbalance_core::Record;
//! use betbalance_reconcile::diff::compute_diff;
//!
//! let current = vec![Record::new().with("id", "1").with("v", 5)];
//! let incoming = vec![
//!     Record::new().with("id", "1").with("v", 5),
//!     Record::new().with("id", "2").with("v", 9),
//! ];
//!
//! let diff = compute_diff(&current, &incoming, "id").unwrap();
//! assert_eq!(diff.to_add.len(), 1);
//! assert!(diff.to_update.is_empty() && diff.to_remove.is_empty());
//! ```

use betbalance_core::Record;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{DiffSide, ReconcileError, Result};

/// Changes that turn the current set into the incoming one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    /// Incoming records with no current counterpart, in incoming order.
    pub to_add: Vec<Record>,
    /// Incoming versions of records that changed, in incoming order.
    pub to_update: Vec<Record>,
    /// Current records absent from the incoming set, in current order.
    pub to_remove: Vec<Record>,
}

impl DiffResult {
    /// Returns true when the two sets already agree.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_update.is_empty() && self.to_remove.is_empty()
    }

    #[must_use]
    pub fn total_changes(&self) -> usize {
        self.to_add.len() + self.to_update.len() + self.to_remove.len()
    }

    /// Applies the diff to `current`, returning the converged set.
    ///
    /// Updated records replace their current version in place, removed ones
    /// are dropped and additions are appended in diff order.
    #[must_use]
    pub fn apply_to(&self, current: &[Record], id_field: &str) -> Vec<Record> {
        let updates: HashMap<String, &Record> = self
            .to_update
            .iter()
            .filter_map(|r| r.identifier(id_field).map(|id| (id, r)))
            .collect();
        let removals: Vec<String> = self
            .to_remove
            .iter()
            .filter_map(|r| r.identifier(id_field))
            .collect();

        current
            .iter()
            .filter(|r| {
                r.identifier(id_field)
                    .map_or(true, |id| !removals.contains(&id))
            })
            .map(|r| {
                r.identifier(id_field)
                    .and_then(|id| updates.get(&id))
                    .map_or_else(|| r.clone(), |updated| (*updated).clone())
            })
            .chain(self.to_add.iter().cloned())
            .collect()
    }
}

/// Computes additions, updates and removals from `current` to `incoming`.
///
/// # Errors
///
/// Returns `ReconcileError::DuplicateIdentifier` when an identifier occurs
/// twice within one side and `ReconcileError::MissingIdentifier` when a
/// record has no identifier value.
pub fn compute_diff(current: &[Record], incoming: &[Record], id_field: &str) -> Result<DiffResult> {
    let current_index = index_by_id(current, id_field, DiffSide::Current)?;
    let incoming_index = index_by_id(incoming, id_field, DiffSide::Incoming)?;

    let mut diff = DiffResult::default();

    for (id, record) in &incoming_index.ordered {
        match current_index.lookup.get(id.as_str()) {
            None => diff.to_add.push((*record).clone()),
            Some(existing) if *existing != *record => diff.to_update.push((*record).clone()),
            Some(_) => {}
        }
    }

    for (id, record) in &current_index.ordered {
        if !incoming_index.lookup.contains_key(id.as_str()) {
            diff.to_remove.push((*record).clone());
        }
    }

    tracing::debug!(
        "Diff on '{}': {} to add, {} to update, {} to remove",
        id_field,
        diff.to_add.len(),
        diff.to_update.len(),
        diff.to_remove.len()
    );

    Ok(diff)
}

struct IdIndex<'a> {
    ordered: Vec<(String, &'a Record)>,
    lookup: HashMap<String, &'a Record>,
}

fn index_by_id<'a>(records: &'a [Record], id_field: &str, side: DiffSide) -> Result<IdIndex<'a>> {
    let mut ordered = Vec::with_capacity(records.len());
    let mut lookup = HashMap::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let id = record
            .identifier(id_field)
            .ok_or_else(|| ReconcileError::MissingIdentifier {
                side,
                index,
                id_field: id_field.to_string(),
            })?;

        if lookup.insert(id.clone(), record).is_some() {
            tracing::warn!("Rejecting diff: duplicate identifier '{}' in {} records", id, side);
            return Err(ReconcileError::DuplicateIdentifier { side, id });
        }
        ordered.push((id, record));
    }

    Ok(IdIndex { ordered, lookup })
}
