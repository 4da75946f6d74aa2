//! The reconciliation protocol shared by every record family.
//!
//! Records are identified by a derived code. Two records with the same code
//! describe the same logical entity and must be merged, never duplicated.

use serde::{Deserialize, Serialize};
use snafu::prelude::*;

/// Errors raised while reconciling records.
///
/// Every variant is fatal: a conflict between two records with the same code
/// is a data quality problem to fix upstream, not something to paper over.
#[derive(Debug, Snafu, PartialEq, Eq, Clone)]
#[snafu(visibility(pub))]
pub enum MergeError {
    #[snafu(display("Field '{field}' must not be empty"))]
    EmptyField { field: &'static str },

    #[snafu(display("Field '{field}' must be the same value, got '{left}' and '{right}'"))]
    FieldMismatch {
        field: &'static str,
        left: String,
        right: String,
    },

    #[snafu(display("Result '{code}' has conflicting values {left} and {right}"))]
    ValueConflict { code: String, left: u64, right: u64 },

    #[snafu(display("Cannot insert a record without a code"))]
    MissingCode,
}

pub type MergeResult<T> = Result<T, MergeError>;

/// Implemented by every record family that can be deduplicated by key.
pub trait Reconcile {
    /// The identity key. For entities this is the code; notes key on their
    /// whole (display, content, category) triple.
    fn key(&self) -> String;

    /// Combines `other` into `self`. Both sides must carry equal keys.
    fn merge_in(&mut self, other: Self) -> MergeResult<()>;
}

/// Requires two identity fields to be equal and non-blank.
pub(crate) fn require_same(field: &'static str, left: &str, right: &str) -> MergeResult<()> {
    ensure!(
        !left.trim().is_empty() && !right.trim().is_empty(),
        EmptyFieldSnafu { field }
    );
    ensure!(left == right, FieldMismatchSnafu { field, left, right });
    Ok(())
}

/// Like [`require_same`], but a blank side yields the other value.
pub(crate) fn same_allow_empty(
    field: &'static str,
    left: &str,
    right: &str,
) -> MergeResult<String> {
    match (left.trim().is_empty(), right.trim().is_empty()) {
        (true, _) => Ok(right.to_string()),
        (false, true) => Ok(left.to_string()),
        (false, false) if left == right => Ok(left.to_string()),
        _ => FieldMismatchSnafu { field, left, right }.fail(),
    }
}

/// Picks the longer of two display strings.
///
/// This is a policy choice, not a correctness guarantee: the richer source
/// usually writes the longer title. Ties keep `left`, so with sorted inputs
/// the first-seen value wins deterministically.
pub fn pick_longest(left: &str, right: &str) -> String {
    if right.len() > left.len() {
        right.to_string()
    } else {
        left.to_string()
    }
}

/// The deduplicated, sorted union of two code lists.
pub fn union_codes(left: Vec<String>, right: Vec<String>) -> Vec<String> {
    let mut all: Vec<String> = left;
    all.extend(right);
    all.sort();
    all.dedup();
    all
}

/// A collection of records unique by key, behind a small repository surface.
///
/// Lookups are linear scans. A single election holds at most a few hundred
/// records per kind, so an index would not pay for itself, and the scan
/// keeps the merge behaviour easy to audit. Call sites only see
/// `find_by_key` / `upsert` / `all`, so an indexed implementation could be
/// swapped in without touching them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection<T>(Vec<T>);

impl<T> Default for Collection<T> {
    fn default() -> Collection<T> {
        Collection(Vec::new())
    }
}

impl<T> From<Vec<T>> for Collection<T> {
    fn from(items: Vec<T>) -> Collection<T> {
        Collection(items)
    }
}

impl<T> Collection<T> {
    pub fn new() -> Collection<T> {
        Collection::default()
    }

    pub fn all(&self) -> &[T] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl<T: Reconcile> Collection<T> {
    pub fn find_by_key(&self, key: &str) -> Option<&T> {
        self.0.iter().find(|i| i.key() == key)
    }

    /// Adds the record, merging it into an existing record with equal key.
    pub fn upsert(&mut self, item: T) -> MergeResult<()> {
        ensure!(!item.key().trim().is_empty(), MissingCodeSnafu);
        match self.0.iter_mut().find(|i| i.key() == item.key()) {
            Some(existing) => existing.merge_in(item),
            None => {
                self.0.push(item);
                Ok(())
            }
        }
    }

    /// Sorts by key and re-inserts every record, so exactly one record per
    /// key survives, in deterministic order. Normalising an already
    /// normalised collection is a no-op.
    pub fn normalise(&mut self) -> MergeResult<()> {
        let mut items = std::mem::take(&mut self.0);
        items.sort_by_key(|i| i.key());
        let mut result = Collection::new();
        for item in items {
            result.upsert(item)?;
        }
        *self = result;
        Ok(())
    }

    /// Concatenates `other` into this collection and normalises.
    pub fn merge_from(&mut self, other: Collection<T>) -> MergeResult<()> {
        self.0.extend(other.0);
        self.normalise()
    }
}

impl<T: Clone> Collection<T> {
    pub fn filter<F>(&self, keep: F) -> Collection<T>
    where
        F: Fn(&T) -> bool,
    {
        Collection(self.0.iter().filter(|i| keep(i)).cloned().collect())
    }
}

impl<T> IntoIterator for Collection<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
