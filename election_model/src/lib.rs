//! Unified election data model with a code-based reconciliation engine.
//!
//! Entities (elections, assemblies, electorates, ballots, parties,
//! candidates, results) are identified by deterministic, hierarchical slug
//! codes and reference each other by code only. Records of the same kind
//! with equal codes are the same logical entity: adding one to a
//! [`Combination`] merges it into the existing record, resolving each field
//! by a fixed policy (identity fields must match, display strings take the
//! longer value, code lists union, numeric values must agree).
//!
//! The engine is a single-pass, in-memory batch reconciler: collections are
//! plain lists normalised by sorting on code and re-merging, which keeps the
//! behaviour deterministic regardless of the order sources are read in.

mod assembly;
mod ballot;
mod candidate;
mod combination;
pub mod codes;
mod election;
mod electorate;
mod merge;
mod note;
mod party;
mod tally;

pub use crate::assembly::Assembly;
pub use crate::ballot::{Ballot, BallotCategory, OrderMethod};
pub use crate::candidate::Candidate;
pub use crate::combination::{Combination, Record};
pub use crate::election::Election;
pub use crate::electorate::Electorate;
pub use crate::merge::{
    pick_longest, union_codes, Collection, MergeError, MergeResult, Reconcile,
};
pub use crate::note::{normalise_notes, Note, NoteCategory};
pub use crate::party::{Party, PartyCategory};
pub use crate::tally::{Tally, TallyCategory};
