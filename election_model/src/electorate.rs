//! A geographic division electing to a seat or seats in one assembly.

use serde::{Deserialize, Serialize};

use crate::merge::{
    pick_longest, require_same, same_allow_empty, union_codes, MergeResult, Reconcile,
};
use crate::note::{normalise_notes, Note};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Electorate {
    pub code: String,
    pub title: String,
    pub ballot_codes: Vec<String>,
    pub notes: Vec<Note>,

    pub election_code: String,
    /// May be blank when a source only knows the electorate indirectly;
    /// a later merge fills it in.
    pub assembly_code: String,
    pub candidate_codes: Vec<String>,
}

impl Reconcile for Electorate {
    fn key(&self) -> String {
        self.code.clone()
    }

    fn merge_in(&mut self, other: Electorate) -> MergeResult<()> {
        require_same("code", &self.code, &other.code)?;
        require_same("election code", &self.election_code, &other.election_code)?;
        self.assembly_code =
            same_allow_empty("assembly code", &self.assembly_code, &other.assembly_code)?;

        self.title = pick_longest(&self.title, &other.title);
        self.ballot_codes =
            union_codes(std::mem::take(&mut self.ballot_codes), other.ballot_codes);
        self.candidate_codes = union_codes(
            std::mem::take(&mut self.candidate_codes),
            other.candidate_codes,
        );
        self.notes = normalise_notes(std::mem::take(&mut self.notes), other.notes)?;
        Ok(())
    }
}
