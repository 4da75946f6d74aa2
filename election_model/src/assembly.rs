//! A house of an elected body, e.g. a senate or house of representatives.

use serde::{Deserialize, Serialize};

use crate::merge::{pick_longest, require_same, union_codes, MergeResult, Reconcile};
use crate::note::{normalise_notes, Note};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assembly {
    pub code: String,
    pub title: String,
    pub election_code: String,
    pub electorate_codes: Vec<String>,
    pub ballot_codes: Vec<String>,
    pub notes: Vec<Note>,
}

impl Reconcile for Assembly {
    fn key(&self) -> String {
        self.code.clone()
    }

    fn merge_in(&mut self, other: Assembly) -> MergeResult<()> {
        require_same("code", &self.code, &other.code)?;
        require_same("election code", &self.election_code, &other.election_code)?;

        self.title = pick_longest(&self.title, &other.title);
        self.electorate_codes = union_codes(
            std::mem::take(&mut self.electorate_codes),
            other.electorate_codes,
        );
        self.ballot_codes =
            union_codes(std::mem::take(&mut self.ballot_codes), other.ballot_codes);
        self.notes = normalise_notes(std::mem::take(&mut self.notes), other.notes)?;
        Ok(())
    }
}
