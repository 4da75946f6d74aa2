//! A single numeric outcome: a vote or person count.
//!
//! Tallies link to each other through ancestor and child codes, forming the
//! reporting hierarchy: population -> enrolment -> {not-enrolled,
//! participated, not-participated}; participated -> {voted, not-voted};
//! voted -> {formal, not-formal}.

use serde::{Deserialize, Serialize};

use crate::merge::{
    pick_longest, require_same, union_codes, MergeResult, Reconcile, ValueConflictSnafu,
};
use crate::note::{normalise_notes, Note};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TallyCategory {
    CandidateElected,
    CandidateExcluded,
    PeopleCount,
}

impl TallyCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TallyCategory::CandidateElected => "candidate-elected",
            TallyCategory::CandidateExcluded => "candidate-excluded",
            TallyCategory::PeopleCount => "people-count",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    pub code: String,
    pub title: String,

    /// The number of votes or number of voters.
    pub value: u64,
    pub category: TallyCategory,

    pub ancestor_codes: Vec<String>,
    pub child_codes: Vec<String>,

    pub notes: Vec<Note>,

    pub election_code: String,
    pub assembly_code: String,
    pub electorate_code: String,
    pub ballot_code: String,
}

impl Tally {
    // Well-known (code suffix, title) pairs for people counts.
    pub const POPULATION: (&'static str, &'static str) = ("population", "Population");
    pub const ENROLMENT: (&'static str, &'static str) = ("enrolment", "Enrolment");
    pub const NOT_ENROLLED: (&'static str, &'static str) = ("not-enrolled", "Not Enrolled");
    pub const PARTICIPATED: (&'static str, &'static str) = ("participated", "Participated");
    pub const NOT_PARTICIPATED: (&'static str, &'static str) =
        ("not-participated", "Did not participate");
    pub const VOTED: (&'static str, &'static str) = ("voted", "Voted");
    pub const NOT_VOTED: (&'static str, &'static str) = ("not-voted", "Did not vote");
    pub const FORMAL: (&'static str, &'static str) = ("formal", "Formal votes");
    pub const NOT_FORMAL: (&'static str, &'static str) = ("not-formal", "Informal votes");
}

impl Reconcile for Tally {
    fn key(&self) -> String {
        self.code.clone()
    }

    fn merge_in(&mut self, other: Tally) -> MergeResult<()> {
        require_same("code", &self.code, &other.code)?;
        require_same("category", self.category.as_str(), other.category.as_str())?;
        // A changed count for the same code signals a genuine data
        // discrepancy; never average or overwrite.
        if self.value != other.value {
            return ValueConflictSnafu {
                code: self.code.clone(),
                left: self.value,
                right: other.value,
            }
            .fail();
        }
        require_same("election code", &self.election_code, &other.election_code)?;
        require_same("assembly code", &self.assembly_code, &other.assembly_code)?;
        require_same(
            "electorate code",
            &self.electorate_code,
            &other.electorate_code,
        )?;
        require_same("ballot code", &self.ballot_code, &other.ballot_code)?;

        self.title = pick_longest(&self.title, &other.title);
        self.ancestor_codes = union_codes(
            std::mem::take(&mut self.ancestor_codes),
            other.ancestor_codes,
        );
        self.child_codes = union_codes(std::mem::take(&mut self.child_codes), other.child_codes);
        self.notes = normalise_notes(std::mem::take(&mut self.notes), other.notes)?;
        Ok(())
    }
}
