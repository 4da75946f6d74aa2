//! The voting unit presented to voters in one electorate.

use serde::{Deserialize, Serialize};

use crate::merge::{require_same, union_codes, FieldMismatchSnafu, MergeResult, Reconcile};
use crate::note::{normalise_notes, Note};

/// What the ballot asks voters to choose between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BallotCategory {
    Party,
    Candidate,
}

impl BallotCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BallotCategory::Party => "party",
            BallotCategory::Candidate => "candidate",
        }
    }
}

/// Whether the printed order of entries is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderMethod {
    Fixed,
    /// Candidate order rotated across printed batches.
    RobsonRotation,
}

impl OrderMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderMethod::Fixed => "fixed",
            OrderMethod::RobsonRotation => "robson-rotation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ballot {
    pub code: String,
    pub category: BallotCategory,
    /// Only relevant when showing candidates.
    pub group_candidates_by_party: bool,
    pub order_method: OrderMethod,
    pub notes: Vec<Note>,

    pub election_code: String,
    pub assembly_code: String,
    pub electorate_code: String,
    pub party_codes: Vec<String>,
    pub candidate_codes: Vec<String>,
    pub result_codes: Vec<String>,
}

impl Reconcile for Ballot {
    fn key(&self) -> String {
        self.code.clone()
    }

    fn merge_in(&mut self, other: Ballot) -> MergeResult<()> {
        require_same("code", &self.code, &other.code)?;
        require_same(
            "category",
            self.category.as_str(),
            other.category.as_str(),
        )?;
        if self.group_candidates_by_party != other.group_candidates_by_party {
            return FieldMismatchSnafu {
                field: "group candidates by party",
                left: self.group_candidates_by_party.to_string(),
                right: other.group_candidates_by_party.to_string(),
            }
            .fail();
        }
        require_same(
            "order method",
            self.order_method.as_str(),
            other.order_method.as_str(),
        )?;
        require_same("election code", &self.election_code, &other.election_code)?;
        require_same("assembly code", &self.assembly_code, &other.assembly_code)?;
        require_same(
            "electorate code",
            &self.electorate_code,
            &other.electorate_code,
        )?;

        self.party_codes = union_codes(std::mem::take(&mut self.party_codes), other.party_codes);
        self.candidate_codes = union_codes(
            std::mem::take(&mut self.candidate_codes),
            other.candidate_codes,
        );
        self.result_codes =
            union_codes(std::mem::take(&mut self.result_codes), other.result_codes);
        self.notes = normalise_notes(std::mem::take(&mut self.notes), other.notes)?;
        Ok(())
    }
}
