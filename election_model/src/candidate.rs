//! A person standing for a seat in one electorate.

use serde::{Deserialize, Serialize};

use crate::merge::{pick_longest, require_same, union_codes, MergeResult, Reconcile};
use crate::note::{normalise_notes, Note};

/// Marker inside a party code slug denoting an independent candidate.
const INDEPENDENT_MARKER: &str = "-independent";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub code: String,
    pub title: String,
    pub name_first: String,
    pub name_last: String,
    pub notes: Vec<Note>,

    pub election_code: String,
    pub assembly_code: String,
    pub electorate_code: String,
    pub party_code: String,
    pub ballot_code: String,
    pub result_codes: Vec<String>,
}

impl Candidate {
    fn is_independent(&self) -> bool {
        let local = self
            .party_code
            .strip_prefix(&self.election_code)
            .unwrap_or(&self.party_code);
        local.starts_with(INDEPENDENT_MARKER)
    }
}

impl Reconcile for Candidate {
    fn key(&self) -> String {
        self.code.clone()
    }

    fn merge_in(&mut self, other: Candidate) -> MergeResult<()> {
        require_same("code", &self.code, &other.code)?;
        require_same("first name", &self.name_first, &other.name_first)?;
        require_same("last name", &self.name_last, &other.name_last)?;
        require_same("election code", &self.election_code, &other.election_code)?;
        require_same("assembly code", &self.assembly_code, &other.assembly_code)?;
        require_same(
            "electorate code",
            &self.electorate_code,
            &other.electorate_code,
        )?;
        require_same("ballot code", &self.ballot_code, &other.ballot_code)?;

        // Commissions label independents inconsistently, sometimes appending
        // the candidate's name to the party slug. Any other disagreement
        // about the party is a data integrity problem.
        if self.is_independent() && other.is_independent() {
            self.party_code = pick_longest(&self.party_code, &other.party_code);
        } else {
            require_same("party code", &self.party_code, &other.party_code)?;
        }

        self.title = pick_longest(&self.title, &other.title);
        self.result_codes =
            union_codes(std::mem::take(&mut self.result_codes), other.result_codes);
        self.notes = normalise_notes(std::mem::take(&mut self.notes), other.notes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::MergeError;

    fn candidate(party_code: &str) -> Candidate {
        Candidate {
            code: "2019-h-wentworth-smith-john".to_string(),
            title: "John Smith".to_string(),
            name_first: "John".to_string(),
            name_last: "Smith".to_string(),
            notes: vec![],
            election_code: "au-2019".to_string(),
            assembly_code: "2019-h".to_string(),
            electorate_code: "2019-h-wentworth".to_string(),
            party_code: party_code.to_string(),
            ballot_code: "2019-h-wentworth-ballot".to_string(),
            result_codes: vec![],
        }
    }

    #[test]
    fn independent_party_variants_merge_to_longest() {
        let mut a = candidate("au-2019-independent");
        let b = candidate("au-2019-independent-john-smith");
        a.merge_in(b).unwrap();
        assert_eq!(a.party_code, "au-2019-independent-john-smith");
    }

    #[test]
    fn named_party_conflict_is_fatal() {
        let mut a = candidate("au-2019-liberal");
        let b = candidate("au-2019-labor");
        let err = a.merge_in(b).unwrap_err();
        assert!(matches!(
            err,
            MergeError::FieldMismatch {
                field: "party code",
                ..
            }
        ));
    }

    #[test]
    fn electorate_conflict_is_fatal() {
        let mut a = candidate("au-2019-liberal");
        let mut b = candidate("au-2019-liberal");
        b.electorate_code = "2019-h-sydney".to_string();
        let err = a.merge_in(b).unwrap_err();
        assert!(matches!(
            err,
            MergeError::FieldMismatch {
                field: "electorate code",
                ..
            }
        ));
    }
}
