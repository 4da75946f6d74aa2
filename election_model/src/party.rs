//! A party (or independent grouping) fielding candidates in one election.

use serde::{Deserialize, Serialize};

use crate::merge::{
    pick_longest, require_same, union_codes, FieldMismatchSnafu, MergeResult, Reconcile,
};
use crate::note::{normalise_notes, Note};

/// How the party appears on ballots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartyCategory {
    /// A registered party named on the ballot.
    Named,
    /// A group on the ballot without a registered name.
    NotNamed,
    /// Ungrouped, e.g. an ungrouped independent.
    NotGrouped,
}

impl PartyCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartyCategory::Named => "named",
            PartyCategory::NotNamed => "not-named",
            PartyCategory::NotGrouped => "not-grouped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub code: String,
    pub short_name: String,
    pub title: String,
    pub alt_titles: Vec<String>,
    /// Not every source knows the grouping status.
    pub category: Option<PartyCategory>,
    pub notes: Vec<Note>,

    pub election_code: String,
    pub candidate_codes: Vec<String>,
}

impl Reconcile for Party {
    fn key(&self) -> String {
        self.code.clone()
    }

    fn merge_in(&mut self, other: Party) -> MergeResult<()> {
        require_same("code", &self.code, &other.code)?;
        require_same("election code", &self.election_code, &other.election_code)?;

        self.category = match (self.category, other.category) {
            (Some(left), Some(right)) if left != right => {
                return FieldMismatchSnafu {
                    field: "category",
                    left: left.as_str(),
                    right: right.as_str(),
                }
                .fail();
            }
            (left, right) => left.or(right),
        };

        self.short_name = pick_longest(&self.short_name, &other.short_name);
        self.title = pick_longest(&self.title, &other.title);
        self.alt_titles = union_codes(std::mem::take(&mut self.alt_titles), other.alt_titles);
        self.candidate_codes = union_codes(
            std::mem::take(&mut self.candidate_codes),
            other.candidate_codes,
        );
        self.notes = normalise_notes(std::mem::take(&mut self.notes), other.notes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn party(title: &str, category: Option<PartyCategory>) -> Party {
        Party {
            code: "au-2019-animal-justice-party".to_string(),
            short_name: String::new(),
            title: title.to_string(),
            alt_titles: vec![],
            category,
            notes: vec![],
            election_code: "au-2019".to_string(),
            candidate_codes: vec![],
        }
    }

    #[test]
    fn merge_fills_missing_category() {
        let mut a = party("AJP", None);
        let b = party("Animal Justice Party", Some(PartyCategory::Named));
        a.merge_in(b).unwrap();
        assert_eq!(a.category, Some(PartyCategory::Named));
        assert_eq!(a.title, "Animal Justice Party");
    }

    #[test]
    fn merge_rejects_conflicting_category() {
        let mut a = party("AJP", Some(PartyCategory::Named));
        let b = party("AJP", Some(PartyCategory::NotGrouped));
        assert!(a.merge_in(b).is_err());
    }
}
