//! The aggregate holding every entity collection for one or more elections.

use log::debug;

use serde::{Deserialize, Serialize};

use crate::assembly::Assembly;
use crate::ballot::Ballot;
use crate::candidate::Candidate;
use crate::election::Election;
use crate::electorate::Electorate;
use crate::merge::{Collection, MergeResult};
use crate::party::Party;
use crate::tally::Tally;

/// Any entity record, for kind dispatch in [`Combination::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Assembly(Assembly),
    Ballot(Ballot),
    Candidate(Candidate),
    Election(Election),
    Electorate(Electorate),
    Party(Party),
    Tally(Tally),
}

macro_rules! record_from {
    ($($kind:ident),+) => {
        $(impl From<$kind> for Record {
            fn from(item: $kind) -> Record {
                Record::$kind(item)
            }
        })+
    };
}

record_from!(Assembly, Ballot, Candidate, Election, Electorate, Party, Tally);

/// Collections are independent: entities reference each other by code only,
/// so each collection can be normalised on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Combination {
    #[serde(default)]
    pub assemblies: Collection<Assembly>,
    #[serde(default)]
    pub ballots: Collection<Ballot>,
    #[serde(default)]
    pub candidates: Collection<Candidate>,
    #[serde(default)]
    pub elections: Collection<Election>,
    #[serde(default)]
    pub electorates: Collection<Electorate>,
    #[serde(default)]
    pub parties: Collection<Party>,
    #[serde(default)]
    pub results: Collection<Tally>,
}

impl Combination {
    pub fn new() -> Combination {
        Combination::default()
    }

    /// Adds the record to the collection for its kind, merging it into an
    /// existing record with the same code.
    pub fn add(&mut self, item: impl Into<Record>) -> MergeResult<()> {
        match item.into() {
            Record::Assembly(i) => self.assemblies.upsert(i),
            Record::Ballot(i) => self.ballots.upsert(i),
            Record::Candidate(i) => self.candidates.upsert(i),
            Record::Election(i) => self.elections.upsert(i),
            Record::Electorate(i) => self.electorates.upsert(i),
            Record::Party(i) => self.parties.upsert(i),
            Record::Tally(i) => self.results.upsert(i),
        }
    }

    /// Combines another aggregate into this one, collection by collection.
    pub fn merge_in(&mut self, other: Combination) -> MergeResult<()> {
        debug!(
            "Merging in {} elections, {} electorates, {} candidates, {} results.",
            other.elections.len(),
            other.electorates.len(),
            other.candidates.len(),
            other.results.len()
        );
        self.assemblies.merge_from(other.assemblies)?;
        self.ballots.merge_from(other.ballots)?;
        self.candidates.merge_from(other.candidates)?;
        self.elections.merge_from(other.elections)?;
        self.electorates.merge_from(other.electorates)?;
        self.parties.merge_from(other.parties)?;
        self.results.merge_from(other.results)?;
        Ok(())
    }

    /// Deduplicates and sorts every collection.
    pub fn normalise(&mut self) -> MergeResult<()> {
        self.assemblies.normalise()?;
        self.ballots.normalise()?;
        self.candidates.normalise()?;
        self.elections.normalise()?;
        self.electorates.normalise()?;
        self.parties.normalise()?;
        self.results.normalise()?;
        Ok(())
    }

    /// Whether any collection holds data. Used to skip writing empty
    /// output partitions.
    pub fn any(&self) -> bool {
        !self.assemblies.is_empty()
            || !self.ballots.is_empty()
            || !self.candidates.is_empty()
            || !self.elections.is_empty()
            || !self.electorates.is_empty()
            || !self.parties.is_empty()
            || !self.results.is_empty()
    }

    /// The slice belonging to one election.
    pub fn for_election(&self, election_code: &str) -> Combination {
        Combination {
            assemblies: self
                .assemblies
                .filter(|i| i.election_code == election_code),
            ballots: self.ballots.filter(|i| i.election_code == election_code),
            candidates: self
                .candidates
                .filter(|i| i.election_code == election_code),
            elections: self.elections.filter(|i| i.code == election_code),
            electorates: self
                .electorates
                .filter(|i| i.election_code == election_code),
            parties: self.parties.filter(|i| i.election_code == election_code),
            results: self.results.filter(|i| i.election_code == election_code),
        }
    }

    /// Seven single-kind aggregates, one per output file.
    pub fn split_by_kind(&self) -> Vec<(&'static str, Combination)> {
        vec![
            (
                "assemblies",
                Combination {
                    assemblies: self.assemblies.clone(),
                    ..Combination::new()
                },
            ),
            (
                "ballots",
                Combination {
                    ballots: self.ballots.clone(),
                    ..Combination::new()
                },
            ),
            (
                "candidates",
                Combination {
                    candidates: self.candidates.clone(),
                    ..Combination::new()
                },
            ),
            (
                "elections",
                Combination {
                    elections: self.elections.clone(),
                    ..Combination::new()
                },
            ),
            (
                "electorates",
                Combination {
                    electorates: self.electorates.clone(),
                    ..Combination::new()
                },
            ),
            (
                "parties",
                Combination {
                    parties: self.parties.clone(),
                    ..Combination::new()
                },
            ),
            (
                "results",
                Combination {
                    results: self.results.clone(),
                    ..Combination::new()
                },
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::MergeError;

    fn electorate(code: &str, title: &str, election_code: &str) -> Electorate {
        Electorate {
            code: code.to_string(),
            title: title.to_string(),
            ballot_codes: vec![],
            notes: vec![],
            election_code: election_code.to_string(),
            assembly_code: "senate".to_string(),
            candidate_codes: vec![],
        }
    }

    #[test]
    fn add_rejects_blank_code() {
        let mut c = Combination::new();
        let err = c.add(electorate("", "NSW", "au-2019")).unwrap_err();
        assert_eq!(err, MergeError::MissingCode);
    }

    #[test]
    fn add_merges_same_code() {
        let mut c = Combination::new();
        c.add(electorate("senate-nsw", "NSW", "au-2019")).unwrap();
        c.add(electorate("senate-nsw", "New South Wales", "au-2019"))
            .unwrap();
        assert_eq!(c.electorates.len(), 1);
        assert_eq!(c.electorates.all()[0].title, "New South Wales");
    }

    #[test]
    fn merge_in_collapses_duplicates_across_aggregates() {
        let mut left = Combination::new();
        left.add(electorate("senate-nsw", "NSW", "au-2019")).unwrap();
        let mut right = Combination::new();
        right
            .add(electorate("senate-nsw", "New South Wales", "au-2019"))
            .unwrap();
        right
            .add(electorate("senate-act", "ACT", "au-2019"))
            .unwrap();

        left.merge_in(right).unwrap();
        assert_eq!(left.electorates.len(), 2);
        // Sorted by code, titled by the longer string.
        assert_eq!(left.electorates.all()[0].code, "senate-act");
        assert_eq!(left.electorates.all()[1].title, "New South Wales");
    }

    #[test]
    fn normalise_is_idempotent() {
        let mut c = Combination::new();
        c.add(electorate("senate-vic", "VIC", "au-2019")).unwrap();
        c.add(electorate("senate-nsw", "NSW", "au-2019")).unwrap();
        c.normalise().unwrap();
        let once = c.clone();
        c.normalise().unwrap();
        assert_eq!(c, once);
    }

    #[test]
    fn any_reports_data() {
        let mut c = Combination::new();
        assert!(!c.any());
        c.add(electorate("senate-nsw", "NSW", "au-2019")).unwrap();
        assert!(c.any());
    }

    #[test]
    fn for_election_filters_by_code() {
        let mut c = Combination::new();
        c.add(electorate("senate-nsw", "NSW", "au-2019")).unwrap();
        c.add(electorate("senate-vic", "VIC", "au-2022")).unwrap();
        let slice = c.for_election("au-2019");
        assert_eq!(slice.electorates.len(), 1);
        assert_eq!(slice.electorates.all()[0].code, "senate-nsw");
    }

    #[test]
    fn serde_round_trip() {
        let mut c = Combination::new();
        c.add(electorate("senate-nsw", "New South Wales", "au-2019"))
            .unwrap();
        let text = serde_json::to_string(&c).unwrap();
        let read: Combination = serde_json::from_str(&text).unwrap();
        assert_eq!(read, c);
        // External field names are camelCase.
        assert!(text.contains("\"electionCode\":\"au-2019\""));
        assert!(text.contains("\"assemblyCode\""));
    }

    #[test]
    fn deserialises_partial_input() {
        let c: Combination = serde_json::from_str("{\"elections\": []}").unwrap();
        assert!(!c.any());
    }
}
