//! Lookups specific to the Australian Electoral Commission exports.

use snafu::OptionExt;

use election_model::{Assembly, Combination, Election, NoteCategory};

use crate::etl::{EtlResult, MissingAssemblySnafu, MissingElectionIdSnafu};

/// The raw-info note display that carries the commission's election id.
pub const ELECTION_ID_KEY: &str = "AEC Election ID";

const SENATE_MARKER: &str = "senate";
const HOUSE_OF_REPS_MARKER: &str = "house-of-reps";

pub const INDEPENDENT_TITLE: &str = "Independent";
pub const INDEPENDENT_SHORT: &str = "IND";

/// The commission's numeric id for this election, taken from the seed
/// notes. The tally room and media feed filenames embed it.
pub fn election_id(election: &Election) -> EtlResult<String> {
    election
        .notes
        .iter()
        .find(|n| n.category == NoteCategory::RawInfo && n.display == ELECTION_ID_KEY)
        .map(|n| n.content.clone())
        .context(MissingElectionIdSnafu {
            code: &election.code,
        })
}

pub fn assembly_senate(combination: &Combination) -> EtlResult<Assembly> {
    find_assembly(combination, SENATE_MARKER)
}

pub fn assembly_house_reps(combination: &Combination) -> EtlResult<Assembly> {
    find_assembly(combination, HOUSE_OF_REPS_MARKER)
}

fn find_assembly(combination: &Combination, marker: &str) -> EtlResult<Assembly> {
    combination
        .assemblies
        .iter()
        .find(|a| a.code.contains(marker))
        .cloned()
        .context(MissingAssemblySnafu { marker })
}

#[cfg(test)]
mod tests {
    use super::*;
    use election_model::Note;

    #[test]
    fn election_id_reads_the_seed_note() {
        let election = Election {
            code: "au-2019".to_string(),
            title: "2019 Federal Election".to_string(),
            location_country: "Australia".to_string(),
            location_administrative_area_name: "Federal".to_string(),
            location_locality_name: String::new(),
            location_description: String::new(),
            date: "2019-05-18".to_string(),
            date_time_zone: "Australia/Sydney".to_string(),
            assembly_codes: vec![],
            party_codes: vec![],
            notes: vec![Note::new(ELECTION_ID_KEY, "24310", NoteCategory::RawInfo)],
        };
        assert_eq!(election_id(&election).unwrap(), "24310");
    }

    #[test]
    fn missing_assembly_is_fatal() {
        let combination = Combination::new();
        assert!(assembly_senate(&combination).is_err());
    }
}
