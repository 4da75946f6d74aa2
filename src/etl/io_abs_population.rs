//! Adapter for the ABS estimated resident population tables (tsv).
//!
//! Population tallies anchor the reporting hierarchy: every electorate gets
//! a population figure whose child is the enrolment figure reported by the
//! commission.

use snafu::whatever;

use election_model::{
    codes, Combination, Election, Electorate, Note, NoteCategory, Tally, TallyCategory,
};

use crate::etl::aec;
use crate::etl::store::{row_number, row_value, RawData, RawFile, RawRow};
use crate::etl::EtlResult;

pub const EXCEL_NAME: &str = "32180DS0003_2010-20.xls";
pub const FED_ELECTORATES_2018_NAME: &str = "abs-est-pop-fed-electorates-asgs-2018.tsv";
pub const FED_ELECTORATES_2021_NAME: &str = "abs-est-pop-fed-electorates-asgs-2021.tsv";
pub const FED_ELECTORATES_NAME: &str = "federal-electorates-pop";
pub const STATE_ELECTORATES_2020_NAME: &str = "abs-est-pop-state-electorates-asgs-2020.tsv";
pub const STATE_ELECTORATES_NAME: &str = "state-electorates-pop";

const FED_TOTAL_NAME: &str = "TOTAL AUSTRALIA";

struct PopulationRow {
    division_id: String,
    name: String,
    population: u64,
}

pub fn populate(
    original: &RawData,
    combination: &mut Combination,
    election: &Election,
) -> EtlResult<()> {
    // The population tables carry one column per reference year.
    let year = match election.date.split('-').next() {
        Some(y) if !y.is_empty() => y.to_string(),
        _ => whatever!("Election '{}' has no usable date.", election.code),
    };

    let senate = aec::assembly_senate(combination)?;
    let house_reps = aec::assembly_house_reps(combination)?;

    if let Some(RawFile::Rows(rows)) = original.get(FED_ELECTORATES_NAME) {
        for item in rows {
            let division_id = row_value(item, "CED code");
            let name = row_value(item, "CED name");
            if division_id.is_empty() {
                if name == FED_TOTAL_NAME {
                    continue;
                }
                whatever!("Federal population row '{}' has no division code.", name);
            }
            let raw = PopulationRow {
                division_id,
                name,
                population: row_number(item, &year)?,
            };
            add_population(&raw, &house_reps, combination, None)?;
        }
    }

    if let Some(RawFile::Rows(rows)) = original.get(STATE_ELECTORATES_NAME) {
        // State rows are grouped under a trailing total row that names the
        // state; only then can the rows be attributed.
        let mut current: Vec<PopulationRow> = Vec::new();
        for item in rows {
            let division_id = row_value(item, "SED code");
            let name = row_value(item, "SED name");
            if !division_id.is_empty() {
                current.push(PopulationRow {
                    division_id,
                    name,
                    population: row_number(item, &year)?,
                });
                continue;
            }
            let state = find_state(combination, &name);
            for raw in &current {
                add_population(raw, &senate, combination, state.as_ref())?;
            }
            current.clear();
        }
    }

    Ok(())
}

/// Resolves a state total row ("Total New South Wales") to the senate
/// electorate it describes, by title or by a note naming the state.
fn find_state(combination: &Combination, total_name: &str) -> Option<Electorate> {
    let full_name = codes::title_case(total_name)
        .replace("Total", "")
        .trim()
        .to_string();
    combination
        .electorates
        .iter()
        .find(|i| i.title == full_name || i.notes.iter().any(|n| n.content == full_name))
        .cloned()
}

fn add_population(
    raw: &PopulationRow,
    assembly: &election_model::Assembly,
    combination: &mut Combination,
    state: Option<&Electorate>,
) -> EtlResult<()> {
    let mut notes = vec![Note::new(
        "division id",
        &raw.division_id,
        NoteCategory::RawInfo,
    )];

    // State electorates are namespaced by their state's short title so two
    // states may reuse a district name.
    let name = match state {
        Some(state) => {
            notes.extend(state.notes.iter().cloned());
            format!("{} {}", state.title, raw.name)
        }
        None => raw.name.clone(),
    };

    let (pop_code, pop_title) = Tally::POPULATION;
    let (enrol_code, _) = Tally::ENROLMENT;

    combination.add(Tally {
        code: codes::result_electorate_code(&assembly.code, &name, pop_code),
        title: format!("{} {}", name, pop_title),
        value: raw.population,
        category: TallyCategory::PeopleCount,
        ancestor_codes: vec![],
        child_codes: vec![codes::result_electorate_code(
            &assembly.code,
            &name,
            enrol_code,
        )],
        notes,
        election_code: assembly.election_code.clone(),
        assembly_code: assembly.code.clone(),
        electorate_code: codes::electorate_code(&assembly.code, &name),
        ballot_code: codes::ballot_code(&assembly.code, &name),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use election_model::Assembly;

    fn seed() -> (Combination, Election) {
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
            notes: vec![],
        };
        let mut combination = Combination::new();
        for code in ["au-2019-senate", "au-2019-house-of-reps"] {
            combination
                .add(Assembly {
                    code: code.to_string(),
                    title: code.to_string(),
                    election_code: "au-2019".to_string(),
                    electorate_codes: vec![],
                    ballot_codes: vec![],
                    notes: vec![],
                })
                .unwrap();
        }
        combination
            .add(Electorate {
                code: "au-2019-senate-nsw".to_string(),
                title: "NSW".to_string(),
                ballot_codes: vec![],
                notes: vec![Note::new(
                    "state full name",
                    "New South Wales",
                    NoteCategory::RawInfo,
                )],
                election_code: "au-2019".to_string(),
                assembly_code: "au-2019-senate".to_string(),
                candidate_codes: vec![],
            })
            .unwrap();
        (combination, election)
    }

    fn row(entries: &[(&str, &str)]) -> RawRow {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn federal_rows_become_population_tallies() {
        let (mut combination, election) = seed();
        let mut original = RawData::new();
        original.insert(
            FED_ELECTORATES_NAME.to_string(),
            RawFile::Rows(vec![
                row(&[("CED code", "101"), ("CED name", "Banks"), ("2019", "167990")]),
                row(&[("CED code", ""), ("CED name", FED_TOTAL_NAME), ("2019", "25000000")]),
            ]),
        );

        populate(&original, &mut combination, &election).unwrap();

        assert_eq!(combination.results.len(), 1);
        let tally = &combination.results.all()[0];
        assert_eq!(tally.code, "au-2019-house-of-reps-banks-population");
        assert_eq!(tally.value, 167_990);
        assert_eq!(
            tally.child_codes,
            vec!["au-2019-house-of-reps-banks-enrolment"]
        );
    }

    #[test]
    fn state_rows_are_grouped_under_their_total() {
        let (mut combination, election) = seed();
        let mut original = RawData::new();
        original.insert(
            STATE_ELECTORATES_NAME.to_string(),
            RawFile::Rows(vec![
                row(&[("SED code", "10001"), ("SED name", "Albury"), ("2019", "82506")]),
                row(&[("SED code", ""), ("SED name", "Total New South Wales"), ("2019", "0")]),
            ]),
        );

        populate(&original, &mut combination, &election).unwrap();

        assert_eq!(combination.results.len(), 1);
        let tally = &combination.results.all()[0];
        // Prefixed by the state electorate's title.
        assert_eq!(tally.code, "au-2019-senate-nsw-albury-population");
        assert!(tally
            .notes
            .iter()
            .any(|n| n.content == "New South Wales"));
    }

    #[test]
    fn federal_row_without_division_is_fatal() {
        let (mut combination, election) = seed();
        let mut original = RawData::new();
        original.insert(
            FED_ELECTORATES_NAME.to_string(),
            RawFile::Rows(vec![row(&[("CED code", ""), ("CED name", "Mystery"), ("2019", "1")])]),
        );
        assert!(populate(&original, &mut combination, &election).is_err());
    }
}
