//! Adapter for the AEC federal all-candidates list (csv).

use log::debug;

use election_model::{codes, Candidate, Combination, Election, Electorate, Note, Party};

use crate::etl::aec;
use crate::etl::store::{row_value, RawData, RawFile, RawRow};
use crate::etl::EtlResult;

/// Any csv with this in its name is treated as the candidates list.
const FILE_MARKER: &str = "all-candidates";

pub fn populate(
    original: &RawData,
    combination: &mut Combination,
    election: &Election,
) -> EtlResult<()> {
    let found = original.iter().find_map(|(name, file)| match file {
        RawFile::Rows(rows) if name.contains(FILE_MARKER) && name.ends_with(".csv") => {
            Some((name, rows))
        }
        _ => None,
    });
    let (name, rows) = match found {
        Some(f) => f,
        None => return Ok(()),
    };
    debug!("Reading candidates from '{}'.", name);

    let senate = aec::assembly_senate(combination)?;
    let house_reps = aec::assembly_house_reps(combination)?;

    for row in rows {
        add_candidate_row(row, combination, election, &senate, &house_reps)?;
    }
    Ok(())
}

fn add_candidate_row(
    row: &RawRow,
    combination: &mut Combination,
    election: &Election,
    senate: &election_model::Assembly,
    house_reps: &election_model::Assembly,
) -> EtlResult<()> {
    let state_ab = row_value(row, "state_ab");
    let div_nm = row_value(row, "div_nm");
    let name_last = row_value(row, "surname");
    let name_first = row_value(row, "ballot_given_nm");
    let mut party_title = row_value(row, "party_ballot_nm");
    if party_title.is_empty() {
        party_title = aec::INDEPENDENT_TITLE.to_string();
    }

    let location_address = joined_address(row, &["address_1", "address_2", "suburb", "postcode", "address_state_ab"]);
    let post_address = joined_address(
        row,
        &[
            "postal_address_1",
            "postal_address_2",
            "postal_suburb",
            "postal_postcode",
            "postal_state_ab",
        ],
    );

    let notes = Note::raw_info(&[
        ("state short name", &state_ab),
        ("occupation", &row_value(row, "occupation")),
        ("work phone", &row_value(row, "contact_work_ph")),
        ("home phone", &row_value(row, "contact_home_ph")),
        ("fax", &row_value(row, "contact_fax")),
        ("mobile phone", &row_value(row, "contact_mobile_no")),
        ("email", &row_value(row, "contact_email")),
        ("location", &location_address),
        ("post", &post_address),
    ]);

    let party = Party {
        code: codes::party_code(&election.code, &party_title)?,
        short_name: String::new(),
        title: party_title,
        alt_titles: vec![],
        category: None,
        notes: vec![],
        election_code: election.code.clone(),
        candidate_codes: vec![],
    };

    // House candidates have a division; senate candidates only a state.
    let (assembly, electorate_title) = if div_nm.is_empty() {
        (senate, state_ab)
    } else {
        (house_reps, div_nm)
    };
    let electorate = Electorate {
        code: codes::electorate_code(&assembly.code, &electorate_title),
        title: electorate_title.clone(),
        ballot_codes: vec![],
        notes: vec![],
        election_code: election.code.clone(),
        assembly_code: assembly.code.clone(),
        candidate_codes: vec![],
    };

    let candidate = Candidate {
        code: codes::candidate_code(&assembly.code, &electorate_title, &name_first, &name_last)?,
        title: codes::candidate_title(&name_first, &name_last),
        name_first,
        name_last,
        notes,
        election_code: election.code.clone(),
        assembly_code: assembly.code.clone(),
        electorate_code: electorate.code.clone(),
        party_code: party.code.clone(),
        ballot_code: codes::ballot_code(&assembly.code, &electorate_title),
        result_codes: vec![],
    };

    combination.add(party)?;
    combination.add(electorate)?;
    combination.add(candidate)?;
    Ok(())
}

fn joined_address(row: &RawRow, columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| row_value(row, c))
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
