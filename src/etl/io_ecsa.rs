//! Adapter for the South Australian commission candidate exports.
//!
//! Candidates arrive as fixed-width tables extracted from the commission's
//! pdfs (one file per chamber) plus pre-scraped exports of the website
//! tables. Column boundaries are recovered from the header line offsets;
//! pdf page furniture is skipped line by line.

use std::collections::HashMap;

use snafu::prelude::*;

use election_model::{
    codes, Assembly, Ballot, BallotCategory, Candidate, Combination, Election, Electorate, Note,
    OrderMethod, Party, PartyCategory,
};

use crate::etl::store::{row_value, RawData, RawFile, RawRow};
use crate::etl::{
    EtlResult, InvalidPartyMappingSnafu, MissingAssemblySnafu, UnknownPartySnafu,
};

const ASSEMBLY_LC: &str = "legislative-council";
const ASSEMBLY_HA: &str = "house-of-assembly";

const PARTIES_NAME: &str = "parties.csv";
const HA_PDF_NAME: &str = "candidates-ha-pdf.txt";
const LC_PDF_NAME: &str = "candidates-lc-pdf.txt";
const HA_WEB_NAME: &str = "candidates-ha-web.csv";
const LC_WEB_NAME: &str = "candidates-lc-web.csv";

const HA_HEADERS: [&str; 4] = ["Full name", "Gender", "Contact number", "Affiliation"];
const LC_HEADERS: [&str; 5] = ["Group", "Full name", "Contact", "Affiliation", "member"];

// Grouping headings, compared with spaces removed and lowercased.
const GROUPED: &str = "groupedcandidates";
const GROUPED_IND: &str = "independentgrouped";
const UNGROUPED_IND: &str = "independentungrouped";

struct CandidateRow<'a> {
    assembly: &'a Assembly,
    grouping: Option<PartyCategory>,
    fields: RawRow,
}

pub fn populate(
    original: &RawData,
    combination: &mut Combination,
    election: &Election,
) -> EtlResult<()> {
    let party_map: HashMap<String, String> = match original.get(PARTIES_NAME) {
        Some(RawFile::Rows(rows)) => rows
            .iter()
            .map(|r| (row_value(r, "long"), row_value(r, "short")))
            .collect(),
        _ => HashMap::new(),
    };

    let lc = find_assembly(combination, election, ASSEMBLY_LC)?;
    let ha = find_assembly(combination, election, ASSEMBLY_HA)?;

    let mut rows: Vec<CandidateRow> = Vec::new();
    if let Some(RawFile::Text(text)) = original.get(HA_PDF_NAME) {
        rows.extend(read_ha_pdf(text, &ha));
    }
    if let Some(RawFile::Rows(table)) = original.get(HA_WEB_NAME) {
        for fields in table {
            rows.push(CandidateRow {
                assembly: &ha,
                grouping: None,
                fields: fields.clone(),
            });
        }
    }
    if let Some(RawFile::Text(text)) = original.get(LC_PDF_NAME) {
        rows.extend(read_lc_pdf(text, &lc)?);
    }
    if let Some(RawFile::Rows(table)) = original.get(LC_WEB_NAME) {
        for fields in table {
            let grouping = parse_grouping(&row_value(fields, "Group heading"))?;
            rows.push(CandidateRow {
                assembly: &lc,
                grouping: Some(grouping),
                fields: fields.clone(),
            });
        }
    }

    for row in &rows {
        add_candidate_row(row, &party_map, combination)?;
    }
    Ok(())
}

fn find_assembly(
    combination: &Combination,
    election: &Election,
    marker: &str,
) -> EtlResult<Assembly> {
    combination
        .assemblies
        .iter()
        .find(|a| a.code.contains(marker) && a.code.contains(&election.code))
        .cloned()
        .context(MissingAssemblySnafu { marker })
}

/// House of assembly pdf: one table for the whole state, with the
/// electorate named on its first candidate line only.
fn read_ha_pdf<'a>(text: &str, assembly: &'a Assembly) -> Vec<CandidateRow<'a>> {
    let mut columns: Option<Vec<(String, usize)>> = None;
    let mut current_electorate = String::new();
    let mut rows = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        // Page furniture: copyright footer, page numbers, legend lines.
        if trimmed.starts_with('©')
            || trimmed.ends_with(|c: char| c.is_ascii_digit())
            || trimmed.ends_with('#')
        {
            continue;
        }
        if HA_HEADERS.iter().all(|h| line.contains(h)) {
            let mut cols: Vec<(String, usize)> = HA_HEADERS
                .iter()
                .filter_map(|h| line.find(h).map(|offset| (h.to_string(), offset)))
                .collect();
            let full_name_offset = cols[0].1;
            cols.push(("Electorate".to_string(), 0));
            // The sitting-member marker sits just left of the name column.
            cols.push((
                "Sitting member".to_string(),
                full_name_offset.saturating_sub(3),
            ));
            cols.sort_by_key(|(_, offset)| *offset);
            columns = Some(cols);
            continue;
        }
        let cols = match &columns {
            Some(c) => c,
            None => continue,
        };
        let max_offset = cols.last().map(|(_, o)| *o).unwrap_or(0);
        if line.len() < max_offset {
            continue;
        }

        let mut fields = split_columns(line, cols);
        let electorate = row_value(&fields, "Electorate");
        if electorate.is_empty() {
            fields.insert("Electorate".to_string(), current_electorate.clone());
        } else {
            current_electorate = electorate;
        }
        rows.push(CandidateRow {
            assembly,
            grouping: None,
            fields,
        });
    }
    rows
}

/// Legislative council pdf: a single state-wide table, sectioned by
/// grouping headings instead of electorates.
fn read_lc_pdf<'a>(text: &str, assembly: &'a Assembly) -> EtlResult<Vec<CandidateRow<'a>>> {
    let mut columns: Option<Vec<(String, usize)>> = None;
    let mut grouping: Option<PartyCategory> = None;
    let mut rows = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let squashed = squash(line);
        if squashed.starts_with("page")
            && squashed.contains("of")
            && squashed.ends_with(|c: char| c.is_ascii_digit())
        {
            continue;
        }
        if squashed.contains("denotesmember") || squashed.contains("stateelection") {
            continue;
        }
        if squashed.contains("legislativecouncil") || squashed == "sitting" {
            continue;
        }
        if squashed.starts_with(GROUPED_IND) {
            grouping = Some(PartyCategory::NotNamed);
            continue;
        }
        if squashed.starts_with(UNGROUPED_IND) {
            grouping = Some(PartyCategory::NotGrouped);
            continue;
        }
        if squashed.starts_with(GROUPED) {
            grouping = Some(PartyCategory::Named);
            continue;
        }
        if LC_HEADERS.iter().all(|h| line.contains(h)) {
            let mut cols: Vec<(String, usize)> = LC_HEADERS
                .iter()
                .filter_map(|h| line.find(h).map(|offset| (h.to_string(), offset)))
                .collect();
            cols.sort_by_key(|(_, offset)| *offset);
            columns = Some(cols);
            continue;
        }
        let cols = match &columns {
            Some(c) => c,
            None => continue,
        };
        let category = match grouping {
            Some(g) => g,
            None => whatever!("Candidate line before any grouping heading."),
        };
        rows.push(CandidateRow {
            assembly,
            grouping: Some(category),
            fields: split_columns(line, cols),
        });
    }
    Ok(rows)
}

fn parse_grouping(heading: &str) -> EtlResult<PartyCategory> {
    let squashed = squash(heading);
    if squashed.starts_with(GROUPED_IND) {
        Ok(PartyCategory::NotNamed)
    } else if squashed.starts_with(UNGROUPED_IND) {
        Ok(PartyCategory::NotGrouped)
    } else if squashed.starts_with(GROUPED) {
        Ok(PartyCategory::Named)
    } else {
        whatever!("Unknown grouping heading '{}'.", heading)
    }
}

fn squash(line: &str) -> String {
    line.trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

fn split_columns(line: &str, columns: &[(String, usize)]) -> RawRow {
    let mut fields = RawRow::new();
    for (index, (header, offset)) in columns.iter().enumerate() {
        let end = columns
            .get(index + 1)
            .map(|(_, o)| *o)
            .unwrap_or_else(|| line.len());
        fields.insert(
            header.clone(),
            slice_within(line, *offset, end).trim().to_string(),
        );
    }
    fields
}

/// Slices by byte offsets, clamped to the line and to char boundaries so
/// stray non-ascii characters cannot split a code point.
fn slice_within(line: &str, start: usize, end: usize) -> &str {
    let len = line.len();
    let mut s = start.min(len);
    while s < len && !line.is_char_boundary(s) {
        s += 1;
    }
    let mut e = end.min(len).max(s);
    while e > s && !line.is_char_boundary(e) {
        e -= 1;
    }
    &line[s..e]
}

fn add_candidate_row(
    row: &CandidateRow,
    party_map: &HashMap<String, String>,
    combination: &mut Combination,
) -> EtlResult<()> {
    let f = &row.fields;
    let assembly = row.assembly;

    let group = row_value(f, "Group");
    let position = row_value(f, "Position");
    let gender = parse_gender(&row_value(f, "Gender"))?;
    let contact = codes::collapse_spaces(&first_non_empty(&[
        row_value(f, "Contact number"),
        row_value(f, "Contact"),
    ]));

    let full = row_value(f, "Full name");
    let (full_last, full_first) = match full.split_once(',') {
        Some((last, first)) => (last.trim().to_string(), first.trim().to_string()),
        None => (full.clone(), String::new()),
    };
    let name_first = first_non_empty(&[row_value(f, "Given name/s"), full_first]);
    let name_last = first_non_empty(&[row_value(f, "Surname"), full_last]);

    let electorate_title = first_non_empty(&[row_value(f, "Electorate"), row_value(f, "electorate")]);
    let electorate_title = codes::display_title(&codes::title_case(&electorate_title));

    let sitting = first_non_empty(&[
        row_value(f, "Setting member"),
        row_value(f, "Sitting member"),
        row_value(f, "member"),
    ]);
    let sitting = if sitting.is_empty() { "" } else { "yes" };

    let party_title = codes::collapse_spaces(&first_non_empty(&[
        row_value(f, "Affiliation"),
        row_value(f, "Affiliation or group"),
    ]));
    let (party_long, party_short) = party_titles(party_map, &party_title)?;

    let election_code = assembly.election_code.clone();
    let electorate_code = codes::electorate_code(&assembly.code, &electorate_title);
    let candidate_code =
        codes::candidate_code(&assembly.code, &electorate_title, &name_first, &name_last)?;
    let candidate_title = codes::candidate_title(&name_first, &name_last);
    let party_code = codes::party_code(&election_code, &party_long)?;
    let ballot_code = codes::ballot_code(&assembly.code, &electorate_title);

    combination.add(Party {
        code: party_code.clone(),
        short_name: party_short.clone(),
        title: party_long.clone(),
        alt_titles: vec![],
        category: row.grouping,
        notes: vec![],
        election_code: election_code.clone(),
        candidate_codes: vec![candidate_code.clone()],
    })?;
    combination.add(Candidate {
        code: candidate_code.clone(),
        title: candidate_title,
        name_first,
        name_last,
        notes: Note::raw_info(&[
            ("group", &group),
            ("position", &position),
            ("gender", &gender),
            ("contact", &contact),
            ("sitting", sitting),
            ("party short", &party_short),
            ("party long", &party_long),
        ]),
        election_code: election_code.clone(),
        assembly_code: assembly.code.clone(),
        electorate_code: electorate_code.clone(),
        party_code: party_code.clone(),
        ballot_code: ballot_code.clone(),
        result_codes: vec![],
    })?;
    combination.add(Electorate {
        code: electorate_code.clone(),
        title: electorate_title,
        ballot_codes: vec![ballot_code.clone()],
        notes: vec![],
        election_code: election_code.clone(),
        assembly_code: assembly.code.clone(),
        candidate_codes: vec![candidate_code.clone()],
    })?;
    combination.add(Ballot {
        code: ballot_code,
        category: BallotCategory::Candidate,
        group_candidates_by_party: assembly.code.contains(ASSEMBLY_LC),
        order_method: OrderMethod::Fixed,
        notes: vec![],
        election_code,
        assembly_code: assembly.code.clone(),
        electorate_code,
        party_codes: vec![party_code],
        candidate_codes: vec![candidate_code],
        result_codes: vec![],
    })?;
    Ok(())
}

/// Resolves an affiliation through the long/short party name lookup. An
/// unknown or ambiguous name is fatal.
fn party_titles(
    parties: &HashMap<String, String>,
    party_title: &str,
) -> EtlResult<(String, String)> {
    let as_short = parties
        .iter()
        .find(|(_, short)| short.as_str() == party_title)
        .map(|(long, _)| long.clone());
    let as_long = parties.get(party_title).cloned();
    match (as_short, as_long) {
        (None, None) => UnknownPartySnafu { title: party_title }.fail(),
        (Some(long), Some(short)) => InvalidPartyMappingSnafu {
            long,
            short,
            title: party_title,
        }
        .fail(),
        (Some(long), None) => Ok((long, party_title.to_string())),
        (None, Some(short)) => Ok((party_title.to_string(), short)),
    }
}

fn parse_gender(value: &str) -> EtlResult<String> {
    match value.trim().to_lowercase().as_str() {
        "" => Ok(String::new()),
        "f" => Ok("female".to_string()),
        "m" => Ok("male".to_string()),
        other => whatever!("Unknown gender marker '{}'.", other),
    }
}

fn first_non_empty(values: &[String]) -> String {
    values
        .iter()
        .find(|v| !v.is_empty())
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed() -> (Combination, Election) {
        let election = Election {
            code: "sa-2018".to_string(),
            title: "2018 South Australian State Election".to_string(),
            location_country: "Australia".to_string(),
            location_administrative_area_name: "South Australia".to_string(),
            location_locality_name: String::new(),
            location_description: String::new(),
            date: "2018-03-17".to_string(),
            date_time_zone: "Australia/Adelaide".to_string(),
            assembly_codes: vec![],
            party_codes: vec![],
            notes: vec![],
        };
        let mut combination = Combination::new();
        combination.add(election.clone()).unwrap();
        for code in ["sa-2018-legislative-council", "sa-2018-house-of-assembly"] {
            combination
                .add(Assembly {
                    code: code.to_string(),
                    title: code.to_string(),
                    election_code: "sa-2018".to_string(),
                    electorate_codes: vec![],
                    ballot_codes: vec![],
                    notes: vec![],
                })
                .unwrap();
        }
        (combination, election)
    }

    fn parties() -> RawFile {
        let rows = vec![
            [("long", "Liberal Party of Australia"), ("short", "Liberal")],
            [("long", "Independent"), ("short", "IND")],
        ]
        .into_iter()
        .map(|entries| {
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<RawRow>()
        })
        .collect();
        RawFile::Rows(rows)
    }

    // Column offsets matter: the electorate, sitting marker, name, gender,
    // contact and affiliation columns start at 0, 12, 15, 35, 45 and 65.
    const HA_PDF: &str = concat!(
        "State election candidate details\n",
        "Electorate     Full name           Gender    Contact number      Affiliation\n",
        "Adelaide    *  SMITH, John         F         08 8123 4567        Liberal\n",
        "               DOE, Jane           F         08 8000 0000        Independent\n",
    );

    #[test]
    fn ha_pdf_rows_parse_fixed_width_columns() {
        let (mut combination, election) = seed();
        let mut original = RawData::new();
        original.insert(PARTIES_NAME.to_string(), parties());
        original.insert(HA_PDF_NAME.to_string(), RawFile::Text(HA_PDF.to_string()));

        populate(&original, &mut combination, &election).unwrap();

        let smith = combination
            .candidates
            .find_by_key("sa-2018-house-of-assembly-adelaide-smith-john")
            .unwrap();
        assert_eq!(smith.party_code, "sa-2018-liberal-party-of-australia");
        assert!(smith
            .notes
            .iter()
            .any(|n| n.display == "sitting" && n.content == "yes"));
        assert!(smith
            .notes
            .iter()
            .any(|n| n.display == "gender" && n.content == "female"));

        // The second line has no electorate column: it carries forward.
        let doe = combination
            .candidates
            .find_by_key("sa-2018-house-of-assembly-adelaide-doe-jane")
            .unwrap();
        assert_eq!(doe.party_code, "sa-2018-independent");
        assert!(!doe.notes.iter().any(|n| n.display == "sitting"));

        let ballot = combination
            .ballots
            .find_by_key("sa-2018-house-of-assembly-adelaide-ballot")
            .unwrap();
        assert_eq!(ballot.candidate_codes.len(), 2);
        assert!(!ballot.group_candidates_by_party);
    }

    #[test]
    fn lc_web_rows_use_the_grouping_heading() {
        let (mut combination, election) = seed();
        let mut original = RawData::new();
        original.insert(PARTIES_NAME.to_string(), parties());
        let mut row = RawRow::new();
        row.insert("Group heading".to_string(), "Grouped candidates".to_string());
        row.insert("Full name".to_string(), "BLOGGS, Fred".to_string());
        row.insert("Affiliation".to_string(), "Liberal".to_string());
        original.insert(LC_WEB_NAME.to_string(), RawFile::Rows(vec![row]));

        populate(&original, &mut combination, &election).unwrap();

        let party = combination
            .parties
            .find_by_key("sa-2018-liberal-party-of-australia")
            .unwrap();
        assert_eq!(party.category, Some(PartyCategory::Named));
        // No electorate on a council-wide ballot: it falls back to the
        // assembly and the ballot groups candidates by party.
        let ballot = combination
            .ballots
            .find_by_key("sa-2018-legislative-council-ballot")
            .unwrap();
        assert!(ballot.group_candidates_by_party);
    }

    #[test]
    fn unknown_party_is_fatal_and_named() {
        let map: HashMap<String, String> = HashMap::new();
        let err = party_titles(&map, "Mystery Party").unwrap_err();
        assert!(format!("{}", err).contains("Mystery Party"));
    }

    #[test]
    fn ambiguous_party_mapping_is_fatal() {
        let mut map = HashMap::new();
        map.insert("Independent".to_string(), "Independent".to_string());
        assert!(party_titles(&map, "Independent").is_err());
    }

    #[test]
    fn unknown_gender_marker_is_fatal() {
        assert!(parse_gender("x").is_err());
        assert_eq!(parse_gender(" ").unwrap(), "");
        assert_eq!(parse_gender("M").unwrap(), "male");
    }
}
