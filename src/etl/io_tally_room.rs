//! Adapter for the AEC tally room csv set.
//!
//! One download file per feed, named `<Feed>Download-<election id>.csv`.
//! Every csv carrying the election id must be claimed by a handler; a
//! leftover file means a new feed appeared and must not be silently
//! ignored.

use std::collections::HashMap;
use std::collections::HashSet;

use snafu::prelude::*;

use election_model::{
    codes, pick_longest, Assembly, Ballot, BallotCategory, Candidate, Combination, Election,
    Electorate, Note, OrderMethod, Party, PartyCategory, Tally, TallyCategory,
};

use crate::etl::aec;
use crate::etl::store::{row_flag, row_number, row_value, RawData, RawFile, RawRow};
use crate::etl::{EtlResult, UnprocessedFilesSnafu};

const SENATE_STATES: [&str; 8] = ["ACT", "NSW", "NT", "QLD", "SA", "TAS", "VIC", "WA"];

type Handler<'a> = Box<dyn Fn(&[RawRow], &mut Combination) -> EtlResult<()> + 'a>;

fn handler<'a>(
    f: impl Fn(&[RawRow], &mut Combination) -> EtlResult<()> + 'a,
) -> Handler<'a> {
    Box::new(f)
}

pub fn populate(
    original: &RawData,
    combination: &mut Combination,
    election: &Election,
) -> EtlResult<()> {
    let ctx = TallyRoom {
        senate: aec::assembly_senate(combination)?,
        house_reps: aec::assembly_house_reps(combination)?,
        election: election.clone(),
    };
    let id = aec::election_id(election)?;

    let mut handlers: Vec<(String, Handler<'_>)> = vec![
        (
            format!("GeneralEnrolmentByDivisionDownload-{}.csv", id),
            handler(|rows, c| ctx.rows_enrolment(&ctx.house_reps, rows, c)),
        ),
        (
            format!("GeneralEnrolmentByStateDownload-{}.csv", id),
            handler(|rows, c| ctx.rows_enrolment(&ctx.senate, rows, c)),
        ),
        (
            format!("GeneralPartyDetailsDownload-{}.csv", id),
            handler(|rows, c| ctx.rows_party_details(rows, c)),
        ),
        (
            format!("HouseCandidatesDownload-{}.csv", id),
            handler(|rows, c| ctx.rows_candidates(&ctx.house_reps, rows, c)),
        ),
        (
            format!("HouseDopByDivisionDownload-{}.csv", id),
            handler(|rows, c| ctx.rows_house_preferences(rows, c)),
        ),
        (
            format!("HouseInformalByDivisionDownload-{}.csv", id),
            handler(|rows, c| ctx.rows_informal(&ctx.house_reps, rows, c)),
        ),
        (
            format!("HouseInformalByStateDownload-{}.csv", id),
            handler(|rows, c| ctx.rows_informal(&ctx.house_reps, rows, c)),
        ),
        (
            format!("HouseTurnoutByDivisionDownload-{}.csv", id),
            handler(|rows, c| ctx.rows_turnout(&ctx.house_reps, rows, c)),
        ),
        (
            format!("HouseTurnoutByStateDownload-{}.csv", id),
            handler(|rows, c| ctx.rows_turnout(&ctx.house_reps, rows, c)),
        ),
        (
            format!("HouseVotesCountedByDivisionDownload-{}.csv", id),
            handler(|rows, c| ctx.rows_votes(&ctx.house_reps, rows, c)),
        ),
        (
            format!("HouseVotesCountedByStateDownload-{}.csv", id),
            handler(|rows, c| ctx.rows_votes(&ctx.house_reps, rows, c)),
        ),
        (
            format!("SenateCandidatesDownload-{}.csv", id),
            handler(|rows, c| ctx.rows_candidates(&ctx.senate, rows, c)),
        ),
        (
            format!("SenateInformalByDivisionDownload-{}.csv", id),
            handler(|rows, c| ctx.rows_informal(&ctx.senate, rows, c)),
        ),
        (
            format!("SenateInformalByStateDownload-{}.csv", id),
            handler(|rows, c| ctx.rows_informal(&ctx.senate, rows, c)),
        ),
        (
            format!("SenateTurnoutByDivisionDownload-{}.csv", id),
            handler(|rows, c| ctx.rows_turnout(&ctx.senate, rows, c)),
        ),
        (
            format!("SenateVotesCountedByDivisionDownload-{}.csv", id),
            handler(|rows, c| ctx.rows_votes(&ctx.senate, rows, c)),
        ),
        (
            format!("SenateVotesCountedByStateDownload-{}.csv", id),
            handler(|rows, c| ctx.rows_votes(&ctx.senate, rows, c)),
        ),
    ];
    for state in SENATE_STATES {
        handlers.push((
            format!("SenateStateDOPDownload-{}-{}.csv", id, state),
            handler(|rows, c| ctx.rows_senate_preferences(rows, c)),
        ));
    }

    let mut processed: HashSet<String> = HashSet::new();
    for (filename, run) in &handlers {
        if let Some(RawFile::Rows(rows)) = original.get(filename) {
            run(rows, combination)?;
            processed.insert(filename.clone());
        }
    }

    let marker = format!("-{}", id);
    let mut missed: Vec<String> = original
        .keys()
        .filter(|k| k.contains(&marker) && k.ends_with(".csv") && !processed.contains(*k))
        .cloned()
        .collect();
    missed.sort();
    ensure!(missed.is_empty(), UnprocessedFilesSnafu { files: missed });
    Ok(())
}

struct TallyRoom {
    senate: Assembly,
    house_reps: Assembly,
    election: Election,
}

impl TallyRoom {
    // --------------------
    // Extracting pieces of info about records from a row.
    // --------------------

    fn electorate_title(&self, item: &RawRow) -> EtlResult<String> {
        let state_ab = first_of(item, &["StateAb", "State"]);
        let div_name = row_value(item, "DivisionNm");
        let title = if div_name.is_empty() { state_ab } else { div_name };
        let title = codes::display_title(&title);
        if title.is_empty() {
            whatever!("Electorate must have a title.");
        }
        Ok(title)
    }

    fn electorate_code(&self, assembly: &Assembly, item: &RawRow) -> EtlResult<String> {
        Ok(codes::electorate_code(
            &assembly.code,
            &self.electorate_title(item)?,
        ))
    }

    fn result_code(&self, assembly: &Assembly, item: &RawRow, suffix: &str) -> EtlResult<String> {
        Ok(codes::result_electorate_code(
            &assembly.code,
            &self.electorate_title(item)?,
            suffix,
        ))
    }

    fn ballot_code(&self, assembly: &Assembly, item: &RawRow) -> EtlResult<String> {
        Ok(codes::ballot_code(
            &assembly.code,
            &self.electorate_title(item)?,
        ))
    }

    fn party_short(&self, item: &RawRow) -> String {
        let party_ab = row_value(item, "PartyAb");
        if party_ab.is_empty() {
            aec::INDEPENDENT_SHORT.to_string()
        } else {
            party_ab
        }
    }

    fn party_title(&self, item: &RawRow) -> String {
        let party_name = row_value(item, "PartyNm");
        let registered = row_value(item, "RegisteredPartyAb");
        let title = pick_longest(&party_name, &registered);
        if title.is_empty() {
            aec::INDEPENDENT_TITLE.to_string()
        } else {
            title
        }
    }

    fn party_alt_title(&self, item: &RawRow) -> String {
        let party_name = row_value(item, "PartyNm");
        let registered = row_value(item, "RegisteredPartyAb");
        if self.party_title(item) == party_name {
            registered
        } else {
            party_name
        }
    }

    fn party_category(&self, item: &RawRow) -> Option<PartyCategory> {
        let has_reg = item.contains_key("RegisteredPartyAb");
        let reg = row_value(item, "RegisteredPartyAb");
        let has_ab = item.contains_key("PartyAb");
        let ab = row_value(item, "PartyAb");
        let has_name = item.contains_key("PartyNm");
        let name = row_value(item, "PartyNm");

        if has_reg && !reg.is_empty() {
            Some(PartyCategory::Named)
        } else if has_reg && ((has_ab && !ab.is_empty()) || (has_name && !name.is_empty())) {
            Some(PartyCategory::NotNamed)
        } else if (has_ab && ab.is_empty()) || (has_name && name.is_empty()) {
            Some(PartyCategory::NotGrouped)
        } else {
            None
        }
    }

    fn party_code(&self, item: &RawRow) -> EtlResult<String> {
        Ok(codes::party_code(
            &self.election.code,
            &self.party_title(item),
        )?)
    }

    fn candidate_code(&self, assembly: &Assembly, item: &RawRow) -> EtlResult<String> {
        Ok(codes::candidate_code(
            &assembly.code,
            &self.electorate_title(item)?,
            &row_value(item, "GivenNm"),
            &row_value(item, "Surname"),
        )?)
    }

    // --------------------
    // Creating records from a row.
    // --------------------

    fn create_notes(&self, item: &RawRow) -> Vec<Note> {
        Note::raw_info(&[
            ("state full name", &row_value(item, "StateNm")),
            ("state short name", &first_of(item, &["StateAb", "State"])),
            ("division id", &row_value(item, "DivisionID")),
            ("division name", &row_value(item, "DivisionNm")),
        ])
    }

    fn create_electorate(&self, assembly: &Assembly, item: &RawRow) -> EtlResult<Electorate> {
        Ok(Electorate {
            code: self.electorate_code(assembly, item)?,
            title: self.electorate_title(item)?,
            ballot_codes: vec![],
            notes: self.create_notes(item),
            election_code: assembly.election_code.clone(),
            assembly_code: assembly.code.clone(),
            candidate_codes: vec![],
        })
    }

    fn create_party(&self, item: &RawRow) -> EtlResult<Party> {
        let alt_title = self.party_alt_title(item);
        Ok(Party {
            code: self.party_code(item)?,
            short_name: self.party_short(item),
            title: self.party_title(item),
            alt_titles: if alt_title.is_empty() {
                vec![]
            } else {
                vec![alt_title]
            },
            category: self.party_category(item),
            notes: self.create_notes(item),
            election_code: self.election.code.clone(),
            candidate_codes: vec![],
        })
    }

    fn create_candidate(&self, assembly: &Assembly, item: &RawRow) -> EtlResult<Candidate> {
        let name_first = row_value(item, "GivenNm");
        let name_last = row_value(item, "Surname");
        Ok(Candidate {
            code: self.candidate_code(assembly, item)?,
            title: codes::candidate_title(&name_first, &name_last),
            name_first,
            name_last,
            notes: self.create_notes(item),
            election_code: assembly.election_code.clone(),
            assembly_code: assembly.code.clone(),
            electorate_code: self.electorate_code(assembly, item)?,
            party_code: self.party_code(item)?,
            ballot_code: self.ballot_code(assembly, item)?,
            result_codes: vec![],
        })
    }

    fn create_ballot(&self, assembly: &Assembly, item: &RawRow) -> EtlResult<Ballot> {
        Ok(Ballot {
            code: self.ballot_code(assembly, item)?,
            category: BallotCategory::Candidate,
            // Senate papers group candidates below their party ticket.
            group_candidates_by_party: assembly.code == self.senate.code,
            order_method: OrderMethod::Fixed,
            notes: vec![],
            election_code: assembly.election_code.clone(),
            assembly_code: assembly.code.clone(),
            electorate_code: self.electorate_code(assembly, item)?,
            party_codes: vec![self.party_code(item)?],
            candidate_codes: vec![self.candidate_code(assembly, item)?],
            result_codes: vec![],
        })
    }

    fn people_tally(
        &self,
        assembly: &Assembly,
        item: &RawRow,
        code_title: (&str, &str),
        value: u64,
        ancestors: &[&str],
        children: &[&str],
    ) -> EtlResult<Tally> {
        let title = self.electorate_title(item)?;
        let ancestor_codes = ancestors
            .iter()
            .map(|suffix| self.result_code(assembly, item, suffix))
            .collect::<EtlResult<Vec<_>>>()?;
        let child_codes = children
            .iter()
            .map(|suffix| self.result_code(assembly, item, suffix))
            .collect::<EtlResult<Vec<_>>>()?;
        Ok(Tally {
            code: self.result_code(assembly, item, code_title.0)?,
            title: format!("{} {}", title, code_title.1),
            value,
            category: TallyCategory::PeopleCount,
            ancestor_codes,
            child_codes,
            notes: self.create_notes(item),
            election_code: assembly.election_code.clone(),
            assembly_code: assembly.code.clone(),
            electorate_code: self.electorate_code(assembly, item)?,
            ballot_code: self.ballot_code(assembly, item)?,
        })
    }

    // --------------------
    // One handler per feed.
    // --------------------

    fn rows_enrolment(
        &self,
        assembly: &Assembly,
        rows: &[RawRow],
        c: &mut Combination,
    ) -> EtlResult<()> {
        for item in rows {
            c.add(self.create_electorate(assembly, item)?)?;
            let value = row_number(item, "Enrolment")?;
            c.add(self.people_tally(
                assembly,
                item,
                Tally::ENROLMENT,
                value,
                &[Tally::POPULATION.0],
                &[
                    Tally::NOT_ENROLLED.0,
                    Tally::PARTICIPATED.0,
                    Tally::NOT_PARTICIPATED.0,
                ],
            )?)?;
        }
        Ok(())
    }

    fn rows_party_details(&self, rows: &[RawRow], c: &mut Combination) -> EtlResult<()> {
        for item in rows {
            c.add(self.create_electorate(&self.senate, item)?)?;
            c.add(self.create_party(item)?)?;
        }
        Ok(())
    }

    fn rows_candidates(
        &self,
        assembly: &Assembly,
        rows: &[RawRow],
        c: &mut Combination,
    ) -> EtlResult<()> {
        for item in rows {
            c.add(self.create_electorate(assembly, item)?)?;
            c.add(self.create_party(item)?)?;
            c.add(self.create_candidate(assembly, item)?)?;
            c.add(self.create_ballot(assembly, item)?)?;
        }
        Ok(())
    }

    fn rows_turnout(
        &self,
        assembly: &Assembly,
        rows: &[RawRow],
        c: &mut Combination,
    ) -> EtlResult<()> {
        for item in rows {
            c.add(self.create_electorate(assembly, item)?)?;
            let value = row_number(item, "Turnout")?;
            c.add(self.people_tally(
                assembly,
                item,
                Tally::PARTICIPATED,
                value,
                &[Tally::ENROLMENT.0],
                &[Tally::VOTED.0, Tally::NOT_VOTED.0],
            )?)?;
        }
        Ok(())
    }

    fn rows_informal(
        &self,
        assembly: &Assembly,
        rows: &[RawRow],
        c: &mut Combination,
    ) -> EtlResult<()> {
        for item in rows {
            c.add(self.create_electorate(assembly, item)?)?;
            let formal = row_number(item, "FormalVotes")?;
            let informal = row_number(item, "InformalVotes")?;
            c.add(self.people_tally(
                assembly,
                item,
                Tally::FORMAL,
                formal,
                &[Tally::VOTED.0],
                &[],
            )?)?;
            c.add(self.people_tally(
                assembly,
                item,
                Tally::NOT_FORMAL,
                informal,
                &[Tally::VOTED.0],
                &[],
            )?)?;
        }
        Ok(())
    }

    fn rows_votes(
        &self,
        assembly: &Assembly,
        rows: &[RawRow],
        c: &mut Combination,
    ) -> EtlResult<()> {
        for item in rows {
            c.add(self.create_electorate(assembly, item)?)?;
            let value = row_number(item, "TotalVotes")?;
            let mut tally = self.people_tally(
                assembly,
                item,
                Tally::VOTED,
                value,
                &[Tally::PARTICIPATED.0],
                &[Tally::FORMAL.0, Tally::NOT_FORMAL.0],
            )?;
            tally.notes.extend(Note::raw_info(&[
                ("ordinary votes", &row_value(item, "OrdinaryVotes")),
                ("absent votes", &row_value(item, "AbsentVotes")),
                ("provisional votes", &row_value(item, "ProvisionalVotes")),
                ("pre poll votes", &row_value(item, "PrePollVotes")),
                ("postal votes", &row_value(item, "PostalVotes")),
            ]));
            c.add(tally)?;
        }
        Ok(())
    }

    /// House distribution of preferences: first-preference counts and the
    /// winner's final tally, per candidate.
    fn rows_house_preferences(&self, rows: &[RawRow], c: &mut Combination) -> EtlResult<()> {
        let assembly = &self.house_reps;

        struct Progress {
            item: RawRow,
            first: u64,
            last_count: u64,
            last_value: u64,
            elected: bool,
        }
        let mut progress: HashMap<String, Progress> = HashMap::new();
        for item in rows {
            if row_value(item, "CalculationType") != "Preference Count" {
                continue;
            }
            let count = row_number(item, "CountNumber")?;
            let value = row_number(item, "CalculationValue")?;
            let code = self.candidate_code(assembly, item)?;
            let entry = progress.entry(code).or_insert_with(|| Progress {
                item: item.clone(),
                first: 0,
                last_count: 0,
                last_value: 0,
                elected: false,
            });
            if count == 0 {
                entry.first = value;
            }
            if count >= entry.last_count {
                entry.last_count = count;
                entry.last_value = value;
            }
            if row_flag(item, "Elected") {
                entry.elected = true;
            }
        }

        let mut entries: Vec<(&String, &Progress)> = progress.iter().collect();
        entries.sort_by_key(|(code, _)| (*code).clone());

        for (code, p) in entries {
            c.add(self.create_electorate(assembly, &p.item)?)?;
            c.add(self.create_party(&p.item)?)?;
            let mut candidate = self.create_candidate(assembly, &p.item)?;

            let first_code = codes::result_candidate_code(code, "first-preferences");
            candidate.result_codes.push(first_code.clone());
            let mut tallies = vec![Tally {
                code: first_code.clone(),
                title: format!("{} First preferences", candidate.title),
                value: p.first,
                category: TallyCategory::PeopleCount,
                ancestor_codes: vec![self.result_code(assembly, &p.item, Tally::FORMAL.0)?],
                child_codes: vec![],
                notes: self.create_notes(&p.item),
                election_code: assembly.election_code.clone(),
                assembly_code: assembly.code.clone(),
                electorate_code: self.electorate_code(assembly, &p.item)?,
                ballot_code: self.ballot_code(assembly, &p.item)?,
            }];

            if p.elected {
                let elected_code = codes::result_candidate_code(code, "elected");
                candidate.result_codes.push(elected_code.clone());
                tallies.push(Tally {
                    code: elected_code,
                    title: format!("{} Elected", candidate.title),
                    value: p.last_value,
                    category: TallyCategory::CandidateElected,
                    ancestor_codes: vec![first_code],
                    child_codes: vec![],
                    notes: self.create_notes(&p.item),
                    election_code: assembly.election_code.clone(),
                    assembly_code: assembly.code.clone(),
                    electorate_code: self.electorate_code(assembly, &p.item)?,
                    ballot_code: self.ballot_code(assembly, &p.item)?,
                });
            }

            c.add(candidate)?;
            for tally in tallies {
                c.add(tally)?;
            }
        }
        Ok(())
    }

    /// Senate distribution of preferences: first-count papers and elected
    /// progressive totals. The feed carries no party columns, so result
    /// codes are attached to candidates already known from the candidates
    /// feed instead of constructing new ones.
    fn rows_senate_preferences(&self, rows: &[RawRow], c: &mut Combination) -> EtlResult<()> {
        let assembly = &self.senate;

        struct Progress {
            item: RawRow,
            first: u64,
            elected: Option<(u64, String)>,
        }
        let mut progress: HashMap<String, Progress> = HashMap::new();
        for item in rows {
            let count = row_number(item, "Count")?;
            let code = self.candidate_code(assembly, item)?;
            let entry = progress.entry(code).or_insert_with(|| Progress {
                item: item.clone(),
                first: 0,
                elected: None,
            });
            if count == 1 {
                entry.first = row_number(item, "Papers")?;
            }
            if row_value(item, "Status") == "Elected" && entry.elected.is_none() {
                entry.elected = Some((
                    row_number(item, "ProgressiveVoteTotal")?,
                    row_value(item, "Order Elected"),
                ));
            }
        }

        let mut entries: Vec<(&String, &Progress)> = progress.iter().collect();
        entries.sort_by_key(|(code, _)| (*code).clone());

        for (code, p) in entries {
            c.add(self.create_electorate(assembly, &p.item)?)?;
            let candidate_title = codes::candidate_title(
                &row_value(&p.item, "GivenNm"),
                &row_value(&p.item, "Surname"),
            );

            let first_code = codes::result_candidate_code(code, "first-preferences");
            let mut result_codes = vec![first_code.clone()];
            c.add(Tally {
                code: first_code.clone(),
                title: format!("{} First preferences", candidate_title),
                value: p.first,
                category: TallyCategory::PeopleCount,
                ancestor_codes: vec![self.result_code(assembly, &p.item, Tally::FORMAL.0)?],
                child_codes: vec![],
                notes: self.create_notes(&p.item),
                election_code: assembly.election_code.clone(),
                assembly_code: assembly.code.clone(),
                electorate_code: self.electorate_code(assembly, &p.item)?,
                ballot_code: self.ballot_code(assembly, &p.item)?,
            })?;

            if let Some((value, order)) = &p.elected {
                let elected_code = codes::result_candidate_code(code, "elected");
                result_codes.push(elected_code.clone());
                let mut notes = self.create_notes(&p.item);
                notes.extend(Note::raw_info(&[("order elected", order)]));
                c.add(Tally {
                    code: elected_code,
                    title: format!("{} Elected", candidate_title),
                    value: *value,
                    category: TallyCategory::CandidateElected,
                    ancestor_codes: vec![first_code],
                    child_codes: vec![],
                    notes,
                    election_code: assembly.election_code.clone(),
                    assembly_code: assembly.code.clone(),
                    electorate_code: self.electorate_code(assembly, &p.item)?,
                    ballot_code: self.ballot_code(assembly, &p.item)?,
                })?;
            }

            let known = c.candidates.find_by_key(code).cloned();
            if let Some(mut updated) = known {
                updated.result_codes = result_codes;
                c.add(updated)?;
            }
        }
        Ok(())
    }
}

fn first_of(item: &RawRow, columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| row_value(item, c))
        .find(|v| !v.is_empty())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use election_model::NoteCategory;

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
            notes: vec![Note::new(aec::ELECTION_ID_KEY, "24310", NoteCategory::RawInfo)],
        };
        let mut combination = Combination::new();
        combination.add(election.clone()).unwrap();
        for (code, title) in [
            ("au-2019-senate", "Senate"),
            ("au-2019-house-of-reps", "House of Representatives"),
        ] {
            combination
                .add(Assembly {
                    code: code.to_string(),
                    title: title.to_string(),
                    election_code: "au-2019".to_string(),
                    electorate_codes: vec![],
                    ballot_codes: vec![],
                    notes: vec![],
                })
                .unwrap();
        }
        (combination, election)
    }

    fn row(entries: &[(&str, &str)]) -> RawRow {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn enrolment_feed_creates_electorate_and_tally() {
        let (mut combination, election) = seed();
        let mut original = RawData::new();
        original.insert(
            "GeneralEnrolmentByDivisionDownload-24310.csv".to_string(),
            RawFile::Rows(vec![row(&[
                ("DivisionID", "179"),
                ("DivisionNm", "Adelaide"),
                ("StateAb", "SA"),
                ("Enrolment", "121606"),
            ])]),
        );

        populate(&original, &mut combination, &election).unwrap();

        let tally = combination
            .results
            .find_by_key("au-2019-house-of-reps-adelaide-enrolment")
            .unwrap();
        assert_eq!(tally.value, 121_606);
        assert_eq!(
            tally.ancestor_codes,
            vec!["au-2019-house-of-reps-adelaide-population"]
        );
        assert!(combination
            .electorates
            .find_by_key("au-2019-house-of-reps-adelaide")
            .is_some());
    }

    #[test]
    fn house_candidates_feed_builds_all_records() {
        let (mut combination, election) = seed();
        let mut original = RawData::new();
        original.insert(
            "HouseCandidatesDownload-24310.csv".to_string(),
            RawFile::Rows(vec![row(&[
                ("StateAb", "NSW"),
                ("DivisionID", "151"),
                ("DivisionNm", "Warringah"),
                ("PartyAb", "LP"),
                ("PartyNm", "Liberal"),
                ("Surname", "ABBOTT"),
                ("GivenNm", "Tony"),
                ("Elected", "N"),
            ])]),
        );

        populate(&original, &mut combination, &election).unwrap();

        let candidate = combination
            .candidates
            .find_by_key("au-2019-house-of-reps-warringah-abbott-tony")
            .unwrap();
        assert_eq!(candidate.party_code, "au-2019-liberal");
        let ballot = combination
            .ballots
            .find_by_key("au-2019-house-of-reps-warringah-ballot")
            .unwrap();
        assert!(!ballot.group_candidates_by_party);
        assert_eq!(
            ballot.candidate_codes,
            vec!["au-2019-house-of-reps-warringah-abbott-tony"]
        );
    }

    #[test]
    fn party_details_resolves_category() {
        let (mut combination, election) = seed();
        let mut original = RawData::new();
        original.insert(
            "GeneralPartyDetailsDownload-24310.csv".to_string(),
            RawFile::Rows(vec![row(&[
                ("StateAb", "NSW"),
                ("PartyAb", "AJP"),
                ("RegisteredPartyAb", "AJP"),
                ("PartyNm", "Animal Justice Party"),
            ])]),
        );

        populate(&original, &mut combination, &election).unwrap();

        let party = combination
            .parties
            .find_by_key("au-2019-animal-justice-party")
            .unwrap();
        assert_eq!(party.category, Some(PartyCategory::Named));
        assert_eq!(party.short_name, "AJP");
        assert_eq!(party.alt_titles, vec!["AJP"]);
    }

    #[test]
    fn house_preferences_attach_results_to_candidates() {
        let (mut combination, election) = seed();
        let base = [
            ("StateAb", "ACT"),
            ("DivisionID", "318"),
            ("DivisionNm", "Bean"),
            ("PartyAb", "ALP"),
            ("PartyNm", "Australian Labor Party"),
            ("Surname", "SMITH"),
            ("GivenNm", "David"),
        ];
        let mut first = row(&base);
        first.extend(row(&[
            ("CountNumber", "0"),
            ("CalculationType", "Preference Count"),
            ("CalculationValue", "48342"),
            ("Elected", "Y"),
        ]));
        let mut ignored_percent = row(&base);
        ignored_percent.extend(row(&[
            ("CountNumber", "0"),
            ("CalculationType", "Preference Percent"),
            ("CalculationValue", "44.5"),
            ("Elected", "Y"),
        ]));
        let mut final_count = row(&base);
        final_count.extend(row(&[
            ("CountNumber", "2"),
            ("CalculationType", "Preference Count"),
            ("CalculationValue", "60000"),
            ("Elected", "Y"),
        ]));

        let mut original = RawData::new();
        original.insert(
            "HouseDopByDivisionDownload-24310.csv".to_string(),
            RawFile::Rows(vec![first, ignored_percent, final_count]),
        );

        populate(&original, &mut combination, &election).unwrap();

        let candidate = combination
            .candidates
            .find_by_key("au-2019-house-of-reps-bean-smith-david")
            .unwrap();
        assert_eq!(candidate.result_codes.len(), 2);
        let first_pref = combination
            .results
            .find_by_key("au-2019-house-of-reps-bean-smith-david-first-preferences")
            .unwrap();
        assert_eq!(first_pref.value, 48_342);
        let elected = combination
            .results
            .find_by_key("au-2019-house-of-reps-bean-smith-david-elected")
            .unwrap();
        assert_eq!(elected.value, 60_000);
        assert_eq!(elected.category, TallyCategory::CandidateElected);
    }

    #[test]
    fn leftover_election_file_is_fatal() {
        let (mut combination, election) = seed();
        let mut original = RawData::new();
        original.insert(
            "BrandNewFeedDownload-24310.csv".to_string(),
            RawFile::Rows(vec![]),
        );

        let err = populate(&original, &mut combination, &election).unwrap_err();
        let message = format!("{}", err);
        assert!(message.contains("BrandNewFeedDownload-24310.csv"));
    }

    #[test]
    fn unrelated_files_are_ignored() {
        let (mut combination, election) = seed();
        let mut original = RawData::new();
        original.insert("parties.csv".to_string(), RawFile::Rows(vec![]));

        populate(&original, &mut combination, &election).unwrap();
    }
}
