//! Ingestion pipeline turning raw commission exports into the combined model.
//!
//! Every failure here is fatal: this is a batch pipeline with no
//! partial-success mode, and a violation means the raw data (or an adapter)
//! needs fixing, not retrying.

use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use text_diff::print_diff;

use election_model::{Combination, Election, MergeError, NoteCategory};

use crate::etl::store::RawData;

pub mod aec;
pub mod io_abs_population;
pub mod io_aec_candidates;
pub mod io_ecsa;
pub mod io_media_feed;
pub mod io_tally_room;
pub mod store;

#[derive(Debug, Snafu)]
pub enum EtlError {
    #[snafu(display("Error reading file {}", path.display()))]
    ReadingFile {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Error writing file {}", path.display()))]
    WritingFile {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Error with json in {}", path.display()))]
    ParsingJson {
        source: serde_json::Error,
        path: PathBuf,
    },
    #[snafu(display("Error opening archive {}", path.display()))]
    OpeningArchive {
        source: zip::result::ZipError,
        path: PathBuf,
    },
    #[snafu(display("Error reading archive entry '{name}'"))]
    ReadingArchiveEntry {
        source: std::io::Error,
        name: String,
    },
    #[snafu(display("Entry '{name}' is not valid utf-8 text"))]
    DecodingText {
        source: std::string::FromUtf8Error,
        name: String,
    },
    #[snafu(display("Error parsing csv '{name}'"))]
    ParsingCsv { source: csv::Error, name: String },
    #[snafu(display("Error parsing xml '{name}'"))]
    ParsingXml {
        source: quick_xml::Error,
        name: String,
    },
    #[snafu(display("Expected a number in column '{column}', got '{value}'"))]
    ParsingNumber { column: String, value: String },

    #[snafu(display("{source}"), context(false))]
    Model { source: MergeError },

    #[snafu(display("Did not process source files {files:?}"))]
    UnprocessedFiles { files: Vec<String> },
    #[snafu(display("Unknown party '{title}'"))]
    UnknownParty { title: String },
    #[snafu(display("Invalid party mapping for '{long}', '{short}', '{title}'"))]
    InvalidPartyMapping {
        long: String,
        short: String,
        title: String,
    },
    #[snafu(display("Must have an assembly with '{marker}' in the code"))]
    MissingAssembly { marker: String },
    #[snafu(display("No commission election id note on '{code}'"))]
    MissingElectionId { code: String },
    #[snafu(display("Reading back {} did not reproduce the aggregate", path.display()))]
    RoundTrip { path: PathBuf },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type EtlResult<T> = Result<T, EtlError>;

/// Runs the whole pipeline: read every raw election directory, populate and
/// reconcile the model, write the output partitions.
pub fn run(raw_dir: &Path, ready_dir: &Path) -> EtlResult<()> {
    info!("Starting data processing.");

    let shared_path = raw_dir.join("shared").join("original.zip");
    let mut shared_data = if shared_path.exists() {
        store::read_archive(&shared_path)?
    } else {
        RawData::new()
    };
    remap_shared(&mut shared_data);

    let mut combined = Combination::new();

    // Sorted so a run is deterministic regardless of filesystem order.
    let mut dirs: Vec<PathBuf> = fs::read_dir(raw_dir)
        .context(ReadingFileSnafu { path: raw_dir })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_dir() && path.file_name() != Some(std::ffi::OsStr::new("shared"))
        })
        .collect();
    dirs.sort();

    for dir in dirs {
        let input_path = dir.join("input.json");
        if !input_path.exists() {
            continue;
        }
        debug!("Read input: {:?}", input_path);
        let input: Option<Combination> = store::read_json_file(&input_path)?;
        let mut combination = match input {
            Some(c) => c,
            None => continue,
        };

        let original_path = dir.join("original.zip");
        let mut original_data = shared_data.clone();
        if original_path.exists() {
            debug!("Read original: {:?}", original_path);
            original_data.extend(store::read_archive(&original_path)?);
        }

        let elections: Vec<Election> = combination.elections.iter().cloned().collect();
        for election in &elections {
            populate_election(&original_data, &mut combination, election)?;
        }

        if combination.any() {
            combined.merge_in(combination)?;
        }
    }

    info!("Writing ready files.");
    fs::create_dir_all(ready_dir).context(WritingFileSnafu { path: ready_dir })?;

    let all_path = ready_dir.join("all.json");
    write_combination(&all_path, &combined)?;
    check_round_trip(&all_path, &combined)?;

    let election_codes: Vec<String> = combined.elections.iter().map(|e| e.code.clone()).collect();
    for code in election_codes {
        let slice = combined.for_election(&code);
        if slice.any() {
            write_combination(&ready_dir.join(format!("{}.json", code)), &slice)?;
        }
    }

    for (kind, slice) in combined.split_by_kind() {
        write_combination(&ready_dir.join(format!("{}.json", kind)), &slice)?;
    }

    info!("Finished data processing.");
    Ok(())
}

/// Runs the parser named by the election's raw-parser seed note.
pub fn populate_election(
    original: &RawData,
    combination: &mut Combination,
    election: &Election,
) -> EtlResult<()> {
    let parser = election
        .notes
        .iter()
        .find(|n| n.category == NoteCategory::RawParser)
        .map(|n| n.content.clone());
    let parser = match parser {
        Some(p) if !p.is_empty() => p,
        _ => return Ok(()),
    };

    info!("Parsing {} using {}.", election.code, parser);
    match parser.as_str() {
        "au-aec-v1" => {
            io_media_feed::populate(original, combination, election)?;
            io_tally_room::populate(original, combination, election)?;
            io_abs_population::populate(original, combination, election)?;
            io_aec_candidates::populate(original, combination, election)?;
        }
        "au-ecsa-v1" => {
            io_ecsa::populate(original, combination, election)?;
        }
        other => {
            warn!("No parser named '{}', skipping {}.", other, election.code);
        }
    }
    Ok(())
}

/// Drops the superseded population sources and remaps the current ones to
/// their stable keys, so the adapters need not know the release years.
fn remap_shared(shared: &mut RawData) {
    shared.remove(io_abs_population::FED_ELECTORATES_2018_NAME);
    if let Some(file) = shared.remove(io_abs_population::FED_ELECTORATES_2021_NAME) {
        shared.insert(io_abs_population::FED_ELECTORATES_NAME.to_string(), file);
    }
    if let Some(file) = shared.remove(io_abs_population::STATE_ELECTORATES_2020_NAME) {
        shared.insert(io_abs_population::STATE_ELECTORATES_NAME.to_string(), file);
    }
}

fn write_combination(path: &Path, combination: &Combination) -> EtlResult<()> {
    let text = serde_json::to_string_pretty(combination).context(ParsingJsonSnafu { path })?;
    fs::write(path, text).context(WritingFileSnafu { path })?;
    Ok(())
}

/// Reads a just-written file back and checks it reproduces the aggregate.
fn check_round_trip(path: &Path, expected: &Combination) -> EtlResult<()> {
    let text = fs::read_to_string(path).context(ReadingFileSnafu { path })?;
    let actual: Combination = serde_json::from_str(&text).context(ParsingJsonSnafu { path })?;
    if actual != *expected {
        let expected_text =
            serde_json::to_string_pretty(expected).context(ParsingJsonSnafu { path })?;
        print_diff(expected_text.as_str(), text.as_str(), "\n");
        return RoundTripSnafu { path }.fail();
    }
    Ok(())
}
