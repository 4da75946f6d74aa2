//! Adapter for the AEC media feed (standard verbose) xml.
//!
//! The feed header identifies the publishing authority and the event; both
//! become provenance notes on the election, and the event name enriches the
//! election title through the normal merge path.

use snafu::whatever;

use election_model::{Combination, Election, Note, NoteCategory};

use crate::etl::aec;
use crate::etl::store::{RawData, RawFile};
use crate::etl::EtlResult;

pub fn populate(
    original: &RawData,
    combination: &mut Combination,
    election: &Election,
) -> EtlResult<()> {
    let aec_id = aec::election_id(election)?;
    let filename = format!("aec-mediafeed-results-standard-verbose-{}.xml", aec_id);
    let feed = match original.get(&filename) {
        Some(RawFile::Xml(feed)) => feed,
        _ => return Ok(()),
    };
    if feed.local_name() != "MediaFeed" {
        whatever!("Expected a MediaFeed document in '{}'.", filename);
    }

    let mut notes = Note::raw_info(&[
        ("media feed id", &feed.attribute("Id")),
        ("media feed created", &feed.attribute("Created")),
        ("media feed schema version", &feed.attribute("SchemaVersion")),
        ("message language", &feed.child_text("MessageLanguage")),
    ]);

    if let Some(authority) = feed.child("ManagingAuthority") {
        for identifier in authority.children_named("AuthorityIdentifier") {
            notes.extend(Note::raw_info(&[
                ("managing authority", &identifier.text),
                ("managing authority id", &identifier.attribute("Id")),
            ]));
        }
    }

    if let Some(generator) = feed.child("MessageGenerator") {
        for child in &generator.children {
            if !child.text.is_empty() {
                notes.push(Note::new(
                    &format!("generator {}", child.local_name().to_lowercase()),
                    &child.text,
                    NoteCategory::RawInfo,
                ));
            }
        }
    }

    if let Some(cycle) = feed.child("Cycle") {
        notes.extend(Note::raw_info(&[
            ("cycle id", &cycle.text),
            ("cycle created", &cycle.attribute("Created")),
        ]));
    }

    let mut event_name = String::new();
    if let Some(results) = feed.child("Results") {
        notes.extend(Note::raw_info(&[
            ("results updated", &results.attribute("Updated")),
            ("results phase", &results.attribute("Phase")),
            ("results verbosity", &results.attribute("Verbosity")),
        ]));
        if let Some(event) = results.child("EventIdentifier") {
            notes.extend(Note::raw_info(&[("event id", &event.attribute("Id"))]));
            event_name = event.child_text("EventName");
        }
    }

    // Re-add a copy of the seed election so the feed's richer title and the
    // notes go through the usual merge.
    let mut enriched = election.clone();
    enriched.notes = notes;
    if !event_name.is_empty() {
        enriched.title = event_name;
    }
    combination.add(enriched)?;
    Ok(())
}
