//! Provenance and auxiliary facts attached to entities.

use serde::{Deserialize, Serialize};

use crate::codes::slugify;
use crate::merge::{require_same, Collection, MergeResult, Reconcile};

/// What a note carries, and therefore what may be done with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoteCategory {
    /// A raw fact from a source, e.g. a commission's internal identifier.
    RawInfo,
    /// A source url.
    RawUrl,
    /// The name of the parser that ingests this election's raw data.
    RawParser,
}

impl NoteCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteCategory::RawInfo => "raw-info",
            NoteCategory::RawUrl => "raw-url",
            NoteCategory::RawParser => "raw-parser",
        }
    }
}

/// A (display, content, category) fact attached to an entity.
///
/// Identity is the whole triple: exact duplicates collapse, while two notes
/// sharing a display but differing in content stay separate records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub display: String,
    pub content: String,
    pub category: NoteCategory,
}

impl Note {
    pub fn new(display: &str, content: &str, category: NoteCategory) -> Note {
        Note {
            display: display.to_string(),
            content: content.to_string(),
            category,
        }
    }

    /// Builds raw-info notes from (display, content) pairs, dropping pairs
    /// with blank content.
    pub fn raw_info(entries: &[(&str, &str)]) -> Vec<Note> {
        entries
            .iter()
            .filter(|(_, content)| !content.trim().is_empty())
            .map(|(display, content)| Note::new(display, content, NoteCategory::RawInfo))
            .collect()
    }
}

impl Reconcile for Note {
    fn key(&self) -> String {
        [
            slugify(self.category.as_str()),
            slugify(&self.display),
            slugify(&self.content),
        ]
        .join("-")
    }

    fn merge_in(&mut self, other: Note) -> MergeResult<()> {
        require_same("display", &self.display, &other.display)?;
        require_same("content", &self.content, &other.content)?;
        require_same("category", self.category.as_str(), other.category.as_str())?;
        Ok(())
    }
}

/// Unions two note lists by triple identity, sorted and deduplicated.
pub fn normalise_notes(left: Vec<Note>, right: Vec<Note>) -> MergeResult<Vec<Note>> {
    let mut all = Collection::from(left);
    all.merge_from(Collection::from(right))?;
    Ok(all.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_collapse_by_triple() {
        let a = Note::new("division id", "101", NoteCategory::RawInfo);
        let b = Note::new("division id", "101", NoteCategory::RawInfo);
        let merged = normalise_notes(vec![a.clone()], vec![b]).unwrap();
        assert_eq!(merged, vec![a]);
    }

    #[test]
    fn differing_content_stays_separate() {
        let a = Note::new("division id", "101", NoteCategory::RawInfo);
        let b = Note::new("division id", "102", NoteCategory::RawInfo);
        let merged = normalise_notes(vec![a], vec![b]).unwrap();
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn raw_info_skips_blank_content() {
        let notes = Note::raw_info(&[("occupation", "Plumber"), ("fax", " ")]);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].display, "occupation");
    }
}
