//! Derives the stable slug codes that identify entities.
//!
//! Codes are hierarchical: a child code starts with its parent code, joined
//! by `-`. Identical inputs always produce identical codes, independent of
//! ingestion order, which is what makes merge-matching by code possible.

use snafu::prelude::*;

use crate::merge::{EmptyFieldSnafu, MergeResult};

const DELIM: char = '-';

/// Turns free text into a lowercase, hyphen-delimited slug.
///
/// Runs of non-alphanumeric characters collapse into a single delimiter;
/// leading and trailing delimiters are dropped. Non-ASCII letters and
/// digits are kept as-is (lowercased).
pub fn slugify(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending = false;
    for c in value.trim().chars() {
        if c.is_alphanumeric() {
            if pending && !out.is_empty() {
                out.push(DELIM);
            }
            pending = false;
            out.extend(c.to_lowercase());
        } else {
            pending = true;
        }
    }
    out
}

/// Collapses runs of whitespace into single spaces.
pub fn collapse_spaces(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Title-cases a name written in upper or lower case: every letter that
/// follows a non-letter is uppercased, the rest lowercased.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;
    for c in value.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

pub fn party_code(election_code: &str, party_title: &str) -> MergeResult<String> {
    ensure!(
        !party_title.trim().is_empty(),
        EmptyFieldSnafu {
            field: "party title"
        }
    );
    Ok(format!("{}{}{}", election_code, DELIM, slugify(party_title)))
}

/// An electorate with a blank title falls back to the assembly code itself,
/// for sources that report assembly-wide figures.
pub fn electorate_code(assembly_code: &str, electorate_title: &str) -> String {
    let slug = slugify(electorate_title);
    if slug.is_empty() {
        assembly_code.to_string()
    } else {
        format!("{}{}{}", assembly_code, DELIM, slug)
    }
}

/// Candidate codes sit under the electorate code, so the same surname in
/// two electorates cannot collide. Both name parts are required.
pub fn candidate_code(
    assembly_code: &str,
    electorate_title: &str,
    name_first: &str,
    name_last: &str,
) -> MergeResult<String> {
    ensure!(
        !name_first.trim().is_empty(),
        EmptyFieldSnafu {
            field: "first name"
        }
    );
    ensure!(
        !name_last.trim().is_empty(),
        EmptyFieldSnafu { field: "last name" }
    );
    let name = format!("{} {}", name_last.trim(), name_first.trim());
    Ok(format!(
        "{}{}{}",
        electorate_code(assembly_code, electorate_title),
        DELIM,
        slugify(&name)
    ))
}

/// Result codes append a topic suffix to the electorate code, so several
/// result kinds can coexist under one electorate.
pub fn result_electorate_code(assembly_code: &str, name: &str, suffix: &str) -> String {
    format!(
        "{}{}{}",
        electorate_code(assembly_code, name),
        DELIM,
        slugify(suffix)
    )
}

/// Result codes that belong to a single candidate.
pub fn result_candidate_code(candidate_code: &str, suffix: &str) -> String {
    format!("{}{}{}", candidate_code, DELIM, slugify(suffix))
}

pub fn ballot_code(assembly_code: &str, electorate_title: &str) -> String {
    format!(
        "{}{}ballot",
        electorate_code(assembly_code, electorate_title),
        DELIM
    )
}

pub fn candidate_title(name_first: &str, name_last: &str) -> String {
    collapse_spaces(&format!("{} {}", name_first.trim(), name_last.trim()))
}

/// Tidies a display title read from a source row.
pub fn display_title(value: &str) -> String {
    collapse_spaces(value.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("New South Wales"), "new-south-wales");
        assert_eq!(slugify("O'Connor"), "o-connor");
        assert_eq!(slugify("  #Sustainable Australia "), "sustainable-australia");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn electorate_code_blank_title_is_assembly() {
        assert_eq!(electorate_code("2019-s", ""), "2019-s");
        assert_eq!(electorate_code("2019-h", "Wentworth"), "2019-h-wentworth");
    }

    #[test]
    fn candidate_code_hierarchy() {
        let code = candidate_code("2019-h", "Wentworth", "John", "Smith").unwrap();
        assert_eq!(code, "2019-h-wentworth-smith-john");
    }

    #[test]
    fn candidate_code_requires_both_names() {
        assert!(candidate_code("2019-h", "Wentworth", "", "Smith").is_err());
        assert!(candidate_code("2019-h", "Wentworth", "John", " ").is_err());
    }

    #[test]
    fn result_codes_append_suffix() {
        assert_eq!(
            result_electorate_code("2019-s", "NSW", "population"),
            "2019-s-nsw-population"
        );
        assert_eq!(ballot_code("2019-s", "NSW"), "2019-s-nsw-ballot");
    }

    #[test]
    fn party_code_requires_title() {
        assert!(party_code("2019", " ").is_err());
        assert_eq!(
            party_code("2019", "Animal Justice Party").unwrap(),
            "2019-animal-justice-party"
        );
    }

    #[test]
    fn titles_collapse_spaces() {
        assert_eq!(candidate_title(" John ", " Smith "), "John Smith");
        assert_eq!(display_title("  New   England "), "New England");
    }

    #[test]
    fn title_case_handles_names() {
        assert_eq!(title_case("WENTWORTH"), "Wentworth");
        assert_eq!(title_case("o'connor"), "O'Connor");
        assert_eq!(title_case("NEW SOUTH WALES"), "New South Wales");
    }
}
