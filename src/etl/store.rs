//! Readers turning stored source files into format-independent shapes.
//!
//! Adapters only ever see header-keyed row maps, element trees or plain
//! text; nothing format-specific leaks past this module.

use log::warn;

use serde::de::DeserializeOwned;
use snafu::prelude::*;

use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};

use crate::etl::{
    DecodingTextSnafu, EtlResult, OpeningArchiveSnafu, ParsingCsvSnafu, ParsingJsonSnafu,
    ParsingNumberSnafu, ParsingXmlSnafu, ReadingArchiveEntrySnafu, ReadingFileSnafu,
};

/// A row keyed by the source file's header names.
pub type RawRow = HashMap<String, String>;

/// All the source files available to the adapters, keyed by filename.
pub type RawData = HashMap<String, RawFile>;

/// A source file parsed into a format-independent shape.
#[derive(Debug, Clone, PartialEq)]
pub enum RawFile {
    /// Header-keyed rows from csv or tsv (or pre-scraped html tables).
    Rows(Vec<RawRow>),
    /// An element tree from xml.
    Xml(XmlNode),
    /// Plain text, e.g. extracted from pdf tables.
    Text(String),
}

impl RawFile {
    pub fn rows(&self) -> Option<&[RawRow]> {
        match self {
            RawFile::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            RawFile::Text(text) => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlNode {
    pub tag: String,
    pub attributes: HashMap<String, String>,
    pub text: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    /// The tag without any namespace prefix.
    pub fn local_name(&self) -> &str {
        self.tag.rsplit(':').next().unwrap_or(&self.tag)
    }

    pub fn child(&self, local: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.local_name() == local)
    }

    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlNode> {
        self.children.iter().filter(move |c| c.local_name() == local)
    }

    pub fn child_text(&self, local: &str) -> String {
        self.child(local).map(|c| c.text.clone()).unwrap_or_default()
    }

    /// An attribute value, matched ignoring any namespace prefix.
    pub fn attribute(&self, local: &str) -> String {
        self.attributes
            .iter()
            .find(|(key, _)| key.rsplit(':').next() == Some(local))
            .map(|(_, value)| value.clone())
            .unwrap_or_default()
    }
}

/// Reads every file in a zip archive, parsed by extension. Unknown
/// extensions are skipped with a warning.
pub fn read_archive(path: &Path) -> EtlResult<RawData> {
    let file = fs::File::open(path).context(ReadingFileSnafu { path })?;
    let mut archive = zip::ZipArchive::new(file).context(OpeningArchiveSnafu { path })?;

    let mut result = RawData::new();
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .context(OpeningArchiveSnafu { path })?;
        if !entry.is_file() {
            continue;
        }
        let name = match Path::new(entry.name()).file_name().and_then(|n| n.to_str()) {
            Some(n) => n.to_string(),
            None => continue,
        };
        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .context(ReadingArchiveEntrySnafu { name: &name })?;
        let content = decode_text(bytes, &name)?;

        if name.ends_with(".csv") {
            let rows = read_csv_text(&content, &name)?;
            result.insert(name, RawFile::Rows(rows));
        } else if name.ends_with(".tsv") {
            let rows = read_tsv_text(&content, &name)?;
            result.insert(name, RawFile::Rows(rows));
        } else if name.ends_with(".xml") {
            let node = read_xml_text(&content, &name)?;
            result.insert(name, RawFile::Xml(node));
        } else if name.ends_with(".txt") {
            result.insert(name, RawFile::Text(content));
        } else {
            warn!("Unknown extension for file '{}'.", name);
        }
    }
    Ok(result)
}

/// Reads a json file; an empty file reads as absent.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> EtlResult<Option<T>> {
    let content = fs::read_to_string(path).context(ReadingFileSnafu { path })?;
    let content = content.trim_start_matches('\u{feff}');
    if content.trim().is_empty() {
        return Ok(None);
    }
    let value = serde_json::from_str(content).context(ParsingJsonSnafu { path })?;
    Ok(Some(value))
}

pub fn read_csv_text(content: &str, name: &str) -> EtlResult<Vec<RawRow>> {
    read_delimited(content, b',', name)
}

pub fn read_tsv_text(content: &str, name: &str) -> EtlResult<Vec<RawRow>> {
    read_delimited(content, b'\t', name)
}

/// Commission exports often put a title line above the header, so lines
/// without the delimiter are dropped before parsing.
fn read_delimited(content: &str, delimiter: u8, name: &str) -> EtlResult<Vec<RawRow>> {
    let delim_char = delimiter as char;
    let lines: Vec<&str> = content
        .lines()
        .filter(|line| line.contains(delim_char))
        .collect();
    let text = lines.join("\n");

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .context(ParsingCsvSnafu { name })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context(ParsingCsvSnafu { name })?;
        let mut row = RawRow::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            row.insert(header.clone(), value.to_string());
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Parses an xml document into a tree of tags, attributes, text and
/// children.
pub fn read_xml_text(content: &str, name: &str) -> EtlResult<XmlNode> {
    let mut reader = quick_xml::Reader::from_str(content);
    reader.trim_text(true);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;
    loop {
        match reader.read_event().context(ParsingXmlSnafu { name })? {
            Event::Start(start) => {
                stack.push(node_from_start(&start, name)?);
            }
            Event::Empty(start) => {
                let node = node_from_start(&start, name)?;
                attach(&mut stack, &mut root, node);
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    let value = text.unescape().context(ParsingXmlSnafu { name })?;
                    if !current.text.is_empty() {
                        current.text.push(' ');
                    }
                    current.text.push_str(value.trim());
                }
            }
            Event::End(_) => match stack.pop() {
                Some(node) => attach(&mut stack, &mut root, node),
                None => whatever!("Unbalanced xml in '{}'", name),
            },
            Event::Eof => break,
            _ => {}
        }
    }
    match root {
        Some(node) => Ok(node),
        None => whatever!("No root element in '{}'", name),
    }
}

fn node_from_start(start: &BytesStart, name: &str) -> EtlResult<XmlNode> {
    let tag = String::from_utf8_lossy(start.name().as_ref()).to_string();
    let mut attributes = HashMap::new();
    for attr in start.attributes() {
        let attr = attr
            .map_err(quick_xml::Error::InvalidAttr)
            .context(ParsingXmlSnafu { name })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .context(ParsingXmlSnafu { name })?
            .to_string();
        attributes.insert(key, value);
    }
    Ok(XmlNode {
        tag,
        attributes,
        text: String::new(),
        children: Vec::new(),
    })
}

fn attach(stack: &mut Vec<XmlNode>, root: &mut Option<XmlNode>, node: XmlNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => *root = Some(node),
    }
}

fn decode_text(bytes: Vec<u8>, name: &str) -> EtlResult<String> {
    let content = String::from_utf8(bytes).context(DecodingTextSnafu { name })?;
    // UTF-8 BOM
    Ok(content.trim_start_matches('\u{feff}').to_string())
}

/// The trimmed value of a column, or empty when absent.
pub fn row_value(row: &RawRow, column: &str) -> String {
    row.get(column).map(|v| v.trim().to_string()).unwrap_or_default()
}

/// A numeric column; thousands separators are tolerated.
pub fn row_number(row: &RawRow, column: &str) -> EtlResult<u64> {
    let value = row_value(row, column);
    let cleaned: String = value.chars().filter(|c| *c != ',' && *c != ' ').collect();
    cleaned
        .parse::<u64>()
        .ok()
        .context(ParsingNumberSnafu { column, value })
}

/// Commission exports flag booleans as Y/N.
pub fn row_flag(row: &RawRow, column: &str) -> bool {
    row_value(row, column).to_uppercase() == "Y"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_drops_leading_junk_lines() {
        let content = "House of Representatives downloaded 2019\nDivisionNm,StateAb,Enrolment\nAdelaide,SA,121606\n";
        let rows = read_csv_text(content, "test.csv").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(row_value(&rows[0], "DivisionNm"), "Adelaide");
        assert_eq!(row_number(&rows[0], "Enrolment").unwrap(), 121606);
    }

    #[test]
    fn tsv_reads_tab_delimited() {
        let content = "title line\nCED code\tCED name\t2019\n101\tBanks\t167,990\n";
        let rows = read_tsv_text(content, "test.tsv").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(row_number(&rows[0], "2019").unwrap(), 167_990);
    }

    #[test]
    fn row_number_rejects_text() {
        let mut row = RawRow::new();
        row.insert("Enrolment".to_string(), "n/a".to_string());
        assert!(row_number(&row, "Enrolment").is_err());
    }

    #[test]
    fn xml_builds_a_tree() {
        let content = "<mf:MediaFeed Id=\"feed-1\" xmlns:mf=\"urn:example\">\
            <mf:Cycle Created=\"2019-05-18\">24310</mf:Cycle>\
            <mf:Results Updated=\"2019-07-11\"><eml:EventName xmlns:eml=\"urn:eml\">2019 Federal Election</eml:EventName></mf:Results>\
            </mf:MediaFeed>";
        let node = read_xml_text(content, "feed.xml").unwrap();
        assert_eq!(node.local_name(), "MediaFeed");
        assert_eq!(node.attribute("Id"), "feed-1");
        assert_eq!(node.child_text("Cycle"), "24310");
        let results = node.child("Results").unwrap();
        assert_eq!(results.child_text("EventName"), "2019 Federal Election");
    }

    #[test]
    fn bom_is_stripped() {
        let decoded = decode_text("\u{feff}a,b\n1,2\n".as_bytes().to_vec(), "t.csv").unwrap();
        assert!(decoded.starts_with("a,b"));
    }
}
