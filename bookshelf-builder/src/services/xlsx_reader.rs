//! Minimal spreadsheet reader
//!
//! Reads the first worksheet of an `.xlsx` workbook and returns one header-keyed
//! record per data row. Only what the catalog needs is supported: shared strings,
//! inline strings and raw cell values. No formulas, styles, merged cells or
//! multiple sheets.
//!
//! The reader fails soft. Any problem opening or parsing the archive is logged and
//! yields an empty result, which callers treat as "no spreadsheet input".

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::PathBuf;
use thiserror::Error;
use zip::result::ZipError;
use zip::ZipArchive;

const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";
const WORKSHEET_PREFIX: &str = "xl/worksheets/sheet";
const WORKSHEET_SUFFIX: &str = ".xml";

/// Header name that every kept row must have a value for
pub const TITLE_HEADER: &str = "Title";

/// One data row keyed by header text
pub type RawRecord = BTreeMap<String, String>;

/// Spreadsheet reader errors
#[derive(Debug, Error)]
pub enum XlsxError {
    /// Workbook file does not exist
    #[error("Spreadsheet not found: {0}")]
    NotFound(PathBuf),

    /// Zip container could not be read
    #[error("Archive error: {0}")]
    Archive(#[from] ZipError),

    /// I/O error while reading a part
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed XML inside a part
    #[error("XML error in {part}: {message}")]
    Xml { part: &'static str, message: String },
}

fn xml_error(part: &'static str, err: impl std::fmt::Display) -> XlsxError {
    XlsxError::Xml {
        part,
        message: err.to_string(),
    }
}

/// Reader for one workbook file
pub struct XlsxReader {
    path: PathBuf,
}

impl XlsxReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read all data rows, returning an empty list on any failure
    pub fn read(&self) -> Vec<RawRecord> {
        match self.try_read() {
            Ok(records) => {
                tracing::debug!(
                    path = %self.path.display(),
                    rows = records.len(),
                    "Spreadsheet parsed"
                );
                records
            }
            Err(XlsxError::NotFound(path)) => {
                tracing::debug!("No spreadsheet at {}", path.display());
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Error reading spreadsheet {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    /// Read all data rows, propagating failures
    pub fn try_read(&self) -> Result<Vec<RawRecord>, XlsxError> {
        if !self.path.exists() {
            return Err(XlsxError::NotFound(self.path.clone()));
        }
        let file = File::open(&self.path)?;
        read_workbook(file)
    }
}

/// Parse a workbook from any seekable byte source
pub fn read_workbook<R: Read + Seek>(source: R) -> Result<Vec<RawRecord>, XlsxError> {
    let mut archive = ZipArchive::new(source)?;

    let shared_strings = match read_part(&mut archive, SHARED_STRINGS_PART)? {
        Some(xml) => parse_shared_strings(&xml)?,
        None => Vec::new(),
    };

    let sheet_name = match first_worksheet(archive.file_names()) {
        Some(name) => name,
        None => {
            tracing::debug!("Workbook has no worksheet part");
            return Ok(Vec::new());
        }
    };

    match read_part(&mut archive, &sheet_name)? {
        Some(xml) => parse_sheet(&xml, &shared_strings),
        None => Ok(Vec::new()),
    }
}

fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>, XlsxError> {
    match archive.by_name(name) {
        Ok(mut part) => {
            let mut xml = String::new();
            part.read_to_string(&mut xml)?;
            Ok(Some(xml))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// `sheet1.xml` if present, otherwise the lowest-numbered worksheet part
fn first_worksheet<'a>(names: impl Iterator<Item = &'a str>) -> Option<String> {
    names
        .filter_map(|name| {
            let number = name
                .strip_prefix(WORKSHEET_PREFIX)?
                .strip_suffix(WORKSHEET_SUFFIX)?
                .parse::<u32>()
                .ok()?;
            Some((number, name))
        })
        .min_by_key(|(number, _)| *number)
        .map(|(_, name)| name.to_string())
}

fn attribute(e: &BytesStart<'_>, name: &[u8], part: &'static str) -> Result<Option<String>, XlsxError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| xml_error(part, err))?;
        if attr.key.local_name().as_ref() == name {
            let value = attr.unescape_value().map_err(|err| xml_error(part, err))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Parse the shared-string table into position-indexed strings
///
/// Each `<si>` contributes the concatenation of its `<t>` runs, so both plain and
/// rich-text entries resolve to their visible text. Phonetic runs are skipped.
pub fn parse_shared_strings(xml: &str) -> Result<Vec<String>, XlsxError> {
    const PART: &str = SHARED_STRINGS_PART;

    let mut reader = Reader::from_str(xml);
    let mut strings = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;
    let mut in_phonetic = false;

    loop {
        match reader.read_event().map_err(|e| xml_error(PART, e))? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current = Some(String::new()),
                b"rPh" => in_phonetic = true,
                b"t" if current.is_some() && !in_phonetic => in_text = true,
                _ => {}
            },
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"si" {
                    strings.push(String::new());
                }
            }
            Event::Text(t) if in_text => {
                let text = t.unescape().map_err(|e| xml_error(PART, e))?;
                if let Some(buf) = current.as_mut() {
                    buf.push_str(&text);
                }
            }
            Event::CData(t) if in_text => {
                if let Some(buf) = current.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"si" => {
                    if let Some(text) = current.take() {
                        strings.push(text);
                    }
                }
                b"rPh" => in_phonetic = false,
                b"t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(strings)
}

/// Column number (1-based) from the letter part of a cell reference ("B7" → 2)
fn column_number(reference: &str) -> Option<u32> {
    let letters: String = reference
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if letters.is_empty() {
        return None;
    }
    letters.chars().try_fold(0u32, |acc, c| {
        acc.checked_mul(26)?
            .checked_add(c.to_ascii_uppercase() as u32 - 'A' as u32 + 1)
    })
}

/// Cell being assembled while its children are read
#[derive(Default)]
struct PendingCell {
    column: u32,
    kind: Option<String>,
    value: Option<String>,
    inline: Option<String>,
}

impl PendingCell {
    fn resolve(self, shared_strings: &[String]) -> String {
        let value = match self.kind.as_deref() {
            Some("s") => self
                .value
                .and_then(|raw| raw.trim().parse::<usize>().ok())
                .and_then(|idx| shared_strings.get(idx).cloned())
                .unwrap_or_default(),
            Some("inlineStr") => self.inline.or(self.value).unwrap_or_default(),
            _ => self.value.unwrap_or_default(),
        };
        value.trim().to_string()
    }
}

#[derive(Clone, Copy, PartialEq)]
enum TextTarget {
    None,
    Value,
    Inline,
}

/// Parse worksheet XML into header-keyed records
///
/// Row 1 is the header row. Later rows become records with one entry per header
/// (missing cells become empty strings). Rows whose fields are all empty, or whose
/// "Title" field is empty, are dropped.
pub fn parse_sheet(xml: &str, shared_strings: &[String]) -> Result<Vec<RawRecord>, XlsxError> {
    const PART: &str = "worksheet";

    let mut reader = Reader::from_str(xml);
    let mut headers: BTreeMap<u32, String> = BTreeMap::new();
    let mut records = Vec::new();

    let mut row_index: u32 = 0;
    let mut row_values: HashMap<u32, String> = HashMap::new();
    let mut last_column: u32 = 0;
    let mut cell: Option<PendingCell> = None;
    let mut target = TextTarget::None;
    let mut in_inline = false;

    loop {
        match reader.read_event().map_err(|e| xml_error(PART, e))? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"row" => {
                    row_index = next_row_index(&e, row_index, PART)?;
                    row_values.clear();
                    last_column = 0;
                }
                b"c" => {
                    let pending = start_cell(&e, last_column, PART)?;
                    last_column = pending.column;
                    cell = Some(pending);
                }
                b"v" if cell.is_some() => target = TextTarget::Value,
                b"is" if cell.is_some() => in_inline = true,
                b"t" if in_inline => target = TextTarget::Inline,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"c" => {
                    let pending = start_cell(&e, last_column, PART)?;
                    last_column = pending.column;
                    row_values.insert(pending.column, String::new());
                }
                b"row" => {
                    row_index = next_row_index(&e, row_index, PART)?;
                    row_values.clear();
                    finish_row(row_index, &row_values, &mut headers, &mut records);
                }
                _ => {}
            },
            Event::Text(t) if target != TextTarget::None => {
                let text = t.unescape().map_err(|e| xml_error(PART, e))?;
                append_text(cell.as_mut(), target, &text);
            }
            Event::CData(t) if target != TextTarget::None => {
                let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                append_text(cell.as_mut(), target, &text);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"v" | b"t" => target = TextTarget::None,
                b"is" => in_inline = false,
                b"c" => {
                    if let Some(pending) = cell.take() {
                        let column = pending.column;
                        row_values.insert(column, pending.resolve(shared_strings));
                    }
                    target = TextTarget::None;
                    in_inline = false;
                }
                b"row" => finish_row(row_index, &row_values, &mut headers, &mut records),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(records)
}

fn next_row_index(e: &BytesStart<'_>, previous: u32, part: &'static str) -> Result<u32, XlsxError> {
    Ok(attribute(e, b"r", part)?
        .and_then(|r| r.trim().parse::<u32>().ok())
        .unwrap_or(previous + 1))
}

fn start_cell(e: &BytesStart<'_>, last_column: u32, part: &'static str) -> Result<PendingCell, XlsxError> {
    let column = attribute(e, b"r", part)?
        .as_deref()
        .and_then(column_number)
        .unwrap_or(last_column + 1);

    Ok(PendingCell {
        column,
        kind: attribute(e, b"t", part)?,
        value: None,
        inline: None,
    })
}

fn append_text(cell: Option<&mut PendingCell>, target: TextTarget, text: &str) {
    let Some(cell) = cell else { return };
    let slot = match target {
        TextTarget::Value => &mut cell.value,
        TextTarget::Inline => &mut cell.inline,
        TextTarget::None => return,
    };
    slot.get_or_insert_with(String::new).push_str(text);
}

fn finish_row(
    row_index: u32,
    row_values: &HashMap<u32, String>,
    headers: &mut BTreeMap<u32, String>,
    records: &mut Vec<RawRecord>,
) {
    if row_index == 1 {
        for (column, name) in row_values {
            if !name.is_empty() {
                headers.insert(*column, name.clone());
            }
        }
        return;
    }

    let mut record = RawRecord::new();
    let mut is_empty = true;
    for (column, header) in headers.iter() {
        let value = row_values.get(column).cloned().unwrap_or_default();
        if !value.is_empty() {
            is_empty = false;
        }
        record.insert(header.clone(), value);
    }

    if is_empty {
        return;
    }
    let has_title = record
        .get(TITLE_HEADER)
        .map(|title| !title.is_empty())
        .unwrap_or(false);
    if has_title {
        records.push(record);
    }
}
