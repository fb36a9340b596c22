//! Rename dictionary loading (`fields.csv`, `methods.csv`).
//!
//! Dictionaries are CSV with a header row. Only the first two columns are
//! read: the short intermediate name and its final name. Quoted fields may
//! span lines. Duplicate short names are rejected rather than silently
//! overwritten, and final names must be single non-empty tokens so every
//! derived table line keeps its token count.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::core::srg::RenameDictionary;
use crate::error::{MapError, ParseError};

/// Load a rename dictionary from a CSV file.
pub fn load_dictionary(path: &Path) -> Result<RenameDictionary, MapError> {
    let file = File::open(path).map_err(|err| MapError::io("open dictionary", path, err))?;
    let dict = parse_dictionary(path, file)?;
    debug!(path = %path.display(), entries = dict.len(), "dictionary loaded");
    Ok(dict)
}

/// Parse dictionary rows from `reader`; `path` is used for diagnostics only.
pub fn parse_dictionary(path: &Path, reader: impl Read) -> Result<RenameDictionary, MapError> {
    let mut dict = RenameDictionary::new();
    let mut first_seen: HashMap<String, usize> = HashMap::new();
    let mut rows = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    for row in rows.records() {
        let record = row.map_err(|err| csv_error(path, err))?;
        let line_no = record.position().map_or(0, |pos| pos.line() as usize);
        let reject = |reason: String| -> MapError {
            ParseError::new(path, line_no, &render(&record), reason).into()
        };

        let (Some(short), Some(final_name)) = (record.get(0), record.get(1)) else {
            return Err(reject("expected at least 2 columns".to_string()));
        };
        if short.is_empty() {
            return Err(reject("empty short name".to_string()));
        }
        if final_name.is_empty() {
            return Err(reject(format!("empty final name for '{short}'")));
        }
        if final_name.chars().any(char::is_whitespace) {
            return Err(reject(format!(
                "final name for '{short}' contains whitespace"
            )));
        }

        if dict
            .insert(short.to_string(), final_name.to_string())
            .is_err()
        {
            let first = first_seen.get(short).copied().unwrap_or_default();
            return Err(reject(format!(
                "duplicate short name '{short}' (first defined on line {first})"
            )));
        }
        first_seen.insert(short.to_string(), line_no);
    }
    Ok(dict)
}

fn render(record: &StringRecord) -> String {
    record.iter().collect::<Vec<_>>().join(",")
}

fn csv_error(path: &Path, err: csv::Error) -> MapError {
    let line_no = err.position().map_or(0, |pos| pos.line() as usize);
    let reason = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => MapError::io("read dictionary", path, source),
        _ => ParseError::new(path, line_no, "", reason).into(),
    }
}
