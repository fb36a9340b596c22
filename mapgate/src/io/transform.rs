//! Streaming transform from one mapping table to the three derived tables.
//!
//! The input is read once, line by line; memory use is bounded by the rename
//! dictionaries. Every derived line is written with a single `write_all` so a
//! buffer flush never splits a line, and all three writers are flushed on
//! both the success and the error path.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::core::srg::{EntryKind, Renames, derive_lines, parse_line};
use crate::error::{MapError, ParseError};

/// Input table and the three derived tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePaths {
    pub input: PathBuf,
    /// Obfuscated → final names.
    pub obf_to_final: PathBuf,
    /// Final → intermediate names.
    pub final_to_intermediate: PathBuf,
    /// Final → obfuscated names.
    pub final_to_obf: PathBuf,
}

/// Record counts from one transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransformStats {
    pub packages: usize,
    pub classes: usize,
    pub fields: usize,
    pub methods: usize,
    pub renamed_fields: usize,
    pub renamed_methods: usize,
}

impl TransformStats {
    fn record(&mut self, kind: EntryKind, renamed: bool) {
        match kind {
            EntryKind::Package => self.packages += 1,
            EntryKind::Class => self.classes += 1,
            EntryKind::Field => {
                self.fields += 1;
                self.renamed_fields += usize::from(renamed);
            }
            EntryKind::Method => {
                self.methods += 1;
                self.renamed_methods += usize::from(renamed);
            }
        }
    }
}

/// A derived table being written, labelled with its path for diagnostics.
pub struct TableWriter<W> {
    pub path: PathBuf,
    pub writer: W,
}

impl<W: Write> TableWriter<W> {
    pub fn new(path: impl Into<PathBuf>, writer: W) -> Self {
        Self {
            path: path.into(),
            writer,
        }
    }

    fn write_line(&mut self, line: &str) -> Result<(), MapError> {
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');
        self.writer
            .write_all(buf.as_bytes())
            .map_err(|err| MapError::io("write", &self.path, err))
    }

    fn flush(&mut self) -> Result<(), MapError> {
        self.writer
            .flush()
            .map_err(|err| MapError::io("flush", &self.path, err))
    }
}

/// The three derived tables.
pub struct DerivedTables<W> {
    pub obf_to_final: TableWriter<W>,
    pub final_to_intermediate: TableWriter<W>,
    pub final_to_obf: TableWriter<W>,
}

impl<W: Write> DerivedTables<W> {
    /// Flush all three writers, attempting every one before reporting the
    /// first failure.
    pub fn flush(&mut self) -> Result<(), MapError> {
        let first = self.obf_to_final.flush();
        let second = self.final_to_intermediate.flush();
        let third = self.final_to_obf.flush();
        first.and(second).and(third)
    }
}

/// Transform `paths.input` into the three derived table files.
///
/// Parent directories of the outputs are created when missing.
#[instrument(skip_all, fields(input = %paths.input.display()))]
pub fn transform_files(paths: &TablePaths, renames: Renames<'_>) -> Result<TransformStats, MapError> {
    let input = File::open(&paths.input)
        .map_err(|err| MapError::io("open mapping table", &paths.input, err))?;
    let mut tables = DerivedTables {
        obf_to_final: create_table(&paths.obf_to_final)?,
        final_to_intermediate: create_table(&paths.final_to_intermediate)?,
        final_to_obf: create_table(&paths.final_to_obf)?,
    };

    let streamed = transform_stream(&paths.input, BufReader::new(input), &mut tables, renames);
    let flushed = tables.flush();
    let stats = streamed?;
    flushed?;

    info!(
        packages = stats.packages,
        classes = stats.classes,
        fields = stats.fields,
        methods = stats.methods,
        renamed_fields = stats.renamed_fields,
        renamed_methods = stats.renamed_methods,
        "mapping tables written"
    );
    Ok(stats)
}

/// Transform records from `input` into `tables` in a single pass.
///
/// `source` names the input in parse errors. Stops at the first malformed
/// line; lines already written stay complete.
pub fn transform_stream<R: BufRead, W: Write>(
    source: &Path,
    input: R,
    tables: &mut DerivedTables<W>,
    renames: Renames<'_>,
) -> Result<TransformStats, MapError> {
    let mut stats = TransformStats::default();
    for (idx, line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|err| MapError::io("read mapping table", source, err))?;
        let entry = match parse_line(&line) {
            Ok(Some(entry)) => entry,
            Ok(None) => continue,
            Err(reason) => {
                return Err(ParseError::new(source, line_no, line.trim_end(), reason).into());
            }
        };
        let derived = derive_lines(&entry, renames);
        tables.obf_to_final.write_line(&derived.obf_to_final)?;
        tables
            .final_to_intermediate
            .write_line(&derived.final_to_intermediate)?;
        tables.final_to_obf.write_line(&derived.final_to_obf)?;
        stats.record(entry.kind(), derived.renamed);
    }
    debug!(?stats, "stream transformed");
    Ok(stats)
}

fn create_table(path: &Path) -> Result<TableWriter<BufWriter<File>>, MapError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|err| MapError::io("create directory", parent, err))?;
    }
    let file = File::create(path).map_err(|err| MapError::io("create table", path, err))?;
    Ok(TableWriter::new(path, BufWriter::new(file)))
}
