//! Mapping-table records and the per-record rename transform.
//!
//! Each input record yields exactly one line for each of the three derived
//! tables, so row order in every output mirrors the input.

use std::borrow::Cow;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

const PACKAGE_TAG: &str = "PK:";
const CLASS_TAG: &str = "CL:";
const FIELD_TAG: &str = "FD:";
const METHOD_TAG: &str = "MD:";

/// One parsed mapping-table record.
///
/// Identifiers are fixed at parse time. The optional `<type>` token some
/// tables carry after the tag is not retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingEntry {
    /// Packages are never renamed; the line is kept verbatim.
    Package { line: String },
    Class {
        obf: String,
        intermediate: String,
    },
    Field {
        obf: String,
        intermediate: String,
    },
    Method {
        obf: String,
        obf_signature: String,
        intermediate: String,
        intermediate_signature: String,
    },
}

/// Record kind, used for statistics and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Package,
    Class,
    Field,
    Method,
}

impl MappingEntry {
    pub fn kind(&self) -> EntryKind {
        match self {
            MappingEntry::Package { .. } => EntryKind::Package,
            MappingEntry::Class { .. } => EntryKind::Class,
            MappingEntry::Field { .. } => EntryKind::Field,
            MappingEntry::Method { .. } => EntryKind::Method,
        }
    }
}

/// Parse one mapping-table line.
///
/// Returns `Ok(None)` for blank lines. The error is a human-readable reason;
/// callers attach file and line context.
pub fn parse_line(line: &str) -> Result<Option<MappingEntry>, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Ok(None);
    }

    let mut tokens = line.split_whitespace();
    let tag = tokens.next().unwrap_or_default();
    let rest: Vec<&str> = tokens.collect();

    let entry = match tag {
        PACKAGE_TAG => {
            if rest.is_empty() {
                return Err("package record needs a path".to_string());
            }
            MappingEntry::Package {
                line: line.to_string(),
            }
        }
        CLASS_TAG => {
            let [obf, intermediate] = fields::<2>(&rest, "class")?;
            MappingEntry::Class {
                obf: obf.to_string(),
                intermediate: intermediate.to_string(),
            }
        }
        FIELD_TAG => {
            let [obf, intermediate] = fields::<2>(&rest, "field")?;
            MappingEntry::Field {
                obf: obf.to_string(),
                intermediate: intermediate.to_string(),
            }
        }
        METHOD_TAG => {
            let [obf, obf_signature, intermediate, intermediate_signature] =
                fields::<4>(&rest, "method")?;
            MappingEntry::Method {
                obf: obf.to_string(),
                obf_signature: obf_signature.to_string(),
                intermediate: intermediate.to_string(),
                intermediate_signature: intermediate_signature.to_string(),
            }
        }
        other => return Err(format!("unknown record tag '{other}'")),
    };
    Ok(Some(entry))
}

/// Take exactly `N` identifier tokens, skipping one leading `<type>` token
/// when present.
fn fields<'a, const N: usize>(rest: &[&'a str], kind: &str) -> Result<[&'a str; N], String> {
    let ids = match rest.len() {
        n if n == N => rest,
        n if n == N + 1 => &rest[1..],
        n if n < N => {
            return Err(format!("{kind} record needs {N} identifiers, found {n}"));
        }
        n => {
            return Err(format!(
                "{kind} record takes at most {} tokens, found {n}",
                N + 1
            ));
        }
    };
    let mut out = [""; N];
    out.copy_from_slice(ids);
    Ok(out)
}

/// Short intermediate name → final human name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameDictionary {
    names: HashMap<String, String>,
}

impl RenameDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a rename. When `short` is already present the existing entry is
    /// kept and its final name is returned as the error.
    pub fn insert(&mut self, short: String, final_name: String) -> Result<(), String> {
        match self.names.entry(short) {
            Entry::Occupied(existing) => Err(existing.get().clone()),
            Entry::Vacant(slot) => {
                slot.insert(final_name);
                Ok(())
            }
        }
    }

    pub fn get(&self, short: &str) -> Option<&str> {
        self.names.get(short).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Both rename dictionaries, borrowed for the duration of a transform.
#[derive(Debug, Clone, Copy)]
pub struct Renames<'a> {
    pub fields: &'a RenameDictionary,
    pub methods: &'a RenameDictionary,
}

/// The three lines derived from one record, without line terminators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedLines {
    pub obf_to_final: String,
    pub final_to_intermediate: String,
    pub final_to_obf: String,
    /// Whether a dictionary lookup changed the name.
    pub renamed: bool,
}

/// Derive the obf→final, final→intermediate and final→obf lines for a record.
pub fn derive_lines(entry: &MappingEntry, renames: Renames<'_>) -> DerivedLines {
    match entry {
        MappingEntry::Package { line } => DerivedLines {
            obf_to_final: line.clone(),
            final_to_intermediate: line.clone(),
            final_to_obf: line.clone(),
            renamed: false,
        },
        MappingEntry::Class { obf, intermediate } => DerivedLines {
            obf_to_final: format!("{CLASS_TAG} {obf} {intermediate}"),
            final_to_intermediate: format!("{CLASS_TAG} {intermediate} {intermediate}"),
            final_to_obf: format!("{CLASS_TAG} {intermediate} {obf}"),
            renamed: false,
        },
        MappingEntry::Field { obf, intermediate } => {
            let final_path = final_owner_path(intermediate, renames.fields);
            DerivedLines {
                obf_to_final: format!("{FIELD_TAG} {obf} {final_path}"),
                final_to_intermediate: format!("{FIELD_TAG} {final_path} {intermediate}"),
                final_to_obf: format!("{FIELD_TAG} {final_path} {obf}"),
                renamed: matches!(final_path, Cow::Owned(_)),
            }
        }
        MappingEntry::Method {
            obf,
            obf_signature,
            intermediate,
            intermediate_signature,
        } => {
            let final_path = final_owner_path(intermediate, renames.methods);
            let sig = intermediate_signature;
            DerivedLines {
                obf_to_final: format!("{METHOD_TAG} {obf} {obf_signature} {final_path} {sig}"),
                final_to_intermediate: format!(
                    "{METHOD_TAG} {final_path} {sig} {intermediate} {sig}"
                ),
                final_to_obf: format!("{METHOD_TAG} {final_path} {sig} {obf} {obf_signature}"),
                renamed: matches!(final_path, Cow::Owned(_)),
            }
        }
    }
}

/// Replace the trailing simple name of `owner_path` when the dictionary knows
/// it; otherwise borrow the path unchanged.
pub fn final_owner_path<'a>(owner_path: &'a str, dict: &RenameDictionary) -> Cow<'a, str> {
    let (owner, simple) = match owner_path.rfind('/') {
        Some(idx) => owner_path.split_at(idx + 1),
        None => ("", owner_path),
    };
    match dict.get(simple) {
        Some(final_name) if final_name != simple => Cow::Owned(format!("{owner}{final_name}")),
        _ => Cow::Borrowed(owner_path),
    }
}
