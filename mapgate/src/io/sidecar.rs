//! Fingerprint sidecar files stored next to cached outputs.
//!
//! A file output `dir/name` keeps its fingerprint in `dir/name.sha256`. A
//! directory output keeps it inside itself as `.cache`, a name every
//! directory snapshot skips.

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::fingerprint::Fingerprint;
use crate::error::GateError;
use crate::io::hash::SNAPSHOT_EXCLUDED_NAME;

pub const FILE_SIDECAR_EXTENSION: &str = "sha256";

/// Location of the sidecar for `output`.
pub fn sidecar_path(output: &Path) -> PathBuf {
    if output.is_dir() {
        return output.join(SNAPSHOT_EXCLUDED_NAME);
    }
    let mut name = output
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".");
    name.push(FILE_SIDECAR_EXTENSION);
    output.with_file_name(name)
}

/// Read sidecar text; `None` when the sidecar does not exist.
pub fn read_sidecar(path: &Path) -> Result<Option<String>, GateError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(GateError::io("read sidecar", path, err)),
    }
}

/// Atomically replace the sidecar (temp file + rename).
pub fn write_sidecar(path: &Path, fingerprint: &Fingerprint) -> Result<(), GateError> {
    debug!(path = %path.display(), tokens = fingerprint.len(), "writing sidecar");
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp_path = PathBuf::from(tmp);
    fs::write(&tmp_path, fingerprint.render())
        .map_err(|err| GateError::io("write temp sidecar", &tmp_path, err))?;
    fs::rename(&tmp_path, path).map_err(|err| GateError::io("replace sidecar", path, err))
}

/// Remove a cached artifact (file or directory tree). Missing is not an error.
pub fn remove_artifact(path: &Path) -> Result<(), GateError> {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(GateError::io("remove", path, err)),
    }
}
