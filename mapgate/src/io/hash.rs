//! Content hashing for files, strings and directory snapshots.
//!
//! Tokens are lowercase hex SHA-256 digests. Directory snapshots are lists of
//! per-file tokens ordered by path so the same tree always hashes the same.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::error::GateError;

/// File name skipped by every directory snapshot. Directory outputs keep
/// their fingerprint sidecar under this name.
pub const SNAPSHOT_EXCLUDED_NAME: &str = ".cache";

const READ_CHUNK_BYTES: usize = 64 * 1024;

pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

pub fn hash_str(content: &str) -> String {
    hash_bytes(content.as_bytes())
}

/// Hash a file's bytes, reading it in chunks.
pub fn hash_file(path: &Path) -> Result<String, GateError> {
    let mut file = File::open(path).map_err(|err| GateError::hash(path, err))?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; READ_CHUNK_BYTES];
    loop {
        let read = file.read(&mut buf).map_err(|err| GateError::hash(path, err))?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Hash every file below `dir`, recursively, in path order.
pub fn hash_dir_recursive(dir: &Path) -> Result<Vec<String>, GateError> {
    let mut tokens = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|err| {
            let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
            GateError::hash(path, err.into())
        })?;
        if entry.file_type().is_dir() || is_excluded(entry.path()) {
            continue;
        }
        if entry.path().is_file() {
            tokens.push(hash_file(entry.path())?);
        }
    }
    Ok(tokens)
}

/// Hash the files directly inside `dir` (no recursion), in path order.
pub fn hash_dir_shallow(dir: &Path) -> Result<Vec<String>, GateError> {
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir).map_err(|err| GateError::hash(dir, err))? {
        let entry = entry.map_err(|err| GateError::hash(dir, err))?;
        let path = entry.path();
        if path.is_file() && !is_excluded(&path) {
            files.push(path);
        }
    }
    files.sort();
    files.iter().map(|path| hash_file(path)).collect()
}

/// One token for a file, the recursive snapshot for a directory.
pub fn hash_path_all(path: &Path) -> Result<Vec<String>, GateError> {
    if path.is_dir() {
        hash_dir_recursive(path)
    } else {
        Ok(vec![hash_file(path)?])
    }
}

fn is_excluded(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name == SNAPSHOT_EXCLUDED_NAME)
}
