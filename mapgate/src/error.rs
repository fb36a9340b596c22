//! Error kinds shared by the mapping engine and the cache gate.
//!
//! The engine fails closed on every error. The gate never surfaces most of
//! these to its caller: [`GateError`] values are logged and resolved as
//! "must run".

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A malformed line in a mapping table or rename dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}:{line}: {reason}: {content:?}", path.display())]
pub struct ParseError {
    pub path: PathBuf,
    /// 1-based line number.
    pub line: usize,
    pub content: String,
    pub reason: String,
}

impl ParseError {
    pub fn new(
        path: impl Into<PathBuf>,
        line: usize,
        content: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            line,
            content: content.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failures of the symbol mapping transformation engine.
#[derive(Debug, Error)]
pub enum MapError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl MapError {
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

/// Failures while gating or committing a work item.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("hash {}: {source}", path.display())]
    Hash {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("required input '{name}' has no value")]
    MissingInput { name: &'static str },
}

impl GateError {
    pub fn hash(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Hash {
            path: path.into(),
            source,
        }
    }

    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
