//! Cache gate: skip decision before a work item runs, fingerprint commit
//! after it succeeds.
//!
//! The gate never reports a work item as up to date on uncertain state. Any
//! failure while checking resolves to "must run", and artifacts whose
//! fingerprint is missing or stale are deleted so nothing downstream mistakes
//! them for current outputs.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::core::descriptor::{CachedOutput, Descriptor, WorkItem};
use crate::error::GateError;
use crate::io::fingerprint::fingerprint;
use crate::io::sidecar::{read_sidecar, remove_artifact, sidecar_path, write_sidecar};

/// Invocation-time caching options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
    pub enabled: bool,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl CacheOptions {
    pub fn disabled() -> Self {
        Self { enabled: false }
    }
}

/// Why the gate decided a work item must run, or that it may be skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GateDecision {
    /// Caching is off for this invocation or this work-item type.
    Disabled,
    NoCachedOutputs,
    MissingOutput {
        output: &'static str,
        path: PathBuf,
    },
    /// The output existed without a sidecar and was deleted.
    MissingSidecar {
        output: &'static str,
        path: PathBuf,
    },
    /// The stored fingerprint did not match; output and sidecar were deleted.
    Corrupted {
        output: &'static str,
        path: PathBuf,
    },
    /// Checking failed; the item runs rather than trusting the cache.
    Failed {
        output: &'static str,
        error: String,
    },
    UpToDate,
}

impl GateDecision {
    pub fn should_run(&self) -> bool {
        !matches!(self, GateDecision::UpToDate)
    }
}

impl fmt::Display for GateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateDecision::Disabled => write!(f, "caching disabled"),
            GateDecision::NoCachedOutputs => write!(f, "no cached outputs"),
            GateDecision::MissingOutput { output, path } => {
                write!(f, "output {output} missing ({})", path.display())
            }
            GateDecision::MissingSidecar { output, path } => {
                write!(f, "output {output} had no fingerprint ({})", path.display())
            }
            GateDecision::Corrupted { output, path } => {
                write!(f, "output {output} fingerprint mismatch ({})", path.display())
            }
            GateDecision::Failed { output, error } => {
                write!(f, "checking output {output} failed: {error}")
            }
            GateDecision::UpToDate => write!(f, "up-to-date"),
        }
    }
}

/// Outcome of committing fingerprints after a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub written: Vec<PathBuf>,
    /// Outputs that did not exist; no sidecar was written for them.
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

/// Gate for one work-item type, holding its descriptor table.
pub struct CacheGate<T> {
    descriptor: Descriptor<T>,
}

impl<T: WorkItem> Default for CacheGate<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: WorkItem> CacheGate<T> {
    pub fn new() -> Self {
        Self::with_descriptor(T::descriptor())
    }

    pub fn with_descriptor(descriptor: Descriptor<T>) -> Self {
        Self { descriptor }
    }

    pub fn descriptor(&self) -> &Descriptor<T> {
        &self.descriptor
    }

    pub fn caching_enabled(&self, options: &CacheOptions) -> bool {
        options.enabled && T::CACHES_BY_DEFAULT
    }

    /// True unless every cached output is present with a matching fingerprint.
    pub fn should_run(&self, item: &T, options: &CacheOptions) -> bool {
        self.decide(item, options).should_run()
    }

    /// Check every cached output and report the first reason to run.
    ///
    /// May delete outputs whose sidecar is missing and outputs whose
    /// fingerprint does not match, together with their sidecars.
    #[instrument(skip_all, fields(item = item.name()))]
    pub fn decide(&self, item: &T, options: &CacheOptions) -> GateDecision {
        if !self.caching_enabled(options) {
            debug!("caching disabled");
            return GateDecision::Disabled;
        }
        if self.descriptor.outputs().is_empty() {
            debug!("no cached outputs declared");
            return GateDecision::NoCachedOutputs;
        }

        for output in self.descriptor.outputs() {
            match self.check_output(output, item) {
                Ok(None) => continue,
                Ok(Some(decision)) => return decision,
                Err(err) => {
                    error!(output = output.name, err = %err, "cache check failed, running");
                    return GateDecision::Failed {
                        output: output.name,
                        error: err.to_string(),
                    };
                }
            }
        }

        info!("all cached outputs up to date");
        GateDecision::UpToDate
    }

    fn check_output(
        &self,
        output: &CachedOutput<T>,
        item: &T,
    ) -> Result<Option<GateDecision>, GateError> {
        let path = output.path(item);
        if !path.exists() {
            info!(output = output.name, path = %path.display(), "cached output missing");
            return Ok(Some(GateDecision::MissingOutput {
                output: output.name,
                path,
            }));
        }

        let sidecar = sidecar_path(&path);
        let Some(stored) = read_sidecar(&sidecar)? else {
            warn!(
                output = output.name,
                path = %path.display(),
                "fingerprint missing, deleting orphaned output"
            );
            remove_artifact(&path)?;
            return Ok(Some(GateDecision::MissingSidecar {
                output: output.name,
                path,
            }));
        };

        let calculated = fingerprint(output, self.descriptor.inputs(), item)?;
        info!(output = output.name, path = %path.display(), "cached output found");
        debug!(found = %stored, calculated = %calculated, "comparing fingerprints");

        if !calculated.matches(&stored) {
            warn!(output = output.name, path = %path.display(), "corrupted cache");
            remove_artifact(&path)?;
            remove_artifact(&sidecar)?;
            return Ok(Some(GateDecision::Corrupted {
                output: output.name,
                path,
            }));
        }
        Ok(None)
    }

    /// Record fresh fingerprints for every cached output that exists.
    ///
    /// Call only after the work item ran successfully. Failures are logged
    /// and reported; a missing sidecar only costs a re-run next time.
    #[instrument(skip_all, fields(item = item.name()))]
    pub fn commit(&self, item: &T, options: &CacheOptions) -> CommitReport {
        let mut report = CommitReport::default();
        if !self.caching_enabled(options) {
            debug!("caching disabled, not committing");
            return report;
        }

        for output in self.descriptor.outputs() {
            let path = output.path(item);
            if !path.exists() {
                debug!(output = output.name, path = %path.display(), "output missing, no sidecar");
                report.skipped.push(path);
                continue;
            }
            let sidecar = sidecar_path(&path);
            let written = fingerprint(output, self.descriptor.inputs(), item)
                .and_then(|fp| write_sidecar(&sidecar, &fp));
            match written {
                Ok(()) => report.written.push(sidecar),
                Err(err) => {
                    warn!(output = output.name, err = %err, "failed to write fingerprint");
                    report.failed.push((path, err.to_string()));
                }
            }
        }
        report
    }
}
