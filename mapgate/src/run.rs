//! Gate, execute, commit.

use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use crate::core::descriptor::WorkItem;
use crate::io::gate::{CacheGate, CacheOptions, CommitReport, GateDecision};

/// The action a work item performs when the gate lets it run.
pub trait Execute {
    type Output;

    fn execute(&self) -> Result<Self::Output>;
}

/// Result of [`run_cached`].
#[derive(Debug)]
pub enum RunOutcome<O> {
    /// Every cached output was present with a matching fingerprint.
    UpToDate,
    Ran {
        /// Why the gate let the item run.
        decision: GateDecision,
        output: O,
        commit: CommitReport,
    },
}

impl<O> RunOutcome<O> {
    pub fn ran(&self) -> bool {
        matches!(self, RunOutcome::Ran { .. })
    }
}

/// Run `item` unless the gate reports it up to date; commit fingerprints
/// after a successful execution.
///
/// A failed execution is returned as an error and nothing is committed.
#[instrument(skip_all, fields(item = item.name()))]
pub fn run_cached<T: WorkItem + Execute>(
    item: &T,
    gate: &CacheGate<T>,
    options: &CacheOptions,
) -> Result<RunOutcome<T::Output>> {
    let decision = gate.decide(item, options);
    if !decision.should_run() {
        info!("up to date, skipping");
        return Ok(RunOutcome::UpToDate);
    }

    info!(reason = %decision, "running");
    let output = item
        .execute()
        .with_context(|| format!("execute {}", item.name()))?;
    let commit = gate.commit(item, options);
    if !commit.failed.is_empty() {
        warn!(failed = commit.failed.len(), "some fingerprints were not recorded");
    }
    Ok(RunOutcome::Ran {
        decision,
        output,
        commit,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::fs;
    use std::path::PathBuf;

    use anyhow::bail;

    use super::*;
    use crate::core::descriptor::{Descriptor, TrackedInput};

    struct Counter {
        input: PathBuf,
        output: PathBuf,
        runs: Cell<u32>,
        fail: bool,
    }

    impl WorkItem for Counter {
        fn name(&self) -> &str {
            "counter"
        }

        fn descriptor() -> Descriptor<Self> {
            Descriptor::new()
                .cached_output("output", |c: &Counter| c.output.clone())
                .input(TrackedInput::file("input", |c: &Counter| Some(c.input.clone())))
        }
    }

    impl Execute for Counter {
        type Output = u32;

        fn execute(&self) -> Result<u32> {
            if self.fail {
                fs::write(&self.output, "partial")?;
                bail!("boom");
            }
            self.runs.set(self.runs.get() + 1);
            fs::copy(&self.input, &self.output)?;
            Ok(self.runs.get())
        }
    }

    fn counter(root: &std::path::Path, fail: bool) -> Counter {
        fs::write(root.join("in"), "data").expect("input");
        Counter {
            input: root.join("in"),
            output: root.join("out"),
            runs: Cell::new(0),
            fail,
        }
    }

    #[test]
    fn second_run_is_skipped() {
        let temp = tempfile::tempdir().expect("tempdir");
        let item = counter(temp.path(), false);
        let gate = CacheGate::new();
        let options = CacheOptions::default();

        let first = run_cached(&item, &gate, &options).expect("first");
        assert!(first.ran());
        let second = run_cached(&item, &gate, &options).expect("second");
        assert!(!second.ran());
        assert_eq!(item.runs.get(), 1);
    }

    #[test]
    fn failed_execution_commits_nothing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let item = counter(temp.path(), true);
        let gate = CacheGate::new();

        let err = run_cached(&item, &gate, &CacheOptions::default()).expect_err("fails");
        assert!(format!("{err:#}").contains("boom"));
        assert!(!temp.path().join("out.sha256").exists());

        // The partial output has no fingerprint, so the next check removes it.
        let decision = gate.decide(&item, &CacheOptions::default());
        assert!(matches!(decision, GateDecision::MissingSidecar { .. }));
        assert!(!item.output.exists());
    }
}
