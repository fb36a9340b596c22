//! Content-addressed build caching and rename-table generation.
//!
//! The crate keeps the usual split:
//!
//! - **[`core`]**: Pure logic (mapping-record parsing and rewriting, work-item
//!   descriptors, fingerprint tokens). No I/O.
//! - **[`io`]**: Side-effecting operations (hashing, sidecar files, the cache
//!   gate, dictionary loading, streaming table transforms, config).
//!
//! [`run`] ties a gate to a work item's execution and [`gen_srg`] defines the
//! rename-table work item driven by the CLI.

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod gen_srg;
pub mod io;
pub mod logging;
pub mod run;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
