//! Stable exit codes for mapgate CLI commands.

/// Command succeeded; for `status`, every output is up to date.
pub const OK: i32 = 0;
/// Invalid config, malformed input, or any other failure.
pub const INVALID: i32 = 1;
/// `mapgate status` found the work item would run.
pub const STALE: i32 = 2;
