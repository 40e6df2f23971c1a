//! Stable exit codes for the bootstrap binary.
//!
//! Failures of `venv` or `pip` exit with the tool's own status instead.

/// Sequence handed off and the server exited cleanly.
pub const OK: i32 = 0;
/// Runtime missing from `PATH` or older than the supported minimum.
pub const MISSING_RUNTIME: i32 = 1;
/// Bootstrap-internal failure with no tool status to propagate.
pub const FAILURE: i32 = 2;
/// A provisioning tool ran past its timeout and was killed.
pub const TIMED_OUT: i32 = 124;
/// Children terminated by signal `n` map to `SIGNAL_BASE + n`.
pub const SIGNAL_BASE: i32 = 128;
