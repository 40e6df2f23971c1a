//! Idempotent bootstrap for the local Task Scheduler service.
//!
//! Brings a workstation from "unknown state" to "server running": checks the
//! runtime, provisions an isolated environment, installs dependencies, creates
//! working directories and hands off to the server. The architecture keeps a
//! strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (steps, layout, launch target,
//!   versions). No I/O.
//! - **[`io`]**: Side-effecting operations (config, child processes, runtime
//!   resolution, environment, installer, directories, launcher).
//!
//! [`sequence`] drives the steps over a [`toolchain::Toolchain`], which tests
//! replace with a scripted double.

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod sequence;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod toolchain;
