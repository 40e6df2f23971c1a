//! I/O helpers for the bootstrap steps.

pub mod config;
pub mod environment;
pub mod installer;
pub mod launcher;
pub mod process;
pub mod runtime;
pub mod workdirs;
