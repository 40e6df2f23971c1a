//! Deterministic, pure logic shared by the bootstrap sequence.
//!
//! Core modules must be free of I/O side effects. They compute paths, arguments
//! and classifications that the `io` layer acts on.

pub mod layout;
pub mod target;
pub mod types;
pub mod version;
