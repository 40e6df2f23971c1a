//! Classified failures of the bootstrap sequence.
//!
//! Plumbing errors travel as `anyhow::Error`; a [`SequenceError`] somewhere in
//! the chain decides the process exit code.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::types::Step;
use crate::core::version::{RUNTIME_NAME, RuntimeVersion};
use crate::exit_codes;

#[derive(Debug, Error)]
pub enum SequenceError {
    #[error(
        "{} {minimum} or newer is required, but none of [{}] was found on PATH",
        RUNTIME_NAME,
        .tried.join(", ")
    )]
    MissingRuntime {
        tried: Vec<String>,
        minimum: RuntimeVersion,
    },

    #[error(
        "{} {minimum} or newer is required, but {} reports {found}",
        RUNTIME_NAME,
        .path.display()
    )]
    UnsupportedRuntime {
        path: PathBuf,
        found: RuntimeVersion,
        minimum: RuntimeVersion,
    },

    #[error("{step}: {tool} exited with status {code}")]
    ToolFailed { step: Step, tool: String, code: i32 },

    #[error("{step}: {tool} timed out after {secs}s")]
    TimedOut { step: Step, tool: String, secs: u64 },

    #[error(
        "{}: environment interpreter missing at {} (delete the environment directory to recreate it)",
        Step::ActivateEnvironment,
        .interpreter.display()
    )]
    CorruptEnvironment { interpreter: PathBuf },

    #[error("{step}: cannot create {}", .path.display())]
    Filesystem {
        step: Step,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{step}: failed to start {tool}")]
    Spawn {
        step: Step,
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

impl SequenceError {
    pub fn exit_code(&self) -> i32 {
        match self {
            SequenceError::MissingRuntime { .. } | SequenceError::UnsupportedRuntime { .. } => {
                exit_codes::MISSING_RUNTIME
            }
            SequenceError::ToolFailed { code, .. } => *code,
            SequenceError::TimedOut { .. } => exit_codes::TIMED_OUT,
            SequenceError::CorruptEnvironment { .. }
            | SequenceError::Filesystem { .. }
            | SequenceError::Spawn { .. } => exit_codes::FAILURE,
        }
    }
}

/// Exit code for an error chain: the first [`SequenceError`] wins, anything
/// else is [`exit_codes::FAILURE`].
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<SequenceError>())
        .map_or(exit_codes::FAILURE, SequenceError::exit_code)
}
