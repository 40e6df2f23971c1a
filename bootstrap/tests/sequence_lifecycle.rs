//! Sequence-level tests for bootstrap idempotence and failure handling.
//!
//! These tests drive `run_sequence` with a scripted toolchain across repeated
//! invocations on the same root, the way an operator re-runs the bootstrap
//! after fixing a failure.

use std::fs;
use std::path::PathBuf;

use bootstrap::error::exit_code_for;
use bootstrap::exit_codes;
use bootstrap::sequence::run_sequence;
use bootstrap::test_support::{CreateBehavior, ScriptedToolchain, TestWorkspace, ToolCall};

fn is_launch(call: &ToolCall) -> bool {
    matches!(call, ToolCall::Launch { .. })
}

/// Fresh machine: environment, dependencies and all working directories are
/// provisioned, then the server is launched on the fixed address with reload.
#[test]
fn fresh_root_is_fully_provisioned_then_launched() {
    let ws = TestWorkspace::new().expect("workspace");
    let layout = ws.layout();
    let toolchain = ScriptedToolchain::new();

    let outcome = run_sequence(ws.path(), &toolchain).expect("sequence");

    assert_eq!(outcome.exit_code, exit_codes::OK);
    assert_eq!(outcome.report.runtime, Some(PathBuf::from("/usr/bin/python3")));
    assert!(outcome.report.environment_created);
    assert!(outcome.report.dependencies_installed);
    assert_eq!(outcome.report.directories_created, layout.working_dirs);
    assert!(layout.interpreter_path().is_file());
    assert_eq!(
        ws.entries().expect("entries"),
        vec!["data", "logs", "requirements.txt", "scripts", "venv"]
    );

    assert_eq!(
        toolchain.calls(),
        vec![
            ToolCall::ResolveRuntime,
            ToolCall::CreateEnvironment,
            ToolCall::InstallDependencies {
                manifest: layout.manifest_path.clone(),
            },
            ToolCall::Launch {
                args: vec![
                    "-m".to_string(),
                    "uvicorn".to_string(),
                    "app.main:app".to_string(),
                    "--host".to_string(),
                    "0.0.0.0".to_string(),
                    "--port".to_string(),
                    "8000".to_string(),
                    "--reload".to_string(),
                ],
                workdir: ws.path().to_path_buf(),
            },
        ]
    );
}

/// Second invocation with nothing changed: same final state, strictly fewer
/// provisioning actions, straight through to launch.
#[test]
fn second_run_skips_environment_and_directory_creation() {
    let ws = TestWorkspace::new().expect("workspace");

    let first = ScriptedToolchain::new();
    run_sequence(ws.path(), &first).expect("first run");
    let entries_after_first = ws.entries().expect("entries");

    let second = ScriptedToolchain::new();
    let outcome = run_sequence(ws.path(), &second).expect("second run");

    assert!(!outcome.report.environment_created);
    assert!(outcome.report.directories_created.is_empty());
    assert_eq!(ws.entries().expect("entries"), entries_after_first);
    assert!(second.provisioning_actions() < first.provisioning_actions());
    assert!(!second.calls().contains(&ToolCall::CreateEnvironment));
    assert!(second.calls().last().is_some_and(is_launch));
}

/// A missing runtime short-circuits everything: no environment, no working
/// directories, no installation attempt, exit code 1.
#[test]
fn missing_runtime_fails_before_any_side_effect() {
    let ws = TestWorkspace::new().expect("workspace");
    let toolchain = ScriptedToolchain::new().without_runtime();

    let err = run_sequence(ws.path(), &toolchain).unwrap_err();

    assert_eq!(exit_code_for(&err), exit_codes::MISSING_RUNTIME);
    assert_eq!(toolchain.calls(), vec![ToolCall::ResolveRuntime]);
    assert_eq!(ws.entries().expect("entries"), vec!["requirements.txt"]);
}

/// Install fails after the environment was created; the re-run does not
/// recreate the environment and retries from installation onward.
#[test]
fn failed_install_resumes_without_recreating_environment() {
    let ws = TestWorkspace::new().expect("workspace");
    let layout = ws.layout();

    let failing = ScriptedToolchain::new().failing_install(3);
    let err = run_sequence(ws.path(), &failing).unwrap_err();
    assert_eq!(exit_code_for(&err), 3);
    assert!(layout.environment_dir.is_dir());
    assert!(layout.working_dirs.iter().all(|dir| !dir.exists()));
    assert!(!failing.calls().iter().any(is_launch));

    let retry = ScriptedToolchain::new();
    let outcome = run_sequence(ws.path(), &retry).expect("retry");
    assert!(!outcome.report.environment_created);
    assert!(outcome.report.dependencies_installed);
    assert_eq!(outcome.report.directories_created, layout.working_dirs);
    assert_eq!(
        retry.calls()[..2],
        [
            ToolCall::ResolveRuntime,
            ToolCall::InstallDependencies {
                manifest: layout.manifest_path.clone(),
            },
        ]
    );
}

/// An installer failure propagates the installer's own code, not 1.
#[test]
fn install_failure_code_is_propagated_verbatim() {
    let ws = TestWorkspace::new().expect("workspace");
    let toolchain = ScriptedToolchain::new().failing_install(2);

    let err = run_sequence(ws.path(), &toolchain).unwrap_err();

    assert_eq!(exit_code_for(&err), 2);
    assert_ne!(exit_code_for(&err), exit_codes::MISSING_RUNTIME);
}

/// Environment creation failure stops the sequence with the tool's code and
/// leaves nothing to clean up; the next run tries creation again.
#[test]
fn failed_environment_creation_is_retried_next_run() {
    let ws = TestWorkspace::new().expect("workspace");
    let layout = ws.layout();

    let failing = ScriptedToolchain::new().with_create(CreateBehavior::Fail(4));
    let err = run_sequence(ws.path(), &failing).unwrap_err();
    assert_eq!(exit_code_for(&err), 4);
    assert!(!layout.environment_dir.exists());
    assert_eq!(
        failing.calls(),
        vec![ToolCall::ResolveRuntime, ToolCall::CreateEnvironment]
    );

    let retry = ScriptedToolchain::new();
    let outcome = run_sequence(ws.path(), &retry).expect("retry");
    assert!(outcome.report.environment_created);
}

/// An interrupted creation that left the directory behind is not recreated;
/// activation reports the missing interpreter instead.
#[test]
fn partially_created_environment_is_reported_not_recreated() {
    let ws = TestWorkspace::new().expect("workspace");
    let layout = ws.layout();

    let interrupted = ScriptedToolchain::new().with_create(CreateBehavior::FailLeavingDir(1));
    run_sequence(ws.path(), &interrupted).unwrap_err();
    assert!(layout.environment_dir.is_dir());

    let rerun = ScriptedToolchain::new();
    let err = run_sequence(ws.path(), &rerun).unwrap_err();
    assert_eq!(exit_code_for(&err), exit_codes::FAILURE);
    assert!(format!("{err:#}").contains("environment interpreter missing"));
    assert_eq!(rerun.calls(), vec![ToolCall::ResolveRuntime]);
}

/// Pre-existing working directories keep their contents.
#[test]
fn existing_working_directories_are_left_untouched() {
    let ws = TestWorkspace::new().expect("workspace");
    let layout = ws.layout();
    for dir in &layout.working_dirs {
        fs::create_dir(dir).expect("pre-create");
        fs::write(dir.join("keep.txt"), "keep").expect("write");
    }

    let outcome = run_sequence(ws.path(), &ScriptedToolchain::new()).expect("sequence");

    assert!(outcome.report.directories_created.is_empty());
    for dir in &layout.working_dirs {
        let contents = fs::read_to_string(dir.join("keep.txt")).expect("read");
        assert_eq!(contents, "keep");
    }
}

/// The server's exit code becomes the invocation's exit code.
#[test]
fn server_exit_code_is_the_sequence_exit_code() {
    let ws = TestWorkspace::new().expect("workspace");
    let toolchain = ScriptedToolchain::new().with_launch_exit(137);

    let outcome = run_sequence(ws.path(), &toolchain).expect("sequence");

    assert_eq!(outcome.exit_code, 137);
}
