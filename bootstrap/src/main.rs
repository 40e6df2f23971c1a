//! Local bootstrap for the Task Scheduler service.
//!
//! Run from the project root. Provisions `venv/`, installs `requirements.txt`,
//! creates `data/`, `logs/` and `scripts/`, then hands off to
//! `uvicorn app.main:app` on `0.0.0.0:8000` with reload enabled.

use anyhow::{Context, Result};
use clap::Parser;

use bootstrap::error::exit_code_for;
use bootstrap::io::config::{CONFIG_FILE, load_config};
use bootstrap::logging;
use bootstrap::sequence::run_sequence;
use bootstrap::toolchain::SystemToolchain;

#[derive(Parser)]
#[command(
    name = "bootstrap",
    version,
    about = "Provision the local environment and start the Task Scheduler server"
)]
struct Cli {}

fn main() {
    let _cli = Cli::parse();
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("bootstrap: {:#}", err);
            std::process::exit(exit_code_for(&err));
        }
    }
}

fn run() -> Result<i32> {
    let root = std::env::current_dir().context("resolve invocation directory")?;
    let config = load_config(&root.join(CONFIG_FILE))?;
    let toolchain = SystemToolchain::new(config);
    let outcome = run_sequence(&root, &toolchain)?;
    Ok(outcome.exit_code)
}
