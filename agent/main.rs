#![forbid(unsafe_code)]

//! `denovibe-agent` runs project skills (test, lint, fmt, check, release)
//! from the command line or CI.
//!
//! Exits with the underlying subprocess's exit code.

use std::process;

use clap::{CommandFactory, Parser};
use tracing_subscriber::{fmt, EnvFilter};

use denovibe::agent::{run_skill, unknown_skill_message, AgentArgs, Invocation};
use denovibe::config::GlobalConfig;
use denovibe::process::runner::ProcessRunner;
use denovibe::skills::Skills;

fn main() {
    let args = AgentArgs::parse();
    init_tracing();

    let skill = match args.invocation() {
        Invocation::Help => {
            if let Err(err) = AgentArgs::command().print_help() {
                eprintln!("failed to print help: {err}");
            }
            process::exit(0);
        }
        Invocation::UnknownSkill(id) => {
            eprintln!("{}", unknown_skill_message(&id));
            process::exit(1);
        }
        Invocation::Run(skill) => skill,
    };

    let config = match GlobalConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Error: failed to build tokio runtime: {err}");
            process::exit(1);
        }
    };

    let skills = Skills::new(
        ProcessRunner::with_working_dir(config.workspace_root.clone()),
        &config,
    );
    let outcome = runtime.block_on(run_skill(&skills, skill, &args));

    if !outcome.output.is_empty() {
        println!("{}", outcome.output);
    }
    process::exit(outcome.exit_code);
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
