//! Shared test doubles for the skill and dispatch layers.
//!
//! [`StubRunner`] records every command line it is asked to run and answers
//! with scripted outcomes, so handler tests never touch real subprocesses.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use denovibe::config::GlobalConfig;
use denovibe::mcp::dispatcher::McpDispatcher;
use denovibe::process::outcome::SkillOutcome;
use denovibe::process::runner::{CommandRunner, EnvOverlay};
use denovibe::skills::Skills;

/// Scripted [`CommandRunner`]. Unscripted calls succeed with empty output.
#[derive(Debug, Default)]
pub struct StubRunner {
    responses: Mutex<VecDeque<SkillOutcome>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl StubRunner {
    pub fn new(responses: Vec<SkillOutcome>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Command lines received so far, in order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for StubRunner {
    fn run<'a>(
        &'a self,
        command: &'a [String],
        _env: Option<&'a EnvOverlay>,
    ) -> Pin<Box<dyn Future<Output = SkillOutcome> + Send + 'a>> {
        self.calls.lock().unwrap().push(command.to_vec());
        let outcome = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| SkillOutcome::from_exit(0, ""));
        Box::pin(async move { outcome })
    }
}

/// Runner whose every call panics, to exercise the dispatch boundary.
#[derive(Debug, Default)]
pub struct PanickingRunner;

impl CommandRunner for PanickingRunner {
    fn run<'a>(
        &'a self,
        command: &'a [String],
        _env: Option<&'a EnvOverlay>,
    ) -> Pin<Box<dyn Future<Output = SkillOutcome> + Send + 'a>> {
        let program = command.first().cloned().unwrap_or_default();
        Box::pin(async move { explode(&program) })
    }
}

fn explode(program: &str) -> SkillOutcome {
    panic!("runner exploded while starting {program}")
}

pub fn ok(output: &str) -> SkillOutcome {
    SkillOutcome::from_exit(0, output)
}

pub fn fail(exit_code: i32, output: &str) -> SkillOutcome {
    SkillOutcome::from_exit(exit_code, output)
}

pub fn default_config() -> GlobalConfig {
    GlobalConfig::load(None).expect("default config is valid")
}

pub fn stub_skills(responses: Vec<SkillOutcome>) -> Skills<StubRunner> {
    Skills::new(StubRunner::new(responses), &default_config())
}

pub fn stub_dispatcher(responses: Vec<SkillOutcome>) -> Arc<McpDispatcher<StubRunner>> {
    Arc::new(McpDispatcher::new(stub_skills(responses)))
}

pub fn panicking_dispatcher() -> Arc<McpDispatcher<PanickingRunner>> {
    Arc::new(McpDispatcher::new(Skills::new(
        PanickingRunner,
        &default_config(),
    )))
}

/// `["deno", ...]` as owned strings.
pub fn deno(args: &[&str]) -> Vec<String> {
    std::iter::once("deno")
        .chain(args.iter().copied())
        .map(str::to_owned)
        .collect()
}
