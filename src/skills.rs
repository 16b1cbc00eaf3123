//! Skill handlers shared by the agent CLI and the MCP tool server.
//!
//! Each handler turns typed parameters into a fixed command line, runs it
//! through a [`CommandRunner`], and returns the resulting [`SkillOutcome`].
//! Two handlers compose several steps:
//!
//! - [`Skills::lint`] with `fix` formats only after a clean lint run.
//! - [`Skills::release`] validates the version, then tags, pushes, and
//!   dispatches the release workflow, stopping at the first failed step.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{info, info_span, warn, Instrument};

use crate::config::{CommandsConfig, GlobalConfig, ReleaseConfig};
use crate::process::outcome::SkillOutcome;
use crate::process::runner::CommandRunner;

/// Accepted release version shape: `1.2.3`, `v1.2.3`, `1.2.3-rc.1`, `1.2.3+build`.
///
/// Digits are ASCII only.
pub const SEMVER_PATTERN: &str = r"^v?([0-9]+\.[0-9]+\.[0-9]+([-+].+)?)$";

fn semver_regex() -> Option<&'static Regex> {
    static SEMVER: OnceLock<Option<Regex>> = OnceLock::new();
    SEMVER.get_or_init(|| Regex::new(SEMVER_PATTERN).ok()).as_ref()
}

/// Validate `version` and normalize it to a `v`-prefixed tag.
///
/// Returns `None` when `version` is not a semantic version.
#[must_use]
pub fn release_tag(version: &str) -> Option<String> {
    let captures = semver_regex()?.captures(version)?;
    captures.get(1).map(|core| format!("v{}", core.as_str()))
}

/// Skill handlers bound to a runner and the configured executables.
#[derive(Debug, Clone)]
pub struct Skills<R> {
    runner: R,
    commands: CommandsConfig,
    release: ReleaseConfig,
    coverage_dir: String,
}

impl<R: CommandRunner> Skills<R> {
    /// Bind handlers to `runner` using executables and release settings from `config`.
    #[must_use]
    pub fn new(runner: R, config: &GlobalConfig) -> Self {
        Self {
            runner,
            commands: config.commands.clone(),
            release: config.release.clone(),
            coverage_dir: config.test.coverage_dir.clone(),
        }
    }

    /// Access the underlying runner.
    #[must_use]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run `deno task test`, optionally collecting coverage and filtering by name.
    ///
    /// An empty filter is treated as no filter.
    pub async fn test(&self, filter: Option<&str>, coverage: bool) -> SkillOutcome {
        let mut cmd = self.deno(&["task", "test"]);
        if coverage {
            cmd.push(format!("--coverage={}", self.coverage_dir));
        }
        if let Some(filter) = filter.filter(|f| !f.is_empty()) {
            cmd.push("--filter".into());
            cmd.push(filter.to_owned());
        }
        self.runner
            .run(&cmd, None)
            .instrument(info_span!("skill", name = "test"))
            .await
    }

    /// Run `deno task lint`; with `fix`, follow a clean lint run with `deno fmt`.
    ///
    /// A failed lint run is returned unchanged and the format step is skipped.
    /// Otherwise the format step's status is authoritative.
    pub async fn lint(&self, fix: bool) -> SkillOutcome {
        let span = info_span!("skill", name = "lint", fix);
        async move {
            let lint = self.runner.run(&self.deno(&["task", "lint"]), None).await;
            if !fix || !lint.success {
                return lint;
            }

            let fmt = self.runner.run(&self.deno(&["fmt"]), None).await;
            SkillOutcome {
                success: fmt.success,
                output: SkillOutcome::join_outputs(&[&lint, &fmt]),
                exit_code: fmt.exit_code,
            }
        }
        .instrument(span)
        .await
    }

    /// Run `deno fmt --check` in check mode, otherwise `deno task fmt`.
    pub async fn fmt(&self, check: bool) -> SkillOutcome {
        let cmd = if check {
            self.deno(&["fmt", "--check"])
        } else {
            self.deno(&["task", "fmt"])
        };
        self.runner
            .run(&cmd, None)
            .instrument(info_span!("skill", name = "fmt", check))
            .await
    }

    /// Run `deno task check`.
    pub async fn type_check(&self) -> SkillOutcome {
        self.runner
            .run(&self.deno(&["task", "check"]), None)
            .instrument(info_span!("skill", name = "type_check"))
            .await
    }

    /// Run `deno task <task>` with extra arguments appended verbatim.
    pub async fn run_task(&self, task: &str, args: &[String]) -> SkillOutcome {
        let mut cmd = self.deno(&["task", task]);
        cmd.extend(args.iter().cloned());
        self.runner
            .run(&cmd, None)
            .instrument(info_span!("skill", name = "run_task", task))
            .await
    }

    /// Tag, push, and dispatch a release for `version`.
    ///
    /// An invalid version fails with exit code 1 before any subprocess runs.
    /// A failed tag step is returned verbatim; a failed push step returns the
    /// joined tag and push output with the push exit code. Once both succeed,
    /// the workflow dispatch step decides the overall status.
    pub async fn release(&self, version: &str, prerelease: bool) -> SkillOutcome {
        let Some(tag) = release_tag(version) else {
            warn!(version, "rejected release version");
            return SkillOutcome::failure(
                1,
                format!("Invalid semver version: \"{version}\". Expected format: 1.2.3 or v1.2.3"),
            );
        };

        let span = info_span!("skill", name = "release", tag = %tag, prerelease);
        async move {
            let tag_cmd = vec![
                self.commands.git.clone(),
                "tag".into(),
                "-a".into(),
                tag.clone(),
                "-m".into(),
                format!("Release {tag}"),
            ];
            let tagged = self.runner.run(&tag_cmd, None).await;
            if !tagged.success {
                return tagged;
            }

            let push_cmd = vec![
                self.commands.git.clone(),
                "push".into(),
                self.release.remote.clone(),
                tag.clone(),
            ];
            let pushed = self.runner.run(&push_cmd, None).await;
            if !pushed.success {
                return SkillOutcome {
                    success: false,
                    output: SkillOutcome::join_outputs(&[&tagged, &pushed]),
                    exit_code: pushed.exit_code,
                };
            }

            let mut workflow_cmd = vec![
                self.commands.gh.clone(),
                "workflow".into(),
                "run".into(),
                self.release.workflow.clone(),
                "--field".into(),
                format!("version={tag}"),
            ];
            if prerelease {
                workflow_cmd.push("--field".into());
                workflow_cmd.push("prerelease=true".into());
            }
            let dispatched = self.runner.run(&workflow_cmd, None).await;
            info!(success = dispatched.success, "release workflow dispatched");

            SkillOutcome {
                success: dispatched.success,
                output: SkillOutcome::join_outputs(&[&tagged, &pushed, &dispatched]),
                exit_code: dispatched.exit_code,
            }
        }
        .instrument(span)
        .await
    }

    fn deno(&self, args: &[&str]) -> Vec<String> {
        std::iter::once(self.commands.deno.clone())
            .chain(args.iter().map(|arg| (*arg).to_owned()))
            .collect()
    }
}
