//! `denovibe-agent` command-line surface.
//!
//! Parses `--skill <id>` plus per-skill flags and maps them onto [`Skills`].
//! The binary's exit code is the resulting outcome's exit code, so the CLI
//! composes in CI pipelines.

use std::path::PathBuf;

use clap::Parser;

use crate::process::outcome::SkillOutcome;
use crate::process::runner::CommandRunner;
use crate::skills::Skills;

const SKILLS_HELP: &str = "\
SKILLS
  deno-test     Run the test suite
    --filter <pattern>   Filter tests by name
    --coverage           Collect coverage into coverage/

  deno-lint     Lint source code
    --fix                Also auto-format with deno fmt

  deno-fmt      Format source code
    --check              Check only (exit non-zero if unformatted)

  deno-check    Type-check the project

  deno-release  Create and push a versioned release
    --version <semver>   Version to release (required)
    --prerelease         Mark as pre-release

EXAMPLES
  denovibe-agent --skill deno-test
  denovibe-agent --skill deno-test --filter router --coverage
  denovibe-agent --skill deno-lint --fix
  denovibe-agent --skill deno-fmt --check
  denovibe-agent --skill deno-check
  denovibe-agent --skill deno-release --version 1.2.3";

/// Command-line arguments for `denovibe-agent`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "denovibe-agent",
    about = "denovibe-agent: run project skills from the command line",
    after_help = SKILLS_HELP,
    long_about = None
)]
pub struct AgentArgs {
    /// Skill to run.
    #[arg(short = 's', long)]
    pub skill: Option<String>,

    /// Filter tests by name (deno-test).
    #[arg(long)]
    pub filter: Option<String>,

    /// Collect coverage (deno-test).
    #[arg(long)]
    pub coverage: bool,

    /// Auto-format after a clean lint run (deno-lint).
    #[arg(long)]
    pub fix: bool,

    /// Check formatting only (deno-fmt).
    #[arg(long)]
    pub check: bool,

    /// Version to release (deno-release).
    #[arg(long)]
    pub version: Option<String>,

    /// Mark the release as a pre-release (deno-release).
    #[arg(long)]
    pub prerelease: bool,

    /// Path to an optional TOML configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Skill identifiers accepted by `--skill`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillId {
    /// `deno-test`
    DenoTest,
    /// `deno-lint`
    DenoLint,
    /// `deno-fmt`
    DenoFmt,
    /// `deno-check`
    DenoCheck,
    /// `deno-release`
    DenoRelease,
}

impl SkillId {
    /// All skills in help order.
    pub const ALL: [Self; 5] = [
        Self::DenoTest,
        Self::DenoLint,
        Self::DenoFmt,
        Self::DenoCheck,
        Self::DenoRelease,
    ];

    /// Command-line id.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DenoTest => "deno-test",
            Self::DenoLint => "deno-lint",
            Self::DenoFmt => "deno-fmt",
            Self::DenoCheck => "deno-check",
            Self::DenoRelease => "deno-release",
        }
    }

    /// Look up a skill by its command-line id.
    #[must_use]
    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|skill| skill.as_str() == id)
    }
}

/// What the parsed arguments ask the binary to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Print usage and exit 0.
    Help,
    /// Report an unknown skill id and exit 1.
    UnknownSkill(String),
    /// Run a skill.
    Run(SkillId),
}

impl AgentArgs {
    /// Resolve `--skill` into an [`Invocation`]. A missing skill means help.
    #[must_use]
    pub fn invocation(&self) -> Invocation {
        match self.skill.as_deref() {
            None | Some("") => Invocation::Help,
            Some(id) => SkillId::parse(id).map_or_else(
                || Invocation::UnknownSkill(id.to_owned()),
                Invocation::Run,
            ),
        }
    }
}

/// Message printed for an unrecognised `--skill` value.
#[must_use]
pub fn unknown_skill_message(id: &str) -> String {
    let valid: Vec<&str> = SkillId::ALL.iter().map(|skill| skill.as_str()).collect();
    format!("Unknown skill: \"{id}\". Valid skills: {}", valid.join(", "))
}

/// Run `skill` with the flags in `args`.
pub async fn run_skill<R: CommandRunner>(
    skills: &Skills<R>,
    skill: SkillId,
    args: &AgentArgs,
) -> SkillOutcome {
    match skill {
        SkillId::DenoTest => skills.test(args.filter.as_deref(), args.coverage).await,
        SkillId::DenoLint => skills.lint(args.fix).await,
        SkillId::DenoFmt => skills.fmt(args.check).await,
        SkillId::DenoCheck => skills.type_check().await,
        SkillId::DenoRelease => match args.version.as_deref() {
            Some(version) if !version.is_empty() => skills.release(version, args.prerelease).await,
            _ => SkillOutcome::failure(1, "Error: --version is required for deno-release"),
        },
    }
}
