//! Global configuration parsing and validation.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::{AppError, Result};

/// Executables the skill handlers shell out to.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct CommandsConfig {
    /// Deno binary used for test, lint, fmt, check, and task runs.
    #[serde(default = "default_deno")]
    pub deno: String,
    /// Git binary used to create and push release tags.
    #[serde(default = "default_git")]
    pub git: String,
    /// GitHub CLI binary used to trigger the release workflow.
    #[serde(default = "default_gh")]
    pub gh: String,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            deno: default_deno(),
            git: default_git(),
            gh: default_gh(),
        }
    }
}

/// Release pipeline settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ReleaseConfig {
    /// Git remote the release tag is pushed to.
    #[serde(default = "default_remote")]
    pub remote: String,
    /// Workflow file dispatched through `gh workflow run`.
    #[serde(default = "default_workflow")]
    pub workflow: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            remote: default_remote(),
            workflow: default_workflow(),
        }
    }
}

/// Test runner settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct TestConfig {
    /// Directory handed to `--coverage=` when coverage is requested.
    #[serde(default = "default_coverage_dir")]
    pub coverage_dir: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            coverage_dir: default_coverage_dir(),
        }
    }
}

fn default_deno() -> String {
    "deno".into()
}

fn default_git() -> String {
    "git".into()
}

fn default_gh() -> String {
    "gh".into()
}

fn default_remote() -> String {
    "origin".into()
}

fn default_workflow() -> String {
    "release.yml".into()
}

fn default_coverage_dir() -> String {
    "coverage/".into()
}

fn default_http_port() -> u16 {
    8000
}

fn default_workspace_root() -> PathBuf {
    PathBuf::from(".")
}

/// Global configuration parsed from an optional `denovibe.toml`.
///
/// Every field has a default, so an empty document is a valid config.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// HTTP port for the route server.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Working directory for every spawned subprocess.
    #[serde(default = "default_workspace_root")]
    pub workspace_root: PathBuf,
    /// Executable names.
    #[serde(default)]
    pub commands: CommandsConfig,
    /// Release pipeline settings.
    #[serde(default)]
    pub release: ReleaseConfig,
    /// Test runner settings.
    #[serde(default)]
    pub test: TestConfig,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string and normalize paths.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise build the all-defaults config.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::from_toml_str(""),
        }
    }

    /// Apply the `PORT` environment variable on top of the file value.
    ///
    /// An unparsable value is ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(raw) = env::var("PORT") {
            match raw.parse::<u16>() {
                Ok(port) => self.http_port = port,
                Err(err) => warn!(value = %raw, %err, "ignoring invalid PORT env var"),
            }
        }
    }

    fn validate(&mut self) -> Result<()> {
        for (field, value) in [
            ("commands.deno", &self.commands.deno),
            ("commands.git", &self.commands.git),
            ("commands.gh", &self.commands.gh),
            ("release.remote", &self.release.remote),
            ("release.workflow", &self.release.workflow),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Config(format!("{field} must not be empty")));
            }
        }

        let canonical_root = self
            .workspace_root
            .canonicalize()
            .map_err(|err| AppError::Config(format!("workspace_root invalid: {err}")))?;
        self.workspace_root = canonical_root;

        Ok(())
    }
}
