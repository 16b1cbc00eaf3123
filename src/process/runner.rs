//! Subprocess runner.
//!
//! Executes an external program without a shell, captures both output
//! streams, and reports the result as a [`SkillOutcome`]. A non-zero exit is
//! ordinary data. A program that cannot be started at all is reported as a
//! distinguished failing outcome rather than an error:
//!
//! | Spawn failure         | Exit code |
//! |-----------------------|-----------|
//! | executable not found  | `127`     |
//! | permission denied     | `126`     |
//! | anything else         | `1`       |

use std::collections::HashMap;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info, warn};

use super::outcome::SkillOutcome;

/// Exit code reported when the executable does not exist.
pub const EXIT_NOT_FOUND: i32 = 127;
/// Exit code reported when the executable cannot be run.
pub const EXIT_PERMISSION_DENIED: i32 = 126;
/// Exit code reported for any other spawn failure, an empty command line, or
/// a child killed by a signal.
pub const EXIT_FAILURE: i32 = 1;

/// Environment variables layered over the inherited environment.
pub type EnvOverlay = HashMap<String, String>;

/// Seam between skill handlers and the operating system.
///
/// `command[0]` is the executable and the rest are its arguments. With an
/// overlay, each key replaces the same-named inherited variable; without one
/// the child inherits the environment unchanged. Implementations never fail:
/// every call resolves to exactly one [`SkillOutcome`].
pub trait CommandRunner: Send + Sync {
    /// Run `command` to completion and capture its result.
    fn run<'a>(
        &'a self,
        command: &'a [String],
        env: Option<&'a EnvOverlay>,
    ) -> Pin<Box<dyn Future<Output = SkillOutcome> + Send + 'a>>;
}

/// [`CommandRunner`] backed by [`tokio::process::Command`].
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    working_dir: Option<PathBuf>,
}

impl ProcessRunner {
    /// Runner whose children start in the current directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner whose children start in `dir`.
    #[must_use]
    pub fn with_working_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: Some(dir.into()),
        }
    }

    /// Configured working directory, if any.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }
}

impl CommandRunner for ProcessRunner {
    fn run<'a>(
        &'a self,
        command: &'a [String],
        env: Option<&'a EnvOverlay>,
    ) -> Pin<Box<dyn Future<Output = SkillOutcome> + Send + 'a>> {
        Box::pin(run_command(command, env, self.working_dir.as_deref()))
    }
}

/// Run `command` and wait for it to exit with both pipes fully drained.
///
/// stdout is concatenated before stderr; the combined text is decoded as
/// lossy UTF-8 and trailing whitespace is trimmed.
pub async fn run_command(
    command: &[String],
    env: Option<&EnvOverlay>,
    working_dir: Option<&Path>,
) -> SkillOutcome {
    let Some((program, args)) = command.split_first() else {
        return SkillOutcome::failure(EXIT_FAILURE, "failed to start: empty command line");
    };

    let mut cmd = Command::new(program);
    cmd.args(args)
        // stdin may be the JSON-RPC channel; children must never read it.
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if let Some(env) = env {
        cmd.envs(env);
    }
    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }

    debug!(program = %program, ?args, "spawning subprocess");

    match cmd.output().await {
        Ok(output) => {
            let exit_code = output.status.code().unwrap_or(EXIT_FAILURE);
            let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
            text.push_str(&String::from_utf8_lossy(&output.stderr));
            info!(program = %program, exit_code, "subprocess exited");
            SkillOutcome::from_exit(exit_code, &text)
        }
        Err(err) => {
            warn!(program = %program, %err, "failed to start subprocess");
            spawn_failure(program, &err)
        }
    }
}

fn spawn_failure(program: &str, err: &std::io::Error) -> SkillOutcome {
    let exit_code = match err.kind() {
        ErrorKind::NotFound => EXIT_NOT_FOUND,
        ErrorKind::PermissionDenied => EXIT_PERMISSION_DENIED,
        _ => EXIT_FAILURE,
    };
    SkillOutcome::failure(exit_code, format!("failed to start {program}: {err}"))
}
