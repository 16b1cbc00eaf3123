//! Structured result of running an external program.

use serde::{Deserialize, Serialize};

/// Result returned by every subprocess run and every skill handler.
///
/// `success` is always `exit_code == 0`, independent of `output`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillOutcome {
    /// Whether the program exited with status zero.
    pub success: bool,
    /// Captured stdout followed by stderr, trailing whitespace trimmed.
    pub output: String,
    /// Process exit code.
    pub exit_code: i32,
}

impl SkillOutcome {
    /// Build an outcome from an exit code and raw captured text.
    #[must_use]
    pub fn from_exit(exit_code: i32, output: &str) -> Self {
        Self {
            success: exit_code == 0,
            output: output.trim_end().to_owned(),
            exit_code,
        }
    }

    /// Build a failing outcome that never reached a subprocess.
    #[must_use]
    pub fn failure(exit_code: i32, message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: message.into(),
            exit_code,
        }
    }

    /// Join the outputs of sequential steps with `\n`, dropping empty ones.
    #[must_use]
    pub fn join_outputs(steps: &[&Self]) -> String {
        steps
            .iter()
            .map(|step| step.output.as_str())
            .filter(|output| !output.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
