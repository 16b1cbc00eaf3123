//! Subprocess execution.
//!
//! - `outcome`: the [`SkillOutcome`](outcome::SkillOutcome) every run produces.
//! - `runner`: the [`CommandRunner`](runner::CommandRunner) seam and the
//!   tokio-backed [`ProcessRunner`](runner::ProcessRunner).

pub mod outcome;
pub mod runner;
