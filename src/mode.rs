//! Server mode: which surface the `denovibe` process serves.
//!
//! `ServerMode` is used as the `--mode` CLI flag value.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Top-level serving mode.
///
/// Passed as `--mode` on the command line. Defaults to [`ServerMode::Http`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerMode {
    /// Static HTTP route table. Default mode.
    #[default]
    Http,
    /// MCP tool server speaking line-delimited JSON-RPC on stdio.
    Mcp,
}
