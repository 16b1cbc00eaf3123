#![forbid(unsafe_code)]

//! `denovibe`: DevOps boilerplate library.
//!
//! Shared by the `denovibe` server binary (HTTP routes or MCP tools on
//! stdio) and the `denovibe-agent` skill CLI.

pub mod agent;
pub mod config;
pub mod errors;
pub mod http;
pub mod mcp;
pub mod mode;
pub mod process;
pub mod skills;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
