//! Model Context Protocol tool server.
//!
//! - `codec`: newline framing of the stdio byte stream.
//! - `protocol`: JSON-RPC envelopes and tool result types.
//! - `registry`: the static tool catalog.
//! - `tools`: tool handlers over the shared skills.
//! - `dispatcher`: method routing.
//! - `transport`: the stdio request loop.

pub mod codec;
pub mod dispatcher;
pub mod protocol;
pub mod registry;
pub mod tools;
pub mod transport;
