//! Crate-wide error type and the JSON-RPC codes it maps onto.

use std::fmt::{Display, Formatter};

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AppError>;

/// JSON-RPC 2.0 error code: invalid JSON was received.
pub const PARSE_ERROR: i64 = -32700;
/// JSON-RPC 2.0 error code: the JSON sent is not a valid request object.
pub const INVALID_REQUEST: i64 = -32600;
/// JSON-RPC 2.0 error code: the method does not exist.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// JSON-RPC 2.0 error code: internal error while handling the request.
pub const INTERNAL_ERROR: i64 = -32603;

/// Every failure the server binary and the agent CLI can report.
#[derive(Debug)]
pub enum AppError {
    /// Unreadable, unparsable, or invalid configuration.
    Config(String),
    /// Malformed `tools/call` params or another dispatch failure.
    Mcp(String),
    /// A JSON-RPC method outside the supported set was requested.
    MethodNotFound(String),
    /// Stdio framing failure (over-long or non-UTF-8 line).
    Framing(String),
    /// HTTP server failure.
    Http(String),
    /// Stdio or file-system failure.
    Io(String),
}

impl AppError {
    /// JSON-RPC error code reported when this error crosses the protocol boundary.
    ///
    /// Everything other than an unknown method or a framing failure is an
    /// internal error from the peer's point of view.
    #[must_use]
    pub fn json_rpc_code(&self) -> i64 {
        match self {
            Self::MethodNotFound(_) => METHOD_NOT_FOUND,
            Self::Framing(_) => PARSE_ERROR,
            _ => INTERNAL_ERROR,
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Mcp(msg) => write!(f, "mcp: {msg}"),
            Self::MethodNotFound(method) => write!(f, "Method not found: {method}"),
            Self::Framing(msg) => write!(f, "framing: {msg}"),
            Self::Http(msg) => write!(f, "http: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Mcp(format!("json: {err}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
