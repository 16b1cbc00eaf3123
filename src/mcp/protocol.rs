//! JSON-RPC 2.0 envelopes and MCP tool result types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::process::outcome::SkillOutcome;

/// Version string carried on every response.
pub const JSONRPC_VERSION: &str = "2.0";

/// Method-name prefix marking fire-and-forget notifications.
pub const NOTIFICATION_PREFIX: &str = "notifications/";

/// Inbound request (or notification) decoded from one line.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version; accepted but not enforced.
    #[serde(default)]
    pub jsonrpc: Option<String>,
    /// Correlation id; `null` when absent.
    #[serde(default)]
    pub id: Value,
    /// Method name.
    pub method: String,
    /// Method parameters.
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Whether the peer expects no response.
    #[must_use]
    pub fn is_notification(&self) -> bool {
        self.method.starts_with(NOTIFICATION_PREFIX)
    }
}

/// Error object of a failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    /// JSON-RPC error code.
    pub code: i64,
    /// Human-readable description.
    pub message: String,
}

/// Outbound response. Exactly one of `result` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Always [`JSONRPC_VERSION`].
    pub jsonrpc: String,
    /// Echo of the request id.
    pub id: Value,
    /// Success payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Failure payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl JsonRpcResponse {
    /// Successful response carrying `result`.
    #[must_use]
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Error response.
    #[must_use]
    pub fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// One content block of a tool result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Plain text.
    Text {
        /// The text itself.
        text: String,
    },
}

/// Payload of a `tools/call` result.
///
/// `is_error` absent or `false` means the action succeeded. A failed action
/// is still a successful JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    /// Ordered content blocks.
    pub content: Vec<ToolContent>,
    /// Application-level failure flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl ToolResult {
    /// Successful result with a single text block and no `isError` flag.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: None,
        }
    }

    /// Failed result with a single text block.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: Some(true),
        }
    }

    /// Flatten a subprocess outcome into `"<label> (exit code: N)"` plus output.
    #[must_use]
    pub fn from_outcome(label: &str, outcome: &SkillOutcome) -> Self {
        let mut text = format!("{label} (exit code: {})", outcome.exit_code);
        if !outcome.output.is_empty() {
            text.push_str("\n\n");
            text.push_str(&outcome.output);
        }
        Self {
            content: vec![ToolContent::Text { text }],
            is_error: Some(!outcome.success),
        }
    }

    /// Concatenated text of all content blocks.
    #[must_use]
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .map(|block| match block {
                ToolContent::Text { text } => text.as_str(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether the action failed.
    #[must_use]
    pub fn failed(&self) -> bool {
        self.is_error.unwrap_or(false)
    }
}
