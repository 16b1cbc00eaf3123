//! JSON-RPC method dispatch for the MCP tool server.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::mcp::protocol::JsonRpcRequest;
use crate::mcp::registry::ToolRegistry;
use crate::mcp::tools::call_tool;
use crate::process::runner::CommandRunner;
use crate::skills::Skills;
use crate::{AppError, Result};

/// MCP protocol revision announced by `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name announced by `initialize`.
pub const SERVER_NAME: &str = "denovibe-tools";

/// `tools/call` parameters.
#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

/// Routes decoded requests to protocol bookkeeping or to a tool.
///
/// Holds no per-request state; every call is independent of the previous one.
#[derive(Debug)]
pub struct McpDispatcher<R> {
    skills: Skills<R>,
    registry: ToolRegistry,
}

impl<R: CommandRunner> McpDispatcher<R> {
    /// Create a dispatcher over `skills` with the static tool catalog.
    #[must_use]
    pub fn new(skills: Skills<R>) -> Self {
        Self {
            skills,
            registry: ToolRegistry::new(),
        }
    }

    /// The tool catalog served by `tools/list`.
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// The skill handlers tools delegate to.
    #[must_use]
    pub fn skills(&self) -> &Skills<R> {
        &self.skills
    }

    /// Handle one request and produce its `result` value.
    ///
    /// # Errors
    ///
    /// - `AppError::MethodNotFound` for any method other than `initialize`,
    ///   `tools/list`, and `tools/call`.
    /// - `AppError::Mcp` when `tools/call` params lack a tool name.
    pub async fn dispatch(&self, request: &JsonRpcRequest) -> Result<Value> {
        match request.method.as_str() {
            "initialize" => Ok(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": { "name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION") },
            })),
            "tools/list" => Ok(self.registry.list_result()),
            "tools/call" => self.call(request.params.clone()).await,
            other => {
                debug!(method = other, "rejecting unknown method");
                Err(AppError::MethodNotFound(other.to_owned()))
            }
        }
    }

    async fn call(&self, params: Option<Value>) -> Result<Value> {
        let params = params
            .ok_or_else(|| AppError::Mcp("tools/call requires params with a tool name".into()))?;
        let params: CallToolParams = serde_json::from_value(params)
            .map_err(|err| AppError::Mcp(format!("invalid tools/call params: {err}")))?;

        let result = call_tool(
            &self.skills,
            &params.name,
            params.arguments.unwrap_or(Value::Null),
        )
        .await;

        Ok(serde_json::to_value(result)?)
    }
}
