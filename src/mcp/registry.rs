//! Static tool catalog.
//!
//! [`ToolName`] is the single source of truth: the catalog returned by
//! `tools/list` and the routing in [`crate::mcp::tools::call_tool`] are both
//! derived from it, so neither side can carry a dangling entry.

use serde::Serialize;
use serde_json::{json, Value};

/// Every tool the server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    /// `run_tests(filter?, coverage?)`
    RunTests,
    /// `run_lint(fix?)`
    RunLint,
    /// `run_fmt(check?)`
    RunFmt,
    /// `type_check()`
    TypeCheck,
    /// `get_routes()`
    GetRoutes,
    /// `run_task(task, args?)`
    RunTask,
}

impl ToolName {
    /// All tools in catalog order.
    pub const ALL: [Self; 6] = [
        Self::RunTests,
        Self::RunLint,
        Self::RunFmt,
        Self::TypeCheck,
        Self::GetRoutes,
        Self::RunTask,
    ];

    /// Wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RunTests => "run_tests",
            Self::RunLint => "run_lint",
            Self::RunFmt => "run_fmt",
            Self::TypeCheck => "type_check",
            Self::GetRoutes => "get_routes",
            Self::RunTask => "run_task",
        }
    }

    /// Exact-match lookup by wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "run_tests" => Some(Self::RunTests),
            "run_lint" => Some(Self::RunLint),
            "run_fmt" => Some(Self::RunFmt),
            "type_check" => Some(Self::TypeCheck),
            "get_routes" => Some(Self::GetRoutes),
            "run_task" => Some(Self::RunTask),
            _ => None,
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::RunTests => {
                "Run Deno tests using `deno task test`. Returns the combined output and exit code."
            }
            Self::RunLint => {
                "Run the Deno linter using `deno task lint`. With fix=true, a clean lint run is \
                 followed by `deno fmt`."
            }
            Self::RunFmt => {
                "Run the Deno formatter. Use check=true to verify formatting without modifying files."
            }
            Self::TypeCheck => {
                "Run TypeScript type checking via `deno task check`. Returns type errors if any."
            }
            Self::GetRoutes => "Return all HTTP routes served by the app with their method and path.",
            Self::RunTask => "Run any Deno task by name with optional additional arguments.",
        }
    }

    fn input_schema(self) -> Value {
        match self {
            Self::RunTests => json!({
                "type": "object",
                "properties": {
                    "filter": { "type": "string", "description": "Filter tests by name pattern" },
                    "coverage": { "type": "boolean", "description": "Enable coverage collection" }
                }
            }),
            Self::RunLint => json!({
                "type": "object",
                "properties": {
                    "fix": { "type": "boolean", "description": "Auto-format after a clean lint run" }
                }
            }),
            Self::RunFmt => json!({
                "type": "object",
                "properties": {
                    "check": { "type": "boolean", "description": "Check formatting without modifying files" }
                }
            }),
            Self::TypeCheck | Self::GetRoutes => json!({
                "type": "object",
                "properties": {}
            }),
            Self::RunTask => json!({
                "type": "object",
                "required": ["task"],
                "properties": {
                    "task": { "type": "string", "description": "Deno task name to run" },
                    "args": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Additional arguments to pass to the task"
                    }
                }
            }),
        }
    }
}

/// Catalog entry advertised through `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema of the `arguments` object.
    pub input_schema: Value,
}

impl From<ToolName> for ToolDescriptor {
    fn from(tool: ToolName) -> Self {
        Self {
            name: tool.as_str().to_owned(),
            description: tool.description().to_owned(),
            input_schema: tool.input_schema(),
        }
    }
}

/// Immutable catalog built once at startup.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
}

impl ToolRegistry {
    /// Build the catalog from [`ToolName::ALL`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: ToolName::ALL.into_iter().map(ToolDescriptor::from).collect(),
        }
    }

    /// Descriptors in catalog order.
    #[must_use]
    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// Descriptor for `name`, if registered.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|tool| tool.name == name)
    }

    /// `tools/list` result payload.
    #[must_use]
    pub fn list_result(&self) -> Value {
        json!({ "tools": self.tools })
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
