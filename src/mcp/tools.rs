//! MCP tool handlers.
//!
//! Each tool deserializes its `arguments`, delegates to a [`Skills`] handler,
//! and flattens the [`SkillOutcome`](crate::process::outcome::SkillOutcome)
//! into a [`ToolResult`]. Tool failures never become JSON-RPC errors: an
//! unknown tool name, unusable arguments, or a non-zero exit all produce a
//! result with `isError: true`.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info_span, Instrument};

use crate::http::router::ROUTES;
use crate::mcp::protocol::ToolResult;
use crate::mcp::registry::ToolName;
use crate::process::runner::CommandRunner;
use crate::skills::Skills;

/// `run_tests` arguments.
#[derive(Debug, Default, Deserialize)]
struct RunTestsInput {
    /// Test name filter; empty means no filter.
    filter: Option<String>,
    /// Collect coverage.
    coverage: Option<bool>,
}

/// `run_lint` arguments.
#[derive(Debug, Default, Deserialize)]
struct RunLintInput {
    /// Auto-format after a clean lint run.
    fix: Option<bool>,
}

/// `run_fmt` arguments.
#[derive(Debug, Default, Deserialize)]
struct RunFmtInput {
    /// Verify formatting only.
    check: Option<bool>,
}

/// `run_task` arguments.
#[derive(Debug, Deserialize)]
struct RunTaskInput {
    /// Deno task name.
    task: String,
    /// Extra arguments appended after the task name.
    #[serde(default)]
    args: Option<Vec<String>>,
}

/// Invoke the tool registered as `name` with `arguments`.
///
/// `arguments` of `null` is treated as an empty object.
pub async fn call_tool<R: CommandRunner>(
    skills: &Skills<R>,
    name: &str,
    arguments: Value,
) -> ToolResult {
    let Some(tool) = ToolName::from_name(name) else {
        debug!(tool = name, "unknown tool requested");
        return ToolResult::error(format!("Unknown tool: {name}"));
    };

    let arguments = match arguments {
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other,
    };

    let span = info_span!("tool_call", tool = tool.as_str());
    async move {
        match tool {
            ToolName::RunTests => match parse_args::<RunTestsInput>(tool, arguments) {
                Ok(input) => run_tests(skills, input).await,
                Err(result) => result,
            },
            ToolName::RunLint => match parse_args::<RunLintInput>(tool, arguments) {
                Ok(input) => run_lint(skills, input).await,
                Err(result) => result,
            },
            ToolName::RunFmt => match parse_args::<RunFmtInput>(tool, arguments) {
                Ok(input) => run_fmt(skills, input).await,
                Err(result) => result,
            },
            ToolName::TypeCheck => {
                let outcome = skills.type_check().await;
                let label = status_label("Type check", "passed", outcome.success);
                ToolResult::from_outcome(&label, &outcome)
            }
            ToolName::GetRoutes => get_routes(),
            ToolName::RunTask => match parse_args::<RunTaskInput>(tool, arguments) {
                Ok(input) => run_task(skills, input).await,
                Err(result) => result,
            },
        }
    }
    .instrument(span)
    .await
}

async fn run_tests<R: CommandRunner>(skills: &Skills<R>, input: RunTestsInput) -> ToolResult {
    let filter = input.filter.as_deref().filter(|f| !f.is_empty());
    let outcome = skills.test(filter, input.coverage.unwrap_or(false)).await;
    ToolResult::from_outcome("Tests", &outcome)
}

async fn run_lint<R: CommandRunner>(skills: &Skills<R>, input: RunLintInput) -> ToolResult {
    let outcome = skills.lint(input.fix.unwrap_or(false)).await;
    ToolResult::from_outcome(&status_label("Lint", "passed", outcome.success), &outcome)
}

async fn run_fmt<R: CommandRunner>(skills: &Skills<R>, input: RunFmtInput) -> ToolResult {
    let check = input.check.unwrap_or(false);
    let outcome = skills.fmt(check).await;
    let label = if check {
        status_label("Format check", "passed", outcome.success)
    } else {
        status_label("Format", "complete", outcome.success)
    };
    ToolResult::from_outcome(&label, &outcome)
}

async fn run_task<R: CommandRunner>(skills: &Skills<R>, input: RunTaskInput) -> ToolResult {
    let args = input.args.unwrap_or_default();
    let outcome = skills.run_task(&input.task, &args).await;
    ToolResult::from_outcome(&format!("Task \"{}\"", input.task), &outcome)
}

fn get_routes() -> ToolResult {
    match serde_json::to_string_pretty(ROUTES) {
        Ok(text) => ToolResult::text(text),
        Err(err) => ToolResult::error(format!("Error: could not serialize routes: {err}")),
    }
}

fn status_label(subject: &str, ok_word: &str, success: bool) -> String {
    format!("{subject} {}", if success { ok_word } else { "failed" })
}

fn parse_args<T: DeserializeOwned>(tool: ToolName, arguments: Value) -> Result<T, ToolResult> {
    serde_json::from_value(arguments).map_err(|err| {
        ToolResult::error(format!("Invalid arguments for {}: {err}", tool.as_str()))
    })
}
