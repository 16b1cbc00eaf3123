//! Stdio transport: the process-level JSON-RPC loop.
//!
//! Reads one framed line at a time, answers it, and only then reads the
//! next, so two tool calls never overlap. Bad input is answered and
//! skipped; the loop ends at end of input, on cancellation, or when stdin or
//! stdout itself fails.
//!
//! | Line                                 | Response                         |
//! |--------------------------------------|----------------------------------|
//! | blank                                | none                             |
//! | not JSON / unframeable               | `-32700` with `id: null`         |
//! | JSON but not a request object        | `-32600` with `id: null`         |
//! | method prefixed `notifications/`     | none                             |
//! | unknown method                       | `-32601`                         |
//! | dispatch failure or handler panic    | `-32603` with the error text     |
//! | anything else                        | `result` echoing the request id  |

use std::sync::Arc;

use bytes::BytesMut;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::codec::{LineFramer, McpCodec};
use super::dispatcher::McpDispatcher;
use super::protocol::{JsonRpcRequest, JsonRpcResponse};
use crate::errors::{INVALID_REQUEST, PARSE_ERROR};
use crate::process::runner::CommandRunner;
use crate::{AppError, Result};

/// Serve the dispatcher over the process's stdin/stdout.
///
/// # Errors
///
/// Returns `AppError::Io` if stdin or stdout fails.
pub async fn serve_stdio<R>(dispatcher: Arc<McpDispatcher<R>>, ct: CancellationToken) -> Result<()>
where
    R: CommandRunner + 'static,
{
    info!("starting stdio MCP transport");
    serve_lines(tokio::io::stdin(), tokio::io::stdout(), dispatcher, ct).await?;
    info!("stdio MCP transport shut down");
    Ok(())
}

/// Run the JSON-RPC loop over an arbitrary reader/writer pair.
///
/// # Errors
///
/// Returns `AppError::Io` if `input` fails to read or `output` fails to write.
pub async fn serve_lines<I, O, R>(
    input: I,
    mut output: O,
    dispatcher: Arc<McpDispatcher<R>>,
    ct: CancellationToken,
) -> Result<()>
where
    I: AsyncRead + Unpin + Send,
    O: AsyncWrite + Unpin + Send,
    R: CommandRunner + 'static,
{
    let mut framer = LineFramer::new(input);
    let mut codec = McpCodec::new();

    loop {
        let next = tokio::select! {
            biased;

            () = ct.cancelled() => {
                debug!("stdio loop: cancellation received, stopping");
                break;
            }

            next = framer.next_line() => next,
        };

        let response = match next {
            None => {
                debug!("stdio loop: end of input");
                break;
            }
            Some(Err(AppError::Framing(msg))) => {
                warn!(error = %msg, "stdio loop: framing error, skipping line");
                Some(parse_error())
            }
            Some(Err(err)) => {
                warn!(error = %err, "stdio loop: input failed, stopping");
                return Err(err);
            }
            Some(Ok(line)) => handle_line(&line, &dispatcher).await,
        };

        if let Some(response) = response {
            write_response(&mut output, &mut codec, &response).await?;
        }
    }

    Ok(())
}

/// Answer a single framed line; `None` means nothing is written back.
pub async fn handle_line<R>(line: &str, dispatcher: &Arc<McpDispatcher<R>>) -> Option<JsonRpcResponse>
where
    R: CommandRunner + 'static,
{
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let value: Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(err) => {
            debug!(%err, "stdio loop: malformed json");
            return Some(parse_error());
        }
    };

    let request: JsonRpcRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(err) => {
            debug!(%err, "stdio loop: not a request object");
            return Some(JsonRpcResponse::error(
                Value::Null,
                INVALID_REQUEST,
                "Invalid Request",
            ));
        }
    };

    if request.is_notification() {
        debug!(method = %request.method, "stdio loop: notification, no response");
        return None;
    }

    let id = request.id.clone();
    Some(match dispatch_guarded(dispatcher, request).await {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(err) => JsonRpcResponse::error(id, err.json_rpc_code(), err.to_string()),
    })
}

/// Dispatch on a separate task so a panicking handler becomes an error value.
async fn dispatch_guarded<R>(dispatcher: &Arc<McpDispatcher<R>>, request: JsonRpcRequest) -> Result<Value>
where
    R: CommandRunner + 'static,
{
    let dispatcher = Arc::clone(dispatcher);
    let method = request.method.clone();
    tokio::spawn(async move { dispatcher.dispatch(&request).await })
        .await
        .map_err(|err| AppError::Mcp(format!("{method} handler aborted: {err}")))?
}

fn parse_error() -> JsonRpcResponse {
    JsonRpcResponse::error(Value::Null, PARSE_ERROR, "Parse error")
}

async fn write_response<O>(output: &mut O, codec: &mut McpCodec, response: &JsonRpcResponse) -> Result<()>
where
    O: AsyncWrite + Unpin + Send,
{
    let line = serde_json::to_string(response)?;
    let mut bytes = BytesMut::with_capacity(line.len() + 1);
    codec.encode(line, &mut bytes)?;

    output
        .write_all(&bytes)
        .await
        .map_err(|err| AppError::Io(format!("stdout write failed: {err}")))?;
    output
        .flush()
        .await
        .map_err(|err| AppError::Io(format!("stdout flush failed: {err}")))?;
    Ok(())
}
