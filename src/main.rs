#![forbid(unsafe_code)]

//! `denovibe`: server binary.
//!
//! Bootstraps configuration and logging, then serves either the static HTTP
//! route table or the MCP tool server on stdio, depending on `--mode`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use denovibe::config::GlobalConfig;
use denovibe::http::server::serve_http;
use denovibe::mcp::dispatcher::McpDispatcher;
use denovibe::mcp::transport::serve_stdio;
use denovibe::mode::ServerMode;
use denovibe::process::runner::ProcessRunner;
use denovibe::skills::Skills;
use denovibe::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "denovibe", about = "denovibe HTTP and MCP tool server", version, long_about = None)]
struct Cli {
    /// Which surface to serve.
    #[arg(long, value_enum, default_value_t = ServerMode::Http)]
    mode: ServerMode,

    /// Path to an optional TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log output format (text or json). Logs always go to stderr.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// HTTP port; overrides both the config file and the `PORT` env var.
    #[arg(long)]
    port: Option<u16>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!(mode = ?args.mode, "denovibe bootstrap");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?;
    let result = runtime.block_on(run(args));

    // A pending blocking stdin read would otherwise hold the runtime open.
    runtime.shutdown_timeout(Duration::from_secs(1));
    result
}

async fn run(args: Cli) -> Result<()> {
    // ── Configuration: file, then PORT, then --port ──────
    let mut config = GlobalConfig::load(args.config.as_deref())?;
    config.apply_env_overrides();
    if let Some(port) = args.port {
        config.http_port = port;
    }
    info!(workspace_root = %config.workspace_root.display(), "configuration loaded");

    let ct = CancellationToken::new();

    match args.mode {
        ServerMode::Http => {
            let server_ct = ct.clone();
            let port = config.http_port;
            let server = tokio::spawn(async move { serve_http(port, server_ct).await });

            shutdown_signal().await;
            info!("shutdown signal received");
            ct.cancel();

            server
                .await
                .map_err(|err| AppError::Http(format!("server task failed: {err}")))??;
        }
        ServerMode::Mcp => {
            let skills = Skills::new(
                ProcessRunner::with_working_dir(config.workspace_root.clone()),
                &config,
            );
            let dispatcher = Arc::new(McpDispatcher::new(skills));

            let stdio_ct = ct.clone();
            tokio::select! {
                result = serve_stdio(dispatcher, stdio_ct) => {
                    if let Err(err) = result {
                        error!(%err, "stdio transport failed");
                        return Err(err);
                    }
                }
                () = shutdown_signal() => {
                    info!("shutdown signal received");
                    ct.cancel();
                }
            }
        }
    }

    info!("denovibe shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout carries JSON-RPC in mcp mode.
    let subscriber = fmt().with_env_filter(env_filter).with_writer(std::io::stderr);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
