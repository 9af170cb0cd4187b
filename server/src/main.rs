//! IIP Agent Console: HTTP server
//!
//! Serves the workspace file routes and a JSON session API over one console
//! session.
//!
//! Usage:
//!   cargo run -p iip-server -- --bind 127.0.0.1:3000
//!   cargo run -p iip-server -- --config console.toml --workspace ./scratch --dev

mod api;
mod files;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use iip_contracts::pipeline::Env;
use iip_core::{ConsoleConfig, FsWorkspace};

use api::AppState;

#[derive(Parser)]
#[command(name = "iip-server", about = "IIP agent console HTTP server")]
struct Cli {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:3000")]
    bind: String,

    /// TOML console configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Deployment tier (DEV, STG or PRD). Overrides the config file.
    #[arg(long)]
    env: Option<Env>,

    /// Root for file routes and artifact writes. Defaults to the config's
    /// `workspace_root`, then the working directory.
    #[arg(long)]
    workspace: Option<PathBuf>,

    /// Allow cross-origin requests from any origin.
    #[arg(long)]
    dev: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Server error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => ConsoleConfig::from_file(path)?,
        None => ConsoleConfig::default(),
    };
    if let Some(env) = cli.env {
        config.env = env;
    }

    let workspace = match cli.workspace.or_else(|| config.workspace_root.clone()) {
        Some(root) => FsWorkspace::new(root),
        None => FsWorkspace::current_dir()?,
    };
    info!(env = %config.env, root = %workspace.root().display(), "workspace ready");

    let state = Arc::new(AppState::new(config, workspace)?);
    let mut app = api::api_router().with_state(state);
    if cli.dev {
        app = app.layer(CorsLayer::permissive());
    }

    let listener = tokio::net::TcpListener::bind(&cli.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", cli.bind))?;
    info!(addr = %listener.local_addr()?, "IIP console server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
