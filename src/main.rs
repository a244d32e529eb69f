//! Server binary: loads config, opens SQLite storage, serves the student API until Ctrl+C/SIGTERM.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use student_registry::{app_router, serve, shutdown_signal, AppState, Config, SqliteStore};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "student-registry", version, about = "Student registry REST service")]
struct Args {
    /// Path to a dotenv-style config file.
    #[arg(long = "config", env = "CONFIG_PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("student_registry=info,tower_http=info")),
        )
        .init();

    if let Some(dir) = config.storage_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await?;
    }
    let store = SqliteStore::open(&config.storage_path, config.storage_timeout).await?;
    tracing::info!(env = %config.env, path = %config.storage_path.display(), "storage initialized");

    let state = AppState::new(Arc::new(store));
    let app = app_router(state, config.max_body_bytes);

    let listener = TcpListener::bind(config.http_address).await?;
    tracing::info!(address = %listener.local_addr()?, "server started");

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        trigger.cancel();
    });

    serve(listener, app, shutdown, config.shutdown_grace).await?;
    Ok(())
}
