//! `memverse-upload` binary: load config, open storage, serve.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use memverse_upload::{AppState, UploadConfig, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = UploadConfig::load().context("loading configuration")?;
    init_tracing(&config);

    let addr = config.bind_addr();
    let state = Arc::new(AppState::open(config).context("opening upload storage")?);
    info!(
        upload_dir = %state.blobs.root().display(),
        database = %state.config.database_path.display(),
        "Storage ready"
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(addr = %addr, "Memories API server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    info!("Server stopped");
    Ok(())
}

fn init_tracing(config: &UploadConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until killed.
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
