//! LRU Persist - A list-valued LRU cache server
//!
//! Serves the cache over a line-oriented TCP protocol and an HTTP API, and
//! flushes everything to disk on shutdown.

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lru_persist::api::create_router;
use lru_persist::cache::PersistentStore;
use lru_persist::protocol;
use lru_persist::{spawn_reconciler_task, AppState, Config, ReconcilerSettings};

/// Main entry point for the cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the cache over the persistence file
/// 4. Start the background reconciler
/// 5. Start the line protocol and HTTP listeners
/// 6. On SIGINT/SIGTERM, stop both listeners and flush everything to disk
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lru_persist=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting LRU Persist cache server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: max_size={}, file={}, sleep_interval={}s, persist_threshold={}",
        config.max_size,
        config.persistence_file_path.display(),
        config.sleep_interval_seconds,
        config.persist_threshold
    );

    PersistentStore::new(config.persistence_file_path.clone())
        .ensure_parent_dir()
        .context("Failed to prepare the persistence directory")?;

    let state = AppState::from_config(&config);
    info!("Cache initialized with {} resident entries", state.cache.len());

    let reconciler =
        spawn_reconciler_task(state.cache.clone(), ReconcilerSettings::from_config(&config));

    let tcp_listener = TcpListener::bind((config.host.as_str(), config.tcp_port))
        .await
        .with_context(|| format!("Failed to bind line protocol port {}", config.tcp_port))?;
    let http_listener = TcpListener::bind((config.host.as_str(), config.http_port))
        .await
        .with_context(|| format!("Failed to bind HTTP port {}", config.http_port))?;
    info!(
        "Server listening on http://{}",
        http_listener.local_addr()?
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let line_task = tokio::spawn(protocol::serve(
        tcp_listener,
        state.clone(),
        wait_for_shutdown(shutdown_rx.clone()),
    ));

    let app = create_router(state);
    let http_task = tokio::spawn(async move {
        axum::serve(http_listener, app)
            .with_graceful_shutdown(wait_for_shutdown(shutdown_rx))
            .await
    });

    shutdown_signal().await;
    let _ = shutdown_tx.send(true);

    match line_task.await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => warn!("Line protocol server failed: {}", err),
        Err(err) => warn!("Line protocol task panicked: {}", err),
    }
    match http_task.await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => warn!("HTTP server failed: {}", err),
        Err(err) => warn!("HTTP task panicked: {}", err),
    }

    info!("Listeners stopped, persisting cache");
    if reconciler.flush_and_stop().await {
        info!("Server shutdown complete");
    } else {
        warn!("Final flush failed; unsaved entries were lost");
    }

    Ok(())
}

async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
