//! Samovar Menu - catalog cache host process.
//!
//! Loads configuration, connects the shared store, runs an initial
//! catalog refresh, and keeps the snapshot fresh on a timer until
//! shutdown. The web router and bot front ends are separate processes
//! that consume this crate as a library.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use tokio::sync::watch;

use samovar_menu::config::MenuConfig;
use samovar_menu::state::AppState;
use samovar_menu::store::RedisStore;

#[tokio::main]
async fn main() {
    // Initialize tracing with EnvFilter; defaults to info for our crate
    // if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "samovar_menu=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = MenuConfig::from_env().expect("Failed to load configuration");

    let store = RedisStore::connect(&config.redis_url)
        .await
        .expect("Failed to connect to shared store");
    tracing::info!("shared store connected");

    let refresh_interval = config.refresh_interval;
    let state = AppState::new(config, Arc::new(store))
        .expect("Failed to initialize application state");

    // The refresh task's interval fires immediately, covering the
    // initial snapshot build; a failure there is contained like any
    // other cycle.
    let (stop_tx, stop_rx) = watch::channel(());
    let refresh_task = state.menu().spawn_refresh(refresh_interval, stop_rx);

    tracing::info!("samovar-menu running");
    shutdown_signal().await;

    // Stop the refresh loop and let an in-flight cycle finish.
    drop(stop_tx);
    if let Err(e) = refresh_task.await {
        tracing::warn!(error = %e, "refresh task did not stop cleanly");
    }
    tracing::info!("shutdown complete");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
