// MindTwin Server - REST API
// Copyright (c) 2025 MindTwin contributors
//
// Licensed under AGPL-3.0.
// See LICENSE file for details.

//! # MindTwin Server
//!
//! ## Usage
//!
//! ```bash
//! # Development defaults (port 3000, debug logging)
//! mindtwin-server
//!
//! # Production with Redis health probe
//! NODE_ENV=production REDIS_URL=redis://cache:6379 mindtwin-server --port 8080
//! ```

use clap::Parser;
use mindtwin_server::{router, AppState, Args, MemoryStore};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::from_default_env().add_directive(args.log_level().into()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("MindTwin Server v{}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", args.environment);

    let redis = args.redis_target();
    match &redis {
        Some(target) => info!("Redis health probe: {}:{}", target.host, target.port),
        None => warn!("No Redis configured, health will report it unavailable"),
    }

    let state = Arc::new(AppState::new(Arc::new(MemoryStore::new())).with_redis(redis));
    let app = router(state);

    let addr = args.addr();
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };
    info!("Server running on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Server stopped");
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
