// MindTwin Viewer - Headless visualization driver
// Copyright (c) 2025 MindTwin contributors
//
// Licensed under AGPL-3.0.
// See LICENSE file for details.

//! # MindTwin Viewer
//!
//! ## Usage
//!
//! ```bash
//! MINDTWIN_API_URL=http://localhost:3000 mindtwin-viewer --patient patient-42
//!
//! # Watch frame summaries
//! mindtwin-viewer --patient patient-42 --log-level debug
//! ```

use clap::Parser;
use mindtwin::{Animator, DriverCell};
use mindtwin_viewer::{Args, FrameLoop, HttpMetricsSource, Poller, TracingSink, ViewerError};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::from_default_env().add_directive(args.log_level().into()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("MindTwin Viewer v{}", env!("CARGO_PKG_VERSION"));

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), ViewerError> {
    let source = Arc::new(HttpMetricsSource::new(&args.api_url, args.request_timeout())?);
    let cell = Arc::new(DriverCell::default());

    info!("Metrics endpoint: {}", source.url_for(&args.patient));
    let poller = Poller::new(source, Arc::clone(&cell), args.poller_config())?
        .with_resolver(args.resolver()?)
        .spawn();

    let frames = FrameLoop::new(
        Animator::default(),
        cell,
        TracingSink::new(args.summary_every),
    );
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    };
    frames.run_until(args.fps, shutdown).await?;

    poller.shutdown().await;
    Ok(())
}
