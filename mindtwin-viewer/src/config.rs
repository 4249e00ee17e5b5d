// MindTwin Viewer - Configuration
// Copyright (c) 2025 MindTwin contributors
//
// Licensed under AGPL-3.0.
// See LICENSE file for details.

use clap::Parser;
use mindtwin::{MetricResolver, ResolverConfig, DEFAULT_MAX_SCALE, DEFAULT_POLL_INTERVAL_SECS};
use std::time::Duration;
use tracing::Level;

use crate::error::Result;
use crate::frame::DEFAULT_FPS;
use crate::poller::PollerConfig;

/// Headless MindTwin viewer
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Base URL of the MindTwin API
    #[arg(long, env = "MINDTWIN_API_URL", default_value = "http://localhost:3000")]
    pub api_url: String,

    /// Patient whose metrics drive the view
    #[arg(short, long, env = "MINDTWIN_PATIENT")]
    pub patient: String,

    /// Seconds between metrics fetches
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_SECS)]
    pub poll_interval: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "10")]
    pub request_timeout: u64,

    /// Upper end of the raw metric scale (10 for 0-10 metrics, 1 for 0-1)
    #[arg(long, default_value_t = DEFAULT_MAX_SCALE)]
    pub max_scale: f64,

    /// Frames per second
    #[arg(long, default_value_t = DEFAULT_FPS)]
    pub fps: u32,

    /// Log a frame summary every this many frames
    #[arg(long, default_value = "60")]
    pub summary_every: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig::new(self.patient.clone())
            .with_interval(Duration::from_secs(self.poll_interval))
    }

    pub fn resolver(&self) -> Result<MetricResolver> {
        let config = ResolverConfig {
            max_scale: self.max_scale,
            ..ResolverConfig::default()
        };
        Ok(MetricResolver::with_config(config)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn log_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}
