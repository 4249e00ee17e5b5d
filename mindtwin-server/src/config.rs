// MindTwin Server - Configuration
// Copyright (c) 2025 MindTwin contributors
//
// Licensed under AGPL-3.0.
// See LICENSE file for details.

//! Command-line and environment configuration.

use clap::Parser;
use std::net::SocketAddr;
use tracing::Level;

use crate::health::RedisTarget;

/// MindTwin REST API server
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Runtime environment (development, production, ...)
    #[arg(long, env = "NODE_ENV", default_value = "development")]
    pub environment: String,

    /// Redis URL, e.g. redis://localhost:6379
    #[arg(long, env = "REDIS_URL")]
    pub redis_url: Option<String>,

    /// Redis host, used when no URL is given
    #[arg(long, env = "REDIS_HOST")]
    pub redis_host: Option<String>,

    /// Redis port, used with --redis-host
    #[arg(long, env = "REDIS_PORT", default_value = "6379")]
    pub redis_port: u16,

    /// Log level (trace, debug, info, warn, error); defaults by environment
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    pub fn redis_target(&self) -> Option<RedisTarget> {
        RedisTarget::resolve(
            self.redis_url.as_deref(),
            self.redis_host.as_deref(),
            self.redis_port,
        )
    }

    /// Level used when `RUST_LOG` is unset.
    pub fn log_level(&self) -> Level {
        match self.log_level.as_deref().map(str::to_lowercase).as_deref() {
            Some("trace") => Level::TRACE,
            Some("debug") => Level::DEBUG,
            Some("info") => Level::INFO,
            Some("warn") => Level::WARN,
            Some("error") => Level::ERROR,
            _ if self.is_development() => Level::DEBUG,
            _ => Level::INFO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_flags() {
        let args = Args::parse_from([
            "mindtwin-server",
            "--port",
            "8080",
            "--environment",
            "production",
        ]);
        assert_eq!(args.port, 8080);
        assert!(!args.is_development());
        assert_eq!(args.log_level(), Level::INFO);
        assert_eq!(args.addr().port(), 8080);
    }

    #[test]
    fn test_log_level_override() {
        let args = Args::parse_from([
            "mindtwin-server",
            "--environment",
            "production",
            "--log-level",
            "WARN",
        ]);
        assert_eq!(args.log_level(), Level::WARN);
    }

    #[test]
    fn test_redis_target_from_host() {
        let args = Args::parse_from([
            "mindtwin-server",
            "--redis-host",
            "cache",
            "--redis-port",
            "6380",
        ]);
        assert_eq!(args.redis_target(), Some(RedisTarget::new("cache", 6380)));
    }
}
