// MindTwin Server - REST API
// Copyright (c) 2025 MindTwin contributors
//
// Licensed under AGPL-3.0.
// See LICENSE file for details.

//! # MindTwin Server
//!
//! REST API for cognitive entries, twin states, daily questions and
//! hospital reports, plus the metrics document the viewer polls.
//!
//! ## Endpoints
//!
//! | Route | Purpose |
//! |---|---|
//! | `GET /health` | Store and Redis status |
//! | `GET /metrics` | Prometheus metrics |
//! | `GET /status` | Version and uptime |
//! | `POST /api/cognitive-entries` | Record a patient answer |
//! | `GET /api/cognitive-entries/:patient_id` | List a patient's answers |
//! | `POST /api/twin-states` | Store a window summary |
//! | `GET /api/twin-states/:patient_id/latest` | Latest summary |
//! | `POST /api/daily-questions` | Store a question set |
//! | `GET /api/daily-questions/:patient_id` | List question sets (`?date=`) |
//! | `POST /api/reports` | Upload a write-once report |
//! | `GET /api/reports/:patient_id` | Metrics document |
//! | `GET /api/reports/:patient_id/drivers` | Resolved drivers |
//!
//! ## Example
//!
//! ```rust,no_run
//! use mindtwin_server::{router, AppState, MemoryStore};
//! use std::sync::Arc;
//!
//! # async fn run() -> std::io::Result<()> {
//! let state = Arc::new(AppState::new(Arc::new(MemoryStore::new())));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router(state)).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod health;
pub mod metrics;
pub mod models;
pub mod routes;
pub mod store;

pub use config::Args;
pub use error::{ApiError, StoreError, StoreResult};
pub use health::{HealthReport, RedisStatus, RedisTarget};
pub use routes::{router, AppState};
pub use store::{DocumentStore, MemoryStore, StoreStatus};
