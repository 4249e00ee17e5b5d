// MindTwin Server - Prometheus metrics definitions
// Copyright (c) 2025 MindTwin contributors
//
// Licensed under AGPL-3.0.
// See LICENSE file for details.

//! Prometheus metrics exposed on `/metrics`.

use lazy_static::lazy_static;
use prometheus::{
    register_counter, register_counter_vec, register_gauge, Counter, CounterVec, Encoder, Gauge,
    TextEncoder,
};

use crate::health::RedisStatus;
use crate::store::StoreStatus;

lazy_static! {
    // ============================================================
    // Documents
    // ============================================================

    /// Documents created, labeled by resource.
    pub static ref DOCUMENTS_CREATED_TOTAL: CounterVec = register_counter_vec!(
        "mindtwin_documents_created_total",
        "Documents created by resource",
        &["resource"]
    ).unwrap();

    /// Request bodies rejected by validation, labeled by resource.
    pub static ref VALIDATION_FAILURES_TOTAL: CounterVec = register_counter_vec!(
        "mindtwin_validation_failures_total",
        "Request bodies rejected by validation",
        &["resource"]
    ).unwrap();

    /// Report uploads rejected because the hash already exists.
    pub static ref REPORT_CONFLICTS_TOTAL: Counter = register_counter!(
        "mindtwin_report_conflicts_total",
        "Report uploads rejected as duplicates"
    ).unwrap();

    /// Metrics-document lookups, labeled by outcome (found, missing).
    pub static ref METRICS_LOOKUPS_TOTAL: CounterVec = register_counter_vec!(
        "mindtwin_metrics_lookups_total",
        "Metrics document lookups by outcome",
        &["outcome"]
    ).unwrap();

    // ============================================================
    // Dependencies
    // ============================================================

    /// 1 when the document store was connected at the last health check.
    pub static ref STORE_UP: Gauge = register_gauge!(
        "mindtwin_store_up",
        "Document store connected at last health check (0/1)"
    ).unwrap();

    /// 1 when Redis answered PING at the last health check.
    pub static ref REDIS_UP: Gauge = register_gauge!(
        "mindtwin_redis_up",
        "Redis answered PING at last health check (0/1)"
    ).unwrap();
}

pub fn record_created(resource: &str) {
    DOCUMENTS_CREATED_TOTAL.with_label_values(&[resource]).inc();
}

pub fn record_validation_failure(resource: &str) {
    VALIDATION_FAILURES_TOTAL
        .with_label_values(&[resource])
        .inc();
}

pub fn record_lookup(found: bool) {
    let outcome = if found { "found" } else { "missing" };
    METRICS_LOOKUPS_TOTAL.with_label_values(&[outcome]).inc();
}

/// Update the dependency gauges from a health check.
pub fn update_health(store: StoreStatus, redis: RedisStatus) {
    STORE_UP.set(if store.is_connected() { 1.0 } else { 0.0 });
    REDIS_UP.set(if redis == RedisStatus::Connected { 1.0 } else { 0.0 });
}

/// Encode every registered metric in the Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
