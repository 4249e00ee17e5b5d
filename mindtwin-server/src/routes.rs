// MindTwin Server - HTTP routes
// Copyright (c) 2025 MindTwin contributors
//
// Licensed under AGPL-3.0.
// See LICENSE file for details.

//! Router and request handlers.

use axum::{
    extract::{rejection::JsonRejection, OriginalUri, Path, Query, State},
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use mindtwin::{Drivers, MetricResolver, RawMetrics};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};

use crate::error::{ApiError, StoreError};
use crate::health::{probe_redis, HealthReport, RedisStatus, RedisTarget, REDIS_PROBE_TIMEOUT};
use crate::metrics::{self, encode_metrics};
use crate::models::{
    metrics_document, CognitiveEntry, DailyQuestionSet, NewCognitiveEntry, NewDailyQuestionSet,
    NewPatientReport, NewTwinState, PatientReport, TwinState, ValidationError,
};
use crate::store::DocumentStore;

/// Application state shared across handlers.
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub resolver: MetricResolver,
    pub redis: Option<RedisTarget>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            resolver: MetricResolver::new(),
            redis: None,
            start_time: Instant::now(),
        }
    }

    pub fn with_redis(mut self, redis: Option<RedisTarget>) -> Self {
        self.redis = redis;
        self
    }
}

/// Successful write or list response.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> Envelope<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

type Created<T> = (StatusCode, Json<Envelope<T>>);

/// Build the full application router.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/cognitive-entries", post(create_entry))
        .route("/cognitive-entries/:patient_id", get(list_entries))
        .route("/twin-states", post(create_twin_state))
        .route("/twin-states/:patient_id/latest", get(latest_twin_state))
        .route("/daily-questions", post(create_question_set))
        .route("/daily-questions/:patient_id", get(list_question_sets))
        .route("/reports", post(upload_report))
        .route("/reports/:patient_id", get(metrics_handler_for_patient))
        .route("/reports/:patient_id/", get(metrics_handler_for_patient))
        .route("/reports/:patient_id/drivers", get(drivers_for_patient));

    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/status", get(status_handler))
        .nest("/api", api)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Unwrap a JSON body, turning extractor rejections into a validation error.
fn body<T>(payload: Result<Json<T>, JsonRejection>, resource: &str) -> Result<T, ApiError> {
    payload.map(|Json(v)| v).map_err(|rejection| {
        metrics::record_validation_failure(resource);
        ApiError::Validation(rejection.body_text())
    })
}

fn validated<T>(result: Result<T, ValidationError>, resource: &str) -> Result<T, ApiError> {
    result.map_err(|e| {
        metrics::record_validation_failure(resource);
        debug!(resource, "rejected: {}", e);
        e.into()
    })
}

// ============================================================
// Operational endpoints
// ============================================================

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store = state.store.status().await;
    let redis = match &state.redis {
        Some(target) => probe_redis(target, REDIS_PROBE_TIMEOUT).await,
        None => RedisStatus::Unavailable,
    };
    metrics::update_health(store, redis);

    let report = HealthReport::new(store, redis);
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}

async fn metrics_handler() -> Result<impl IntoResponse, ApiError> {
    let metrics = encode_metrics().map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok((
        StatusCode::OK,
        [("Content-Type", "text/plain; charset=utf-8")],
        metrics,
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    version: &'static str,
    uptime_secs: u64,
    redis_configured: bool,
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.start_time.elapsed().as_secs(),
        redis_configured: state.redis.is_some(),
    })
}

async fn not_found(method: Method, OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::NotFound(format!("Route {} {} not found", method, uri.path()))
}

// ============================================================
// Cognitive entries
// ============================================================

async fn create_entry(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewCognitiveEntry>, JsonRejection>,
) -> Result<Created<CognitiveEntry>, ApiError> {
    const RESOURCE: &str = "cognitive_entries";
    let entry = validated(body(payload, RESOURCE)?.validate(Utc::now()), RESOURCE)?;

    let entry = state.store.insert_entry(entry).await?;
    metrics::record_created(RESOURCE);
    info!(patient = %entry.patient_id, question = %entry.question_id, "cognitive entry recorded");
    Ok((StatusCode::CREATED, Envelope::ok(entry)))
}

async fn list_entries(
    State(state): State<Arc<AppState>>,
    Path(patient_id): Path<String>,
) -> Result<Json<Envelope<Vec<CognitiveEntry>>>, ApiError> {
    let entries = state.store.entries_for_patient(&patient_id).await?;
    Ok(Envelope::ok(entries))
}

// ============================================================
// Twin states
// ============================================================

async fn create_twin_state(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewTwinState>, JsonRejection>,
) -> Result<Created<TwinState>, ApiError> {
    const RESOURCE: &str = "twin_states";
    let twin = validated(body(payload, RESOURCE)?.validate(Utc::now()), RESOURCE)?;

    let twin = state.store.insert_twin_state(twin).await?;
    metrics::record_created(RESOURCE);
    info!(patient = %twin.patient_id, window_end = %twin.window_end, "twin state stored");
    Ok((StatusCode::CREATED, Envelope::ok(twin)))
}

async fn latest_twin_state(
    State(state): State<Arc<AppState>>,
    Path(patient_id): Path<String>,
) -> Result<Json<Envelope<TwinState>>, ApiError> {
    state
        .store
        .latest_twin_state(&patient_id)
        .await?
        .map(Envelope::ok)
        .ok_or_else(|| ApiError::NotFound(format!("No twin state for patient {}", patient_id)))
}

// ============================================================
// Daily questions
// ============================================================

#[derive(Debug, Deserialize)]
struct DateFilter {
    date: Option<String>,
}

async fn create_question_set(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewDailyQuestionSet>, JsonRejection>,
) -> Result<Created<DailyQuestionSet>, ApiError> {
    const RESOURCE: &str = "daily_questions";
    let set = validated(body(payload, RESOURCE)?.validate(Utc::now()), RESOURCE)?;

    let set = state.store.insert_question_set(set).await?;
    metrics::record_created(RESOURCE);
    info!(patient = %set.patient_id, date = %set.date, count = set.questions.len(), "daily questions stored");
    Ok((StatusCode::CREATED, Envelope::ok(set)))
}

async fn list_question_sets(
    State(state): State<Arc<AppState>>,
    Path(patient_id): Path<String>,
    Query(filter): Query<DateFilter>,
) -> Result<Json<Envelope<Vec<DailyQuestionSet>>>, ApiError> {
    let date = filter
        .date
        .as_deref()
        .map(|d| {
            NaiveDate::parse_from_str(d, "%Y-%m-%d")
                .map_err(|_| ApiError::Validation(format!("Invalid date: {}", d)))
        })
        .transpose()?;

    let sets = state.store.question_sets(&patient_id, date).await?;
    Ok(Envelope::ok(sets))
}

// ============================================================
// Reports
// ============================================================

async fn upload_report(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewPatientReport>, JsonRejection>,
) -> Result<Created<PatientReport>, ApiError> {
    const RESOURCE: &str = "reports";
    let report = validated(body(payload, RESOURCE)?.validate(Utc::now()), RESOURCE)?;

    match state.store.insert_report(report).await {
        Ok(report) => {
            metrics::record_created(RESOURCE);
            info!(patient = %report.patient_id, hash = %report.report_hash, "report uploaded");
            Ok((StatusCode::CREATED, Envelope::ok(report)))
        }
        Err(StoreError::DuplicateReport(hash)) => {
            metrics::REPORT_CONFLICTS_TOTAL.inc();
            Err(ApiError::Conflict(format!(
                "Report with hash {} already exists",
                hash
            )))
        }
        Err(e) => Err(e.into()),
    }
}

async fn lookup_metrics(state: &AppState, patient_id: &str) -> Result<RawMetrics, ApiError> {
    let twin = state.store.latest_twin_state(patient_id).await?;
    let report = state.store.latest_report(patient_id).await?;

    let doc = metrics_document(twin.as_ref(), report.as_ref());
    metrics::record_lookup(doc.is_some());
    doc.ok_or_else(|| ApiError::NotFound(format!("No metrics for patient {}", patient_id)))
}

/// The document the viewer polls.
async fn metrics_handler_for_patient(
    State(state): State<Arc<AppState>>,
    Path(patient_id): Path<String>,
) -> Result<Json<RawMetrics>, ApiError> {
    lookup_metrics(&state, &patient_id).await.map(Json)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriversResponse {
    pub patient_id: String,
    pub drivers: Drivers,
    pub percentages: [u8; 4],
}

async fn drivers_for_patient(
    State(state): State<Arc<AppState>>,
    Path(patient_id): Path<String>,
) -> Result<Json<DriversResponse>, ApiError> {
    let raw = lookup_metrics(&state, &patient_id).await?;
    let drivers = state.resolver.resolve(&raw);
    Ok(Json(DriversResponse {
        patient_id,
        percentages: drivers.percentages(),
        drivers,
    }))
}
