// MindTwin Server - Document models
// Copyright (c) 2025 MindTwin contributors
//
// Licensed under AGPL-3.0.
// See LICENSE file for details.

//! Documents persisted by the server and the request bodies that create them.
//!
//! Field names serialize in camelCase to match the documents the viewer
//! and upstream producers exchange.

use chrono::{DateTime, NaiveDate, Utc};
use mindtwin::RawMetrics;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

/// Why a request body was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("{0}")]
    Invalid(String),
}

fn require(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(field)),
    }
}

// ============================================================
// Cognitive entries
// ============================================================

/// A patient's free-text answer to a question, plus scores derived upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CognitiveEntry {
    pub id: Uuid,
    pub patient_id: String,
    pub question_id: String,
    pub question_text: String,
    pub recorded_at: DateTime<Utc>,
    pub raw_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cognitive_load: Option<f64>,
    #[serde(default)]
    pub explainers: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
}

/// Body of `POST /api/cognitive-entries`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCognitiveEntry {
    pub patient_id: Option<String>,
    pub question_id: Option<String>,
    pub question_text: Option<String>,
    pub raw_text: Option<String>,
}

impl NewCognitiveEntry {
    /// Check required fields in order and build the entry, recorded at `now`.
    pub fn validate(self, now: DateTime<Utc>) -> Result<CognitiveEntry, ValidationError> {
        let patient_id = require(self.patient_id, "patientId")?;
        let question_id = require(self.question_id, "questionId")?;
        let question_text = require(self.question_text, "questionText")?;
        let raw_text = require(self.raw_text, "rawText")?;

        Ok(CognitiveEntry {
            id: Uuid::new_v4(),
            patient_id,
            question_id,
            question_text,
            recorded_at: now,
            raw_text,
            sentiment_score: None,
            emotion: None,
            stress_level: None,
            energy_level: None,
            cognitive_load: None,
            explainers: Map::new(),
            created_at: now,
            processed_at: None,
        })
    }
}

// ============================================================
// Twin states
// ============================================================

/// Summary of a patient's entries over a time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwinState {
    pub id: Uuid,
    pub patient_id: String,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_stress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotional_stability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cognitive_load_avg: Option<f64>,
    #[serde(default)]
    pub energy_trend: Vec<f64>,
    #[serde(default)]
    pub flags_from_reports: Vec<String>,
    #[serde(default)]
    pub learning_trend: Map<String, Value>,
    pub generated_at: DateTime<Utc>,
}

/// Body of `POST /api/twin-states`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTwinState {
    pub patient_id: Option<String>,
    pub window_start: Option<DateTime<Utc>>,
    pub window_end: Option<DateTime<Utc>>,
    pub average_stress: Option<f64>,
    pub emotional_stability: Option<f64>,
    pub cognitive_load_avg: Option<f64>,
    #[serde(default)]
    pub energy_trend: Vec<f64>,
    #[serde(default)]
    pub flags_from_reports: Vec<String>,
    #[serde(default)]
    pub learning_trend: Map<String, Value>,
    pub generated_at: Option<DateTime<Utc>>,
}

impl NewTwinState {
    pub fn validate(self, now: DateTime<Utc>) -> Result<TwinState, ValidationError> {
        let patient_id = require(self.patient_id, "patientId")?;
        let window_start = self
            .window_start
            .ok_or(ValidationError::MissingField("windowStart"))?;
        let window_end = self
            .window_end
            .ok_or(ValidationError::MissingField("windowEnd"))?;
        if window_end < window_start {
            return Err(ValidationError::Invalid(
                "windowEnd must not precede windowStart".to_string(),
            ));
        }

        Ok(TwinState {
            id: Uuid::new_v4(),
            patient_id,
            window_start,
            window_end,
            average_stress: self.average_stress,
            emotional_stability: self.emotional_stability,
            cognitive_load_avg: self.cognitive_load_avg,
            energy_trend: self.energy_trend,
            flags_from_reports: self.flags_from_reports,
            learning_trend: self.learning_trend,
            generated_at: self.generated_at.unwrap_or(now),
        })
    }
}

// ============================================================
// Daily questions
// ============================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question_id: String,
    pub text: String,
    pub tone: String,
}

/// Inputs a question set was generated from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedFrom {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Questions generated for one patient on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyQuestionSet {
    pub id: Uuid,
    pub patient_id: String,
    pub date: NaiveDate,
    pub questions: Vec<Question>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_from: Option<GeneratedFrom>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuestion {
    pub question_id: Option<String>,
    pub text: Option<String>,
    pub tone: Option<String>,
}

/// Body of `POST /api/daily-questions`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDailyQuestionSet {
    pub patient_id: Option<String>,
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub questions: Vec<NewQuestion>,
    pub generated_from: Option<GeneratedFrom>,
}

impl NewDailyQuestionSet {
    pub fn validate(self, now: DateTime<Utc>) -> Result<DailyQuestionSet, ValidationError> {
        let patient_id = require(self.patient_id, "patientId")?;
        let date = self.date.ok_or(ValidationError::MissingField("date"))?;

        let questions = self
            .questions
            .into_iter()
            .map(|q| {
                Ok(Question {
                    question_id: require(q.question_id, "questions.questionId")?,
                    text: require(q.text, "questions.text")?,
                    tone: require(q.tone, "questions.tone")?,
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        Ok(DailyQuestionSet {
            id: Uuid::new_v4(),
            patient_id,
            date,
            questions,
            generated_from: self.generated_from,
            created_at: now,
        })
    }
}

// ============================================================
// Patient reports
// ============================================================

/// Uploaded hospital report. Write-once: never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientReport {
    pub id: Uuid,
    pub patient_id: String,
    pub hospital_id: String,
    pub report_hash: String,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default)]
    pub parsed_data: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/reports`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPatientReport {
    pub patient_id: Option<String>,
    pub hospital_id: Option<String>,
    pub report_hash: Option<String>,
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub parsed_data: Map<String, Value>,
}

impl NewPatientReport {
    pub fn validate(self, now: DateTime<Utc>) -> Result<PatientReport, ValidationError> {
        let patient_id = require(self.patient_id, "patientId")?;
        let hospital_id = require(self.hospital_id, "hospitalId")?;
        let report_hash = match self.report_hash {
            Some(hash) if !hash.trim().is_empty() => hash,
            _ => report_hash(&patient_id, &hospital_id, &self.parsed_data),
        };

        Ok(PatientReport {
            id: Uuid::new_v4(),
            patient_id,
            hospital_id,
            report_hash,
            uploaded_at: self.uploaded_at.unwrap_or(now),
            parsed_data: self.parsed_data,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Hex SHA-256 of the compact JSON of `{hospitalId, parsedData, patientId}`.
///
/// `serde_json::Map` keeps keys sorted, so equal content hashes equally
/// regardless of the key order it arrived in.
pub fn report_hash(patient_id: &str, hospital_id: &str, parsed_data: &Map<String, Value>) -> String {
    let mut doc = Map::new();
    doc.insert("hospitalId".to_string(), Value::String(hospital_id.to_string()));
    doc.insert("parsedData".to_string(), Value::Object(parsed_data.clone()));
    doc.insert("patientId".to_string(), Value::String(patient_id.to_string()));

    let canonical = Value::Object(doc).to_string();
    hex::encode(Sha256::digest(canonical.as_bytes()))
}

// ============================================================
// Metrics document
// ============================================================

/// Build the document the viewer resolves drivers from.
///
/// Starts from the twin state (all of its fields, so `averageStress`,
/// `emotionalStability`, `cognitiveLoadAvg` and `energyTrend` are present
/// when known) and overlays the report's `parsedData`. `None` when the
/// patient has neither.
pub fn metrics_document(
    twin: Option<&TwinState>,
    report: Option<&PatientReport>,
) -> Option<RawMetrics> {
    if twin.is_none() && report.is_none() {
        return None;
    }

    let mut doc = twin
        .and_then(|t| serde_json::to_value(t).ok())
        .and_then(|v| RawMetrics::from_value(v).ok())
        .unwrap_or_default();

    if let Some(report) = report {
        doc.overlay(&RawMetrics::from(report.parsed_data.clone()));
    }
    Some(doc)
}
