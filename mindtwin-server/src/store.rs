// MindTwin Server - Document store
// Copyright (c) 2025 MindTwin contributors
//
// Licensed under AGPL-3.0.
// See LICENSE file for details.

//! Persistence seam for the four document collections.
//!
//! Handlers only see [`DocumentStore`]. [`MemoryStore`] keeps everything in
//! process and is what the binary runs with.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::models::{CognitiveEntry, DailyQuestionSet, PatientReport, TwinState};

/// Connection status reported by `/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    Connected,
    Disconnected,
}

impl StoreStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreStatus::Connected => "connected",
            StoreStatus::Disconnected => "disconnected",
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, StoreStatus::Connected)
    }
}

/// Document persistence used by the API.
///
/// Reports are write-once: there is deliberately no update or delete.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert_entry(&self, entry: CognitiveEntry) -> StoreResult<CognitiveEntry>;

    /// Entries for a patient, oldest first.
    async fn entries_for_patient(&self, patient_id: &str) -> StoreResult<Vec<CognitiveEntry>>;

    async fn insert_twin_state(&self, state: TwinState) -> StoreResult<TwinState>;

    /// Twin state with the latest `windowEnd`.
    async fn latest_twin_state(&self, patient_id: &str) -> StoreResult<Option<TwinState>>;

    async fn insert_question_set(&self, set: DailyQuestionSet) -> StoreResult<DailyQuestionSet>;

    async fn question_sets(
        &self,
        patient_id: &str,
        date: Option<NaiveDate>,
    ) -> StoreResult<Vec<DailyQuestionSet>>;

    /// Fails with [`StoreError::DuplicateReport`] if the hash is taken.
    async fn insert_report(&self, report: PatientReport) -> StoreResult<PatientReport>;

    /// Report with the latest `uploadedAt`.
    async fn latest_report(&self, patient_id: &str) -> StoreResult<Option<PatientReport>>;

    async fn status(&self) -> StoreStatus;
}

#[derive(Debug, Default)]
struct Collections {
    entries: Vec<CognitiveEntry>,
    twin_states: Vec<TwinState>,
    question_sets: Vec<DailyQuestionSet>,
    reports: Vec<PatientReport>,
}

/// In-process [`DocumentStore`].
#[derive(Debug)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
    connected: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(Collections::default()),
            connected: AtomicBool::new(true),
        }
    }

    /// Simulate losing or regaining the backing connection.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    fn check(&self) -> StoreResult<()> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store disconnected".to_string()))
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_entry(&self, entry: CognitiveEntry) -> StoreResult<CognitiveEntry> {
        self.check()?;
        self.collections.write().await.entries.push(entry.clone());
        Ok(entry)
    }

    async fn entries_for_patient(&self, patient_id: &str) -> StoreResult<Vec<CognitiveEntry>> {
        self.check()?;
        let collections = self.collections.read().await;
        let mut entries: Vec<_> = collections
            .entries
            .iter()
            .filter(|e| e.patient_id == patient_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.created_at);
        Ok(entries)
    }

    async fn insert_twin_state(&self, state: TwinState) -> StoreResult<TwinState> {
        self.check()?;
        self.collections.write().await.twin_states.push(state.clone());
        Ok(state)
    }

    async fn latest_twin_state(&self, patient_id: &str) -> StoreResult<Option<TwinState>> {
        self.check()?;
        let collections = self.collections.read().await;
        // max_by_key keeps the last of equal keys, so ties go to the newest insert
        Ok(collections
            .twin_states
            .iter()
            .filter(|s| s.patient_id == patient_id)
            .max_by_key(|s| s.window_end)
            .cloned())
    }

    async fn insert_question_set(&self, set: DailyQuestionSet) -> StoreResult<DailyQuestionSet> {
        self.check()?;
        self.collections.write().await.question_sets.push(set.clone());
        Ok(set)
    }

    async fn question_sets(
        &self,
        patient_id: &str,
        date: Option<NaiveDate>,
    ) -> StoreResult<Vec<DailyQuestionSet>> {
        self.check()?;
        let collections = self.collections.read().await;
        Ok(collections
            .question_sets
            .iter()
            .filter(|q| q.patient_id == patient_id)
            .filter(|q| date.map_or(true, |d| q.date == d))
            .cloned()
            .collect())
    }

    async fn insert_report(&self, report: PatientReport) -> StoreResult<PatientReport> {
        self.check()?;
        let mut collections = self.collections.write().await;
        if collections
            .reports
            .iter()
            .any(|r| r.report_hash == report.report_hash)
        {
            return Err(StoreError::DuplicateReport(report.report_hash));
        }
        collections.reports.push(report.clone());
        Ok(report)
    }

    async fn latest_report(&self, patient_id: &str) -> StoreResult<Option<PatientReport>> {
        self.check()?;
        let collections = self.collections.read().await;
        Ok(collections
            .reports
            .iter()
            .filter(|r| r.patient_id == patient_id)
            .max_by_key(|r| r.uploaded_at)
            .cloned())
    }

    async fn status(&self) -> StoreStatus {
        if self.connected.load(Ordering::SeqCst) {
            StoreStatus::Connected
        } else {
            StoreStatus::Disconnected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewPatientReport, NewTwinState};
    use chrono::{DateTime, Utc};

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn twin(patient: &str, end: &str, stress: f64) -> TwinState {
        NewTwinState {
            patient_id: Some(patient.into()),
            window_start: Some(at("2025-01-01T00:00:00Z")),
            window_end: Some(at(end)),
            average_stress: Some(stress),
            ..Default::default()
        }
        .validate(Utc::now())
        .unwrap()
    }

    fn report(patient: &str, hash: &str) -> PatientReport {
        NewPatientReport {
            patient_id: Some(patient.into()),
            hospital_id: Some("h1".into()),
            report_hash: Some(hash.into()),
            ..Default::default()
        }
        .validate(Utc::now())
        .unwrap()
    }

    #[tokio::test]
    async fn test_latest_twin_by_window_end() {
        let store = MemoryStore::new();
        store
            .insert_twin_state(twin("p1", "2025-02-01T00:00:00Z", 1.0))
            .await
            .unwrap();
        store
            .insert_twin_state(twin("p1", "2025-03-01T00:00:00Z", 2.0))
            .await
            .unwrap();
        store
            .insert_twin_state(twin("p1", "2025-01-15T00:00:00Z", 3.0))
            .await
            .unwrap();
        store
            .insert_twin_state(twin("p2", "2025-04-01T00:00:00Z", 4.0))
            .await
            .unwrap();

        let latest = store.latest_twin_state("p1").await.unwrap().unwrap();
        assert_eq!(latest.average_stress, Some(2.0));
        assert!(store.latest_twin_state("p3").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_report_write_once() {
        let store = MemoryStore::new();
        store.insert_report(report("p1", "h-1")).await.unwrap();

        let err = store.insert_report(report("p1", "h-1")).await.unwrap_err();
        assert_eq!(err, StoreError::DuplicateReport("h-1".into()));

        store.insert_report(report("p1", "h-2")).await.unwrap();
    }

    #[tokio::test]
    async fn test_disconnected_store() {
        let store = MemoryStore::new();
        assert_eq!(store.status().await, StoreStatus::Connected);

        store.set_connected(false);
        assert_eq!(store.status().await, StoreStatus::Disconnected);
        assert!(matches!(
            store.entries_for_patient("p1").await,
            Err(StoreError::Unavailable(_))
        ));
    }
}
