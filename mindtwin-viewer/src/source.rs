// MindTwin Viewer - Metrics source
// Copyright (c) 2025 MindTwin contributors
//
// Licensed under AGPL-3.0.
// See LICENSE file for details.

//! Where metrics documents come from.

use async_trait::async_trait;
use mindtwin::RawMetrics;
use std::time::Duration;

use crate::error::{FetchError, Result, ViewerError};

/// Fetches the current metrics document for a patient.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    async fn fetch(&self, patient_id: &str) -> std::result::Result<RawMetrics, FetchError>;
}

/// Reads `GET {base}/api/reports/{patientId}/` from the MindTwin server.
#[derive(Debug, Clone)]
pub struct HttpMetricsSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMetricsSource {
    /// Client with a per-request `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ViewerError::Config(format!(
                "API URL must be http(s): {}",
                base_url
            )));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, patient_id: &str) -> String {
        format!("{}/api/reports/{}/", self.base_url, patient_id)
    }
}

#[async_trait]
impl MetricsSource for HttpMetricsSource {
    async fn fetch(&self, patient_id: &str) -> std::result::Result<RawMetrics, FetchError> {
        let response = self.client.get(self.url_for(patient_id)).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body: serde_json::Value = response.json().await?;
        RawMetrics::from_value(body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}
