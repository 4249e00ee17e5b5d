//! Error types for MindTwin
//!
//! The resolve and frame paths never fail: missing data falls back and
//! out-of-range data is clamped. Only configuration and document parsing
//! can produce an error.

use thiserror::Error;

/// Result type alias for MindTwin operations
pub type Result<T> = std::result::Result<T, MindtwinError>;

/// Main error type for MindTwin operations
#[derive(Error, Debug)]
pub enum MindtwinError {
    /// A configuration value is outside its valid domain
    #[error("Invalid configuration: {field} = {value} ({reason})")]
    InvalidConfig {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// Metrics document is not a JSON object
    #[error("Malformed metrics document: {0}")]
    MalformedDocument(String),

    /// JSON parse error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MindtwinError {
    pub(crate) fn invalid(field: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidConfig {
            field,
            value,
            reason,
        }
    }
}
