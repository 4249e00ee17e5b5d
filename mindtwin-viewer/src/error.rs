// MindTwin Viewer - Error types
// Copyright (c) 2025 MindTwin contributors
//
// Licensed under AGPL-3.0.
// See LICENSE file for details.

use thiserror::Error;

/// Result type for viewer setup
pub type Result<T> = std::result::Result<T, ViewerError>;

/// Why a metrics fetch produced no document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, timeout or protocol failure
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("server returned HTTP {0}")]
    Status(u16),

    /// Body was not a metrics document
    #[error("malformed metrics document: {0}")]
    Decode(String),
}

/// Errors raised while setting the viewer up.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error(transparent)]
    Core(#[from] mindtwin::MindtwinError),
}
