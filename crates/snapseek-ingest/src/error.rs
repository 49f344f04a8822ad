//! Error types for the ingestion pipeline.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during ingestion.
///
/// Label-source errors never leave the pipeline: they are logged and
/// degraded to an empty label set. Index errors end the current record only.
#[derive(Error, Debug)]
pub enum Error {
    /// Signed index client error (transport, status, signing).
    #[error("index error: {0}")]
    Index(#[from] snapseek_core::Error),

    /// Label detection service error.
    #[error("label detection error: {0}")]
    Detector(String),

    /// Object metadata read error.
    #[error("metadata read error: {0}")]
    Metadata(String),

    /// Event record is not a storage object notification.
    #[error("unrecognized event record: {0}")]
    InvalidRecord(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
