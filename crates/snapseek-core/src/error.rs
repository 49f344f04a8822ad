//! Error types shared by the snapseek pipelines.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while talking to the remote index service.
///
/// Every variant is a transport/auth failure from the caller's point of view:
/// the pipelines log it and either skip the current record or answer with an
/// error response.
#[derive(Error, Debug)]
pub enum Error {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The index service answered with a non-2xx status.
    #[error("index service returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body, kept for diagnostics.
        body: String,
    },

    /// The request signature could not be computed.
    #[error("signing error: {0}")]
    Signing(String),

    /// Ambient credentials could not be resolved.
    #[error("credentials error: {0}")]
    Credentials(String),

    /// Request or response JSON could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configured endpoint and path do not form a valid URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Required configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status carried by the error, if the index service answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Raw response body carried by the error, if any.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } => Some(body),
            _ => None,
        }
    }
}
