//! API error types and response formatting.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Fixed message for requests without query text.
pub const MISSING_QUERY_MESSAGE: &str = "Missing query parameter q";

/// API error type that converts to the public error shapes.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No query text in the body or the query string.
    #[error("missing query parameter q")]
    MissingQuery,

    /// The index call failed; callers see an empty result list.
    #[error("search failed: {0}")]
    SearchFailed(#[from] snapseek_core::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::MissingQuery => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": MISSING_QUERY_MESSAGE })),
            )
                .into_response(),
            Self::SearchFailed(err) => {
                tracing::error!(
                    error = %err,
                    status = ?err.status(),
                    body = err.body().unwrap_or(""),
                    "search error"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "results": [] })),
                )
                    .into_response()
            }
        }
    }
}

/// Failure of the NLU intent service.
#[derive(Debug, thiserror::Error)]
#[error("intent service error: {0}")]
pub struct IntentError(pub String);
