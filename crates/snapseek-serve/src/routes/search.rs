//! Search endpoints.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use serde::Serialize;
use serde_json::Value;
use snapseek_core::SearchResult;

use crate::error::ApiError;
use crate::search::run_search;
use crate::state::AppState;

/// Query-string parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub q: Option<String>,
}

impl SearchParams {
    /// Collect parameters from raw query pairs. A repeated `q` keeps the
    /// last value instead of rejecting the request.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let q = pairs
            .into_iter()
            .filter(|(key, _)| key == "q")
            .map(|(_, value)| value)
            .next_back();
        Self { q }
    }
}

/// Successful search response.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

/// `GET /search?q=...`
pub async fn search_get(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<SearchResponse>, ApiError> {
    let params = SearchParams::from_pairs(pairs);
    let query = query_text(None, params.q.as_deref()).ok_or(ApiError::MissingQuery)?;
    let results = run_search(&state, &query).await?;
    Ok(Json(SearchResponse { results }))
}

/// `POST /search`
///
/// Accepts `{"q": "..."}` as the body. The body field takes precedence over
/// the `q` query-string parameter whenever it is present.
pub async fn search_post(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Result<Json<SearchResponse>, ApiError> {
    let params = SearchParams::from_pairs(pairs);
    let body: Option<Value> = if body.is_empty() {
        None
    } else {
        match serde_json::from_slice(&body) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring undecodable search body");
                None
            }
        }
    };

    let query = query_text(body.as_ref(), params.q.as_deref()).ok_or(ApiError::MissingQuery)?;
    let results = run_search(&state, &query).await?;
    Ok(Json(SearchResponse { results }))
}

/// Pick the query text: the body's `q` field if present, else the parameter.
/// An empty or non-string value counts as missing.
pub fn query_text(body: Option<&Value>, param: Option<&str>) -> Option<String> {
    let text = match body.and_then(|b| b.get("q")) {
        Some(direct) => direct.as_str(),
        None => param,
    };
    text.filter(|q| !q.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn params_repeated_q_keeps_last() {
        let params =
            SearchParams::from_pairs(pairs(&[("q", "dog"), ("page", "2"), ("q", "cat")]));
        assert_eq!(params.q.as_deref(), Some("cat"));
    }

    #[test]
    fn params_without_q() {
        assert_eq!(
            SearchParams::from_pairs(pairs(&[("page", "2")])),
            SearchParams::default()
        );
    }

    #[test]
    fn query_text_from_param() {
        assert_eq!(query_text(None, Some("dogs")), Some("dogs".to_string()));
    }

    #[test]
    fn query_text_prefers_body_field() {
        let body = json!({"q": "cats"});
        assert_eq!(
            query_text(Some(&body), Some("dogs")),
            Some("cats".to_string())
        );
    }

    #[test]
    fn query_text_body_without_field_uses_param() {
        let body = json!({"other": 1});
        assert_eq!(
            query_text(Some(&body), Some("dogs")),
            Some("dogs".to_string())
        );
    }

    #[test]
    fn query_text_empty_is_missing() {
        assert_eq!(query_text(None, Some("")), None);
        assert_eq!(query_text(None, None), None);
        let body = json!({"q": ""});
        assert_eq!(query_text(Some(&body), Some("dogs")), None);
        let body = json!({"q": null});
        assert_eq!(query_text(Some(&body), None), None);
    }
}
