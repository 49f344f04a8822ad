//! Query pipeline: labels in, search results out.
//!
//! ```text
//! query text → extract_labels → (no labels → empty results, index untouched)
//!                             → terms query → index → hits → SearchResult
//! ```

use metrics::counter;
use serde::Deserialize;
use serde_json::{Value, json};
use snapseek_core::{SearchResult, render_object_url};

use crate::error::ApiError;
use crate::extract::extract_labels;
use crate::state::AppState;

/// Indexed field matched exactly against query labels.
pub const LABELS_FIELD: &str = "labels.keyword";

/// Exact-match filter: any document carrying at least one of `labels`.
pub fn terms_query(labels: &[String]) -> Value {
    json!({
        "query": {
            "terms": {
                LABELS_FIELD: labels,
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct SearchResponseBody {
    #[serde(default)]
    hits: Hits,
}

#[derive(Debug, Default, Deserialize)]
struct Hits {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: StoredPhoto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredPhoto {
    object_key: String,
    bucket: String,
    #[serde(default)]
    labels: Vec<String>,
}

/// Map raw index hits to public results.
pub fn map_hits(response: Value, url_template: &str) -> snapseek_core::Result<Vec<SearchResult>> {
    let body: SearchResponseBody = serde_json::from_value(response)?;

    Ok(body
        .hits
        .hits
        .into_iter()
        .map(|hit| {
            let photo = hit.source;
            let url = render_object_url(url_template, &photo.bucket, &photo.object_key);
            SearchResult {
                object_key: photo.object_key,
                bucket: photo.bucket,
                labels: photo.labels,
                url,
            }
        })
        .collect())
}

/// Run a search for already-validated query text.
///
/// Returns an empty list without touching the index when no labels could be
/// extracted: a terms filter with no terms must match nothing.
pub async fn run_search(state: &AppState, query: &str) -> Result<Vec<SearchResult>, ApiError> {
    counter!("search_requests_total").increment(1);

    let extraction = extract_labels(state.resolver.as_ref(), query).await;
    tracing::info!(
        labels = ?extraction.labels,
        source = extraction.source.as_str(),
        "extracted labels"
    );

    if extraction.labels.is_empty() {
        counter!("search_short_circuit_total").increment(1);
        return Ok(Vec::new());
    }

    let body = terms_query(&extraction.labels);
    let results = state
        .index
        .search(&state.config.index.index, &body)
        .await
        .and_then(|response| map_hits(response, &state.config.url_template))
        .inspect_err(|_| counter!("search_failures_total").increment(1))?;

    tracing::info!(count = results.len(), "search completed");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapseek_core::DEFAULT_URL_TEMPLATE;

    #[test]
    fn terms_query_shape() {
        let labels = vec!["dog".to_string(), "park".to_string()];
        assert_eq!(
            terms_query(&labels),
            json!({"query": {"terms": {"labels.keyword": ["dog", "park"]}}})
        );
    }

    #[test]
    fn map_hits_builds_urls() {
        let response = json!({
            "took": 3,
            "hits": {
                "total": {"value": 2},
                "hits": [
                    {
                        "_id": "a%20b.jpg",
                        "_source": {
                            "objectKey": "a b.jpg",
                            "bucket": "b1",
                            "createdTimestamp": "2024-05-01T00:00:00.000000Z",
                            "labels": ["dog", "park", "sunny"]
                        }
                    },
                    {
                        "_source": {
                            "objectKey": "2024/trip/x.png",
                            "bucket": "b2",
                            "labels": ["beach"]
                        }
                    }
                ]
            }
        });

        let results = map_hits(response, DEFAULT_URL_TEMPLATE).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].object_key, "a b.jpg");
        assert_eq!(results[0].labels, vec!["dog", "park", "sunny"]);
        assert_eq!(results[0].url, "https://b1.s3.amazonaws.com/a%20b.jpg");
        assert_eq!(results[1].url, "https://b2.s3.amazonaws.com/2024/trip/x.png");
    }

    #[test]
    fn map_hits_without_hits_is_empty() {
        assert!(map_hits(json!({}), DEFAULT_URL_TEMPLATE).unwrap().is_empty());
        assert!(
            map_hits(json!({"hits": {"hits": []}}), DEFAULT_URL_TEMPLATE)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn map_hits_rejects_malformed_source() {
        let response = json!({"hits": {"hits": [{"_source": {"bucket": "b1"}}]}});
        assert!(map_hits(response, DEFAULT_URL_TEMPLATE).is_err());
    }
}
