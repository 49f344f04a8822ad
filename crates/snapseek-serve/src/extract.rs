//! Label extraction from free-text queries.
//!
//! Two tiers:
//!
//! 1. The [`IntentResolver`] (NLU service). Its slot values, lowercased,
//!    become the candidate labels.
//! 2. If the resolver fails or yields nothing, [`fallback_labels`]: a
//!    lowercase whitespace tokenizer that drops [`STOP_WORDS`].
//!
//! Either way the candidates are deduplicated keeping first-seen order. The
//! fallback is logged and counted so degraded queries can be told apart.

use std::collections::HashSet;

use metrics::counter;

use crate::intent::IntentResolver;

/// Words dropped by the fallback tokenizer.
pub const STOP_WORDS: &[&str] = &["show", "me", "photos", "with", "and", "in"];

/// Where the extracted labels came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    /// The NLU service produced at least one label.
    Resolver,
    /// The NLU service answered but with no usable slots.
    FallbackEmpty,
    /// The NLU service call failed.
    FallbackError,
}

impl ExtractionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resolver => "resolver",
            Self::FallbackEmpty => "no_slots",
            Self::FallbackError => "resolver_error",
        }
    }

    pub fn is_fallback(&self) -> bool {
        !matches!(self, Self::Resolver)
    }
}

/// Extracted labels, in first-seen order without duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub labels: Vec<String>,
    pub source: ExtractionSource,
}

/// Extract query labels, falling back to the tokenizer when needed.
pub async fn extract_labels(resolver: &dyn IntentResolver, query: &str) -> Extraction {
    let (labels, source) = match resolver.resolve(query).await {
        Ok(values) => {
            let labels: Vec<String> = values
                .iter()
                .map(|v| v.trim().to_lowercase())
                .filter(|v| !v.is_empty())
                .collect();
            if labels.is_empty() {
                (fallback_labels(query), ExtractionSource::FallbackEmpty)
            } else {
                (labels, ExtractionSource::Resolver)
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "intent service call failed");
            (fallback_labels(query), ExtractionSource::FallbackError)
        }
    };

    if source.is_fallback() {
        counter!("search_labels_fallback_total", "reason" => source.as_str()).increment(1);
        tracing::warn!(
            reason = source.as_str(),
            query = %query,
            "using fallback tokenizer for label extraction"
        );
    }

    Extraction {
        labels: dedupe_preserving_order(labels),
        source,
    }
}

/// Deterministic tokenizer used when the NLU service is unavailable.
pub fn fallback_labels(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|token| !STOP_WORDS.contains(token))
        .map(str::to_string)
        .collect()
}

/// Remove duplicates, keeping the first occurrence of each label.
pub fn dedupe_preserving_order(labels: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    labels
        .into_iter()
        .filter(|label| seen.insert(label.clone()))
        .collect()
}
